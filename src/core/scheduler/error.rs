use sound_trail_core::scheduler::TaskConfigError;

/// Errors returned by scheduler operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Invalid task parameters: {0}")]
    InvalidParams(TaskConfigError),

    #[error("Priority {priority} outside the valid range {min}..={max}")]
    PriorityOutOfRange { priority: u8, min: u8, max: u8 },

    #[error("Failed to create task {name}: {source}")]
    CreateFailed {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Real-time scheduling denied for task {name} (errno {errno})")]
    SchedulingDenied { name: &'static str, errno: i32 },

    #[error("Task {id} ({name}) terminated abnormally")]
    JoinFailed { id: usize, name: &'static str },

    #[error("Unknown task id: {0}")]
    UnknownTask(usize),
}

impl From<TaskConfigError> for SchedulerError {
    fn from(err: TaskConfigError) -> Self {
        SchedulerError::InvalidParams(err)
    }
}

/// Errors returned by the precedence barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BarrierError {
    #[error("Round published for {requested} consumers, barrier capacity is {capacity}")]
    TooManyConsumers { requested: usize, capacity: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_params_message() {
        let err: SchedulerError = TaskConfigError::DeadlineExceedsPeriod {
            deadline_ms: 30,
            period_ms: 20,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Invalid task parameters: deadline 30 ms exceeds period 20 ms"
        );
    }

    #[test]
    fn test_create_failed_keeps_source() {
        use std::error::Error;

        let err = SchedulerError::CreateFailed {
            name: "producer",
            source: std::io::Error::from(std::io::ErrorKind::OutOfMemory),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to create task producer"));
    }
}
