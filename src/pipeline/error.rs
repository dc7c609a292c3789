use crate::core::scheduler::{BarrierError, SchedulerError};

/// Errors raised while configuring, starting or joining the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Barrier error: {0}")]
    Barrier(#[from] BarrierError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
