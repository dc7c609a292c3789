//! Pipeline configuration
//!
//! Defaults reproduce the reference setup: one producer every 20 ms at
//! priority 90, 32 consumers every 20 ms at priority 60, and input and
//! display tasks every 30 ms at priority 30, analysing 882-sample windows of
//! a 44.1 kHz stream. A few values can be overridden from the environment.

use sound_trail_core::parameters::ACTIVE_CONSUMERS;
use sound_trail_core::scheduler::TaskParams;

use super::error::PipelineError;
use crate::core::scheduler::SchedPolicy;

/// Environment variable overriding the consumer count
pub const ENV_CONSUMERS: &str = "SOUND_TRAIL_CONSUMERS";

/// Environment variable selecting the scheduling policy
pub const ENV_SCHED: &str = "SOUND_TRAIL_SCHED";

/// Environment variable enabling verbose logging
pub const ENV_VERBOSE: &str = "SOUND_TRAIL_VERBOSE";

/// Period, relative deadline and priority of one task kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTiming {
    pub period_ms: u32,
    pub deadline_ms: u32,
    pub priority: u8,
}

impl TaskTiming {
    pub const fn new(period_ms: u32, deadline_ms: u32, priority: u8) -> Self {
        Self {
            period_ms,
            deadline_ms,
            priority,
        }
    }

    /// Registration parameters for a task of this kind
    pub const fn params(&self, name: &'static str) -> TaskParams {
        TaskParams::new(name, self.period_ms, self.deadline_ms, self.priority)
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Number of consumer tasks (and barrier capacity)
    pub consumers: usize,
    pub producer: TaskTiming,
    pub consumer: TaskTiming,
    pub input: TaskTiming,
    pub display: TaskTiming,
    /// Samples per analysis window; a frame carries half as many bins
    pub window_samples: usize,
    /// Expected stream sample rate in Hz
    pub sample_rate: u32,
    pub policy: SchedPolicy,
    pub verbose: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            consumers: ACTIVE_CONSUMERS.max,
            producer: TaskTiming::new(20, 20, 90),
            consumer: TaskTiming::new(20, 20, 60),
            input: TaskTiming::new(30, 30, 30),
            display: TaskTiming::new(30, 30, 30),
            window_samples: 882,
            sample_rate: 44_100,
            policy: SchedPolicy::RoundRobinOrBestEffort,
            verbose: false,
        }
    }
}

impl PipelineConfig {
    /// Defaults overridden from the process environment.
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden from `lookup`, which maps a variable name to its
    /// value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_CONSUMERS) {
            config.consumers = value
                .trim()
                .parse()
                .map_err(|_| PipelineError::InvalidConfig("SOUND_TRAIL_CONSUMERS is not a number"))?;
        }

        if let Some(value) = lookup(ENV_SCHED) {
            config.policy = SchedPolicy::from_name(&value).ok_or(PipelineError::InvalidConfig(
                "SOUND_TRAIL_SCHED must be rr, rr-or-best-effort or best-effort",
            ))?;
        }

        if let Some(value) = lookup(ENV_VERBOSE) {
            config.verbose = match value.trim() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => {
                    return Err(PipelineError::InvalidConfig(
                        "SOUND_TRAIL_VERBOSE must be 0 or 1",
                    ))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot run.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.consumers == 0 {
            return Err(PipelineError::InvalidConfig("at least one consumer is required"));
        }
        if self.consumers > ACTIVE_CONSUMERS.max {
            return Err(PipelineError::InvalidConfig("too many consumers"));
        }
        if self.window_samples < 2 {
            return Err(PipelineError::InvalidConfig("analysis window is too small"));
        }
        if self.sample_rate == 0 {
            return Err(PipelineError::InvalidConfig("sample rate must be non-zero"));
        }
        Ok(())
    }

    /// Magnitude bins per analysis frame
    pub fn bins(&self) -> usize {
        self.window_samples / 2
    }

    /// Stream time covered by one analysis window, in milliseconds
    pub fn frame_duration_ms(&self) -> u64 {
        self.window_samples as u64 * 1000 / self.sample_rate as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.consumers, 32);
        assert_eq!(config.producer, TaskTiming::new(20, 20, 90));
        assert_eq!(config.display.priority, 30);
        assert_eq!(config.bins(), 441);
        assert_eq!(config.frame_duration_ms(), 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = PipelineConfig::from_lookup(lookup(&[
            (ENV_CONSUMERS, "8"),
            (ENV_SCHED, "best-effort"),
            (ENV_VERBOSE, "1"),
        ]))
        .unwrap();

        assert_eq!(config.consumers, 8);
        assert_eq!(config.policy, SchedPolicy::BestEffort);
        assert!(config.verbose);
    }

    #[test]
    fn test_env_rejects_bad_values() {
        assert!(matches!(
            PipelineConfig::from_lookup(lookup(&[(ENV_CONSUMERS, "many")])),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::from_lookup(lookup(&[(ENV_SCHED, "fifo")])),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::from_lookup(lookup(&[(ENV_CONSUMERS, "0")])),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert!(matches!(
            PipelineConfig::from_lookup(lookup(&[(ENV_CONSUMERS, "33")])),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_timing_builds_params() {
        let params = TaskTiming::new(30, 25, 30).params("display");
        assert_eq!(params.name, "display");
        assert_eq!(params.deadline_ms, 25);
        assert!(params.validate().is_ok());
    }
}
