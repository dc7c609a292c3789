//! Spectrum pipeline built on the periodic scheduler
//!
//! One producer task publishes an analysis frame every period; a fixed pool
//! of consumer tasks each turn one band of that frame into a smoothed level,
//! in lock-step with the producer through a [`PrecedenceBarrier`]. An input
//! task applies user commands to the shared [`Tunables`], and a display task
//! hands snapshots to a [`Presenter`].
//!
//! ```text
//!            ┌────────────┐  end_round(N)   ┌──────────────┐
//! source ──▶ │  producer  │ ──────────────▶ │ consumer 0..N │ ──▶ trails
//!            └────────────┘ ◀────────────── └──────────────┘        │
//!                  ▲           remaining==0                         ▼
//!   input ──▶ Tunables ───────────────────────────────────▶ display ──▶ presenter
//! ```
//!
//! # Example
//!
//! ```
//! use sound_trail::core::scheduler::SchedPolicy;
//! use sound_trail::pipeline::synthetic::{RecordingPresenter, ToneSource};
//! use sound_trail::pipeline::{NoInput, Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig {
//!     consumers: 8,
//!     policy: SchedPolicy::BestEffort,
//!     ..PipelineConfig::default()
//! };
//! let source = ToneSource::new(config.bins(), config.sample_rate).with_frame_limit(5);
//!
//! let pipeline = Pipeline::spawn(config, source, NoInput, RecordingPresenter::new()).unwrap();
//! let report = pipeline.join().unwrap();
//! assert_eq!(report.rounds_published, 6);
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod frame;
pub mod synthetic;
pub mod trails;
pub mod traits;
pub mod tunables;
pub mod workers;

pub use commands::Command;
pub use config::{PipelineConfig, TaskTiming};
pub use error::PipelineError;
pub use frame::Frame;
pub use trails::{BandSample, BandTrail, BandTrails, TRAIL_LEN};
pub use traits::{InputSource, NoInput, NullPresenter, Presenter, Snapshot, SpectrumSource};
pub use tunables::Tunables;
pub use workers::PipelineState;

use core::fmt;
use std::sync::Arc;

use crate::core::scheduler::{
    PrecedenceBarrier, Scheduler, SchedulerStats, TaskHandle, TaskReport,
};
use crate::{log_error, log_info};

/// Handles of every task the pipeline registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineTasks {
    pub producer: TaskHandle,
    pub consumers: Vec<TaskHandle>,
    pub input: TaskHandle,
    pub display: TaskHandle,
}

/// A running pipeline
pub struct Pipeline {
    scheduler: Scheduler,
    state: Arc<PipelineState>,
    tasks: PipelineTasks,
}

impl Pipeline {
    /// Register and start every task.
    ///
    /// Tasks are created producer first, then the consumers in band order,
    /// then input and display. If any creation fails, the tasks already
    /// started are stopped and joined before the error is returned.
    pub fn spawn<S, I, P>(
        config: PipelineConfig,
        source: S,
        input: I,
        presenter: P,
    ) -> Result<Self, PipelineError>
    where
        S: SpectrumSource + 'static,
        I: InputSource + 'static,
        P: Presenter + 'static,
    {
        config.validate()?;

        let state = Arc::new(PipelineState::new(&config, source.sample_rate()));
        let mut scheduler = Scheduler::new(config.policy);

        match register(&mut scheduler, &config, &state, source, input, presenter) {
            Ok(tasks) => {
                log_info!(
                    "pipeline started: {} consumers, policy {}",
                    config.consumers,
                    config.policy
                );
                Ok(Self {
                    scheduler,
                    state,
                    tasks,
                })
            }
            Err(err) => {
                log_error!("pipeline start failed: {}", err);
                state.stop();
                // The creation error is the one worth reporting
                let _ = scheduler.wait_all();
                Err(err)
            }
        }
    }

    pub fn tunables(&self) -> &Tunables {
        &self.state.tunables
    }

    pub fn barrier(&self) -> &PrecedenceBarrier {
        &self.state.barrier
    }

    pub fn state(&self) -> &Arc<PipelineState> {
        &self.state
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn tasks(&self) -> &PipelineTasks {
        &self.tasks
    }

    /// Apply a command as if it came from the input task.
    pub fn apply(&self, command: Command) {
        self.state.apply(command);
    }

    /// Ask every task to stop; blocked tasks are woken.
    pub fn shutdown(&self) {
        log_info!("pipeline shutdown requested");
        self.state.stop();
    }

    /// Wait for every task to finish and summarize the run.
    pub fn join(mut self) -> Result<PipelineReport, PipelineError> {
        let joined = self.scheduler.wait_all();

        let report = PipelineReport {
            tasks: self.scheduler.reports(),
            handles: self.tasks.clone(),
            totals: self.scheduler.scheduler_stats(),
            rounds_published: self.state.barrier.rounds_published(),
            elapsed_ms: self.state.tunables.elapsed_ms(),
        };
        log_info!(
            "pipeline stopped after {} rounds ({} ms of stream), {} deadline misses",
            report.rounds_published,
            report.elapsed_ms,
            report.totals.total_deadline_misses
        );

        joined?;
        Ok(report)
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("scheduler", &self.scheduler)
            .field("tasks", &self.tasks)
            .finish()
    }
}

fn register<S, I, P>(
    scheduler: &mut Scheduler,
    config: &PipelineConfig,
    state: &Arc<PipelineState>,
    source: S,
    input: I,
    presenter: P,
) -> Result<PipelineTasks, PipelineError>
where
    S: SpectrumSource + 'static,
    I: InputSource + 'static,
    P: Presenter + 'static,
{
    let shared = Arc::clone(state);
    let producer = scheduler.create(config.producer.params("producer"), move |ctx| {
        workers::run_producer(ctx, shared, source)
    })?;

    let mut consumers = Vec::with_capacity(config.consumers);
    for band in 0..config.consumers {
        let shared = Arc::clone(state);
        let params = config.consumer.params("consumer").with_user_id(band);
        consumers.push(scheduler.create(params, move |ctx| workers::run_consumer(ctx, shared))?);
    }

    let shared = Arc::clone(state);
    let input = scheduler.create(config.input.params("input"), move |ctx| {
        workers::run_input(ctx, shared, input)
    })?;

    let shared = Arc::clone(state);
    let display = scheduler.create(config.display.params("display"), move |ctx| {
        workers::run_display(ctx, shared, presenter)
    })?;

    Ok(PipelineTasks {
        producer,
        consumers,
        input,
        display,
    })
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Every task, in creation order
    pub tasks: Vec<TaskReport>,
    pub handles: PipelineTasks,
    pub totals: SchedulerStats,
    pub rounds_published: u64,
    pub elapsed_ms: u64,
}

impl PipelineReport {
    pub fn task(&self, handle: TaskHandle) -> Option<&TaskReport> {
        self.tasks.get(handle.id())
    }

    /// Reports of the consumer tasks, in band order
    pub fn consumers(&self) -> impl Iterator<Item = &TaskReport> + '_ {
        self.handles.consumers.iter().filter_map(|h| self.task(*h))
    }

    pub fn total_deadline_misses(&self) -> u32 {
        self.totals.total_deadline_misses
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} rounds, {} ms of stream, {} deadline misses, worst woet {} ms",
            self.rounds_published,
            self.elapsed_ms,
            self.totals.total_deadline_misses,
            self.totals.worst_woet_us / 1000
        )?;
        for task in &self.tasks {
            writeln!(f, "  {}", task)?;
        }
        Ok(())
    }
}
