//! Spectrum pipeline on a synthetic sweep.
//!
//! Starts the producer, one consumer per band, the input task and the
//! display task, then prints a level bar per active band a few times per
//! second. Type keys followed by Enter to steer it:
//!
//! ```text
//!   + / -    scale up / down        < / >    fewer / more bands
//!   ] / /    gain up / down         1 .. 7   analysis window
//!   q        quit
//! ```
//!
//! Configuration comes from `SOUND_TRAIL_CONSUMERS`, `SOUND_TRAIL_SCHED`
//! and `SOUND_TRAIL_VERBOSE`. Without real-time privilege use
//! `SOUND_TRAIL_SCHED=best-effort` or keep the default fallback.
//!
//! Run with: `cargo run --example pipeline_demo`

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use sound_trail::core::log_router;
use sound_trail::pipeline::synthetic::ToneSource;
use sound_trail::pipeline::{Command, InputSource, Pipeline, PipelineConfig, Presenter, Snapshot};

/// Ten seconds of stream at the default window size
const FRAME_LIMIT: u64 = 500;

/// Print every n-th snapshot
const PRINT_EVERY: u64 = 10;

const BAR_WIDTH: f32 = 40.0;

/// Keys typed on stdin, forwarded by a reader thread
struct StdinInput {
    keys: Receiver<char>,
    closed: bool,
}

impl StdinInput {
    fn spawn() -> Self {
        let (tx, keys) = mpsc::channel();
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                for key in line.chars() {
                    if tx.send(key).is_err() {
                        return;
                    }
                }
            }
        });
        Self { keys, closed: false }
    }
}

impl InputSource for StdinInput {
    fn poll(&mut self) -> Option<Command> {
        while !self.closed {
            match self.keys.try_recv() {
                Ok(key) => {
                    if let Some(command) = Command::from_key(key) {
                        return Some(command);
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => self.closed = true,
            }
        }
        None
    }
}

/// Text bars on stdout
#[derive(Default)]
struct BarPresenter {
    presented: u64,
}

impl Presenter for BarPresenter {
    fn present(&mut self, snapshot: &Snapshot) {
        self.presented += 1;
        if self.presented % PRINT_EVERY != 0 {
            return;
        }

        println!(
            "t={:>6} ms  gain {:>3}%  scale {:.1}  window {}  bands {}",
            snapshot.elapsed_ms,
            snapshot.gain,
            snapshot.scale,
            snapshot.window.name(),
            snapshot.active_consumers
        );
        for (band, sample) in snapshot.active_levels() {
            let width = (sample.level * snapshot.scale * BAR_WIDTH).clamp(0.0, BAR_WIDTH) as usize;
            println!("  {:>2} {:>6} Hz |{}", band, sample.freq_hz, "#".repeat(width));
        }
    }
}

fn main() {
    // 1. Configuration and logging
    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {}", err);
            std::process::exit(2);
        }
    };
    log_router::init_with_verbosity(config.verbose);

    println!("=== sound_trail pipeline demo ===");
    println!(
        "{} consumers, policy {}, {} bins per frame\n",
        config.consumers,
        config.policy,
        config.bins()
    );

    // 2. Start every task
    let source = ToneSource::new(config.bins(), config.sample_rate).with_frame_limit(FRAME_LIMIT);
    let pipeline = Pipeline::spawn(config, source, StdinInput::spawn(), BarPresenter::default())
        .expect("Failed to start pipeline");

    // 3. Run until end of stream or `q`, then report
    let report = pipeline.join().expect("A task failed");
    println!("\n{}", report);

    let dropped = log_router::overflow_count();
    if dropped > 0 {
        println!("{} log messages dropped from the buffer", dropped);
    }
}
