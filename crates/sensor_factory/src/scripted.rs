//! Scripted source - exact sample sequences for deterministic tests.
//!
//! Delivers a fixed list of steps, each an optional delay followed by a
//! sample, from a background thread. Unlike the mock source nothing is
//! randomized, so integration tests can assert on exact values.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use contracts::{RawSample, SensorDataCallback, SensorKind, SensorSource};
use tracing::debug;

/// One scripted delivery step
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Sleep before delivering (ms)
    pub delay_ms: u64,

    /// The sample to deliver
    pub sample: RawSample,
}

impl Step {
    pub fn new(delay_ms: u64, sample: RawSample) -> Self {
        Self { delay_ms, sample }
    }
}

/// Scripted sensor source
pub struct ScriptedSource {
    kinds: Vec<SensorKind>,
    steps: Vec<Step>,
    /// Keep delivering the final sample at this cadence after the script ends
    /// (ms, 0 = stop after the last step)
    hold_last_every_ms: u64,
    listening: Arc<AtomicBool>,
}

impl ScriptedSource {
    /// Create a scripted source from explicit steps
    pub fn new(steps: Vec<Step>) -> Self {
        let mut kinds: Vec<SensorKind> = Vec::new();
        for step in &steps {
            if !kinds.contains(&step.sample.kind) {
                kinds.push(step.sample.kind);
            }
        }
        Self {
            kinds,
            steps,
            hold_last_every_ms: 0,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Keep re-delivering the final sample after the script ends, so a
    /// latest-value consumer always has fresh data
    pub fn hold_last(mut self, every_ms: u64) -> Self {
        self.hold_last_every_ms = every_ms;
        self
    }
}

impl SensorSource for ScriptedSource {
    fn kinds(&self) -> &[SensorKind] {
        &self.kinds
    }

    fn listen(&self, callback: SensorDataCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let listening = Arc::clone(&self.listening);
        let steps = self.steps.clone();
        let hold_every = self.hold_last_every_ms;

        thread::spawn(move || {
            debug!(steps = steps.len(), "scripted source started");

            let mut last = None;
            for step in &steps {
                if !listening.load(Ordering::Relaxed) {
                    return;
                }
                if step.delay_ms > 0 {
                    thread::sleep(Duration::from_millis(step.delay_ms));
                }
                callback(step.sample);
                last = Some(step.sample);
            }

            if hold_every > 0 {
                if let Some(sample) = last {
                    while listening.load(Ordering::Relaxed) {
                        thread::sleep(Duration::from_millis(hold_every));
                        callback(sample);
                    }
                }
            }

            listening.store(false, Ordering::SeqCst);
            debug!("scripted source finished");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
