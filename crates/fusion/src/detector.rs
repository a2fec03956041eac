//! Bump detection over corrected acceleration magnitude.
//!
//! Two phases per session: a calibration phase that establishes the baseline
//! as an incremental mean (no detections possible), then an armed phase with
//! a rolling magnitude window, an exponentially-adapted baseline and a
//! cooldown between accepted detections.
//!
//! The dual firing condition (`delta > threshold` AND rolling stddev above the
//! floor) rejects two failure modes: a single spike with otherwise-calm
//! neighbors, and a long slow drift (turn, incline) with no instantaneous
//! variance. The slow baseline tracker lets sustained road-condition changes
//! (gravel vs. pavement) shift the reference without erasing genuine anomalies.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{DetectionEvent, DetectorConfig};
use ringbuf::{traits::*, HeapRb};
use tracing::debug;

/// Live-adjustable detection threshold.
///
/// Stored as f64 bits in an atomic so the operator can retune a running
/// session without touching the sampling timeline; the new value takes effect
/// on the next sample, no recalibration required.
#[derive(Debug, Clone)]
pub struct SharedThreshold(Arc<AtomicU64>);

impl SharedThreshold {
    pub fn new(threshold: f64) -> Self {
        Self(Arc::new(AtomicU64::new(threshold.to_bits())))
    }

    pub fn set(&self, threshold: f64) {
        self.0.store(threshold.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// Detector phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Establishing the baseline; no detections possible
    Calibrating,
    /// Live detection
    Armed,
}

/// Stateful bump detector
pub struct BumpDetector {
    config: DetectorConfig,
    threshold: SharedThreshold,
    phase: Phase,
    /// Adaptive "normal vibration" reference
    baseline: f64,
    /// Observations folded into the baseline so far, the seed included
    observed: usize,
    /// Rolling window of raw magnitudes
    window: HeapRb<f64>,
    last_detection_ms: Option<u64>,
}

impl std::fmt::Debug for BumpDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BumpDetector")
            .field("phase", &self.phase)
            .field("baseline", &self.baseline)
            .field("window_len", &self.window.occupied_len())
            .field("last_detection_ms", &self.last_detection_ms)
            .finish()
    }
}

impl BumpDetector {
    /// Create a detector in the calibrating phase
    pub fn new(config: DetectorConfig, threshold: SharedThreshold) -> Self {
        let window = HeapRb::new(config.buffer_size);
        let baseline = config.baseline_seed;
        Self {
            config,
            threshold,
            phase: Phase::Calibrating,
            baseline,
            observed: 1,
            window,
            last_detection_ms: None,
        }
    }

    /// Current baseline (diagnostics)
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Whether the calibration phase has completed
    pub fn is_armed(&self) -> bool {
        self.phase == Phase::Armed
    }

    /// Feed one corrected magnitude sample.
    ///
    /// Returns a `DetectionEvent` when the sample is a statistically
    /// significant deviation outside the cooldown window.
    pub fn push(&mut self, elapsed_ms: u64, magnitude: f64) -> Option<DetectionEvent> {
        // Rolling window updates in every phase, cooldown included
        if self.window.is_full() {
            let _ = self.window.try_pop();
        }
        let _ = self.window.try_push(magnitude);

        match self.phase {
            Phase::Calibrating => {
                let n = self.observed as f64;
                self.baseline = (self.baseline * n + magnitude) / (n + 1.0);
                self.observed += 1;

                // The seed counts as the first observation
                if self.observed > self.config.calibration_samples {
                    self.phase = Phase::Armed;
                    debug!(baseline = self.baseline, "bump detector armed");
                }
                metrics::gauge!("fusion_detector_baseline").set(self.baseline);
                None
            }
            Phase::Armed => {
                let fired = if self.in_cooldown(elapsed_ms) {
                    None
                } else {
                    self.evaluate(elapsed_ms, magnitude)
                };

                // Slow exponential tracker, adapted on every sample
                let rate = self.config.baseline_adapt_rate;
                self.baseline = self.baseline * (1.0 - rate) + magnitude * rate;
                metrics::gauge!("fusion_detector_baseline").set(self.baseline);

                fired
            }
        }
    }

    fn in_cooldown(&self, elapsed_ms: u64) -> bool {
        self.last_detection_ms
            .is_some_and(|last| elapsed_ms.saturating_sub(last) < self.config.cooldown_ms)
    }

    fn evaluate(&mut self, elapsed_ms: u64, magnitude: f64) -> Option<DetectionEvent> {
        let (mean, stddev) = self.window_stats();
        let delta = (magnitude - self.baseline).abs();
        let threshold = self.threshold.get();

        if delta > threshold && stddev > self.config.stddev_floor {
            self.last_detection_ms = Some(elapsed_ms);
            metrics::counter!("fusion_detections_total").increment(1);
            debug!(
                elapsed_ms,
                magnitude,
                baseline = self.baseline,
                delta,
                window_mean = mean,
                window_stddev = stddev,
                "bump detected"
            );
            return Some(DetectionEvent { elapsed_ms });
        }
        None
    }

    /// Mean and population stddev of the raw magnitudes in the rolling window
    fn window_stats(&self) -> (f64, f64) {
        let n = self.window.occupied_len();
        if n == 0 {
            return (0.0, 0.0);
        }
        let n = n as f64;
        let mean = self.window.iter().sum::<f64>() / n;
        let var = self
            .window
            .iter()
            .map(|m| (m - mean) * (m - mean))
            .sum::<f64>()
            / n;
        (mean, var.sqrt())
    }
}
