//! Orientation calibration from the gravity vector.
//!
//! Consumes the first window of raw (pre-correction) acceleration samples,
//! low-pass-filters their running mean and classifies the dominant gravity
//! axis into one of six mount orientations with a confidence percentage.
//! Re-estimates every few samples so a live readout can be surfaced; once
//! confidence crosses the freeze threshold the label is locked for the
//! session and later low-confidence estimates can no longer flip it.
//!
//! Gyroscope bias is tracked independently as the plain mean of the first
//! window of gyro samples: unlike gravity direction, gyro bias is not
//! orientation-dependent, so no filtering is applied.

use contracts::{CalibrationProgress, CalibratorConfig, OrientationLabel, OrientationState, Vector3};
use tracing::debug;

/// Gravity-based mount orientation calibrator
#[derive(Debug)]
pub struct OrientationCalibrator {
    config: CalibratorConfig,
    /// Raw accel samples accumulated so far (bounded by `window_samples`)
    accel_window: Vec<Vector3>,
    /// Raw gyro samples accumulated so far (bounded by `window_samples`)
    gyro_window: Vec<Vector3>,
    /// Low-pass-filtered gravity estimate; `None` until the first estimate seeds it
    filtered: Option<Vector3>,
    /// Samples received since the last re-estimate
    pending: usize,
    state: OrientationState,
}

impl OrientationCalibrator {
    /// Create a calibrator in the `Unknown` state
    pub fn new(config: CalibratorConfig) -> Self {
        Self {
            config,
            accel_window: Vec::new(),
            gyro_window: Vec::new(),
            filtered: None,
            pending: 0,
            state: OrientationState::default(),
        }
    }

    /// Current calibration state
    pub fn state(&self) -> &OrientationState {
        &self.state
    }

    /// Whether the accel calibration window has closed
    pub fn is_complete(&self) -> bool {
        self.accel_window.len() >= self.config.window_samples
    }

    /// Whether the gyro bias window is still collecting
    pub fn wants_gyro(&self) -> bool {
        self.gyro_window.len() < self.config.window_samples
    }

    /// Feed one raw (pre-correction) acceleration sample.
    ///
    /// Returns a progress readout whenever a re-estimate ran, so the caller can
    /// surface live feedback. Samples past the window close are ignored.
    pub fn push_accel(&mut self, raw: Vector3) -> Option<CalibrationProgress> {
        if self.is_complete() {
            return None;
        }

        self.accel_window.push(raw);
        self.pending += 1;

        let window_closed = self.is_complete();
        if self.pending < self.config.reestimate_every && !window_closed {
            return None;
        }
        self.pending = 0;

        self.reestimate();
        Some(self.progress())
    }

    /// Feed one raw gyroscope sample.
    ///
    /// Gyro bias is the plain mean of the window; it keeps refining even after
    /// the orientation label has frozen.
    pub fn push_gyro(&mut self, raw: Vector3) {
        if !self.wants_gyro() {
            return;
        }
        self.gyro_window.push(raw);
        self.state.gyro_offsets = mean(&self.gyro_window);
    }

    fn progress(&self) -> CalibrationProgress {
        CalibrationProgress {
            label: self.state.label,
            confidence: self.state.confidence,
            accel_offsets: self.state.accel_offsets,
            gyro_offsets: self.state.gyro_offsets,
            frozen: self.state.frozen,
        }
    }

    fn reestimate(&mut self) {
        let window_mean = mean(&self.accel_window);
        let variance = variance(&self.accel_window, window_mean);

        // Excessive motion degrades the estimate but never aborts calibration
        if variance.x > self.config.motion_variance_limit
            || variance.y > self.config.motion_variance_limit
            || variance.z > self.config.motion_variance_limit
        {
            if !self.state.low_reliability {
                debug!(
                    var_x = variance.x,
                    var_y = variance.y,
                    var_z = variance.z,
                    "motion during calibration, reduced reliability"
                );
            }
            self.state.low_reliability = true;
        }

        // First estimate seeds the filter directly, no blending
        let filtered = match self.filtered {
            None => window_mean,
            Some(prev) => {
                let a = self.config.filter_alpha;
                Vector3::new(
                    a * prev.x + (1.0 - a) * window_mean.x,
                    a * prev.y + (1.0 - a) * window_mean.y,
                    a * prev.z + (1.0 - a) * window_mean.z,
                )
            }
        };
        self.filtered = Some(filtered);
        self.state.accel_offsets = filtered;

        // Normalize to standard gravity to cancel sensor-offset scale error
        let norm = filtered.magnitude();
        let scaled = if norm > f64::EPSILON {
            let s = self.config.gravity / norm;
            Vector3::new(filtered.x * s, filtered.y * s, filtered.z * s)
        } else {
            Vector3::default()
        };
        let (ax, ay, az) = (scaled.x.abs(), scaled.y.abs(), scaled.z.abs());
        let max_component = ax.max(ay).max(az);

        let (label, ambiguous) = self.classify(ax, ay, az, filtered, max_component);
        let mut confidence = (max_component / self.config.gravity * 100.0).clamp(0.0, 100.0);
        if ambiguous {
            // Signal ambiguity rather than guessing
            confidence = confidence.min(50.0);
        }

        if self.state.frozen {
            // Frozen labels are never overwritten, and a later noisy estimate
            // must not degrade the reported confidence either
            self.state.confidence = self.state.confidence.max(confidence);
            return;
        }

        self.state.label = label;
        self.state.confidence = confidence;

        if label != OrientationLabel::Unknown && confidence > self.config.freeze_confidence {
            self.state.frozen = true;
            debug!(
                label = label.as_str(),
                confidence,
                samples = self.accel_window.len(),
                "orientation frozen"
            );
        }
    }

    /// Classify the dominant gravity axis; returns (label, ambiguous)
    fn classify(
        &self,
        ax: f64,
        ay: f64,
        az: f64,
        filtered: Vector3,
        max_component: f64,
    ) -> (OrientationLabel, bool) {
        if max_component <= self.config.hysteresis_ms2 {
            // No axis dominates strongly enough; keep the previous base label
            return (self.state.label, true);
        }

        let label = if az >= ax && az >= ay {
            if filtered.z >= 0.0 {
                OrientationLabel::FaceUp
            } else {
                OrientationLabel::FaceDown
            }
        } else if ax >= ay {
            if filtered.x >= 0.0 {
                OrientationLabel::LandscapeLeft
            } else {
                OrientationLabel::LandscapeRight
            }
        } else if filtered.y >= 0.0 {
            OrientationLabel::Portrait
        } else {
            OrientationLabel::PortraitDown
        };
        (label, false)
    }
}

fn mean(samples: &[Vector3]) -> Vector3 {
    if samples.is_empty() {
        return Vector3::default();
    }
    let n = samples.len() as f64;
    let sum = samples.iter().fold(Vector3::default(), |acc, v| {
        Vector3::new(acc.x + v.x, acc.y + v.y, acc.z + v.z)
    });
    Vector3::new(sum.x / n, sum.y / n, sum.z / n)
}

fn variance(samples: &[Vector3], mean: Vector3) -> Vector3 {
    if samples.is_empty() {
        return Vector3::default();
    }
    let n = samples.len() as f64;
    let sum = samples.iter().fold(Vector3::default(), |acc, v| {
        let dx = v.x - mean.x;
        let dy = v.y - mean.y;
        let dz = v.z - mean.z;
        Vector3::new(acc.x + dx * dx, acc.y + dy * dy, acc.z + dz * dz)
    });
    Vector3::new(sum.x / n, sum.y / n, sum.z / n)
}
