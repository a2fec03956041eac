//! Session metric collection.
//!
//! Facade-level recording for the live session plus an in-memory aggregator
//! used to print a summary when a session or pipeline run finishes.

use contracts::{AnnotationFeedback, SessionReport};
use metrics::{counter, gauge, histogram};

/// Record a live detection event
pub fn record_detection(elapsed_ms: u64) {
    counter!("roadsense_detections_total").increment(1);
    gauge!("roadsense_last_detection_elapsed_ms").set(elapsed_ms as f64);
}

/// Record a resolved annotation
pub fn record_annotation(feedback: AnnotationFeedback) {
    let label = match feedback {
        AnnotationFeedback::Yes => "yes",
        AnnotationFeedback::No => "no",
        AnnotationFeedback::Timeout => "timeout",
    };
    counter!("roadsense_annotations_total", "feedback" => label).increment(1);
}

/// Record a scheduler tick that produced no frame (no accel sample yet)
pub fn record_tick_skipped() {
    counter!("roadsense_ticks_skipped_total").increment(1);
}

/// Record a finished session
pub fn record_session_finished(frames: usize, duration_ms: u64) {
    counter!("roadsense_sessions_total").increment(1);
    histogram!("roadsense_session_duration_ms").record(duration_ms as f64);
    histogram!("roadsense_session_frames").record(frames as f64);
}

/// Session metrics aggregator
///
/// Aggregates metrics in memory for a human-readable end-of-run summary.
#[derive(Debug, Clone, Default)]
pub struct SessionMetricsAggregator {
    /// Live detections seen
    pub detections: u64,

    /// Annotations by outcome
    pub confirmed: u64,
    pub rejected: u64,
    pub timeouts: u64,

    /// Corrected magnitude statistics over the frame log
    pub magnitude_stats: RunningStats,

    /// Inter-frame interval statistics (ms)
    pub interval_stats: RunningStats,
}

impl SessionMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one live detection
    pub fn record_detection(&mut self) {
        self.detections += 1;
    }

    /// Count one resolved annotation
    pub fn record_annotation(&mut self, feedback: AnnotationFeedback) {
        match feedback {
            AnnotationFeedback::Yes => self.confirmed += 1,
            AnnotationFeedback::No => self.rejected += 1,
            AnnotationFeedback::Timeout => self.timeouts += 1,
        }
    }

    /// Fold the finished report into the aggregate
    pub fn consume_report(&mut self, report: &SessionReport) {
        let mut previous: Option<u64> = None;
        for frame in &report.frames {
            self.magnitude_stats.push(frame.accel_magnitude);
            if let Some(prev) = previous {
                self.interval_stats.push((frame.elapsed_ms - prev) as f64);
            }
            previous = Some(frame.elapsed_ms);
        }
    }

    /// Produce the summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            detections: self.detections,
            confirmed: self.confirmed,
            rejected: self.rejected,
            timeouts: self.timeouts,
            magnitude: StatsSummary::from(&self.magnitude_stats),
            interval_ms: StatsSummary::from(&self.interval_stats),
        }
    }

    /// Reset the aggregate
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub detections: u64,
    pub confirmed: u64,
    pub rejected: u64,
    pub timeouts: u64,
    pub magnitude: StatsSummary,
    pub interval_ms: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Session Metrics Summary ===")?;
        writeln!(f, "Detections: {}", self.detections)?;
        writeln!(
            f,
            "Annotations: {} confirmed, {} rejected, {} timed out",
            self.confirmed, self.rejected, self.timeouts
        )?;
        writeln!(f, "Accel magnitude (m/s²): {}", self.magnitude)?;
        writeln!(f, "Frame interval (ms): {}", self.interval_ms)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Push a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum
    pub fn max(&self) -> f64 {
        self.max
    }
}
