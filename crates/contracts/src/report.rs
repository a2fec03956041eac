//! SessionReport - SessionRecorder output
//!
//! The finished, annotated session. Produced once by `stop()` and handed to the
//! export layer; the export borrows it, so an export failure never consumes the
//! in-memory frame log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DeviceInfo, Frame, OrientationState, SensorKind};

/// Measured (not nominal) stream rates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasuredRates {
    /// Frame production rate, `1000 / mean(inter-frame interval)` (Hz)
    pub frame_hz: f64,

    /// Raw accelerometer arrival rate over the session (Hz)
    pub accel_hz: f64,

    /// Raw gyroscope arrival rate over the session (Hz); 0 when absent
    pub gyro_hz: f64,
}

/// Finished session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Wall-clock session start
    pub started_at: DateTime<Utc>,

    /// Wall-clock session end
    pub ended_at: DateTime<Utc>,

    /// Total recording duration (ms)
    pub duration_ms: u64,

    /// Annotated frame log, time order
    pub frames: Vec<Frame>,

    /// Frozen orientation state
    pub orientation: OrientationState,

    /// Rates measured from actual timestamps
    pub rates: MeasuredRates,

    /// Number of annotations that were applied
    pub annotation_count: usize,

    /// Recording device metadata
    pub device: DeviceInfo,

    /// Streams that never delivered a first sample
    pub degraded_streams: Vec<SensorKind>,
}

impl SessionReport {
    /// Number of recorded frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Whether any stream never delivered
    pub fn is_degraded(&self) -> bool {
        !self.degraded_streams.is_empty()
    }
}
