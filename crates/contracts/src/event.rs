//! SessionEvent - typed notifications published by the core
//!
//! The core publishes events on a channel; the UI layer subscribes. This keeps
//! the core free of any UI-toolkit dependency. Events are notifications only -
//! the sampling timeline never blocks on a subscriber.

use serde::{Deserialize, Serialize};

use crate::{OrientationLabel, Vector3};

/// Candidate pothole detection
///
/// Consumed exactly once by the prompt layer, which later records an
/// `Annotation` for the same `elapsed_ms` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// Milliseconds since session start at the detected sample
    pub elapsed_ms: u64,
}

/// Live calibration readout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationProgress {
    /// Current best label (may still be `Unknown`)
    pub label: OrientationLabel,

    /// Confidence percent in [0, 100]
    pub confidence: f64,

    /// Filtered gravity estimate so far
    pub accel_offsets: Vector3,

    /// Gyro bias estimate so far
    pub gyro_offsets: Vector3,

    /// Label has been locked for the session
    pub frozen: bool,
}

/// Typed event published by an active session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Possible pothole; at most one per cooldown window
    Detection(DetectionEvent),

    /// Calibration progressed; fired repeatedly during the calibration phase only
    CalibrationProgress(CalibrationProgress),

    /// A sensor stream never delivered a first sample; reported once per stream
    SourceDegraded(crate::SensorKind),
}
