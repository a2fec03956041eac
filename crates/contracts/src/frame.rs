//! Frame - SamplingScheduler output
//!
//! One fixed-rate record on the 100 Hz grid.

use serde::{Deserialize, Serialize};

use crate::{GpsFix, Vector3};

/// Pothole classification of a frame
///
/// Transitions exactly once, `Unset` -> terminal value, when annotations are
/// applied at session stop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotholeMark {
    /// No annotation window covered this frame
    #[default]
    Unset,
    /// Operator confirmed a pothole
    Yes,
    /// Operator rejected the detection
    No,
    /// Detection fired but the prompt timed out
    Unmarked,
}

/// Operator feedback recorded on a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackMark {
    /// No annotation window covered this frame
    #[default]
    Unset,
    /// Operator answered "yes"
    UserConfirmed,
    /// Operator answered "no"
    UserRejected,
    /// Prompt expired without an answer
    Timeout,
}

/// One fixed-rate output record
///
/// Immutable once appended, except for the two annotation marks which are set
/// exactly once during post-processing. `elapsed_ms` is computed against the
/// single start instant captured at session creation and is never recomputed,
/// so the sequence is non-decreasing by construction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Frame {
    /// Milliseconds since session start
    pub elapsed_ms: u64,

    /// Mount-corrected acceleration (m/s²)
    pub accel: Vector3,

    /// Magnitude of the corrected acceleration
    pub accel_magnitude: f64,

    /// Latest gyroscope reading (rad/s); `None` when the stream never delivered,
    /// never a fabricated zero vector
    pub gyro: Option<Vector3>,

    /// Latest GPS fix, independently clocked
    pub gps: Option<GpsFix>,

    /// Pothole annotation, applied at stop
    pub is_pothole: PotholeMark,

    /// Operator feedback annotation, applied at stop
    pub user_feedback: FeedbackMark,
}

impl Frame {
    /// Create an unannotated frame
    pub fn new(
        elapsed_ms: u64,
        accel: Vector3,
        accel_magnitude: f64,
        gyro: Option<Vector3>,
        gps: Option<GpsFix>,
    ) -> Self {
        Self {
            elapsed_ms,
            accel,
            accel_magnitude,
            gyro,
            gps,
            is_pothole: PotholeMark::Unset,
            user_feedback: FeedbackMark::Unset,
        }
    }

    /// Whether annotation marks are still in their initial state
    pub fn is_unannotated(&self) -> bool {
        self.is_pothole == PotholeMark::Unset && self.user_feedback == FeedbackMark::Unset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_is_unannotated() {
        let frame = Frame::new(0, Vector3::new(0.0, 0.0, 9.81), 9.81, None, None);
        assert!(frame.is_unannotated());
        assert!(frame.gyro.is_none());
    }
}
