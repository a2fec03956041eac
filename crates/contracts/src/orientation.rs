//! OrientationState - Calibrator output
//!
//! Physical mount orientation derived from the gravity component of
//! acceleration. The platform orientation API tracks UI rotation, not the
//! physical mount, so it is deliberately not consulted.

use serde::{Deserialize, Serialize};

use crate::Vector3;

/// Mount orientation label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationLabel {
    /// Calibration has not converged yet
    #[default]
    Unknown,
    /// Screen up, gravity on +z
    FaceUp,
    /// Screen down, gravity on -z
    FaceDown,
    /// Gravity on +x
    LandscapeLeft,
    /// Gravity on -x
    LandscapeRight,
    /// Gravity on +y
    Portrait,
    /// Gravity on -y
    PortraitDown,
}

impl OrientationLabel {
    /// Stable lowercase name, used in exports and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            OrientationLabel::Unknown => "unknown",
            OrientationLabel::FaceUp => "face_up",
            OrientationLabel::FaceDown => "face_down",
            OrientationLabel::LandscapeLeft => "landscape_left",
            OrientationLabel::LandscapeRight => "landscape_right",
            OrientationLabel::Portrait => "portrait",
            OrientationLabel::PortraitDown => "portrait_down",
        }
    }
}

/// Orientation calibration state
///
/// Created as `Unknown`/0 at session start and mutated only by the calibrator.
/// Once `frozen` is set the label is locked for the session; later estimates may
/// refine the offsets but never overwrite the label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrientationState {
    /// Classified mount orientation
    pub label: OrientationLabel,

    /// Classification confidence, percent in [0, 100]
    pub confidence: f64,

    /// Low-pass-filtered gravity estimate (m/s²)
    pub accel_offsets: Vector3,

    /// Gyroscope bias, plain mean of the calibration window (rad/s)
    pub gyro_offsets: Vector3,

    /// Label is locked for the remainder of the session
    pub frozen: bool,

    /// Excessive motion was observed during calibration
    pub low_reliability: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unknown() {
        let state = OrientationState::default();
        assert_eq!(state.label, OrientationLabel::Unknown);
        assert_eq!(state.confidence, 0.0);
        assert!(!state.frozen);
    }

    #[test]
    fn test_label_names() {
        assert_eq!(OrientationLabel::LandscapeLeft.as_str(), "landscape_left");
        assert_eq!(OrientationLabel::Unknown.as_str(), "unknown");
    }
}
