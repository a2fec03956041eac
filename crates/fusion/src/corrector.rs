//! Mount-orientation axis correction.
//!
//! Pure transform from raw device axes to canonical axes, driven by the frozen
//! orientation label. Applied before a reading is logged or detected on, so
//! downstream consumers are mount-invariant. The z axis always passes through
//! unchanged.

use contracts::{OrientationLabel, Vector3};

/// Rotate a raw acceleration vector into the canonical frame.
///
/// | label           | x'  | y'  |
/// |-----------------|-----|-----|
/// | landscape_left  |  y  | -x  |
/// | landscape_right | -y  |  x  |
/// | all others      |  x  |  y  |
pub fn correct(raw: Vector3, label: OrientationLabel) -> Vector3 {
    match label {
        OrientationLabel::LandscapeLeft => Vector3::new(raw.y, -raw.x, raw.z),
        OrientationLabel::LandscapeRight => Vector3::new(-raw.y, raw.x, raw.z),
        _ => raw,
    }
}

/// Magnitude of a corrected reading
pub fn corrected_magnitude(corrected: Vector3) -> f64 {
    corrected.magnitude()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_left_transform() {
        let corrected = correct(Vector3::new(1.0, 2.0, 3.0), OrientationLabel::LandscapeLeft);
        assert_eq!(corrected, Vector3::new(2.0, -1.0, 3.0));
        assert!((corrected_magnitude(corrected) - 14.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_landscape_right_transform() {
        let corrected = correct(Vector3::new(1.0, 2.0, 3.0), OrientationLabel::LandscapeRight);
        assert_eq!(corrected, Vector3::new(-2.0, 1.0, 3.0));
    }

    #[test]
    fn test_identity_for_other_labels() {
        let raw = Vector3::new(1.0, 2.0, 3.0);
        for label in [
            OrientationLabel::Unknown,
            OrientationLabel::FaceUp,
            OrientationLabel::FaceDown,
            OrientationLabel::Portrait,
            OrientationLabel::PortraitDown,
        ] {
            assert_eq!(correct(raw, label), raw);
        }
    }

    #[test]
    fn test_magnitude_is_rotation_invariant() {
        let raw = Vector3::new(1.0, 2.0, 3.0);
        let m0 = corrected_magnitude(correct(raw, OrientationLabel::FaceUp));
        let m1 = corrected_magnitude(correct(raw, OrientationLabel::LandscapeLeft));
        assert!((m0 - m1).abs() < 1e-12);
    }
}
