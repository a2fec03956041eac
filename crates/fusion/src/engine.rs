//! Main fusion core implementation.
//!
//! Composes the calibrator, axis corrector and bump detector behind one
//! push-style entry point. The sampling scheduler calls `push` exactly once
//! per successful tick; everything in here is synchronous and allocation-free
//! on the hot path.

use contracts::{
    CalibrationProgress, CalibratorConfig, DetectionEvent, DetectorConfig, Frame, GpsFix,
    OrientationState, Vector3,
};
use tracing::instrument;

use crate::calibrator::OrientationCalibrator;
use crate::corrector;
use crate::detector::{BumpDetector, SharedThreshold};

/// Result of one fusion tick
#[derive(Debug)]
pub struct TickOutput {
    /// The frame to append to the session log
    pub frame: Frame,

    /// Candidate pothole at this sample, if any
    pub detection: Option<DetectionEvent>,

    /// Calibration readout, present while the calibration window is open
    pub calibration: Option<CalibrationProgress>,
}

/// Sensor fusion core for one session
///
/// Owns the per-session calibration and detection state; a fresh core is
/// constructed at every `start()` so sessions never share mutable state.
#[derive(Debug)]
pub struct FusionCore {
    calibrator: OrientationCalibrator,
    detector: BumpDetector,
}

impl FusionCore {
    /// Create a core with fresh per-session state
    pub fn new(
        calibrator_config: CalibratorConfig,
        detector_config: DetectorConfig,
        threshold: SharedThreshold,
    ) -> Self {
        Self {
            calibrator: OrientationCalibrator::new(calibrator_config),
            detector: BumpDetector::new(detector_config, threshold),
        }
    }

    /// Process one tick worth of latest sensor values.
    ///
    /// The raw acceleration feeds the calibrator until its window closes; the
    /// frozen (or still-unknown) orientation then drives the axis correction
    /// applied before the value reaches the log or the detector, so detection
    /// and storage are mount-orientation-invariant.
    #[instrument(
        level = "trace",
        name = "fusion_push",
        skip(self),
        fields(elapsed_ms = elapsed_ms)
    )]
    pub fn push(
        &mut self,
        elapsed_ms: u64,
        raw_accel: Vector3,
        gyro: Option<Vector3>,
        gps: Option<GpsFix>,
    ) -> TickOutput {
        let calibration = self.calibrator.push_accel(raw_accel);
        if let Some(gyro) = gyro {
            self.calibrator.push_gyro(gyro);
        }

        let corrected = corrector::correct(raw_accel, self.calibrator.state().label);
        let magnitude = corrector::corrected_magnitude(corrected);
        let detection = self.detector.push(elapsed_ms, magnitude);

        metrics::counter!("fusion_frames_total").increment(1);

        TickOutput {
            frame: Frame::new(elapsed_ms, corrected, magnitude, gyro, gps),
            detection,
            calibration,
        }
    }

    /// Current orientation state
    pub fn orientation(&self) -> OrientationState {
        *self.calibrator.state()
    }

    /// Whether the detector has finished its baseline calibration
    pub fn detector_armed(&self) -> bool {
        self.detector.is_armed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::OrientationLabel;

    fn make_core() -> FusionCore {
        FusionCore::new(
            CalibratorConfig::default(),
            DetectorConfig::default(),
            SharedThreshold::new(5.0),
        )
    }

    #[test]
    fn test_calibration_progress_then_silence() {
        let mut core = make_core();

        let mut readouts = 0;
        for i in 0..100u64 {
            let out = core.push(i * 10, Vector3::new(0.0, 0.0, 9.81), None, None);
            if out.calibration.is_some() {
                readouts += 1;
            }
        }
        // One readout per re-estimate cadence across the 100-sample window
        assert_eq!(readouts, 10);

        // Window closed: no further readouts
        let out = core.push(1000, Vector3::new(0.0, 0.0, 9.81), None, None);
        assert!(out.calibration.is_none());
    }

    #[test]
    fn test_correction_applied_after_freeze() {
        let mut core = make_core();

        // Landscape-left mount: gravity on +x
        for i in 0..20u64 {
            core.push(i * 10, Vector3::new(9.81, 0.0, 0.0), None, None);
        }
        assert_eq!(core.orientation().label, OrientationLabel::LandscapeLeft);

        let out = core.push(200, Vector3::new(1.0, 2.0, 3.0), None, None);
        assert_eq!(out.frame.accel, Vector3::new(2.0, -1.0, 3.0));
        assert!((out.frame.accel_magnitude - 14.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_gyro_flows_to_frame_and_calibrator() {
        let mut core = make_core();
        let gyro = Vector3::new(0.01, 0.02, 0.03);

        let out = core.push(0, Vector3::new(0.0, 0.0, 9.81), Some(gyro), None);
        assert_eq!(out.frame.gyro, Some(gyro));

        let out = core.push(10, Vector3::new(0.0, 0.0, 9.81), None, None);
        assert!(out.frame.gyro.is_none());
    }

    #[test]
    fn test_no_detection_before_armed() {
        let mut core = make_core();
        for i in 0..199u64 {
            let out = core.push(i * 10, Vector3::new(0.0, 0.0, 9.8), None, None);
            assert!(out.detection.is_none());
        }
        assert!(!core.detector_armed());

        let out = core.push(1990, Vector3::new(0.0, 0.0, 100.0), None, None);
        assert!(out.detection.is_none());
        assert!(core.detector_armed());
    }
}
