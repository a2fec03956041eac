//! # Fusion
//!
//! The sensor fusion and event-detection core.
//!
//! Responsible for:
//! - Orientation calibration from the gravity component of acceleration
//! - Mount-invariant axis correction
//! - Baseline-tracking bump detection with cooldown
//! - Retroactive annotation correlation
//!
//! Everything here is synchronous, push-style state with no I/O, so every
//! property is unit-testable without a runtime. The sampling scheduler in the
//! `recorder` crate drives `FusionCore::push` once per 100 Hz tick.
//!
//! ## Usage example
//!
//! ```ignore
//! use fusion::{FusionCore, SharedThreshold};
//!
//! let threshold = SharedThreshold::new(5.0);
//! let mut core = FusionCore::new(calibrator_cfg, detector_cfg, threshold.clone());
//!
//! // Once per tick
//! let out = core.push(elapsed_ms, raw_accel, gyro, gps);
//! if let Some(event) = out.detection {
//!     // Surface the prompt
//! }
//! ```

mod annotations;
mod calibrator;
mod corrector;
mod detector;
mod engine;

pub use annotations::AnnotationStore;
pub use calibrator::OrientationCalibrator;
pub use corrector::{correct, corrected_magnitude};
pub use detector::{BumpDetector, SharedThreshold};
pub use engine::{FusionCore, TickOutput};
