//! # Recorder
//!
//! Session lifecycle and the fixed-rate sampling scheduler.
//!
//! Responsible for:
//! - start/stop lifecycle, exactly one active session at a time
//! - the 100 Hz tick task driving the fusion core ("latest wins" reads)
//! - typed event publication (detections, calibration progress, degradation)
//! - operator inputs: live threshold changes and prompt responses
//! - post-stop annotation application and measured-rate statistics
//!
//! ## Usage example
//!
//! ```ignore
//! use recorder::{RecorderConfig, SessionRecorder};
//!
//! let mut recorder = SessionRecorder::new();
//! let started_at = recorder.start(RecorderConfig::default(), hub)?;
//! let mut events = recorder.take_events().unwrap();
//!
//! while let Some(event) = events.recv().await {
//!     // Prompt the operator, then answer:
//!     // recorder.respond_to_prompt(elapsed_ms, true)?;
//! }
//!
//! let report = recorder.stop().await?.expect("first stop yields a report");
//! ```

mod error;
mod recorder;
mod scheduler;
mod stats;

pub use error::SessionError;
pub use recorder::{RecorderConfig, SessionRecorder};
