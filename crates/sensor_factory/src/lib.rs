//! # Sensor Factory
//!
//! `SensorSource` implementations for development and testing without a
//! device: a synthetic road profile, a CSV replay source and a scripted
//! source for deterministic tests. All of them deliver through the same
//! push-style callback a real device integration would use.

mod mock;
mod replay;
mod scripted;

pub use mock::MockImuSource;
pub use replay::ReplaySource;
pub use scripted::{ScriptedSource, Step};
