//! SensorSource trait - Sensor data source abstraction
//!
//! Defines a unified push-style interface for device sensor streams, decoupling
//! the sampling core from concrete platforms. Mock, replay and real device
//! sources all implement the same trait.

use std::sync::Arc;

use crate::{RawSample, SensorKind};

/// Sensor data callback type
///
/// When a source produces a sample, it delivers a `RawSample` through this
/// callback. Uses `Arc` to allow callback sharing across multiple contexts.
pub type SensorDataCallback = Arc<dyn Fn(RawSample) + Send + Sync>;

/// Sensor data source trait
///
/// Abstracts the common behavior of mock, replay and real device streams.
///
/// # Design Principles
///
/// 1. **Decoupling**: sample generation is separated from sample consumption
/// 2. **Last-value semantics**: consumers cache only the most recent sample,
///    there is no queue and no back-pressure onto the source
/// 3. **Callback pattern**: matches the push style of mobile sensor APIs
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn SensorSource> = make_source();
/// source.listen(Arc::new(|sample| {
///     println!("{:?} at {}", sample.kind, sample.timestamp);
/// }));
/// // ... record ...
/// source.stop();
/// ```
pub trait SensorSource: Send + Sync {
    /// Stream kinds this source delivers
    fn kinds(&self) -> &[SensorKind];

    /// Register data callback
    ///
    /// When the source produces a sample it calls the callback. If already
    /// listening, repeated calls are idempotent (no second callback registered).
    fn listen(&self, callback: SensorDataCallback);

    /// Stop sample generation
    ///
    /// For mock/replay sources this stops the background thread.
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
