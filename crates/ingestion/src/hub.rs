//! SensorHub - source registration and per-stream cells.
//!
//! Manages the registered `SensorSource`s and one `LatestCell` per stream
//! kind, providing the scheduler a unified read surface.

use std::collections::HashMap;
use std::sync::Arc;

use contracts::{RawSample, SensorDataCallback, SensorKind, SensorSource};
use tracing::{debug, info, instrument};

use crate::latest::{CellWriter, LatestCell};

const ALL_KINDS: [SensorKind; 3] = [
    SensorKind::Accelerometer,
    SensorKind::Gyroscope,
    SensorKind::Gps,
];

/// Sensor hub
///
/// Owns the latest-value cells and the registered sources. Dropping the hub
/// stops all sources.
pub struct SensorHub {
    cells: HashMap<SensorKind, LatestCell>,
    sources: Vec<Box<dyn SensorSource>>,
}

impl SensorHub {
    /// Create a hub with one empty cell per stream kind
    pub fn new() -> Self {
        let cells = ALL_KINDS
            .into_iter()
            .map(|kind| (kind, LatestCell::new(kind)))
            .collect();
        Self {
            cells,
            sources: Vec::new(),
        }
    }

    /// Register a sensor data source
    ///
    /// The source starts delivering once `start_all` is called.
    #[instrument(name = "hub_register_source", skip_all, fields(kinds = ?source.kinds()))]
    pub fn register_source(&mut self, source: Box<dyn SensorSource>) {
        debug!(kinds = ?source.kinds(), "registered sensor source");
        self.sources.push(source);
    }

    /// Start all registered sources
    #[instrument(name = "hub_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(count = self.sources.len(), "starting sensor sources");

        let writers: HashMap<SensorKind, CellWriter> = self
            .cells
            .iter()
            .map(|(kind, cell)| (*kind, cell.writer()))
            .collect();

        for source in &self.sources {
            if source.is_listening() {
                continue;
            }
            let writers = writers.clone();
            let callback: SensorDataCallback = Arc::new(move |sample: RawSample| {
                if let Some(writer) = writers.get(&sample.kind) {
                    writer.store(sample);
                }
            });
            source.listen(callback);
        }
    }

    /// Stop all sources
    #[instrument(name = "hub_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.sources.len(), "stopping sensor sources");
        for source in &self.sources {
            if source.is_listening() {
                source.stop();
            }
        }
    }

    /// Most recent sample of a stream, `None` until it first delivers
    pub fn latest(&self, kind: SensorKind) -> Option<RawSample> {
        self.cells.get(&kind).and_then(|cell| cell.latest())
    }

    /// Whether a stream has ever delivered
    pub fn has_delivered(&self, kind: SensorKind) -> bool {
        self.cells
            .get(&kind)
            .map(|cell| cell.has_delivered())
            .unwrap_or(false)
    }

    /// Total samples a stream has delivered
    pub fn arrivals(&self, kind: SensorKind) -> u64 {
        self.cells.get(&kind).map(|cell| cell.arrivals()).unwrap_or(0)
    }

    /// Whether any registered source claims to deliver this stream
    pub fn expects(&self, kind: SensorKind) -> bool {
        self.sources
            .iter()
            .any(|source| source.kinds().contains(&kind))
    }

    /// Number of registered sources
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SensorHub {
    fn drop(&mut self) {
        self.stop_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Vector3;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Source that delivers a fixed sample list synchronously on listen
    struct BurstSource {
        kinds: Vec<SensorKind>,
        samples: Mutex<Vec<RawSample>>,
        listening: AtomicBool,
    }

    impl BurstSource {
        fn new(kinds: Vec<SensorKind>, samples: Vec<RawSample>) -> Self {
            Self {
                kinds,
                samples: Mutex::new(samples),
                listening: AtomicBool::new(false),
            }
        }
    }

    impl SensorSource for BurstSource {
        fn kinds(&self) -> &[SensorKind] {
            &self.kinds
        }

        fn listen(&self, callback: SensorDataCallback) {
            if self.listening.swap(true, Ordering::SeqCst) {
                return;
            }
            for sample in self.samples.lock().unwrap().drain(..) {
                callback(sample);
            }
        }

        fn stop(&self) {
            self.listening.store(false, Ordering::SeqCst);
        }

        fn is_listening(&self) -> bool {
            self.listening.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn test_hub_routes_by_kind() {
        let mut hub = SensorHub::new();
        hub.register_source(Box::new(BurstSource::new(
            vec![SensorKind::Accelerometer, SensorKind::Gyroscope],
            vec![
                RawSample::accelerometer(Vector3::new(0.0, 0.0, 9.81), 0.0),
                RawSample::gyroscope(Vector3::new(0.1, 0.0, 0.0), 0.0),
                RawSample::accelerometer(Vector3::new(1.0, 0.0, 9.81), 0.01),
            ],
        )));
        hub.start_all();

        let accel = hub.latest(SensorKind::Accelerometer).unwrap();
        assert_eq!(accel.vector.x, 1.0);
        assert_eq!(hub.arrivals(SensorKind::Accelerometer), 2);

        let gyro = hub.latest(SensorKind::Gyroscope).unwrap();
        assert_eq!(gyro.vector.x, 0.1);

        assert!(!hub.has_delivered(SensorKind::Gps));
    }

    #[test]
    fn test_hub_empty_until_started() {
        let mut hub = SensorHub::new();
        hub.register_source(Box::new(BurstSource::new(
            vec![SensorKind::Accelerometer],
            vec![RawSample::accelerometer(Vector3::new(0.0, 0.0, 9.81), 0.0)],
        )));

        assert!(!hub.has_delivered(SensorKind::Accelerometer));
        hub.start_all();
        assert!(hub.has_delivered(SensorKind::Accelerometer));
    }
}
