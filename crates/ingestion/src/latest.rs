//! Per-stream latest-value cell.
//!
//! "Latest wins": no queuing, no back-pressure onto the sensor source. The
//! cell also counts arrivals so measured stream rates can be computed at
//! session stop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use contracts::{RawSample, SensorKind};
use tokio::sync::watch;

/// Single-writer/single-reader cell holding the most recent sample of a stream
#[derive(Debug)]
pub struct LatestCell {
    kind: SensorKind,
    tx: Arc<watch::Sender<Option<RawSample>>>,
    rx: watch::Receiver<Option<RawSample>>,
    arrivals: Arc<AtomicU64>,
}

impl LatestCell {
    /// Create an empty cell for one stream kind
    pub fn new(kind: SensorKind) -> Self {
        let (tx, rx) = watch::channel(None);
        Self {
            kind,
            tx: Arc::new(tx),
            rx,
            arrivals: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Stream kind this cell caches
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Writer half, handed to the source callback thread
    pub fn writer(&self) -> CellWriter {
        CellWriter {
            kind: self.kind,
            tx: Arc::clone(&self.tx),
            arrivals: Arc::clone(&self.arrivals),
        }
    }

    /// Most recent sample, `None` until the stream delivers its first one
    pub fn latest(&self) -> Option<RawSample> {
        *self.rx.borrow()
    }

    /// Whether the stream has ever delivered
    pub fn has_delivered(&self) -> bool {
        self.latest().is_some()
    }

    /// Total samples the stream has delivered
    pub fn arrivals(&self) -> u64 {
        self.arrivals.load(Ordering::Relaxed)
    }
}

/// Writer half of a `LatestCell`
///
/// Cheap to clone into the source callback; overwriting never blocks.
#[derive(Debug, Clone)]
pub struct CellWriter {
    kind: SensorKind,
    tx: Arc<watch::Sender<Option<RawSample>>>,
    arrivals: Arc<AtomicU64>,
}

impl CellWriter {
    /// Overwrite the cell with a fresh sample
    pub fn store(&self, sample: RawSample) {
        // send only fails when every receiver is gone, i.e. the session is
        // being torn down - the sample is stale by definition then
        let _ = self.tx.send(Some(sample));
        self.arrivals.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(
            "ingestion_samples_received_total",
            "kind" => kind_label(self.kind)
        )
        .increment(1);
    }
}

fn kind_label(kind: SensorKind) -> &'static str {
    match kind {
        SensorKind::Accelerometer => "accelerometer",
        SensorKind::Gyroscope => "gyroscope",
        SensorKind::Gps => "gps",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Vector3;

    #[test]
    fn test_empty_cell_has_no_sample() {
        let cell = LatestCell::new(SensorKind::Accelerometer);
        assert!(cell.latest().is_none());
        assert!(!cell.has_delivered());
        assert_eq!(cell.arrivals(), 0);
    }

    #[test]
    fn test_latest_wins() {
        let cell = LatestCell::new(SensorKind::Accelerometer);
        let writer = cell.writer();

        writer.store(RawSample::accelerometer(Vector3::new(1.0, 0.0, 0.0), 0.1));
        writer.store(RawSample::accelerometer(Vector3::new(2.0, 0.0, 0.0), 0.2));
        writer.store(RawSample::accelerometer(Vector3::new(3.0, 0.0, 0.0), 0.3));

        let latest = cell.latest().unwrap();
        assert_eq!(latest.vector.x, 3.0);
        assert_eq!(cell.arrivals(), 3);
    }

    #[test]
    fn test_reader_does_not_consume() {
        let cell = LatestCell::new(SensorKind::Gyroscope);
        cell.writer()
            .store(RawSample::gyroscope(Vector3::new(0.1, 0.0, 0.0), 0.0));

        assert!(cell.latest().is_some());
        assert!(cell.latest().is_some());
    }

    #[test]
    fn test_store_from_another_thread() {
        let cell = LatestCell::new(SensorKind::Accelerometer);
        let writer = cell.writer();

        let handle = std::thread::spawn(move || {
            for i in 0..100 {
                writer.store(RawSample::accelerometer(
                    Vector3::new(i as f64, 0.0, 9.81),
                    i as f64 * 0.01,
                ));
            }
        });
        handle.join().unwrap();

        assert_eq!(cell.arrivals(), 100);
        assert_eq!(cell.latest().unwrap().vector.x, 99.0);
    }
}
