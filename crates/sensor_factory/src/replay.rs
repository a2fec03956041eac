//! Replay source - replays an exported session CSV as a live stream.
//!
//! Reads the data rows of a previously exported session file and re-delivers
//! accelerometer and gyroscope samples at their original cadence (scaled by a
//! speed multiplier), for offline reproduction of field sessions. Trailer
//! rows (first field prefixed with `#`) are skipped.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use contracts::{
    ContractError, RawSample, ReplaySourceConfig, SensorDataCallback, SensorKind, SensorSource,
    Vector3,
};
use tracing::{debug, info, warn};

/// One replayed sample pair at a recorded instant
#[derive(Debug, Clone, Copy)]
struct ReplayRecord {
    elapsed_s: f64,
    accel: Vector3,
    gyro: Option<Vector3>,
}

/// Replay source
pub struct ReplaySource {
    config: ReplaySourceConfig,
    kinds: Vec<SensorKind>,
    records: Vec<ReplayRecord>,
    listening: Arc<AtomicBool>,
}

impl ReplaySource {
    /// Load a replay source from an exported session CSV
    pub fn load(config: ReplaySourceConfig) -> Result<Self, ContractError> {
        let records = read_records(&config.path)?;
        if records.is_empty() {
            return Err(ContractError::source(
                SensorKind::Accelerometer,
                format!("no data rows in {}", config.path.display()),
            ));
        }

        let mut kinds = vec![SensorKind::Accelerometer];
        if records.iter().any(|r| r.gyro.is_some()) {
            kinds.push(SensorKind::Gyroscope);
        }

        info!(
            path = %config.path.display(),
            records = records.len(),
            "loaded replay source"
        );

        Ok(Self {
            config,
            kinds,
            records,
            listening: Arc::new(AtomicBool::new(false)),
        })
    }
}

fn read_records(path: &Path) -> Result<Vec<ReplayRecord>, ContractError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| {
            ContractError::source(
                SensorKind::Accelerometer,
                format!("cannot open {}: {e}", path.display()),
            )
        })?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| {
            ContractError::source(SensorKind::Accelerometer, format!("csv parse error: {e}"))
        })?;

        // Trailer rows carry session metadata, not samples
        if row.get(0).is_some_and(|f| f.starts_with('#')) {
            continue;
        }

        match parse_row(&row) {
            Some(record) => records.push(record),
            None => warn!(position = ?row.position(), "skipping malformed data row"),
        }
    }
    Ok(records)
}

/// Parse one data row against the v2 export schema
fn parse_row(row: &csv::StringRecord) -> Option<ReplayRecord> {
    let field = |i: usize| row.get(i).map(str::trim);
    let number = |i: usize| field(i).and_then(|f| f.parse::<f64>().ok());

    let elapsed_ms = field(0)?.parse::<u64>().ok()?;
    let accel = Vector3::new(number(1)?, number(2)?, number(3)?);

    // Gyro columns are present but empty when the stream never delivered
    let gyro = match (number(5), number(6), number(7)) {
        (Some(x), Some(y), Some(z)) => Some(Vector3::new(x, y, z)),
        _ => None,
    };

    Some(ReplayRecord {
        elapsed_s: elapsed_ms as f64 / 1000.0,
        accel,
        gyro,
    })
}

impl SensorSource for ReplaySource {
    fn kinds(&self) -> &[SensorKind] {
        &self.kinds
    }

    fn listen(&self, callback: SensorDataCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let listening = Arc::clone(&self.listening);
        let records = self.records.clone();
        let speed = self.config.speed.max(0.1);

        thread::spawn(move || {
            debug!(records = records.len(), speed, "replay thread started");

            let start = Instant::now();
            let first = records[0].elapsed_s;

            for record in &records {
                if !listening.load(Ordering::Relaxed) {
                    debug!("replay stopped");
                    return;
                }

                // Pace delivery against the recorded offsets
                let target = Duration::from_secs_f64((record.elapsed_s - first) / speed);
                let actual = start.elapsed();
                if target > actual {
                    thread::sleep(target - actual);
                }

                let timestamp = start.elapsed().as_secs_f64();
                callback(RawSample::accelerometer(record.accel, timestamp));
                if let Some(gyro) = record.gyro {
                    callback(RawSample::gyroscope(gyro, timestamp));
                }
            }

            info!("replay completed");
            listening.store(false, Ordering::SeqCst);
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
