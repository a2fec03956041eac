//! CsvReportSink - writes a finished session to one CSV file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use contracts::{
    ContractError, FeedbackMark, Frame, PotholeMark, ReportSink, SessionReport,
};
use tracing::{debug, error, info, instrument, warn};

/// Export schema version, bumped whenever columns change
pub const SCHEMA_VERSION: u32 = 2;

/// Fixed frame column order of schema v2
pub const FRAME_COLUMNS: [&str; 12] = [
    "elapsed_ms",
    "accel_x",
    "accel_y",
    "accel_z",
    "accel_magnitude",
    "gyro_x",
    "gyro_y",
    "gyro_z",
    "latitude",
    "longitude",
    "is_pothole",
    "user_feedback",
];

/// Sink that writes the session report to a CSV file
pub struct CsvReportSink {
    name: String,
    path: PathBuf,
}

impl CsvReportSink {
    /// Create a new CsvReportSink
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Target path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for CsvReportSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "csv_sink_write",
        skip(self, report),
        fields(sink = %self.name, frames = report.frame_count())
    )]
    async fn write(&mut self, report: &SessionReport) -> Result<(), ContractError> {
        export_to_path(report, &self.path)
    }
}

/// Export a session report to a CSV file at `path`.
///
/// The report is only borrowed: on failure the caller still holds the full
/// frame log and may retry against the same or another location.
#[instrument(name = "export_to_path", skip(report), fields(frames = report.frame_count()))]
pub fn export_to_path(report: &SessionReport, path: &Path) -> Result<(), ContractError> {
    let write = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_report(report, &mut writer)?;
        writer.flush()
    };

    write().map_err(|e| {
        error!(path = %path.display(), error = %e, "export write failed");
        ContractError::export_write(path.display().to_string(), e.to_string())
    })?;

    metrics::counter!("export_sessions_total").increment(1);
    metrics::counter!("export_rows_total").increment(report.frame_count() as u64);
    info!(
        path = %path.display(),
        frames = report.frame_count(),
        annotations = report.annotation_count,
        "session exported"
    );
    Ok(())
}

/// Export to `primary`, falling back to `fallback` when the primary location
/// is not writable. Returns the path that was actually written.
pub fn export_with_fallback(
    report: &SessionReport,
    primary: &Path,
    fallback: Option<&Path>,
) -> Result<PathBuf, ContractError> {
    match export_to_path(report, primary) {
        Ok(()) => Ok(primary.to_path_buf()),
        Err(primary_err) => {
            let Some(fallback) = fallback else {
                return Err(primary_err);
            };
            warn!(
                primary = %primary.display(),
                fallback = %fallback.display(),
                error = %primary_err,
                "primary export failed, trying fallback"
            );
            export_to_path(report, fallback)?;
            Ok(fallback.to_path_buf())
        }
    }
}

/// Serialize the report into any writer
fn write_report<W: Write>(report: &SessionReport, writer: &mut W) -> std::io::Result<()> {
    // Trailer rows are shorter than data rows, hence flexible
    let mut csv = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    csv.write_record(FRAME_COLUMNS)?;
    for frame in &report.frames {
        csv.write_record(frame_record(frame))?;
    }
    for trailer in trailer_records(report) {
        csv.write_record(trailer)?;
    }
    csv.flush()?;
    Ok(())
}

fn frame_record(frame: &Frame) -> Vec<String> {
    let opt = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();

    vec![
        frame.elapsed_ms.to_string(),
        frame.accel.x.to_string(),
        frame.accel.y.to_string(),
        frame.accel.z.to_string(),
        frame.accel_magnitude.to_string(),
        opt(frame.gyro.map(|g| g.x)),
        opt(frame.gyro.map(|g| g.y)),
        opt(frame.gyro.map(|g| g.z)),
        opt(frame.gps.map(|g| g.latitude)),
        opt(frame.gps.map(|g| g.longitude)),
        pothole_label(frame.is_pothole).to_string(),
        feedback_label(frame.user_feedback).to_string(),
    ]
}

fn trailer_records(report: &SessionReport) -> Vec<Vec<String>> {
    let orientation = &report.orientation;
    let mut rows = vec![
        vec!["#schema_version".into(), SCHEMA_VERSION.to_string()],
        vec!["#ended_at".into(), report.ended_at.to_rfc3339()],
        vec!["#duration_ms".into(), report.duration_ms.to_string()],
        vec!["#frame_rate_hz".into(), report.rates.frame_hz.to_string()],
        vec!["#accel_rate_hz".into(), report.rates.accel_hz.to_string()],
        vec!["#gyro_rate_hz".into(), report.rates.gyro_hz.to_string()],
        vec![
            "#annotation_count".into(),
            report.annotation_count.to_string(),
        ],
        vec!["#device_model".into(), report.device.model.clone()],
        vec!["#device_os".into(), report.device.os_version.clone()],
        vec!["#device_app".into(), report.device.app_version.clone()],
        vec![
            "#orientation_label".into(),
            orientation.label.as_str().to_string(),
        ],
        vec![
            "#orientation_confidence".into(),
            orientation.confidence.to_string(),
        ],
        vec![
            "#orientation_low_reliability".into(),
            orientation.low_reliability.to_string(),
        ],
        vec![
            "#accel_offsets".into(),
            orientation.accel_offsets.x.to_string(),
            orientation.accel_offsets.y.to_string(),
            orientation.accel_offsets.z.to_string(),
        ],
        vec![
            "#gyro_offsets".into(),
            orientation.gyro_offsets.x.to_string(),
            orientation.gyro_offsets.y.to_string(),
            orientation.gyro_offsets.z.to_string(),
        ],
    ];

    if !report.degraded_streams.is_empty() {
        let mut row = vec!["#degraded_streams".to_string()];
        row.extend(
            report
                .degraded_streams
                .iter()
                .map(|kind| format!("{kind:?}").to_lowercase()),
        );
        rows.push(row);
    }

    debug!(trailer_rows = rows.len(), "trailer assembled");
    rows
}

fn pothole_label(mark: PotholeMark) -> &'static str {
    match mark {
        PotholeMark::Unset => "unset",
        PotholeMark::Yes => "yes",
        PotholeMark::No => "no",
        PotholeMark::Unmarked => "unmarked",
    }
}

fn feedback_label(mark: FeedbackMark) -> &'static str {
    match mark {
        FeedbackMark::Unset => "unset",
        FeedbackMark::UserConfirmed => "user_confirmed",
        FeedbackMark::UserRejected => "user_rejected",
        FeedbackMark::Timeout => "timeout",
    }
}
