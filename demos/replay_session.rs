//! Replay Session Demo
//!
//! Replays a previously exported session CSV through the full pipeline at
//! double speed and re-exports the result.
//!
//! Run with: cargo run --bin replay_session -- path/to/session.csv

use std::path::{Path, PathBuf};
use std::time::Duration;

use contracts::{ReplaySourceConfig, SessionEvent};
use ingestion::SensorHub;
use recorder::{RecorderConfig, SessionRecorder};
use sensor_factory::ReplaySource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let path: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demo_session.csv".to_string())
        .into();

    tracing::info!(path = %path.display(), "Starting Replay Session Demo");

    // ==== Stage 1: Load the recorded stream ====
    let source = ReplaySource::load(ReplaySourceConfig {
        path: path.clone(),
        speed: 2.0,
    })?;

    let mut hub = SensorHub::new();
    hub.register_source(Box::new(source));

    // ==== Stage 2: Run the session over the replayed data ====
    let mut session = SessionRecorder::new();
    session.start(RecorderConfig::default(), hub)?;
    let mut events = session.take_events().expect("events taken once");

    let run = async {
        while let Some(event) = events.recv().await {
            if let SessionEvent::Detection(detection) = event {
                tracing::info!(elapsed_ms = detection.elapsed_ms, "Replayed bump detected");
                // Let the prompt time out, like an unattended operator would
                session
                    .prompt_timed_out(detection.elapsed_ms)
                    .expect("session is active");
            }
        }
    };
    let _ = tokio::time::timeout(Duration::from_secs(30), run).await;

    // ==== Stage 3: Stop and re-export ====
    let report = session.stop().await?.expect("first stop yields the report");
    tracing::info!(
        frames = report.frame_count(),
        detections = report.annotation_count,
        "Replay finished"
    );

    let out = Path::new("replayed_session.csv");
    export::export_to_path(&report, out)?;
    tracing::info!(path = %out.display(), "Exported");

    Ok(())
}
