//! Mock Session Demo
//!
//! Records a short session from the synthetic road source, auto-confirms
//! every detection and exports the annotated CSV. Runs without a device.
//!
//! Run with: cargo run --bin mock_session

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use contracts::{MockSourceConfig, OrientationLabel, SessionEvent};
use ingestion::SensorHub;
use recorder::{RecorderConfig, SessionRecorder};
use sensor_factory::MockImuSource;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting Mock Session Demo");

    // ==== Stage 1: Build the synthetic road source ====
    // Two scripted bumps land after the detector has armed (~2 s in)
    let source = MockImuSource::new(MockSourceConfig {
        bumps: HashMap::from([("4.0".to_string(), 8.0), ("9.0".to_string(), 9.5)]),
        noise_std: 0.6,
        mount: OrientationLabel::LandscapeLeft,
        ..MockSourceConfig::default()
    });

    let mut hub = SensorHub::new();
    hub.register_source(Box::new(source));

    // ==== Stage 2: Start the session ====
    let mut session = SessionRecorder::new();
    let started_at = session.start(RecorderConfig::default(), hub)?;
    let mut events = session.take_events().expect("events taken once");

    tracing::info!(started_at = %started_at, "Recording");

    // ==== Stage 3: Auto-answer prompts for 15 seconds ====
    let run = async {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::CalibrationProgress(progress) => {
                    tracing::info!(
                        label = progress.label.as_str(),
                        confidence = format!("{:.1}", progress.confidence),
                        frozen = progress.frozen,
                        "Calibration"
                    );
                }
                SessionEvent::Detection(detection) => {
                    tracing::info!(elapsed_ms = detection.elapsed_ms, "Bump! Auto-confirming");
                    session
                        .respond_to_prompt(detection.elapsed_ms, true)
                        .expect("session is active");
                }
                SessionEvent::SourceDegraded(kind) => {
                    tracing::warn!(kind = ?kind, "Stream degraded");
                }
            }
        }
    };
    let _ = tokio::time::timeout(Duration::from_secs(15), run).await;

    // ==== Stage 4: Stop and export ====
    let report = session.stop().await?.expect("first stop yields the report");

    tracing::info!(
        frames = report.frame_count(),
        annotations = report.annotation_count,
        orientation = report.orientation.label.as_str(),
        frame_hz = format!("{:.2}", report.rates.frame_hz),
        "Session finished"
    );

    let out = Path::new("demo_session.csv");
    export::export_to_path(&report, out)?;
    tracing::info!(path = %out.display(), "Exported");

    Ok(())
}
