//! Pipeline orchestrator - coordinates all components.
//!
//! Builds the sensor hub from the configured source (mock or replay), runs a
//! recording session, answers detection prompts (interactively or by policy)
//! and exports the annotated session when the run ends.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{SessionBlueprint, SessionEvent, SourceConfig};
use ingestion::SensorHub;
use recorder::{RecorderConfig, SessionRecorder};
use sensor_factory::{MockImuSource, ReplaySource};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use super::PipelineStats;
use crate::cli::RespondMode;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The session blueprint
    pub blueprint: SessionBlueprint,

    /// Recording duration (None = run until shutdown)
    pub duration: Option<Duration>,

    /// How detection prompts are answered
    pub respond: RespondMode,

    /// How long an interactive prompt waits before timing out
    pub prompt_timeout: Duration,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run one recording session to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Build the sensor hub from the configured source
        let hub = build_hub(blueprint).context("Failed to set up sensor source")?;
        info!(sources = hub.source_count(), "Sensor hub configured");

        // Start the session
        let mut session = SessionRecorder::new();
        let started_at = session
            .start(RecorderConfig::from_blueprint(blueprint), hub)
            .context("Failed to start session")?;
        let mut events = session
            .take_events()
            .context("Event stream already taken")?;

        info!(
            started_at = %started_at,
            threshold = blueprint.detector.threshold,
            "Recording started"
        );

        // Answer prompts until the duration elapses or the events dry up
        let mut stats = PipelineStats::default();
        let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();

        let event_loop = async {
            while let Some(event) = events.recv().await {
                self.handle_event(&session, &mut stdin_lines, &mut stats, event)
                    .await?;
            }
            Ok::<(), anyhow::Error>(())
        };

        let deadline = async {
            match self.config.duration {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending().await,
            }
        };

        // The session must still stop and export on Ctrl+C
        tokio::select! {
            result = event_loop => {
                result?;
                warn!("Event stream closed before the session ended");
            }
            _ = deadline => {
                info!("Configured duration elapsed");
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Received shutdown signal, stopping session...");
            }
        }

        // Stop and export
        let report = session
            .stop()
            .await
            .context("Failed to stop session")?
            .context("Session produced no report")?;

        stats.frames = report.frame_count() as u64;
        stats.degraded_streams = report.degraded_streams.len();
        stats.session_metrics.consume_report(&report);
        stats.duration = start_time.elapsed();

        if report.frames.is_empty() {
            warn!("No frames recorded; skipping export");
            return Ok(stats);
        }

        let written = export::export_with_fallback(
            &report,
            &blueprint.export.path,
            blueprint.export.fallback_path.as_deref(),
        )
        .context("Failed to export session (frame log retained in memory)")?;

        info!(path = %written.display(), "Session exported");
        stats.export_path = Some(written);

        Ok(stats)
    }

    /// React to one session event
    async fn handle_event(
        &self,
        session: &SessionRecorder,
        stdin_lines: &mut Lines<BufReader<Stdin>>,
        stats: &mut PipelineStats,
        event: SessionEvent,
    ) -> Result<()> {
        match event {
            SessionEvent::CalibrationProgress(progress) => {
                info!(
                    label = progress.label.as_str(),
                    confidence = format!("{:.1}", progress.confidence),
                    frozen = progress.frozen,
                    "Calibration progress"
                );
            }
            SessionEvent::SourceDegraded(kind) => {
                warn!(kind = ?kind, "Stream never delivered; session is degraded");
            }
            SessionEvent::Detection(detection) => {
                stats.detections += 1;
                stats.session_metrics.record_detection();

                let answer = match self.config.respond {
                    RespondMode::Confirm => Some(true),
                    RespondMode::Reject => Some(false),
                    RespondMode::Ignore => None,
                    RespondMode::Ask => {
                        prompt_operator(stdin_lines, detection.elapsed_ms, self.config.prompt_timeout)
                            .await
                    }
                };

                match answer {
                    Some(confirmed) => {
                        session.respond_to_prompt(detection.elapsed_ms, confirmed)?;
                        stats.session_metrics.record_annotation(if confirmed {
                            contracts::AnnotationFeedback::Yes
                        } else {
                            contracts::AnnotationFeedback::No
                        });
                    }
                    None => {
                        session.prompt_timed_out(detection.elapsed_ms)?;
                        stats
                            .session_metrics
                            .record_annotation(contracts::AnnotationFeedback::Timeout);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Ask the operator to confirm a detection; `None` means the prompt timed out
async fn prompt_operator(
    stdin_lines: &mut Lines<BufReader<Stdin>>,
    elapsed_ms: u64,
    timeout: Duration,
) -> Option<bool> {
    println!(
        "Possible pothole at {:.1}s - confirm? [y/n] ({}s timeout)",
        elapsed_ms as f64 / 1000.0,
        timeout.as_secs()
    );

    match tokio::time::timeout(timeout, stdin_lines.next_line()).await {
        Ok(Ok(Some(line))) => {
            let answer = matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes");
            Some(answer)
        }
        // Timeout, closed stdin or read error all resolve to `timeout`
        _ => None,
    }
}

/// Build the sensor hub from the blueprint's source configuration
fn build_hub(blueprint: &SessionBlueprint) -> Result<SensorHub> {
    let mut hub = SensorHub::new();
    match &blueprint.source {
        SourceConfig::Mock(mock) => {
            info!(
                accel_rate_hz = mock.accel_rate_hz,
                gyro_rate_hz = mock.gyro_rate_hz,
                bumps = mock.bumps.len(),
                "Using mock IMU source"
            );
            hub.register_source(Box::new(MockImuSource::new(mock.clone())));
        }
        SourceConfig::Replay(replay) => {
            info!(path = %replay.path.display(), speed = replay.speed, "Using replay source");
            let source = ReplaySource::load(replay.clone())
                .with_context(|| format!("Failed to load replay from {}", replay.path.display()))?;
            hub.register_source(Box::new(source));
        }
    }
    Ok(hub)
}
