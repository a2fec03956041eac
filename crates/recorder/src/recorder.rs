//! SessionRecorder - start/stop lifecycle and operator inputs.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::{DateTime, Utc};
use contracts::{
    Annotation, AnnotationConfig, CalibratorConfig, DetectorConfig, DeviceInfo, Frame,
    MeasuredRates, OrientationState, SchedulerConfig, SensorKind, SessionBlueprint, SessionEvent,
    SessionReport,
};
use fusion::{AnnotationStore, FusionCore, SharedThreshold};
use ingestion::SensorHub;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use crate::error::SessionError;
use crate::scheduler::{self, SchedulerContext};
use crate::stats;

/// Capacity of the event channel; publishing never blocks the tick, a slow
/// subscriber just loses notifications
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Per-session configuration handed to `start()`
///
/// Every tunable the core uses lives here, so concurrent or consecutive
/// sessions never share mutable state.
#[derive(Debug, Clone, Default)]
pub struct RecorderConfig {
    pub device: DeviceInfo,
    pub scheduler: SchedulerConfig,
    pub calibrator: CalibratorConfig,
    pub detector: DetectorConfig,
    pub annotation: AnnotationConfig,
}

impl RecorderConfig {
    /// Extract the recorder-relevant parts of a session blueprint
    pub fn from_blueprint(blueprint: &SessionBlueprint) -> Self {
        Self {
            device: blueprint.device.clone(),
            scheduler: blueprint.scheduler.clone(),
            calibrator: blueprint.calibrator.clone(),
            detector: blueprint.detector.clone(),
            annotation: blueprint.annotation.clone(),
        }
    }
}

/// State of one in-flight session
struct ActiveSession {
    started_at: DateTime<Utc>,
    start: Instant,
    device: DeviceInfo,
    hub: Arc<SensorHub>,
    threshold: SharedThreshold,
    annotations: Arc<Mutex<AnnotationStore>>,
    frames: Arc<Mutex<Vec<Frame>>>,
    orientation: Arc<Mutex<OrientationState>>,
    degraded: Arc<Mutex<Vec<SensorKind>>>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<(), contracts::ContractError>>,
    events: Option<mpsc::Receiver<SessionEvent>>,
}

/// Session recorder
///
/// Owns the frame log and orientation state of the active session and
/// orchestrates scheduler, fusion core and annotation store. Exactly one
/// session is active at a time.
pub struct SessionRecorder {
    active: Option<ActiveSession>,
}

impl SessionRecorder {
    /// Create a recorder with no active session
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Whether a session is currently recording
    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Start a new session.
    ///
    /// Fails if one is already active. Resets all sub-component state, starts
    /// the sensor sources and the 100 Hz sampling task, and returns the new
    /// session identity (its wall-clock start time).
    ///
    /// Must be called within a tokio runtime.
    #[instrument(name = "session_start", skip(self, config, hub))]
    pub fn start(
        &mut self,
        config: RecorderConfig,
        hub: SensorHub,
    ) -> Result<DateTime<Utc>, SessionError> {
        if let Some(active) = &self.active {
            return Err(SessionError::AlreadyRecording {
                started_at: active.started_at,
            });
        }

        let started_at = Utc::now();
        let start = Instant::now();

        let threshold = SharedThreshold::new(config.detector.threshold);
        let core = FusionCore::new(
            config.calibrator.clone(),
            config.detector.clone(),
            threshold.clone(),
        );

        let hub = Arc::new(hub);
        let frames = Arc::new(Mutex::new(Vec::new()));
        let orientation = Arc::new(Mutex::new(OrientationState::default()));
        let degraded = Arc::new(Mutex::new(Vec::new()));
        let annotations = Arc::new(Mutex::new(AnnotationStore::new(config.annotation.clone())));
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        hub.start_all();

        let context = SchedulerContext {
            tick_ms: config.scheduler.tick_ms,
            start,
            hub: Arc::clone(&hub),
            core,
            frames: Arc::clone(&frames),
            orientation: Arc::clone(&orientation),
            degraded: Arc::clone(&degraded),
            events: events_tx,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(scheduler::run(context));

        info!(started_at = %started_at, "session started");

        self.active = Some(ActiveSession {
            started_at,
            start,
            device: config.device,
            hub,
            threshold,
            annotations,
            frames,
            orientation,
            degraded,
            shutdown: shutdown_tx,
            task,
            events: Some(events_rx),
        });

        Ok(started_at)
    }

    /// Take the session event stream. Can only be called once per session;
    /// subsequent calls return `None`.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<SessionEvent>> {
        self.active.as_mut().and_then(|active| active.events.take())
    }

    /// Adjust the detection threshold of the running session; takes effect on
    /// the next sample, no recalibration required.
    pub fn set_threshold(&self, threshold: f64) -> Result<(), SessionError> {
        let active = self.active.as_ref().ok_or(SessionError::NotRecording)?;
        active.threshold.set(threshold);
        info!(threshold, "detection threshold updated");
        Ok(())
    }

    /// Record the operator's answer to a detection prompt
    pub fn respond_to_prompt(
        &self,
        event_elapsed_ms: u64,
        confirmed: bool,
    ) -> Result<(), SessionError> {
        self.record_annotation(Annotation::answered(event_elapsed_ms, confirmed))
    }

    /// Record a detection prompt that expired unanswered
    pub fn prompt_timed_out(&self, event_elapsed_ms: u64) -> Result<(), SessionError> {
        self.record_annotation(Annotation::timed_out(event_elapsed_ms))
    }

    fn record_annotation(&self, annotation: Annotation) -> Result<(), SessionError> {
        let active = self.active.as_ref().ok_or(SessionError::NotRecording)?;
        observability::record_annotation(annotation.feedback);
        active.annotations.lock().unwrap().record(annotation);
        Ok(())
    }

    /// Stop the active session.
    ///
    /// Idempotent: the second call is a no-op returning `None`. Halts the
    /// scheduler synchronously (no timers survive this call), applies the
    /// stored annotations onto the frame log, computes measured rates from
    /// the actual timestamps and returns the finished report. Whatever frames
    /// exist are flushed even when the session stopped early or a
    /// sub-component failed.
    #[instrument(name = "session_stop", skip(self))]
    pub async fn stop(&mut self) -> Result<Option<SessionReport>, SessionError> {
        let Some(active) = self.active.take() else {
            return Ok(None);
        };

        // Tear down the periodic task before touching shared state
        let _ = active.shutdown.send(true);
        active.hub.stop_all();

        match active.task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                // Fatal to the session, but captured frames are still flushed
                error!(error = %e, "scheduler reported a fault; flushing partial session");
            }
            Err(join_error) => {
                error!(error = %join_error, "scheduler task died; flushing partial session");
            }
        }

        let ended_at = Utc::now();
        let duration_ms = active.start.elapsed().as_millis() as u64;

        let mut frames = std::mem::take(&mut *active.frames.lock().unwrap());
        let annotations = active.annotations.lock().unwrap();
        annotations.apply(&mut frames);

        let rates = MeasuredRates {
            frame_hz: stats::frame_rate_hz(&frames),
            accel_hz: stats::stream_rate_hz(
                active.hub.arrivals(SensorKind::Accelerometer),
                duration_ms,
            ),
            gyro_hz: stats::stream_rate_hz(active.hub.arrivals(SensorKind::Gyroscope), duration_ms),
        };

        let report = SessionReport {
            started_at: active.started_at,
            ended_at,
            duration_ms,
            orientation: *active.orientation.lock().unwrap(),
            annotation_count: annotations.len(),
            degraded_streams: active.degraded.lock().unwrap().clone(),
            device: active.device,
            rates,
            frames,
        };

        observability::record_session_finished(report.frame_count(), report.duration_ms);
        info!(
            frames = report.frame_count(),
            annotations = report.annotation_count,
            duration_ms = report.duration_ms,
            frame_hz = format!("{:.2}", report.rates.frame_hz),
            "session stopped"
        );

        if report.frames.is_empty() {
            warn!("session produced no frames (acceleration stream never delivered?)");
        }

        Ok(Some(report))
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{RawSample, Vector3};
    use sensor_factory::{ScriptedSource, Step};
    use std::time::Duration;

    fn gravity_steps(count: usize, interval_ms: u64) -> Vec<Step> {
        (0..count)
            .map(|i| {
                Step::new(
                    interval_ms,
                    RawSample::accelerometer(
                        Vector3::new(0.0, 0.0, 9.81),
                        (i as u64 * interval_ms) as f64 / 1000.0,
                    ),
                )
            })
            .collect()
    }

    fn gravity_hub() -> SensorHub {
        let mut hub = SensorHub::new();
        hub.register_source(Box::new(ScriptedSource::new(gravity_steps(5, 5)).hold_last(5)));
        hub
    }

    #[tokio::test]
    async fn test_start_while_active_fails() {
        let mut recorder = SessionRecorder::new();
        recorder
            .start(RecorderConfig::default(), gravity_hub())
            .unwrap();

        let second = recorder.start(RecorderConfig::default(), gravity_hub());
        assert!(matches!(
            second,
            Err(SessionError::AlreadyRecording { .. })
        ));

        recorder.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut recorder = SessionRecorder::new();
        recorder
            .start(RecorderConfig::default(), gravity_hub())
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;

        let first = recorder.stop().await.unwrap();
        assert!(first.is_some());

        let second = recorder.stop().await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_frames_are_monotonic() {
        let mut recorder = SessionRecorder::new();
        recorder
            .start(RecorderConfig::default(), gravity_hub())
            .unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;
        let report = recorder.stop().await.unwrap().unwrap();

        assert!(report.frame_count() > 5);
        for pair in report.frames.windows(2) {
            assert!(pair[0].elapsed_ms <= pair[1].elapsed_ms);
        }
    }

    #[tokio::test]
    async fn test_no_frames_without_accel() {
        // A gyro-only hub: the scheduler must not fabricate zero-vector frames
        let mut hub = SensorHub::new();
        hub.register_source(Box::new(
            ScriptedSource::new(vec![Step::new(
                0,
                RawSample::gyroscope(Vector3::new(0.01, 0.0, 0.0), 0.0),
            )])
            .hold_last(5),
        ));

        let mut recorder = SessionRecorder::new();
        recorder.start(RecorderConfig::default(), hub).unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        let report = recorder.stop().await.unwrap().unwrap();
        assert_eq!(report.frame_count(), 0);
    }

    #[tokio::test]
    async fn test_operator_inputs_require_active_session() {
        let recorder = SessionRecorder::new();
        assert!(matches!(
            recorder.set_threshold(4.0),
            Err(SessionError::NotRecording)
        ));
        assert!(matches!(
            recorder.respond_to_prompt(1000, true),
            Err(SessionError::NotRecording)
        ));
    }

    #[tokio::test]
    async fn test_annotations_applied_at_stop() {
        let mut recorder = SessionRecorder::new();
        recorder
            .start(RecorderConfig::default(), gravity_hub())
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        recorder.respond_to_prompt(50, true).unwrap();

        let report = recorder.stop().await.unwrap().unwrap();
        assert_eq!(report.annotation_count, 1);
        // Every frame sits inside the ±10 s window around t=50
        assert!(report
            .frames
            .iter()
            .all(|f| f.is_pothole == contracts::PotholeMark::Yes));
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let mut recorder = SessionRecorder::new();
        recorder
            .start(RecorderConfig::default(), gravity_hub())
            .unwrap();
        recorder.stop().await.unwrap();

        // A fresh session starts cleanly after the previous one ended
        recorder
            .start(RecorderConfig::default(), gravity_hub())
            .unwrap();
        assert!(recorder.is_recording());
        recorder.stop().await.unwrap();
    }
}
