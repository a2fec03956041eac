//! Sampling scheduler task - the single producer of frames.
//!
//! A fixed 10 ms `tokio::time::interval` drives one atomic unit per tick:
//! read the latest cached raw samples, calibrate/correct/detect, append one
//! frame. "Latest wins" - the tick never blocks a sensor callback and a
//! sensor callback never blocks the tick. If no acceleration sample has ever
//! arrived, the tick is skipped rather than fabricating a zero-vector
//! reading; the degraded stream is reported once.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use contracts::{
    ContractError, Frame, GpsFix, OrientationState, SensorKind, SessionEvent,
};
use fusion::FusionCore;
use ingestion::SensorHub;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Ticks without a first accel sample before the stream counts as degraded
const DEGRADED_AFTER_TICKS: u64 = 100;

/// Everything the tick task needs, moved into the spawned task
pub(crate) struct SchedulerContext {
    pub tick_ms: u64,
    pub start: Instant,
    pub hub: Arc<SensorHub>,
    pub core: FusionCore,
    pub frames: Arc<Mutex<Vec<Frame>>>,
    pub orientation: Arc<Mutex<OrientationState>>,
    pub degraded: Arc<Mutex<Vec<SensorKind>>>,
    pub events: mpsc::Sender<SessionEvent>,
    pub shutdown: watch::Receiver<bool>,
}

/// Run the sampling loop until shutdown is signalled.
///
/// The frame log and orientation state live behind shared handles, so a
/// partial session is still flushable even if this task dies.
pub(crate) async fn run(mut ctx: SchedulerContext) -> Result<(), ContractError> {
    let mut ticker = interval(Duration::from_millis(ctx.tick_ms));
    // A late tick must not cause a burst of catch-up frames
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut shutdown = ctx.shutdown.clone();
    let mut ticks: u64 = 0;
    let mut last_tick: Option<Instant> = None;

    info!(tick_ms = ctx.tick_ms, "sampling scheduler started");

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                // A closed channel means the session handle is gone; stop too
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            now = ticker.tick() => {
                ticks += 1;
                if let Some(previous) = last_tick.replace(now.into_std()) {
                    let jitter_ms = now.into_std().duration_since(previous).as_secs_f64() * 1000.0
                        - ctx.tick_ms as f64;
                    metrics::histogram!("recorder_tick_jitter_ms").record(jitter_ms.abs());
                }

                tick(&mut ctx, ticks);
            }
        }
    }

    info!(ticks, "sampling scheduler stopped");
    Ok(())
}

/// One atomic tick: read latest -> fuse -> append -> publish
fn tick(ctx: &mut SchedulerContext, ticks: u64) {
    let Some(accel) = ctx.hub.latest(SensorKind::Accelerometer) else {
        observability::record_tick_skipped();
        if ticks == DEGRADED_AFTER_TICKS {
            report_degraded(ctx, SensorKind::Accelerometer);
        }
        return;
    };

    if ticks == DEGRADED_AFTER_TICKS {
        check_optional_streams(ctx);
    }

    let elapsed_ms = ctx.start.elapsed().as_millis() as u64;
    let gyro = ctx.hub.latest(SensorKind::Gyroscope).map(|s| s.vector);
    let gps = ctx.hub.latest(SensorKind::Gps).map(|s| GpsFix {
        latitude: s.vector.x,
        longitude: s.vector.y,
    });

    let out = ctx.core.push(elapsed_ms, accel.vector, gyro, gps);

    {
        // Sole writer; the lock is only contended once, at stop
        let mut frames = ctx.frames.lock().unwrap();
        frames.push(out.frame);
    }

    // Keep the flush-safe snapshot fresh (gyro offsets can refine after the
    // last calibration readout)
    *ctx.orientation.lock().unwrap() = ctx.core.orientation();

    if let Some(progress) = out.calibration {
        publish(ctx, SessionEvent::CalibrationProgress(progress));
    }

    if let Some(event) = out.detection {
        observability::record_detection(event.elapsed_ms);
        publish(ctx, SessionEvent::Detection(event));
    }
}

/// Report optional streams that never delivered, once each
fn check_optional_streams(ctx: &mut SchedulerContext) {
    for kind in [SensorKind::Gyroscope, SensorKind::Gps] {
        if ctx.hub.expects(kind) && !ctx.hub.has_delivered(kind) {
            report_degraded(ctx, kind);
        }
    }
}

fn report_degraded(ctx: &mut SchedulerContext, kind: SensorKind) {
    warn!(kind = ?kind, "sensor stream never delivered a first sample");
    ctx.degraded
        .lock()
        .unwrap()
        .push(kind);
    publish(ctx, SessionEvent::SourceDegraded(kind));
}

/// Publish without ever blocking the sampling timeline
fn publish(ctx: &SchedulerContext, event: SessionEvent) {
    if let Err(e) = ctx.events.try_send(event) {
        debug!(error = %e, "event subscriber lagging, notification dropped");
    }
}
