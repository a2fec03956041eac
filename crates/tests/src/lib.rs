//! # Integration Tests
//!
//! End-to-end tests across the workspace crates, no device required:
//! - scripted source -> scheduler -> detection -> annotation -> export
//! - orientation freeze and mount-invariant storage
//! - export/replay round trip

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use contracts::{
        CalibratorConfig, DetectorConfig, OrientationLabel, PotholeMark, RawSample, SensorKind,
        SensorSource, SessionEvent, Vector3,
    };
    use ingestion::SensorHub;
    use recorder::{RecorderConfig, SessionRecorder};
    use sensor_factory::{ScriptedSource, Step};
    use tokio::time::timeout;

    /// Shrunk calibration windows so e2e tests arm in a few hundred ms
    fn fast_config() -> RecorderConfig {
        RecorderConfig {
            calibrator: CalibratorConfig {
                window_samples: 20,
                reestimate_every: 5,
                ..CalibratorConfig::default()
            },
            detector: DetectorConfig {
                calibration_samples: 20,
                buffer_size: 10,
                cooldown_ms: 300,
                ..DetectorConfig::default()
            },
            ..RecorderConfig::default()
        }
    }

    /// Wobbling gravity along `axis`, alternating ±1.5 m/s² so the rolling
    /// stddev stays above the detector floor
    fn wobble_steps(axis: Vector3, count: usize, step_ms: u64) -> Vec<Step> {
        (0..count)
            .map(|i| {
                let wobble = if i % 2 == 0 { 1.5 } else { -1.5 };
                let scale = (9.8 + wobble) / 9.8;
                let vector = Vector3::new(axis.x * scale, axis.y * scale, axis.z * scale);
                Step::new(
                    step_ms,
                    RawSample::accelerometer(vector, (i as u64 * step_ms) as f64 / 1000.0),
                )
            })
            .collect()
    }

    async fn first_detection(
        events: &mut tokio::sync::mpsc::Receiver<SessionEvent>,
    ) -> Option<contracts::DetectionEvent> {
        while let Some(event) = events.recv().await {
            if let SessionEvent::Detection(detection) = event {
                return Some(detection);
            }
        }
        None
    }

    /// End-to-end: scripted bump -> detection -> confirm -> export
    #[tokio::test]
    async fn test_e2e_detection_annotation_export() {
        let gravity = Vector3::new(0.0, 0.0, 9.8);

        // 600 ms of road wobble, a 25 ms spike at 17 m/s², wobble again
        let mut steps = wobble_steps(gravity, 120, 5);
        for _ in 0..5 {
            steps.push(Step::new(
                5,
                RawSample::accelerometer(Vector3::new(0.0, 0.0, 17.0), 0.6),
            ));
        }
        steps.extend(wobble_steps(gravity, 100, 5));

        let mut hub = SensorHub::new();
        hub.register_source(Box::new(ScriptedSource::new(steps).hold_last(5)));

        let mut session = SessionRecorder::new();
        session.start(fast_config(), hub).unwrap();
        let mut events = session.take_events().unwrap();

        // The spike must surface exactly one prompt
        let detection = timeout(Duration::from_secs(5), first_detection(&mut events))
            .await
            .expect("no detection within 5s")
            .expect("event stream closed");

        session.respond_to_prompt(detection.elapsed_ms, true).unwrap();

        // Let the tail of the script play out, then stop
        tokio::time::sleep(Duration::from_millis(300)).await;
        let report = session.stop().await.unwrap().expect("first stop");

        assert_eq!(report.annotation_count, 1);
        assert!(report.frame_count() > 40);

        // Frames around the detection inherit the confirmed mark
        let marked = report
            .frames
            .iter()
            .filter(|f| f.is_pothole == PotholeMark::Yes)
            .count();
        assert!(marked > 0);

        // And the exported CSV carries both the marks and the trailer
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.csv");
        export::export_to_path(&report, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("yes,user_confirmed"));
        assert!(content.contains("#annotation_count,1"));
        assert!(content.contains("#schema_version,2"));
    }

    /// A landscape mount freezes as such and storage is mount-invariant
    #[tokio::test]
    async fn test_orientation_freeze_and_correction() {
        let gravity_on_x = Vector3::new(9.81, 0.0, 0.0);
        let steps = wobble_steps(gravity_on_x, 150, 5);

        let mut hub = SensorHub::new();
        hub.register_source(Box::new(ScriptedSource::new(steps).hold_last(5)));

        let mut session = SessionRecorder::new();
        session.start(fast_config(), hub).unwrap();
        let mut events = session.take_events().unwrap();

        // Wait until calibration reports a frozen label
        let frozen = timeout(Duration::from_secs(5), async {
            while let Some(event) = events.recv().await {
                if let SessionEvent::CalibrationProgress(progress) = event {
                    if progress.frozen {
                        return Some(progress.label);
                    }
                }
            }
            None
        })
        .await
        .expect("calibration did not freeze in time")
        .expect("event stream closed");

        assert_eq!(frozen, OrientationLabel::LandscapeLeft);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let report = session.stop().await.unwrap().expect("first stop");

        assert_eq!(report.orientation.label, OrientationLabel::LandscapeLeft);
        assert!(report.orientation.frozen);

        // Post-freeze frames store canonical axes: gravity moved from x to -y
        let last = report.frames.last().unwrap();
        assert!(last.accel.x.abs() < 0.1);
        assert!(last.accel.y < -8.0);
    }

    /// Exported CSV feeds back through the replay source
    #[tokio::test]
    async fn test_export_replay_round_trip() {
        let gravity = Vector3::new(0.0, 0.0, 9.8);
        let steps = wobble_steps(gravity, 60, 5);

        let mut hub = SensorHub::new();
        hub.register_source(Box::new(ScriptedSource::new(steps).hold_last(5)));

        let mut session = SessionRecorder::new();
        session.start(fast_config(), hub).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        let report = session.stop().await.unwrap().expect("first stop");
        assert!(report.frame_count() > 10);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.csv");
        export::export_to_path(&report, &path).unwrap();

        let replay = sensor_factory::ReplaySource::load(contracts::ReplaySourceConfig {
            path: path.clone(),
            speed: 10.0,
        })
        .unwrap();
        assert!(replay.kinds().contains(&SensorKind::Accelerometer));

        // Drive a second session from the replayed file
        let mut hub = SensorHub::new();
        hub.register_source(Box::new(replay));
        let mut session = SessionRecorder::new();
        session.start(fast_config(), hub).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        let second = session.stop().await.unwrap().expect("first stop");

        assert!(second.frame_count() > 0);
    }

    /// Config blueprint flows into the recorder configuration
    #[test]
    fn test_blueprint_to_recorder_config() {
        let toml = r#"
[device]
model = "Pixel 8"

[source]
kind = "mock"

[detector]
threshold = 3.5
cooldown_ms = 2000

[export]
path = "out.csv"
"#;
        let blueprint =
            config_loader::ConfigLoader::load_from_str(toml, config_loader::ConfigFormat::Toml)
                .unwrap();
        let config = RecorderConfig::from_blueprint(&blueprint);

        assert_eq!(config.device.model, "Pixel 8");
        assert_eq!(config.detector.threshold, 3.5);
        assert_eq!(config.detector.cooldown_ms, 2000);
        assert_eq!(config.annotation.window_ms, 10_000);
    }
}
