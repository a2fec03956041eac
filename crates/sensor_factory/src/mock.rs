//! Mock IMU source.
//!
//! Generates gravity plus road-vibration noise at configurable irregular
//! rates in background threads, with scripted bump injections. Data is sent
//! through the callback, consistent with real device sensor behavior.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use contracts::{
    MockSourceConfig, OrientationLabel, RawSample, SensorDataCallback, SensorKind, Vector3,
};
use rand::Rng;
use tracing::{debug, warn};

/// How long a scripted bump keeps boosting the signal (seconds)
const BUMP_WIDTH_S: f64 = 0.08;

/// Mock IMU source
///
/// Delivers accelerometer (and optionally gyroscope) samples from background
/// threads at the configured rates. The accelerometer signal is gravity along
/// the simulated mount axis, uniform road noise, and any scripted bumps.
pub struct MockImuSource {
    config: MockSourceConfig,
    kinds: Vec<SensorKind>,
    /// Bump schedule parsed once: (elapsed seconds, amplitude m/s²)
    bumps: Vec<(f64, f64)>,
    listening: Arc<AtomicBool>,
}

impl MockImuSource {
    /// Create a mock source from its config
    pub fn new(config: MockSourceConfig) -> Self {
        let mut kinds = vec![SensorKind::Accelerometer];
        if config.gyro_rate_hz > 0.0 {
            kinds.push(SensorKind::Gyroscope);
        }

        let mut bumps: Vec<(f64, f64)> = config
            .bumps
            .iter()
            .filter_map(|(at, amplitude)| match at.parse::<f64>() {
                Ok(seconds) => Some((seconds, *amplitude)),
                Err(_) => {
                    warn!(key = %at, "ignoring unparsable bump time");
                    None
                }
            })
            .collect();
        bumps.sort_by(|a, b| a.0.total_cmp(&b.0));

        Self {
            config,
            kinds,
            bumps,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Gravity vector in raw device axes for the simulated mount
    fn gravity_vector(mount: OrientationLabel) -> Vector3 {
        const G: f64 = 9.81;
        match mount {
            OrientationLabel::FaceUp | OrientationLabel::Unknown => Vector3::new(0.0, 0.0, G),
            OrientationLabel::FaceDown => Vector3::new(0.0, 0.0, -G),
            OrientationLabel::LandscapeLeft => Vector3::new(G, 0.0, 0.0),
            OrientationLabel::LandscapeRight => Vector3::new(-G, 0.0, 0.0),
            OrientationLabel::Portrait => Vector3::new(0.0, G, 0.0),
            OrientationLabel::PortraitDown => Vector3::new(0.0, -G, 0.0),
        }
    }

    fn spawn_accel_thread(&self, callback: SensorDataCallback) {
        let listening = Arc::clone(&self.listening);
        let config = self.config.clone();
        let bumps = self.bumps.clone();
        let gravity = Self::gravity_vector(config.mount);
        let interval = Duration::from_secs_f64(1.0 / config.accel_rate_hz.max(1.0));
        // Uniform noise over ±(std·√3) has the requested standard deviation
        let spread = config.noise_std * 3.0_f64.sqrt();

        thread::spawn(move || {
            let mut rng = rand::rng();
            let start = Instant::now();

            debug!(rate_hz = config.accel_rate_hz, "mock accelerometer started");

            while listening.load(Ordering::Relaxed) {
                let elapsed = start.elapsed().as_secs_f64();

                let bump = bumps
                    .iter()
                    .find(|(at, _)| elapsed >= *at && elapsed < *at + BUMP_WIDTH_S)
                    .map(|(_, amplitude)| *amplitude)
                    .unwrap_or(0.0);

                let mut noise = || {
                    if spread > 0.0 {
                        rng.random_range(-spread..=spread)
                    } else {
                        0.0
                    }
                };
                // Bumps act along the vertical, i.e. the gravity axis
                let lift = 1.0 + bump / 9.81;
                let vector = Vector3::new(
                    gravity.x * lift + noise(),
                    gravity.y * lift + noise(),
                    gravity.z * lift + noise(),
                );

                callback(RawSample::accelerometer(vector, elapsed));
                thread::sleep(interval);
            }

            debug!("mock accelerometer stopped");
        });
    }

    fn spawn_gyro_thread(&self, callback: SensorDataCallback) {
        if self.config.gyro_rate_hz <= 0.0 {
            return;
        }

        let listening = Arc::clone(&self.listening);
        let interval = Duration::from_secs_f64(1.0 / self.config.gyro_rate_hz);
        let spread = (self.config.noise_std * 0.05).max(1e-4);

        thread::spawn(move || {
            let mut rng = rand::rng();
            let start = Instant::now();

            debug!("mock gyroscope started");

            while listening.load(Ordering::Relaxed) {
                let elapsed = start.elapsed().as_secs_f64();
                let vector = Vector3::new(
                    rng.random_range(-spread..=spread),
                    rng.random_range(-spread..=spread),
                    rng.random_range(-spread..=spread),
                );
                callback(RawSample::gyroscope(vector, elapsed));
                thread::sleep(interval);
            }

            debug!("mock gyroscope stopped");
        });
    }
}

impl contracts::SensorSource for MockImuSource {
    fn kinds(&self) -> &[SensorKind] {
        &self.kinds
    }

    fn listen(&self, callback: SensorDataCallback) {
        // Idempotent: if already listening, don't start again
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        self.spawn_accel_thread(Arc::clone(&callback));
        self.spawn_gyro_thread(callback);
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::SensorSource;
    use std::sync::atomic::AtomicU64;
    use std::sync::Mutex;

    #[test]
    fn test_mock_delivers_accel_and_gyro() {
        let source = MockImuSource::new(MockSourceConfig {
            accel_rate_hz: 200.0,
            gyro_rate_hz: 200.0,
            ..MockSourceConfig::default()
        });

        let accel_count = Arc::new(AtomicU64::new(0));
        let gyro_count = Arc::new(AtomicU64::new(0));
        let (a, g) = (Arc::clone(&accel_count), Arc::clone(&gyro_count));

        source.listen(Arc::new(move |sample| match sample.kind {
            SensorKind::Accelerometer => {
                a.fetch_add(1, Ordering::Relaxed);
            }
            SensorKind::Gyroscope => {
                g.fetch_add(1, Ordering::Relaxed);
            }
            SensorKind::Gps => {}
        }));

        thread::sleep(Duration::from_millis(100));
        source.stop();

        assert!(accel_count.load(Ordering::Relaxed) > 0);
        assert!(gyro_count.load(Ordering::Relaxed) > 0);
        assert!(!source.is_listening());
    }

    #[test]
    fn test_gravity_follows_mount() {
        let source = MockImuSource::new(MockSourceConfig {
            accel_rate_hz: 500.0,
            gyro_rate_hz: 0.0,
            noise_std: 0.0,
            mount: OrientationLabel::LandscapeLeft,
            ..MockSourceConfig::default()
        });
        assert_eq!(source.kinds(), &[SensorKind::Accelerometer]);

        let last = Arc::new(Mutex::new(None));
        let last_clone = Arc::clone(&last);
        source.listen(Arc::new(move |sample| {
            *last_clone.lock().unwrap() = Some(sample.vector);
        }));

        thread::sleep(Duration::from_millis(50));
        source.stop();

        let vector = last.lock().unwrap().expect("no sample delivered");
        assert!((vector.x - 9.81).abs() < 1e-9);
        assert!(vector.z.abs() < 1e-9);
    }

    #[test]
    fn test_idempotent_listen() {
        let source = MockImuSource::new(MockSourceConfig {
            accel_rate_hz: 500.0,
            gyro_rate_hz: 0.0,
            ..MockSourceConfig::default()
        });

        let count = Arc::new(AtomicU64::new(0));
        let c1 = Arc::clone(&count);
        let c2 = Arc::clone(&count);

        source.listen(Arc::new(move |_| {
            c1.fetch_add(1, Ordering::Relaxed);
        }));
        // Second call must not register another callback
        source.listen(Arc::new(move |_| {
            c2.fetch_add(1000, Ordering::Relaxed);
        }));

        thread::sleep(Duration::from_millis(40));
        source.stop();

        let total = count.load(Ordering::Relaxed);
        assert!(total > 0);
        assert!(total < 1000);
    }
}
