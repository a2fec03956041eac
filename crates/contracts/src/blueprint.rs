//! SessionBlueprint - Config Loader output
//!
//! Describes a complete recording session: device metadata, sensor source,
//! sampling grid, calibration and detection tunables, annotation policy and
//! export routing. Every constant the algorithms use lives here so sessions
//! never share mutable state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use validator::Validate;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete session configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Recording device metadata, stamped into the export trailer
    #[serde(default)]
    pub device: DeviceInfo,

    /// Sensor source selection
    pub source: SourceConfig,

    /// Sampling grid configuration
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Orientation calibration configuration
    #[serde(default)]
    pub calibrator: CalibratorConfig,

    /// Bump detection configuration
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Annotation correlation configuration
    #[serde(default)]
    pub annotation: AnnotationConfig,

    /// Export routing configuration
    pub export: ExportConfig,

    /// Prometheus metrics port (None = disabled)
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

/// Device metadata for the export trailer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device model (e.g. "Pixel 8")
    #[serde(default)]
    pub model: String,

    /// OS name and version
    #[serde(default)]
    pub os_version: String,

    /// Recording application version
    #[serde(default)]
    pub app_version: String,
}

/// Sensor source selection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Synthetic road profile (no device required)
    Mock(MockSourceConfig),

    /// Replay a previously exported session CSV
    Replay(ReplaySourceConfig),
}

/// Mock source tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockSourceConfig {
    /// Accelerometer delivery rate (Hz); deliberately off-grid by default
    #[serde(default = "default_accel_rate")]
    pub accel_rate_hz: f64,

    /// Gyroscope delivery rate (Hz); 0 disables the stream
    #[serde(default = "default_gyro_rate")]
    pub gyro_rate_hz: f64,

    /// Road vibration noise, standard deviation in m/s²
    #[serde(default = "default_noise")]
    pub noise_std: f64,

    /// Scripted bump injections: elapsed seconds -> amplitude (m/s²)
    #[serde(default)]
    pub bumps: HashMap<String, f64>,

    /// Simulated mount orientation label for gravity direction
    #[serde(default)]
    pub mount: crate::OrientationLabel,
}

fn default_accel_rate() -> f64 {
    83.0
}

fn default_gyro_rate() -> f64 {
    61.0
}

fn default_noise() -> f64 {
    0.35
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            accel_rate_hz: default_accel_rate(),
            gyro_rate_hz: default_gyro_rate(),
            noise_std: default_noise(),
            bumps: HashMap::new(),
            mount: crate::OrientationLabel::FaceUp,
        }
    }
}

/// Replay source tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaySourceConfig {
    /// Path to a previously exported session CSV
    pub path: PathBuf,

    /// Playback speed multiplier (1.0 = original cadence)
    #[serde(default = "default_replay_speed")]
    pub speed: f64,
}

fn default_replay_speed() -> f64 {
    1.0
}

/// Sampling grid configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SchedulerConfig {
    /// Tick period in milliseconds (100 Hz grid)
    #[validate(range(min = 1))]
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_tick_ms() -> u64 {
    10
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

/// Orientation calibration configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CalibratorConfig {
    /// Calibration window length in raw accel samples
    #[validate(range(min = 10))]
    #[serde(default = "default_window_samples")]
    pub window_samples: usize,

    /// Re-estimate cadence in samples (live readout granularity)
    #[validate(range(min = 1))]
    #[serde(default = "default_reestimate_every")]
    pub reestimate_every: usize,

    /// Low-pass coefficient applied as `filtered = alpha*filtered + (1-alpha)*mean`
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_filter_alpha")]
    pub filter_alpha: f64,

    /// Dominant-axis hysteresis threshold (m/s²)
    #[serde(default = "default_hysteresis")]
    pub hysteresis_ms2: f64,

    /// Confidence percent above which the label freezes
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default = "default_freeze_confidence")]
    pub freeze_confidence: f64,

    /// Per-axis variance above which calibration is flagged unreliable (m/s²)²
    #[serde(default = "default_motion_variance_limit")]
    pub motion_variance_limit: f64,

    /// Standard gravity used for normalization (m/s²)
    #[serde(default = "default_gravity")]
    pub gravity: f64,
}

fn default_window_samples() -> usize {
    100
}

fn default_reestimate_every() -> usize {
    10
}

fn default_filter_alpha() -> f64 {
    0.8
}

fn default_hysteresis() -> f64 {
    6.0
}

fn default_freeze_confidence() -> f64 {
    60.0
}

fn default_motion_variance_limit() -> f64 {
    2.0
}

fn default_gravity() -> f64 {
    9.81
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self {
            window_samples: default_window_samples(),
            reestimate_every: default_reestimate_every(),
            filter_alpha: default_filter_alpha(),
            hysteresis_ms2: default_hysteresis(),
            freeze_confidence: default_freeze_confidence(),
            motion_variance_limit: default_motion_variance_limit(),
            gravity: default_gravity(),
        }
    }
}

/// Bump detection configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DetectorConfig {
    /// Detection threshold on |magnitude - baseline| (m/s²)
    #[validate(range(min = 1.0, max = 10.0))]
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Minimum spacing between accepted detections (ms)
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// Samples consumed establishing the baseline before arming
    #[validate(range(min = 1))]
    #[serde(default = "default_calibration_samples")]
    pub calibration_samples: usize,

    /// Rolling magnitude window length in samples
    #[validate(range(min = 2))]
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Per-sample baseline adaptation rate (`baseline = baseline*(1-rate) + magnitude*rate`)
    #[validate(range(min = 0.0, max = 1.0))]
    #[serde(default = "default_baseline_adapt_rate")]
    pub baseline_adapt_rate: f64,

    /// Rolling stddev below which a deviation is treated as drift, not an event
    #[serde(default = "default_stddev_floor")]
    pub stddev_floor: f64,

    /// Initial baseline seed (m/s², standard gravity)
    #[serde(default = "default_baseline_seed")]
    pub baseline_seed: f64,
}

fn default_threshold() -> f64 {
    5.0
}

fn default_cooldown_ms() -> u64 {
    3000
}

fn default_calibration_samples() -> usize {
    200
}

fn default_buffer_size() -> usize {
    50
}

fn default_baseline_adapt_rate() -> f64 {
    0.01
}

fn default_stddev_floor() -> f64 {
    1.0
}

fn default_baseline_seed() -> f64 {
    9.8
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            cooldown_ms: default_cooldown_ms(),
            calibration_samples: default_calibration_samples(),
            buffer_size: default_buffer_size(),
            baseline_adapt_rate: default_baseline_adapt_rate(),
            stddev_floor: default_stddev_floor(),
            baseline_seed: default_baseline_seed(),
        }
    }
}

/// Annotation correlation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnnotationConfig {
    /// Half-width of the window around an event inside which frames inherit
    /// its annotation (ms)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

fn default_window_ms() -> u64 {
    10_000
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
        }
    }
}

/// Export routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Primary output file path
    pub path: PathBuf,

    /// Alternate writable location tried when the primary write fails
    #[serde(default)]
    pub fallback_path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_canonical_constants() {
        let detector = DetectorConfig::default();
        assert_eq!(detector.threshold, 5.0);
        assert_eq!(detector.cooldown_ms, 3000);
        assert_eq!(detector.calibration_samples, 200);
        assert_eq!(detector.buffer_size, 50);

        let calibrator = CalibratorConfig::default();
        assert_eq!(calibrator.filter_alpha, 0.8);
        assert_eq!(calibrator.hysteresis_ms2, 6.0);
        assert_eq!(calibrator.freeze_confidence, 60.0);

        assert_eq!(AnnotationConfig::default().window_ms, 10_000);
        assert_eq!(SchedulerConfig::default().tick_ms, 10);
    }

    #[test]
    fn test_blueprint_toml_round_trip() {
        let toml_src = r#"
[device]
model = "Pixel 8"
os_version = "Android 15"
app_version = "1.2.0"

[source]
kind = "mock"
accel_rate_hz = 90.0

[detector]
threshold = 4.5

[export]
path = "session.csv"
"#;
        let blueprint: SessionBlueprint = toml::from_str(toml_src).unwrap();
        assert_eq!(blueprint.detector.threshold, 4.5);
        assert_eq!(blueprint.detector.cooldown_ms, 3000);
        match &blueprint.source {
            SourceConfig::Mock(mock) => assert_eq!(mock.accel_rate_hz, 90.0),
            other => panic!("unexpected source: {other:?}"),
        }
    }
}
