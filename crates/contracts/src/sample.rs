//! RawSample - Ingestion input
//!
//! One irregular-rate sample as delivered by a device sensor stream.

use serde::{Deserialize, Serialize};

/// 3D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Sensor stream kind
///
/// Each kind is an independent push stream with its own platform-controlled rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// Accelerometer (m/s²) - mandatory, drives frame production
    Accelerometer,
    /// Gyroscope (rad/s) - optional
    Gyroscope,
    /// GPS fix - optional, independently clocked
    Gps,
}

/// Raw sensor sample
///
/// Delivered by a `SensorSource` callback. "Latest wins": only the most recent
/// sample per kind is ever consumed, there is no queue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawSample {
    /// Stream kind
    pub kind: SensorKind,

    /// Sample vector: accel in m/s², gyro in rad/s. For GPS, `x` = latitude
    /// and `y` = longitude in degrees, `z` = altitude in meters.
    pub vector: Vector3,

    /// Source arrival time (seconds since the source started, f64)
    pub timestamp: f64,
}

impl RawSample {
    pub fn accelerometer(vector: Vector3, timestamp: f64) -> Self {
        Self {
            kind: SensorKind::Accelerometer,
            vector,
            timestamp,
        }
    }

    pub fn gyroscope(vector: Vector3, timestamp: f64) -> Self {
        Self {
            kind: SensorKind::Gyroscope,
            vector,
            timestamp,
        }
    }

    pub fn gps(latitude: f64, longitude: f64, altitude: f64, timestamp: f64) -> Self {
        Self {
            kind: SensorKind::Gps,
            vector: Vector3::new(latitude, longitude, altitude),
            timestamp,
        }
    }
}

/// GPS fix carried on a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    /// Latitude (degrees)
    pub latitude: f64,

    /// Longitude (degrees)
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude() {
        let v = Vector3::new(1.0, 2.0, 3.0);
        assert!((v.magnitude() - 14.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_sample_constructors() {
        let s = RawSample::accelerometer(Vector3::new(0.0, 0.0, 9.81), 0.5);
        assert_eq!(s.kind, SensorKind::Accelerometer);
        assert_eq!(s.timestamp, 0.5);

        let g = RawSample::gps(40.0, -74.0, 10.0, 1.0);
        assert_eq!(g.kind, SensorKind::Gps);
        assert_eq!(g.vector.x, 40.0);
    }
}
