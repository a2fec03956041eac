//! Measured-rate statistics.
//!
//! Rates are computed from actual timestamps, never from nominal
//! configuration: `rate = 1000 / mean(inter-sample interval)`.

use contracts::Frame;

/// Frame production rate from the recorded elapsed timestamps (Hz)
pub fn frame_rate_hz(frames: &[Frame]) -> f64 {
    if frames.len() < 2 {
        return 0.0;
    }
    let first = frames[0].elapsed_ms;
    let last = frames[frames.len() - 1].elapsed_ms;
    if last <= first {
        return 0.0;
    }
    let mean_interval = (last - first) as f64 / (frames.len() - 1) as f64;
    1000.0 / mean_interval
}

/// Raw stream arrival rate over the session (Hz)
pub fn stream_rate_hz(arrivals: u64, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    arrivals as f64 * 1000.0 / duration_ms as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::Vector3;

    fn frame(elapsed_ms: u64) -> Frame {
        Frame::new(elapsed_ms, Vector3::new(0.0, 0.0, 9.8), 9.8, None, None)
    }

    #[test]
    fn test_frame_rate_from_actual_intervals() {
        // 11 frames over 100 ms -> mean interval 10 ms -> 100 Hz
        let frames: Vec<Frame> = (0..11).map(|i| frame(i * 10)).collect();
        assert!((frame_rate_hz(&frames) - 100.0).abs() < 1e-9);

        // Jittered grid still uses the measured mean, not the nominal rate
        let frames = vec![frame(0), frame(12), frame(22), frame(36)];
        let expected = 1000.0 / 12.0;
        assert!((frame_rate_hz(&frames) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(frame_rate_hz(&[]), 0.0);
        assert_eq!(frame_rate_hz(&[frame(0)]), 0.0);
        assert_eq!(frame_rate_hz(&[frame(5), frame(5)]), 0.0);
        assert_eq!(stream_rate_hz(100, 0), 0.0);
    }

    #[test]
    fn test_stream_rate() {
        assert!((stream_rate_hz(830, 10_000) - 83.0).abs() < 1e-9);
    }
}
