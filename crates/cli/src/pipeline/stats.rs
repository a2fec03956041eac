//! Pipeline statistics and metrics.

use std::path::PathBuf;
use std::time::Duration;

use observability::SessionMetricsAggregator;

/// Statistics from a session run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Frames recorded onto the 100 Hz grid
    pub frames: u64,

    /// Detection events surfaced to the operator
    pub detections: u64,

    /// Streams that never delivered a first sample
    pub degraded_streams: usize,

    /// Total duration of the run
    pub duration: Duration,

    /// Where the session was exported (None when nothing was recorded)
    pub export_path: Option<PathBuf>,

    /// Session metrics aggregator
    pub session_metrics: SessionMetricsAggregator,
}

impl PipelineStats {
    /// Calculate frames per second throughput
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Session Statistics ===\n");

        println!("Overview");
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Frames recorded: {}", self.frames);
        println!("  Frame rate: {:.2} Hz", self.fps());
        println!("  Detections: {}", self.detections);
        if self.degraded_streams > 0 {
            println!("  Degraded streams: {}", self.degraded_streams);
        }
        match &self.export_path {
            Some(path) => println!("  Exported to: {}", path.display()),
            None => println!("  Exported to: (nothing recorded)"),
        }

        println!();
        print!("{}", self.session_metrics.summary());
        println!();
    }
}
