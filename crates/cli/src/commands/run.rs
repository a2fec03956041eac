//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::info;

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(threshold) = args.threshold {
        info!(threshold, "Overriding detection threshold from CLI");
        blueprint.detector.threshold = threshold;
    }

    info!(
        device = %blueprint.device.model,
        threshold = blueprint.detector.threshold,
        export = %blueprint.export.path.display(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        super::info::print_config_summary(&blueprint, false);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        duration: if args.duration == 0 {
            None
        } else {
            Some(Duration::from_secs(args.duration))
        },
        respond: args.respond,
        prompt_timeout: Duration::from_secs(args.prompt_timeout.max(1)),
        metrics_port: if args.metrics_port != 0 {
            Some(args.metrics_port)
        } else {
            blueprint.metrics_port
        },
        blueprint,
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    info!("Starting session...");
    let stats = pipeline.run().await.context("Session execution failed")?;

    info!(
        frames = stats.frames,
        detections = stats.detections,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Session completed successfully"
    );

    // Print detailed statistics
    stats.print_summary();

    info!("RoadSense finished");
    Ok(())
}
