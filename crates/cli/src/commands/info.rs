//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    device: DeviceInfoOut,
    source: SourceInfo,
    scheduler_tick_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    detector: Option<DetectorInfo>,
    export: ExportInfo,
}

#[derive(Serialize)]
struct DeviceInfoOut {
    model: String,
    os_version: String,
    app_version: String,
}

#[derive(Serialize)]
struct SourceInfo {
    kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    accel_rate_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gyro_rate_hz: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    replay_path: Option<String>,
}

#[derive(Serialize)]
struct DetectorInfo {
    threshold: f64,
    cooldown_ms: u64,
    calibration_samples: usize,
    buffer_size: usize,
}

#[derive(Serialize)]
struct ExportInfo {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback_path: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_summary(&blueprint, args.detector);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::SessionBlueprint, args: &InfoArgs) -> ConfigInfo {
    let source = match &blueprint.source {
        contracts::SourceConfig::Mock(mock) => SourceInfo {
            kind: "mock".to_string(),
            accel_rate_hz: Some(mock.accel_rate_hz),
            gyro_rate_hz: Some(mock.gyro_rate_hz),
            replay_path: None,
        },
        contracts::SourceConfig::Replay(replay) => SourceInfo {
            kind: "replay".to_string(),
            accel_rate_hz: None,
            gyro_rate_hz: None,
            replay_path: Some(replay.path.display().to_string()),
        },
    };

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        device: DeviceInfoOut {
            model: blueprint.device.model.clone(),
            os_version: blueprint.device.os_version.clone(),
            app_version: blueprint.device.app_version.clone(),
        },
        source,
        scheduler_tick_ms: blueprint.scheduler.tick_ms,
        detector: args.detector.then(|| DetectorInfo {
            threshold: blueprint.detector.threshold,
            cooldown_ms: blueprint.detector.cooldown_ms,
            calibration_samples: blueprint.detector.calibration_samples,
            buffer_size: blueprint.detector.buffer_size,
        }),
        export: ExportInfo {
            path: blueprint.export.path.display().to_string(),
            fallback_path: blueprint
                .export
                .fallback_path
                .as_ref()
                .map(|p| p.display().to_string()),
        },
    }
}

/// Print a human-readable configuration summary
pub fn print_config_summary(blueprint: &contracts::SessionBlueprint, with_detector: bool) {
    println!("\n=== Configuration Summary ===\n");
    println!("Device:");
    println!("  Model: {}", blueprint.device.model);
    println!("  OS: {}", blueprint.device.os_version);
    println!("  App: {}", blueprint.device.app_version);

    println!("\nSource:");
    match &blueprint.source {
        contracts::SourceConfig::Mock(mock) => {
            println!("  Kind: mock");
            println!("  Accel rate: {} Hz", mock.accel_rate_hz);
            println!("  Gyro rate: {} Hz", mock.gyro_rate_hz);
            println!("  Scripted bumps: {}", mock.bumps.len());
        }
        contracts::SourceConfig::Replay(replay) => {
            println!("  Kind: replay");
            println!("  Path: {}", replay.path.display());
            println!("  Speed: {}x", replay.speed);
        }
    }

    println!("\nSampling:");
    println!(
        "  Grid: {} ms tick ({:.0} Hz)",
        blueprint.scheduler.tick_ms,
        1000.0 / blueprint.scheduler.tick_ms as f64
    );

    if with_detector {
        println!("\nDetector:");
        println!("  Threshold: {} m/s²", blueprint.detector.threshold);
        println!("  Cooldown: {} ms", blueprint.detector.cooldown_ms);
        println!(
            "  Calibration: {} samples",
            blueprint.detector.calibration_samples
        );
        println!("  Rolling buffer: {} samples", blueprint.detector.buffer_size);
    }

    println!("\nExport:");
    println!("  Path: {}", blueprint.export.path.display());
    if let Some(fallback) = &blueprint.export.fallback_path {
        println!("  Fallback: {}", fallback.display());
    }

    println!();
}
