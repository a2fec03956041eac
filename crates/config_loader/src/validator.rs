//! Configuration validation
//!
//! Validation rules:
//! - field ranges on scheduler/calibrator/detector tunables
//! - reestimate cadence must fit inside the calibration window
//! - mock source rates must be positive (gyro may be 0 = disabled)
//! - replay path and export path must be non-empty
//! - fallback path, when set, must differ from the primary

use contracts::{ContractError, SessionBlueprint, SourceConfig};
use validator::Validate;

/// Validate a SessionBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    validate_ranges(blueprint)?;
    validate_calibrator(blueprint)?;
    validate_source(blueprint)?;
    validate_export(blueprint)?;
    Ok(())
}

/// Run the derive-level range checks
fn validate_ranges(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    let checks: [(&str, Result<(), validator::ValidationErrors>); 4] = [
        ("scheduler", blueprint.scheduler.validate()),
        ("calibrator", blueprint.calibrator.validate()),
        ("detector", blueprint.detector.validate()),
        ("annotation", blueprint.annotation.validate()),
    ];

    for (section, result) in checks {
        if let Err(errors) = result {
            let detail = errors
                .field_errors()
                .into_iter()
                .map(|(field, errs)| format!("{field} ({} rule violations)", errs.len()))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ContractError::config_validation(
                section,
                format!("out-of-range field(s): {detail}"),
            ));
        }
    }
    Ok(())
}

/// Cross-field calibrator rules
fn validate_calibrator(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    let calibrator = &blueprint.calibrator;
    if calibrator.reestimate_every > calibrator.window_samples {
        return Err(ContractError::config_validation(
            "calibrator.reestimate_every",
            format!(
                "must be <= window_samples ({} > {})",
                calibrator.reestimate_every, calibrator.window_samples
            ),
        ));
    }
    Ok(())
}

/// Source rules
fn validate_source(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    match &blueprint.source {
        SourceConfig::Mock(mock) => {
            if mock.accel_rate_hz <= 0.0 {
                return Err(ContractError::config_validation(
                    "source.accel_rate_hz",
                    format!("must be > 0, got {}", mock.accel_rate_hz),
                ));
            }
            if mock.gyro_rate_hz < 0.0 {
                return Err(ContractError::config_validation(
                    "source.gyro_rate_hz",
                    "must be >= 0 (0 disables the gyroscope stream)",
                ));
            }
            if mock.noise_std < 0.0 {
                return Err(ContractError::config_validation(
                    "source.noise_std",
                    "must be >= 0",
                ));
            }
        }
        SourceConfig::Replay(replay) => {
            if replay.path.as_os_str().is_empty() {
                return Err(ContractError::config_validation(
                    "source.path",
                    "replay path must not be empty",
                ));
            }
            if replay.speed <= 0.0 {
                return Err(ContractError::config_validation(
                    "source.speed",
                    format!("must be > 0, got {}", replay.speed),
                ));
            }
        }
    }
    Ok(())
}

/// Export rules
fn validate_export(blueprint: &SessionBlueprint) -> Result<(), ContractError> {
    let export = &blueprint.export;
    if export.path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "export.path",
            "export path must not be empty",
        ));
    }
    if let Some(fallback) = &export.fallback_path {
        if fallback == &export.path {
            return Err(ContractError::config_validation(
                "export.fallback_path",
                "fallback path must differ from the primary path",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ExportConfig, MockSourceConfig, ReplaySourceConfig};

    fn minimal_blueprint() -> SessionBlueprint {
        SessionBlueprint {
            version: Default::default(),
            device: Default::default(),
            source: SourceConfig::Mock(MockSourceConfig::default()),
            scheduler: Default::default(),
            calibrator: Default::default(),
            detector: Default::default(),
            annotation: Default::default(),
            export: ExportConfig {
                path: "out/session.csv".into(),
                fallback_path: None,
            },
            metrics_port: None,
        }
    }

    #[test]
    fn test_valid_blueprint_passes() {
        assert!(validate(&minimal_blueprint()).is_ok());
    }

    #[test]
    fn test_threshold_out_of_range_fails() {
        let mut blueprint = minimal_blueprint();
        blueprint.detector.threshold = 0.5;
        let err = validate(&blueprint).unwrap_err();
        assert!(err.to_string().contains("threshold"));
    }

    #[test]
    fn test_reestimate_cadence_must_fit_window() {
        let mut blueprint = minimal_blueprint();
        blueprint.calibrator.reestimate_every = 500;
        assert!(validate(&blueprint).is_err());
    }

    #[test]
    fn test_empty_replay_path_fails() {
        let mut blueprint = minimal_blueprint();
        blueprint.source = SourceConfig::Replay(ReplaySourceConfig {
            path: "".into(),
            speed: 1.0,
        });
        assert!(validate(&blueprint).is_err());
    }

    #[test]
    fn test_fallback_must_differ() {
        let mut blueprint = minimal_blueprint();
        blueprint.export.fallback_path = Some("out/session.csv".into());
        assert!(validate(&blueprint).is_err());
    }

    #[test]
    fn test_zero_gyro_rate_is_allowed() {
        let mut blueprint = minimal_blueprint();
        blueprint.source = SourceConfig::Mock(MockSourceConfig {
            gyro_rate_hz: 0.0,
            ..MockSourceConfig::default()
        });
        assert!(validate(&blueprint).is_ok());
    }
}
