//! Layered error definitions
//!
//! Categorized by source: config / source / session / export

use thiserror::Error;

use crate::SensorKind;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Sensor Source Errors =====
    /// Source setup or delivery error
    #[error("sensor source '{kind:?}' error: {message}")]
    Source { kind: SensorKind, message: String },

    // ===== Session Errors =====
    /// A session is already recording
    #[error("a session is already active (started at {started_at})")]
    AlreadyRecording { started_at: String },

    /// The sampling scheduler task failed
    #[error("sampling scheduler fault: {message}")]
    Scheduler { message: String },

    // ===== Export Errors =====
    /// Export write error; the in-memory report is retained by the caller
    #[error("export to '{path}' failed: {message}")]
    ExportWrite { path: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sensor source error
    pub fn source(kind: SensorKind, message: impl Into<String>) -> Self {
        Self::Source {
            kind,
            message: message.into(),
        }
    }

    /// Create export write error
    pub fn export_write(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExportWrite {
            path: path.into(),
            message: message.into(),
        }
    }
}
