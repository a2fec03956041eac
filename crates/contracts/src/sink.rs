//! ReportSink trait - export output interface
//!
//! Defines the abstract interface for session export sinks.

use crate::{ContractError, SessionReport};

/// Session export trait
///
/// All export sink implementations must implement this trait. The sink borrows
/// the report, so a failed write leaves it intact for a retry or a fallback
/// location.
#[trait_variant::make(ReportSink: Send)]
pub trait LocalReportSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write the finished session
    ///
    /// # Errors
    /// Returns a write error with path context; the report is untouched.
    async fn write(&mut self, report: &SessionReport) -> Result<(), ContractError>;
}
