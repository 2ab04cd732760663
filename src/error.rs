//! Error types for the telemetry pipeline boundaries.
//!
//! The decoding core (frame synchronisation, sentence decoding, orientation
//! fusion) never fails: malformed input degrades to resynchronisation, a
//! rejected sentence or a skipped filter update. Errors in this module only
//! appear where the pipeline meets the outside world: configuration files,
//! replay logs and event providers.
//!
//! ## Error Categories
//!
//! - **Source Errors**: A transport or provider stopped delivering events
//! - **File Errors**: Problems reading configuration or replay files
//! - **Parse Errors**: Configuration or replay log content is malformed
//! - **Config Errors**: A configuration value is out of range
//! - **Channel Errors**: An internal channel closed unexpectedly
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use navfusion::TelemetryError;
//!
//! let error = TelemetryError::source_failed("serial port unplugged");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Main error type for pipeline boundary operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Telemetry source failed: {reason}")]
    Source {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Invalid configuration for '{field}': {reason}")]
    Config { field: String, reason: String },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Channel '{channel}' closed")]
    ChannelClosed { channel: String },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Source { .. } => true,
            TelemetryError::Timeout { .. } => true,
            TelemetryError::File { .. } => false,
            TelemetryError::Parse { .. } => false,
            TelemetryError::Config { .. } => false,
            TelemetryError::ChannelClosed { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::Source { .. } => vec![
                "Check the receiver and sensor connections",
                "Verify the serial link baud rate matches the receiver",
                "Restart the transport collaborator",
            ],
            TelemetryError::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            TelemetryError::Parse { .. } => vec![
                "Check the YAML syntax of the file",
                "Compare field names against the documented layout",
            ],
            TelemetryError::Config { .. } => vec![
                "Use a finite, positive value for rates and intervals",
                "Remove the field to fall back to its default",
            ],
            TelemetryError::Timeout { .. } => vec![
                "Increase timeout duration",
                "Verify the source is producing events",
            ],
            TelemetryError::ChannelClosed { .. } => vec![
                "Keep the connection alive while handles are in use",
                "Re-attach a new connection",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }

    /// Helper constructor for source failures.
    pub fn source_failed(reason: impl Into<String>) -> Self {
        TelemetryError::Source { reason: reason.into(), source: None }
    }

    /// Helper constructor for source failures with an underlying cause.
    pub fn source_failed_with(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Source { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for parse errors.
    pub fn parse_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TelemetryError::Config { field: field.into(), reason: reason.into() }
    }

    /// Helper constructor for closed channel errors.
    pub fn channel_closed(channel: impl Into<String>) -> Self {
        TelemetryError::ChannelClosed { channel: channel.into() }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
