//! Unified error hierarchy for RoutePace
//!
//! Only two conditions are genuine faults of the pacing core: input that is too
//! short to describe a route, and parameters that make the physics meaningless.
//! Everything else (solver non-convergence, reserve overrides) is policy and
//! never surfaces here.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all RoutePace operations
#[derive(Debug, Error)]
pub enum RoutePaceError {
    /// Fewer than two track points, or an empty segment sequence
    #[error("Input too short: {what} has {count} entries, at least {required} required")]
    InputTooShort {
        what: String,
        count: usize,
        required: usize,
    },

    /// A rider, environment or segment parameter outside its physical range
    #[error("Non-physical parameter: {parameter}={value} ({reason})")]
    NonPhysicalParameter {
        parameter: String,
        value: f64,
        reason: String,
    },

    /// Track file import errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Track file import errors
#[derive(Debug, Error)]
pub enum ImportError {
    /// File not found at specified path
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No importer handles this file
    #[error("Unsupported format: {extension}")]
    UnsupportedFormat { extension: String },

    /// Format-specific parsing error
    #[error("Parse error in {format}: {reason}")]
    ParseError { format: String, reason: String },

    /// Missing a required column or element
    #[error("Missing required data: {field}")]
    MissingData { field: String },
}

/// Result type alias for RoutePace operations
pub type Result<T> = std::result::Result<T, RoutePaceError>;

impl RoutePaceError {
    pub(crate) fn input_too_short(what: &str, count: usize, required: usize) -> Self {
        RoutePaceError::InputTooShort {
            what: what.to_string(),
            count,
            required,
        }
    }

    pub(crate) fn non_physical(parameter: &str, value: f64, reason: &str) -> Self {
        RoutePaceError::NonPhysicalParameter {
            parameter: parameter.to_string(),
            value,
            reason: reason.to_string(),
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RoutePaceError::InputTooShort { .. } => ErrorSeverity::Warning,
            RoutePaceError::NonPhysicalParameter { .. } => ErrorSeverity::Warning,
            RoutePaceError::Import(ImportError::FileNotFound { .. }) => ErrorSeverity::Warning,
            RoutePaceError::Import(_) => ErrorSeverity::Error,
            RoutePaceError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            RoutePaceError::InputTooShort { what, count, .. } => format!(
                "The {} is too short to plan a ride ({} usable entries). Check that the track contains at least two distinct points.",
                what, count
            ),
            RoutePaceError::NonPhysicalParameter {
                parameter, value, ..
            } => format!(
                "Rider or route setting '{}' has an impossible value ({}). Please correct it and try again.",
                parameter, value
            ),
            RoutePaceError::Import(ImportError::FileNotFound { path }) => {
                format!("Could not find track file: {}", path.display())
            }
            RoutePaceError::Import(ImportError::UnsupportedFormat { extension }) => format!(
                "Track files of type '{}' are not supported. Use GPX or CSV.",
                extension
            ),
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents operation
    Error,
    /// Rejected input; the caller can correct and retry
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
