use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Sitework operations.
#[derive(Debug, Error, Diagnostic)]
pub enum SiteworkError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A command was rejected before any state changed (bad dates, bad
    /// predecessor, unknown scope).
    #[error("Validation failed: {message}")]
    #[diagnostic(help("Fix the command input and try again"))]
    Validation { message: String },

    /// A referenced unit does not exist.
    #[error("Unit not found: {unit}")]
    NotFound { unit: String },

    /// Stored schedule data violates a structural invariant (cycle, runaway
    /// cascade). Updates applied before detection stay in place.
    #[error("Data integrity error at unit {unit}: {message}")]
    #[diagnostic(help("Re-fetch the project and inspect the predecessor chain of this unit"))]
    DataIntegrity { unit: String, message: String },

    /// A store write failed partway through a command.
    #[error("Failed to persist unit {unit}: {message}")]
    #[diagnostic(help(
        "Try again; the remaining writes are idempotent and can be safely retried"
    ))]
    Persistence {
        unit: String,
        message: String,
        /// Units written successfully before the failure.
        applied: Vec<String>,
        /// Units that were not written (the failed unit first).
        remaining: Vec<String>,
    },

    /// Global configuration could not be read or parsed.
    #[error("Config error: {message}")]
    Config { message: String },

    /// A project snapshot file could not be read or parsed.
    #[error("Snapshot error: {message}")]
    #[diagnostic(help("Check the project file for syntax errors"))]
    Snapshot { message: String },
}

impl SiteworkError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(unit: impl Into<String>) -> Self {
        Self::NotFound { unit: unit.into() }
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type SiteworkResult<T> = miette::Result<T>;
