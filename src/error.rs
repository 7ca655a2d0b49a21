//! Error types for fixture registration and activation.

use thiserror::Error;

/// Errors that can occur while registering, activating or serving fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// A registration call received an unusable combination of arguments.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A fixture was not registered, or was never activated on a manager.
    #[error("{entity_type} '{name}' not found: {hint}")]
    NotFound {
        entity_type: &'static str,
        name: String,
        hint: String,
    },

    /// Reading a fixture file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A URL regex could not be compiled.
    #[error("Invalid URL pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A raw HTTP response capture could not be parsed.
    #[error("Invalid raw response: {0}")]
    InvalidResponse(String),

    /// A manager slot holds a substituted value instead of a stub.
    #[error("Fixture '{0}' holds a substituted value, not a stub")]
    NotAStub(String),

    /// Configuration from the environment is unusable.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// HTTP client construction error.
    #[cfg(feature = "mock-server")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl FixtureError {
    /// Whether this is a [`FixtureError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type alias for fixture operations.
pub type Result<T> = core::result::Result<T, FixtureError>;
