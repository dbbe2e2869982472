//! Core error type shared across the workspace.

/// Error type for domain validation and configuration failures.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A value failed domain validation.
    #[error("{0}")]
    Validation(String),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
