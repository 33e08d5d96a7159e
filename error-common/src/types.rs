use thiserror::Error;

/// Process-level errors raised while starting or running a Finbro binary
#[derive(Error, Debug)]
pub enum FinbroError {
    /// Network communication errors (binding, connecting)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server runtime errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Database connection or migration errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal system errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Finbro process-level operations
pub type Result<T> = std::result::Result<T, FinbroError>;

/// Log a process-level error with the context it occurred in
pub fn log_error(context: &str, error: &FinbroError) {
    tracing::error!(
        context = context,
        error = %error,
        "Finbro error occurred"
    );
}
