//! Error types for shipreg-notify.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Usage Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Notification center has no current user")]
    NotInitialized,

    #[error("Notification center has been shut down")]
    Stopped,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // === Infrastructure Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the error code for log output and API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::Stopped => "STOPPED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Redis(_) => "REDIS_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error points at infrastructure rather than misuse.
    #[must_use]
    pub const fn is_infrastructure_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Redis(_) | Self::Config(_) | Self::Internal(_)
        )
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::NotInitialized.error_code(), "NOT_INITIALIZED");
        assert_eq!(AppError::Stopped.error_code(), "STOPPED");
        assert_eq!(
            AppError::Database("connection refused".to_string()).error_code(),
            "DATABASE_ERROR"
        );
    }

    #[test]
    fn test_infrastructure_classification() {
        assert!(AppError::Redis("timeout".to_string()).is_infrastructure_error());
        assert!(!AppError::NotInitialized.is_infrastructure_error());
        assert!(!AppError::Validation("empty title".to_string()).is_infrastructure_error());
    }
}
