use crate::config::error::ConfigError;
use thiserror::Error;

/// Application-wide error type for the listing composer.
///
/// Transport, status and payload failures are kept apart so callers can
/// log them precisely, but the composer treats all three the same way: the
/// previously rendered page stays intact and the message is surfaced.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Facet or operation not allowed by the injected capabilities
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Network or transport failure before a response was received
    #[error("Request to {endpoint} failed: {message}")]
    Transport {
        endpoint: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Endpoint answered with a non-2xx status
    #[error("Endpoint {endpoint} returned HTTP {status}")]
    HttpStatus { endpoint: String, status: u16 },

    /// Payload was neither a JSON array nor a recognized envelope
    #[error("Malformed payload from {endpoint}: {message}")]
    MalformedPayload { endpoint: String, message: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error came from talking to the list endpoint.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            AppError::Transport { .. } | AppError::HttpStatus { .. } | AppError::MalformedPayload { .. }
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = match &error {
            ConfigError::ValidationError { field, .. } => field.clone(),
            _ => "settings".to_string(),
        };
        AppError::Configuration {
            key,
            source: error.into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, reason) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let reason = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "invalid value".to_string());
                (field.to_string(), reason)
            })
            .unwrap_or_else(|| ("request".to_string(), errors.to_string()));
        AppError::Validation { field, reason }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
