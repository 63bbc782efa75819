//! Translation error types

use thiserror::Error;

/// Translation failure with classification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TranslationError {
    pub kind: TranslationErrorKind,
    pub message: String,
}

impl TranslationError {
    pub fn new(kind: TranslationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(TranslationErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(TranslationErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(TranslationErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(TranslationErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(TranslationErrorKind::InvalidRequest, message)
    }

    pub fn missing_target(message: impl Into<String>) -> Self {
        Self::new(TranslationErrorKind::MissingTarget, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(TranslationErrorKind::Unknown, message)
    }

    /// Classify an HTTP error status returned by the translation service
    pub fn from_status(status: u16, message: &str) -> Self {
        match status {
            401 | 403 => Self::auth(format!("Authentication failed: {message}")),
            429 => Self::rate_limit(format!("Quota exceeded: {message}")),
            400 => Self::invalid_request(format!("Invalid request: {message}")),
            500..=599 => Self::server_error(format!("Server error: {message}")),
            _ => Self::unknown(format!("HTTP {status}: {message}")),
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationErrorKind {
    /// Network issues, timeouts
    Network,
    /// Quota or rate limit (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request (400), e.g. empty text
    InvalidRequest,
    /// The service answered without a translation we asked for
    MissingTarget,
    Unknown,
}

impl TranslationErrorKind {
    /// Transient failures worth telling the user to retry later
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}
