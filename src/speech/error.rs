//! Speech synthesis error types

use thiserror::Error;

/// Synthesis could not complete
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Synthesis canceled ({reason}): {message}")]
pub struct SynthesisError {
    pub reason: CancellationReason,
    pub message: String,
}

impl SynthesisError {
    pub fn new(reason: CancellationReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(CancellationReason::Error, message)
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(CancellationReason::Quota, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(CancellationReason::Other, message)
    }

    /// Classify an HTTP error status returned by the speech service
    pub fn from_status(status: u16, message: &str) -> Self {
        match status {
            429 => Self::quota(format!("Too many requests: {message}")),
            401 | 403 => Self::error(format!("Authentication failed: {message}")),
            400 => Self::error(format!("Invalid SSML request: {message}")),
            500..=599 => Self::error(format!("Server error: {message}")),
            _ => Self::other(format!("HTTP {status}: {message}")),
        }
    }
}

/// Why synthesis was canceled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancellationReason {
    /// Service, transport, or local I/O error
    Error,
    /// Quota exhausted or throttled
    Quota,
    Other,
}

impl std::fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CancellationReason::Error => "error",
            CancellationReason::Quota => "quota",
            CancellationReason::Other => "other",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn throttling_is_quota() {
        assert_eq!(
            SynthesisError::from_status(429, "slow down").reason,
            CancellationReason::Quota
        );
        assert_eq!(
            SynthesisError::from_status(401, "bad key").reason,
            CancellationReason::Error
        );
        assert_eq!(SynthesisError::from_status(302, "moved").reason, CancellationReason::Other);
    }

    #[test]
    fn display_includes_reason() {
        let err = SynthesisError::quota("limit reached");
        assert_eq!(err.to_string(), "Synthesis canceled (quota): limit reached");
    }
}
