//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the executor with mock implementations.

use crate::language::LanguageTag;
use crate::reply::ReplyPayload;
use crate::speech::{AudioArtifact, SpeechService, SynthesisError};
use crate::translation::{TranslationError, TranslationResult, TranslationService};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Translation of normalized user text into the policy-selected languages
#[async_trait]
pub trait TranslationGateway: Send + Sync {
    async fn translate(&self, text: &str) -> Result<TranslationResult, TranslationError>;
}

/// Synthesis of one text into a publicly served audio file
#[async_trait]
pub trait SpeechGateway: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice: LanguageTag,
    ) -> Result<AudioArtifact, SynthesisError>;
}

/// Failure to deliver a reply to the messaging platform
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplyError {
    #[error("Reply request failed: {0}")]
    Transport(String),
    #[error("Reply rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Outbound side of the messaging platform
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Answer the inbound event identified by `reply_token`.
    ///
    /// Reply tokens are single use, so this is called once per event.
    async fn reply(&self, reply_token: &str, payload: &ReplyPayload) -> Result<(), ReplyError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: TranslationGateway + ?Sized> TranslationGateway for Arc<T> {
    async fn translate(&self, text: &str) -> Result<TranslationResult, TranslationError> {
        (**self).translate(text).await
    }
}

#[async_trait]
impl<T: SpeechGateway + ?Sized> SpeechGateway for Arc<T> {
    async fn synthesize(
        &self,
        text: &str,
        voice: LanguageTag,
    ) -> Result<AudioArtifact, SynthesisError> {
        (**self).synthesize(text, voice).await
    }
}

#[async_trait]
impl<T: ReplySink + ?Sized> ReplySink for Arc<T> {
    async fn reply(&self, reply_token: &str, payload: &ReplyPayload) -> Result<(), ReplyError> {
        (**self).reply(reply_token, payload).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl TranslationGateway for TranslationService {
    async fn translate(&self, text: &str) -> Result<TranslationResult, TranslationError> {
        TranslationService::translate(self, text).await
    }
}

#[async_trait]
impl SpeechGateway for SpeechService {
    async fn synthesize(
        &self,
        text: &str,
        voice: LanguageTag,
    ) -> Result<AudioArtifact, SynthesisError> {
        SpeechService::synthesize(self, text, voice).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_error_display() {
        let rejected = ReplyError::Rejected {
            status: 400,
            message: "Invalid reply token".to_string(),
        };
        assert_eq!(
            rejected.to_string(),
            "Reply rejected with status 400: Invalid reply token"
        );
        assert_eq!(
            ReplyError::Transport("connection refused".to_string()).to_string(),
            "Reply request failed: connection refused"
        );
    }
}
