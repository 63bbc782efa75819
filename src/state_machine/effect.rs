//! Effects produced by state transitions

use crate::language::LanguageTag;
use crate::reply::ReplyPayload;
use crate::speech::SynthesisError;
use crate::translation::{Translation, TranslationError, TranslationResult};
use thiserror::Error;

/// Effects to be executed after state transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Call the translation gateway with normalized text
    RequestTranslation { text: String },

    /// Overwrite the conversation's stored result
    PersistResult { result: TranslationResult },

    /// Call the speech gateway for one entry
    RequestSynthesis { translation: Translation },

    /// Answer the inbound event
    Reply { payload: ReplyPayload },

    /// Log a failure that was turned into a degraded reply
    RecordFailure { failure: Failure },
}

impl Effect {
    pub fn reply(payload: ReplyPayload) -> Self {
        Effect::Reply { payload }
    }

    pub fn reply_text(text: impl Into<String>) -> Self {
        Effect::Reply {
            payload: ReplyPayload::text(text),
        }
    }

    pub fn record(failure: Failure) -> Self {
        Effect::RecordFailure { failure }
    }
}

/// Why an event could not be fulfilled as asked
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Failure {
    #[error("Translation failed: {0}")]
    Translation(TranslationError),
    #[error("Synthesis of {language} failed: {error}")]
    Synthesis {
        language: LanguageTag,
        error: SynthesisError,
    },
    #[error("No stored translation to resolve the postback against")]
    MissingSession,
    #[error("Postback against version {version}, which offered no choices")]
    NoChoicesOffered { version: u64 },
    #[error("Postback for version {token_version} but current version is {current_version}")]
    StaleAction {
        token_version: u64,
        current_version: u64,
    },
    #[error("Unrecognized postback data: {data}")]
    UnknownAction { data: String },
    #[error("Choice {choice} does not match the stored translation")]
    Unresolvable { choice: String },
}
