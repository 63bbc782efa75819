//! Events that can occur in a conversation

use crate::language::LanguageTag;
use crate::speech::{AudioArtifact, SynthesisError};
use crate::translation::{TranslationError, TranslationResult};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Inbound events
    TextMessage {
        text: String,
    },
    Postback {
        data: String,
    },

    // Translation events
    TranslationComplete {
        result: TranslationResult,
    },
    TranslationFailed {
        error: TranslationError,
    },
    /// The result was written to the session store under `version`
    ResultStored {
        version: u64,
        result: TranslationResult,
    },

    // Synthesis events
    SynthesisComplete {
        artifact: AudioArtifact,
    },
    SynthesisFailed {
        language: LanguageTag,
        error: SynthesisError,
    },
}

impl Event {
    /// Whether this event comes from the user rather than a gateway
    pub fn is_inbound(&self) -> bool {
        matches!(self, Event::TextMessage { .. } | Event::Postback { .. })
    }
}
