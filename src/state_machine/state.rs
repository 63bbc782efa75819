//! Conversation state types

use crate::language::LanguageTag;
use crate::session::{ConversationKey, StoredTranslation};
use crate::speech::{AudioArtifact, CancellationReason};
use crate::translation::{Translation, TranslationResult};

/// Conversation state
///
/// Only the stored translation outlives an inbound event; every run starts
/// from the state derived from it (see [`ConvState::from_session`]).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConvState {
    /// No audio choice pending
    #[default]
    Idle,

    /// Text received, translation in flight or being stored
    Translating,

    /// A single-entry result is stored; there is nothing to choose from
    NoChoices { version: u64 },

    /// A multi-entry result exists and quick-reply choices were offered
    AwaitingAudioChoice {
        version: u64,
        result: TranslationResult,
    },

    /// Synthesizing the chosen entries one at a time
    Synthesizing {
        version: u64,
        /// Language currently being synthesized
        current: LanguageTag,
        /// Entries still to synthesize after the current one
        pending: Vec<Translation>,
        completed: Vec<AudioArtifact>,
        failed: Vec<(LanguageTag, CancellationReason)>,
    },
}

impl ConvState {
    /// Starting state for an event, derived from the stored translation
    pub fn from_session(stored: Option<&StoredTranslation>) -> Self {
        match stored {
            Some(stored) if stored.result.offers_choices() => ConvState::AwaitingAudioChoice {
                version: stored.version,
                result: stored.result.clone(),
            },
            Some(stored) => ConvState::NoChoices {
                version: stored.version,
            },
            None => ConvState::Idle,
        }
    }

    /// Whether a gateway call is in progress
    pub fn is_busy(&self) -> bool {
        matches!(self, ConvState::Translating | ConvState::Synthesizing { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConvState::Idle => "idle",
            ConvState::Translating => "translating",
            ConvState::NoChoices { .. } => "no_choices",
            ConvState::AwaitingAudioChoice { .. } => "awaiting_audio_choice",
            ConvState::Synthesizing { .. } => "synthesizing",
        }
    }
}

/// Context for a conversation (immutable for the run)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub conversation: ConversationKey,
    /// Base of the public URLs audio links are built from
    pub public_base_url: String,
}

impl ConvContext {
    pub fn new(conversation: ConversationKey, public_base_url: impl Into<String>) -> Self {
        Self {
            conversation,
            public_base_url: public_base_url.into(),
        }
    }
}
