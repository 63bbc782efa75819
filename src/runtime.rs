//! Runtime for executing conversations
//!
//! Each inbound webhook event is driven through the state machine to
//! completion: state is derived from the session store, effects are
//! executed here, and exactly one reply is sent back.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{ConversationRuntime, RuntimeError};
pub use traits::*;

use crate::session::ConversationKey;

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = ConversationRuntime<
    std::sync::Arc<crate::translation::TranslationService>,
    std::sync::Arc<crate::speech::SpeechService>,
    std::sync::Arc<crate::line::LineClient>,
>;

/// What the user sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    Text(String),
    /// Opaque data attached to a quick-reply button
    Postback(String),
}

/// One user event, already authenticated and decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub conversation: ConversationKey,
    /// Single-use handle for answering this event
    pub reply_token: String,
    pub kind: InboundKind,
}

impl InboundEvent {
    pub fn text(
        conversation: ConversationKey,
        reply_token: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            conversation,
            reply_token: reply_token.into(),
            kind: InboundKind::Text(text.into()),
        }
    }

    pub fn postback(
        conversation: ConversationKey,
        reply_token: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            conversation,
            reply_token: reply_token.into(),
            kind: InboundKind::Postback(data.into()),
        }
    }
}
