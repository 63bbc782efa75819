//! LINE messaging adapter
//!
//! Authenticates webhook bodies, decodes them into [`InboundEvent`]s and
//! renders replies through the Messaging API.

mod messaging;
pub mod types;

pub use messaging::LineClient;

use crate::runtime::InboundEvent;
use crate::session::ConversationKey;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use types::{MessageContent, Source, WebhookBody, WebhookEvent};

/// Header carrying the base64 HMAC-SHA256 of the raw body
pub const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Missing {SIGNATURE_HEADER} header")]
    MissingSignature,
    #[error("Signature does not match body")]
    InvalidSignature,
    #[error("Malformed webhook body: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Verify the X-Line-Signature header using HMAC-SHA256.
pub fn verify_signature(channel_secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = base64::engine::general_purpose::STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(channel_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Webhook receiver bound to one channel secret
#[derive(Clone)]
pub struct LineWebhook {
    channel_secret: String,
}

impl LineWebhook {
    pub fn new(channel_secret: impl Into<String>) -> Self {
        Self {
            channel_secret: channel_secret.into(),
        }
    }

    /// Check the signature, then decode the events the bot handles
    pub fn authenticate(
        &self,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<Vec<InboundEvent>, WebhookError> {
        let signature = signature.ok_or(WebhookError::MissingSignature)?;
        if !verify_signature(&self.channel_secret, body, signature) {
            return Err(WebhookError::InvalidSignature);
        }
        parse_webhook(body)
    }
}

/// Decode a webhook body into inbound events, in delivery order.
///
/// Non-text messages, non-message/postback events and events without a
/// reply token or source are skipped.
pub fn parse_webhook(body: &[u8]) -> Result<Vec<InboundEvent>, WebhookError> {
    let body: WebhookBody = serde_json::from_slice(body)?;
    if let Some(destination) = &body.destination {
        tracing::debug!(destination = %destination, events = body.events.len(), "Webhook received");
    }

    let mut inbound = Vec::with_capacity(body.events.len());
    for event in body.events {
        match event {
            WebhookEvent::Message(message) => {
                let MessageContent::Text { text } = message.message else {
                    tracing::debug!("Skipping non-text message");
                    continue;
                };
                let Some((conversation, reply_token)) =
                    addressable(message.source, message.reply_token)
                else {
                    continue;
                };
                inbound.push(InboundEvent::text(conversation, reply_token, text));
            }
            WebhookEvent::Postback(postback) => {
                let Some((conversation, reply_token)) =
                    addressable(postback.source, postback.reply_token)
                else {
                    continue;
                };
                inbound.push(InboundEvent::postback(
                    conversation,
                    reply_token,
                    postback.postback.data,
                ));
            }
            WebhookEvent::Other => {
                tracing::debug!("Skipping unsupported webhook event");
            }
        }
    }

    Ok(inbound)
}

impl Source {
    pub fn conversation_key(&self) -> ConversationKey {
        match self {
            Source::User { user_id } => ConversationKey::user(user_id),
            Source::Group { group_id } => ConversationKey::group(group_id),
            Source::Room { room_id } => ConversationKey::room(room_id),
        }
    }
}

fn addressable(
    source: Option<Source>,
    reply_token: Option<String>,
) -> Option<(ConversationKey, String)> {
    match (source, reply_token) {
        (Some(source), Some(token)) if !token.is_empty() => {
            Some((source.conversation_key(), token))
        }
        _ => {
            tracing::warn!("Skipping event without source or reply token");
            None
        }
    }
}
