//! Reply API client

use super::types::{LineErrorResponse, LineMessage, QuickReply, QuickReplyItem, ReplyRequest};
use crate::reply::{ReplyItem, ReplyPayload};
use crate::runtime::{ReplyError, ReplySink};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const REPLY_URL: &str = "https://api.line.me/v2/bot/message/reply";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Messages accepted in one reply
pub const MAX_MESSAGES: usize = 5;
/// Characters accepted in one text message
pub const MAX_TEXT_CHARS: usize = 5000;
/// Quick-reply buttons accepted on one message
pub const MAX_QUICK_REPLIES: usize = 13;

/// Messaging API client answering webhook events
pub struct LineClient {
    client: Client,
    channel_access_token: String,
    reply_url: String,
}

impl LineClient {
    pub fn new(channel_access_token: impl Into<String>) -> Result<Self, ReplyError> {
        Self::with_reply_url(channel_access_token, REPLY_URL)
    }

    /// Client posting to a non-default reply endpoint
    pub fn with_reply_url(
        channel_access_token: impl Into<String>,
        reply_url: impl Into<String>,
    ) -> Result<Self, ReplyError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ReplyError::Transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            channel_access_token: channel_access_token.into(),
            reply_url: reply_url.into(),
        })
    }
}

/// Render a reply payload into Messaging API messages.
///
/// Quick replies go on the last message. Blank texts are dropped since
/// the API rejects them. Payloads longer than [`MAX_MESSAGES`] keep their
/// leading items plus the last one.
pub fn render_messages(payload: &ReplyPayload) -> Vec<LineMessage> {
    let mut items: Vec<&ReplyItem> = payload
        .items
        .iter()
        .filter(|item| !matches!(item, ReplyItem::Text { text } if text.trim().is_empty()))
        .collect();
    if items.len() > MAX_MESSAGES {
        tracing::warn!(
            items = items.len(),
            max = MAX_MESSAGES,
            "Reply exceeds message limit, dropping middle items"
        );
        let last = items.remove(items.len() - 1);
        items.truncate(MAX_MESSAGES - 1);
        items.push(last);
    }

    let quick_reply = (!payload.quick_replies.is_empty()).then(|| {
        if payload.quick_replies.len() > MAX_QUICK_REPLIES {
            tracing::warn!(
                choices = payload.quick_replies.len(),
                "Too many quick replies, truncating"
            );
        }
        QuickReply {
            items: payload
                .quick_replies
                .iter()
                .take(MAX_QUICK_REPLIES)
                .map(|choice| QuickReplyItem::postback(&choice.label, &choice.token))
                .collect(),
        }
    });

    let count = items.len();
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let quick_reply = if i + 1 == count {
                quick_reply.clone()
            } else {
                None
            };
            match item {
                ReplyItem::Text { text } => LineMessage::Text {
                    text: truncate_text(text),
                    quick_reply,
                },
                ReplyItem::Audio { url, duration_ms } => LineMessage::Audio {
                    original_content_url: url.clone(),
                    duration: *duration_ms,
                    quick_reply,
                },
            }
        })
        .collect()
}

fn truncate_text(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_CHARS {
        return text.to_string();
    }
    tracing::warn!(max = MAX_TEXT_CHARS, "Truncating long text message");
    text.chars().take(MAX_TEXT_CHARS).collect()
}

#[async_trait]
impl ReplySink for LineClient {
    async fn reply(&self, reply_token: &str, payload: &ReplyPayload) -> Result<(), ReplyError> {
        let request = ReplyRequest {
            reply_token,
            messages: render_messages(payload),
        };

        let response = self
            .client
            .post(&self.reply_url)
            .bearer_auth(&self.channel_access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| ReplyError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<LineErrorResponse>(&body) {
            Ok(error) if error.details.is_empty() => error.message,
            Ok(error) => {
                let details: Vec<String> = error
                    .details
                    .iter()
                    .map(|d| format!("{}: {}", d.property, d.message))
                    .collect();
                format!("{} ({})", error.message, details.join("; "))
            }
            Err(_) => body,
        };
        Err(ReplyError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
