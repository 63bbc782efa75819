//! LINE Messaging API wire types

use serde::{Deserialize, Serialize};

// ============================================================================
// Webhook (inbound)
// ============================================================================

/// Body of a webhook request
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    Postback(PostbackEvent),
    /// Follow, join, unsend, and everything else the bot ignores
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub reply_token: Option<String>,
    pub source: Option<Source>,
    pub message: MessageContent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostbackEvent {
    pub reply_token: Option<String>,
    pub source: Option<Source>,
    pub postback: PostbackContent,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text { text: String },
    /// Stickers, images, audio, location...
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct PostbackContent {
    pub data: String,
}

/// Where an event came from
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    User {
        #[serde(rename = "userId")]
        user_id: String,
    },
    Group {
        #[serde(rename = "groupId")]
        group_id: String,
    },
    Room {
        #[serde(rename = "roomId")]
        room_id: String,
    },
}

// ============================================================================
// Reply API (outbound)
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest<'a> {
    pub reply_token: &'a str,
    pub messages: Vec<LineMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LineMessage {
    Text {
        text: String,
        #[serde(rename = "quickReply", skip_serializing_if = "Option::is_none")]
        quick_reply: Option<QuickReply>,
    },
    Audio {
        #[serde(rename = "originalContentUrl")]
        original_content_url: String,
        /// Milliseconds
        duration: u64,
        #[serde(rename = "quickReply", skip_serializing_if = "Option::is_none")]
        quick_reply: Option<QuickReply>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickReply {
    pub items: Vec<QuickReplyItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickReplyItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub action: PostbackAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostbackAction {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub label: String,
    pub data: String,
    /// Shown in the chat as the user's message when tapped
    #[serde(rename = "displayText")]
    pub display_text: String,
}

impl QuickReplyItem {
    pub fn postback(label: impl Into<String>, data: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            kind: "action",
            action: PostbackAction {
                kind: "postback",
                display_text: label.clone(),
                label,
                data: data.into(),
            },
        }
    }
}

/// Error body returned by the Messaging API
#[derive(Debug, Deserialize)]
pub struct LineErrorResponse {
    pub message: String,
    #[serde(default)]
    pub details: Vec<LineErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct LineErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub property: String,
}
