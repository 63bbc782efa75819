//! Outbound reply content
//!
//! Channel-neutral description of what goes back to the user for one
//! inbound event. The messaging adapter renders it.

use crate::language::LanguageTag;

/// Route under which synthesized audio is publicly served
pub const AUDIO_ROUTE: &str = "/static";

// User-facing copy, in the bot's UI locale (Traditional Chinese)
pub const AUDIO_PROMPT: &str = "需要語音檔嗎？";
pub const BOTH_LABEL: &str = "兩種都要";
pub const TRANSLATION_UNAVAILABLE: &str = "抱歉，翻譯服務暫時無法使用，請稍後再試。";
pub const TRANSLATION_REJECTED: &str = "抱歉，這則訊息無法翻譯。";
pub const SESSION_MISSING: &str = "找不到可以轉成語音的翻譯，請先傳送一段文字。";
pub const STALE_CHOICE: &str = "這組選項已經過期，請使用最新翻譯下方的按鈕。";
pub const UNKNOWN_CHOICE: &str = "無法辨識這個選項，請重新選擇。";
pub const SYNTHESIS_FAILED: &str = "抱歉，語音檔產生失敗，請稍後再試。";
pub const SYNTHESIS_QUOTA: &str = "語音服務已達使用上限，請稍後再試。";

/// One outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyItem {
    Text { text: String },
    Audio { url: String, duration_ms: u64 },
}

impl ReplyItem {
    pub fn text(text: impl Into<String>) -> Self {
        ReplyItem::Text { text: text.into() }
    }

    pub fn audio(url: impl Into<String>, duration_ms: u64) -> Self {
        ReplyItem::Audio {
            url: url.into(),
            duration_ms,
        }
    }
}

/// A quick-reply button: human-readable label plus opaque action token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReplyChoice {
    pub label: String,
    pub token: String,
}

/// Everything sent back for one inbound event
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReplyPayload {
    pub items: Vec<ReplyItem>,
    /// Attached to the last item; empty means no quick reply
    pub quick_replies: Vec<QuickReplyChoice>,
}

impl ReplyPayload {
    pub fn new(items: Vec<ReplyItem>) -> Self {
        Self {
            items,
            quick_replies: Vec::new(),
        }
    }

    /// Single text message
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(vec![ReplyItem::text(text)])
    }

    pub fn with_quick_replies(mut self, choices: Vec<QuickReplyChoice>) -> Self {
        self.quick_replies = choices;
        self
    }

    pub fn texts(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| match item {
                ReplyItem::Text { text } => Some(text.as_str()),
                ReplyItem::Audio { .. } => None,
            })
            .collect()
    }

    pub fn audio_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, ReplyItem::Audio { .. }))
            .count()
    }
}

/// Public URL of an audio file served from the audio directory
pub fn audio_url(public_base_url: &str, file_name: &str) -> String {
    format!(
        "{}{AUDIO_ROUTE}/{file_name}",
        public_base_url.trim_end_matches('/')
    )
}

/// Notice listing the languages whose audio could not be produced
pub fn partial_synthesis_notice(failed: &[LanguageTag]) -> String {
    let labels: Vec<&str> = failed.iter().map(|tag| tag.label()).collect();
    format!("以下語音檔產生失敗：{}", labels.join("、"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_url_joins_without_double_slash() {
        assert_eq!(
            audio_url("https://bot.example.com/", "english-audio-1.wav"),
            "https://bot.example.com/static/english-audio-1.wav"
        );
        assert_eq!(
            audio_url("https://bot.example.com", "a.wav"),
            "https://bot.example.com/static/a.wav"
        );
    }

    #[test]
    fn payload_accessors() {
        let payload = ReplyPayload::new(vec![
            ReplyItem::text("Hello"),
            ReplyItem::audio("https://x/a.wav", 1200),
        ]);
        assert_eq!(payload.texts(), vec!["Hello"]);
        assert_eq!(payload.audio_count(), 1);
        assert!(payload.quick_replies.is_empty());
    }

    #[test]
    fn partial_notice_names_languages() {
        let notice = partial_synthesis_notice(&[LanguageTag::Ja]);
        assert!(notice.contains("日文"));
    }
}
