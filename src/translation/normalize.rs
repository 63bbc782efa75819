//! Input normalization before translation
//!
//! Emoji carry no translatable content and confuse language detection on
//! short messages, so they are removed before the text is sent out.

use regex::Regex;
use std::sync::LazyLock;

static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\p{Extended_Pictographic}\p{Emoji_Modifier}\p{Regional_Indicator}\u{FE0E}\u{FE0F}\u{200D}\u{20E3}]",
    )
    .expect("emoji pattern is valid")
});

/// Strip emoji (including modifiers, joiners and keycaps) and trim the result.
pub fn strip_emoji(text: &str) -> String {
    let stripped = EMOJI.replace_all(text, "");
    stripped.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(strip_emoji("你好，世界"), "你好，世界");
        assert_eq!(strip_emoji("Hello 123 #tag"), "Hello 123 #tag");
    }

    #[test]
    fn removes_pictographs() {
        assert_eq!(strip_emoji("Hello 😀"), "Hello");
        assert_eq!(strip_emoji("🎉🎉 早安 ☀️"), "早安");
    }

    #[test]
    fn removes_joined_sequences_and_modifiers() {
        // family (ZWJ sequence), thumbs up with skin tone, flag
        assert_eq!(strip_emoji("a👨‍👩‍👧b👍🏽c🇯🇵d"), "abcd");
    }

    #[test]
    fn emoji_only_becomes_empty() {
        assert_eq!(strip_emoji("😀😀"), "");
        assert_eq!(strip_emoji(""), "");
    }
}
