//! Supported language tags
//!
//! The set is fixed: every tag knows its wire code, the synthesis voice
//! used for it, and how it is labelled in quick-reply choices.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A language the bot can translate into or synthesize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LanguageTag {
    #[serde(rename = "zh-Hant")]
    ZhHant,
    #[serde(rename = "zh-Hans")]
    ZhHans,
    #[serde(rename = "en")]
    En,
    #[serde(rename = "ja")]
    Ja,
}

impl LanguageTag {
    pub const ALL: [LanguageTag; 4] = [
        LanguageTag::ZhHant,
        LanguageTag::ZhHans,
        LanguageTag::En,
        LanguageTag::Ja,
    ];

    /// Code used by the translation API and inside action tokens
    pub fn code(self) -> &'static str {
        match self {
            LanguageTag::ZhHant => "zh-Hant",
            LanguageTag::ZhHans => "zh-Hans",
            LanguageTag::En => "en",
            LanguageTag::Ja => "ja",
        }
    }

    /// Look up a tag by its code (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.code().eq_ignore_ascii_case(code))
    }

    /// Neural voice used when synthesizing this language
    pub fn voice_name(self) -> &'static str {
        match self {
            LanguageTag::ZhHant => "zh-TW-HsiaoChenNeural",
            LanguageTag::ZhHans => "zh-CN-XiaoxiaoNeural",
            LanguageTag::En => "en-US-JennyNeural",
            LanguageTag::Ja => "ja-JP-NanamiNeural",
        }
    }

    /// BCP-47 locale of the voice, for the SSML `xml:lang` attribute
    pub fn voice_locale(self) -> &'static str {
        match self {
            LanguageTag::ZhHant => "zh-TW",
            LanguageTag::ZhHans => "zh-CN",
            LanguageTag::En => "en-US",
            LanguageTag::Ja => "ja-JP",
        }
    }

    /// Quick-reply label, in the bot's UI locale
    pub fn label(self) -> &'static str {
        match self {
            LanguageTag::ZhHant => "繁體中文",
            LanguageTag::ZhHans => "简体中文",
            LanguageTag::En => "英文",
            LanguageTag::Ja => "日文",
        }
    }

    /// Canonical stem of synthesized audio file names
    pub fn audio_stem(self) -> &'static str {
        match self {
            LanguageTag::ZhHant => "chinese-traditional-audio",
            LanguageTag::ZhHans => "chinese-simplified-audio",
            LanguageTag::En => "english-audio",
            LanguageTag::Ja => "japanese-audio",
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unsupported language tag: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for LanguageTag {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s.trim()).ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// Parse a comma-separated list of tags, preserving order and dropping duplicates
pub fn parse_tag_list(raw: &str) -> Result<Vec<LanguageTag>, UnknownLanguage> {
    let mut tags = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let tag: LanguageTag = part.parse()?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_lookup() {
        for tag in LanguageTag::ALL {
            assert_eq!(LanguageTag::from_code(tag.code()), Some(tag));
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(LanguageTag::from_code("ZH-hant"), Some(LanguageTag::ZhHant));
        assert_eq!(LanguageTag::from_code("fr"), None);
    }

    #[test]
    fn serde_uses_wire_codes() {
        let json = serde_json::to_string(&LanguageTag::ZhHant).unwrap();
        assert_eq!(json, "\"zh-Hant\"");
        let tag: LanguageTag = serde_json::from_str("\"ja\"").unwrap();
        assert_eq!(tag, LanguageTag::Ja);
    }

    #[test]
    fn tag_list_keeps_order_and_dedups() {
        let tags = parse_tag_list(" ja, en ,ja,").unwrap();
        assert_eq!(tags, vec![LanguageTag::Ja, LanguageTag::En]);
    }

    #[test]
    fn tag_list_rejects_unknown() {
        assert_eq!(
            parse_tag_list("en,klingon"),
            Err(UnknownLanguage("klingon".to_string()))
        );
    }
}
