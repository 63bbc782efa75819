//! Audio-choice action tokens
//!
//! Quick-reply buttons carry a token `audio:<choice>:<version>`. The choice
//! is looked up in a fixed table (every language code, plus `both`); the
//! version ties the token to the stored result it was offered for.

use crate::language::LanguageTag;
use crate::reply::{QuickReplyChoice, BOTH_LABEL};
use crate::translation::{Translation, TranslationResult};
use std::fmt;
use thiserror::Error;

const TOKEN_PREFIX: &str = "audio";
const BOTH_CODE: &str = "both";

/// Which translation(s) to synthesize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioChoice {
    Single(LanguageTag),
    /// Both entries of a two-target result
    Both,
}

impl AudioChoice {
    /// Every choice a token can name
    pub fn table() -> impl Iterator<Item = AudioChoice> {
        LanguageTag::ALL
            .into_iter()
            .map(AudioChoice::Single)
            .chain(std::iter::once(AudioChoice::Both))
    }

    pub fn code(self) -> &'static str {
        match self {
            AudioChoice::Single(tag) => tag.code(),
            AudioChoice::Both => BOTH_CODE,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::table().find(|choice| choice.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            AudioChoice::Single(tag) => tag.label(),
            AudioChoice::Both => BOTH_LABEL,
        }
    }

    /// The entries this choice selects from `result`, in result order.
    ///
    /// `None` when the result has no entry for the language, or when `Both`
    /// is used on a result that does not have exactly two entries.
    pub fn resolve(self, result: &TranslationResult) -> Option<Vec<Translation>> {
        match self {
            AudioChoice::Single(tag) => result.get(tag).map(|t| vec![t.clone()]),
            AudioChoice::Both if result.len() == 2 => Some(result.entries().to_vec()),
            AudioChoice::Both => None,
        }
    }
}

impl fmt::Display for AudioChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Not an audio action token")]
    WrongPrefix,
    #[error("Unknown audio choice: {0}")]
    UnknownChoice(String),
    #[error("Malformed token version")]
    BadVersion,
}

/// Parsed postback payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionToken {
    pub choice: AudioChoice,
    pub version: u64,
}

impl ActionToken {
    pub fn new(choice: AudioChoice, version: u64) -> Self {
        Self { choice, version }
    }

    pub fn encode(&self) -> String {
        format!("{TOKEN_PREFIX}:{}:{}", self.choice.code(), self.version)
    }

    pub fn parse(data: &str) -> Result<Self, TokenError> {
        let mut parts = data.splitn(3, ':');
        if parts.next() != Some(TOKEN_PREFIX) {
            return Err(TokenError::WrongPrefix);
        }
        let code = parts.next().ok_or(TokenError::WrongPrefix)?;
        let choice =
            AudioChoice::from_code(code).ok_or_else(|| TokenError::UnknownChoice(code.to_string()))?;
        let version = parts
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or(TokenError::BadVersion)?;
        Ok(Self { choice, version })
    }
}

/// Quick-reply choices offered for a stored result.
///
/// One per entry in result order, plus `Both` when there are exactly two.
/// Single-entry results get no choices.
pub fn choices_for(result: &TranslationResult, version: u64) -> Vec<QuickReplyChoice> {
    if !result.offers_choices() {
        return Vec::new();
    }

    let mut choices: Vec<AudioChoice> = result
        .languages()
        .into_iter()
        .map(AudioChoice::Single)
        .collect();
    if result.len() == 2 {
        choices.push(AudioChoice::Both);
    }

    choices
        .into_iter()
        .map(|choice| QuickReplyChoice {
            label: choice.label().to_string(),
            token: ActionToken::new(choice, version).encode(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_entry() -> TranslationResult {
        TranslationResult::new([
            Translation::new(LanguageTag::En, "Hello"),
            Translation::new(LanguageTag::Ja, "こんにちは"),
        ])
    }

    #[test]
    fn tokens_survive_encoding() {
        for choice in AudioChoice::table() {
            let token = ActionToken::new(choice, 42);
            assert_eq!(ActionToken::parse(&token.encode()), Ok(token));
        }
    }

    #[test]
    fn token_format() {
        let token = ActionToken::new(AudioChoice::Single(LanguageTag::ZhHant), 7);
        assert_eq!(token.encode(), "audio:zh-Hant:7");
        assert_eq!(ActionToken::new(AudioChoice::Both, 3).encode(), "audio:both:3");
    }

    #[test]
    fn rejects_foreign_payloads() {
        // Labels used as postback data by older builds are not tokens
        assert_eq!(ActionToken::parse("英文"), Err(TokenError::WrongPrefix));
        assert_eq!(
            ActionToken::parse("audio:fr:1"),
            Err(TokenError::UnknownChoice("fr".to_string()))
        );
        assert_eq!(ActionToken::parse("audio:en"), Err(TokenError::BadVersion));
        assert_eq!(ActionToken::parse("audio:en:x"), Err(TokenError::BadVersion));
    }

    #[test]
    fn two_entry_result_offers_three_choices() {
        let choices = choices_for(&two_entry(), 9);
        let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["英文", "日文", BOTH_LABEL]);
        assert_eq!(choices[0].token, "audio:en:9");
        assert_eq!(choices[2].token, "audio:both:9");
    }

    #[test]
    fn single_entry_result_offers_nothing() {
        let result = TranslationResult::new([Translation::new(LanguageTag::ZhHant, "你好")]);
        assert!(choices_for(&result, 1).is_empty());
    }

    #[test]
    fn resolution() {
        let result = two_entry();
        assert_eq!(
            AudioChoice::Single(LanguageTag::Ja).resolve(&result),
            Some(vec![Translation::new(LanguageTag::Ja, "こんにちは")])
        );
        assert_eq!(AudioChoice::Both.resolve(&result).unwrap().len(), 2);
        assert_eq!(AudioChoice::Single(LanguageTag::ZhHans).resolve(&result), None);

        let single = TranslationResult::new([Translation::new(LanguageTag::ZhHant, "你好")]);
        assert_eq!(AudioChoice::Both.resolve(&single), None);
    }
}
