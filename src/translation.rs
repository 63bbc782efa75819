//! Translation gateway
//!
//! Wraps a remote translation capability. The remote side detects the
//! source language and translates into every requested target; the
//! [`LanguagePolicy`] then decides which of those translations the user
//! actually gets back.

mod azure;
mod error;
pub mod normalize;

pub use azure::{AzureTranslator, DEFAULT_ENDPOINT};
pub use error::{TranslationError, TranslationErrorKind};

use crate::language::LanguageTag;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Raw answer of a remote translator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Detected (or given) source language code, as reported by the service
    pub detected_language: String,
    /// One translation per requested target the service answered for
    pub translations: Vec<(LanguageTag, String)>,
}

/// Common interface for remote translation services
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into every language in `targets`.
    ///
    /// `source` of `None` asks the service to auto-detect the source language.
    async fn translate(
        &self,
        text: &str,
        source: Option<LanguageTag>,
        targets: &[LanguageTag],
    ) -> Result<Detection, TranslationError>;
}

// ============================================================================
// Translation Result
// ============================================================================

/// One translated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub language: LanguageTag,
    pub text: String,
}

impl Translation {
    pub fn new(language: LanguageTag, text: impl Into<String>) -> Self {
        Self {
            language,
            text: text.into(),
        }
    }
}

/// Ordered translations of one input, at most one per language
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TranslationResult {
    entries: Vec<Translation>,
}

impl TranslationResult {
    /// Build a result, keeping the first entry for any repeated language
    pub fn new(entries: impl IntoIterator<Item = Translation>) -> Self {
        let mut kept: Vec<Translation> = Vec::new();
        for entry in entries {
            if kept.iter().any(|k| k.language == entry.language) {
                tracing::debug!(language = %entry.language, "Dropping duplicate translation");
                continue;
            }
            kept.push(entry);
        }
        Self { entries: kept }
    }

    pub fn entries(&self) -> &[Translation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a specific language
    pub fn get(&self, language: LanguageTag) -> Option<&Translation> {
        self.entries.iter().find(|e| e.language == language)
    }

    /// Languages in result order
    pub fn languages(&self) -> Vec<LanguageTag> {
        self.entries.iter().map(|e| e.language).collect()
    }

    /// Drop entries whose text is empty or whitespace only
    #[must_use]
    pub fn without_blank(self) -> Self {
        Self {
            entries: self
                .entries
                .into_iter()
                .filter(|e| !e.text.trim().is_empty())
                .collect(),
        }
    }

    /// Whether audio choices are offered for this result
    pub fn offers_choices(&self) -> bool {
        self.entries.len() > 1
    }
}

// ============================================================================
// Language Policy
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("At least one local language is required")]
    NoLocalLanguage,
    #[error("At least one foreign target is required")]
    NoForeignTarget,
    #[error("Language {0} cannot be both local and a foreign target")]
    Overlap(LanguageTag),
}

/// Which translations a detected source language is answered with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePolicy {
    local: Vec<LanguageTag>,
    foreign_targets: Vec<LanguageTag>,
}

impl LanguagePolicy {
    /// `local[0]` is the reply language for foreign input.
    pub fn new(
        local: Vec<LanguageTag>,
        foreign_targets: Vec<LanguageTag>,
    ) -> Result<Self, PolicyError> {
        if local.is_empty() {
            return Err(PolicyError::NoLocalLanguage);
        }
        if foreign_targets.is_empty() {
            return Err(PolicyError::NoForeignTarget);
        }
        if let Some(tag) = foreign_targets.iter().find(|t| local.contains(t)) {
            return Err(PolicyError::Overlap(*tag));
        }
        Ok(Self {
            local,
            foreign_targets,
        })
    }

    pub fn local_target(&self) -> LanguageTag {
        self.local[0]
    }

    pub fn foreign_targets(&self) -> &[LanguageTag] {
        &self.foreign_targets
    }

    pub fn is_local(&self, detected_language: &str) -> bool {
        self.local
            .iter()
            .any(|tag| tag.code().eq_ignore_ascii_case(detected_language))
    }

    /// Every language requested from the remote service in a single call
    pub fn request_targets(&self) -> Vec<LanguageTag> {
        std::iter::once(self.local_target())
            .chain(self.foreign_targets.iter().copied())
            .collect()
    }

    /// Pick the translations the user gets for this detection.
    ///
    /// Local input yields every foreign target in configured order; anything
    /// else yields the local reply language only.
    pub fn select(&self, detection: Detection) -> Result<TranslationResult, TranslationError> {
        let wanted: Vec<LanguageTag> = if self.is_local(&detection.detected_language) {
            self.foreign_targets.clone()
        } else {
            vec![self.local_target()]
        };

        let mut translations = detection.translations;
        let mut entries = Vec::with_capacity(wanted.len());
        for language in wanted {
            let position = translations
                .iter()
                .position(|(tag, _)| *tag == language)
                .ok_or_else(|| {
                    TranslationError::missing_target(format!(
                        "No {language} translation for source {}",
                        detection.detected_language
                    ))
                })?;
            let (_, text) = translations.swap_remove(position);
            entries.push(Translation::new(language, text));
        }

        Ok(TranslationResult::new(entries))
    }
}

impl Default for LanguagePolicy {
    fn default() -> Self {
        Self {
            local: vec![LanguageTag::ZhHant, LanguageTag::ZhHans],
            foreign_targets: vec![LanguageTag::En, LanguageTag::Ja],
        }
    }
}

// ============================================================================
// Translation Service
// ============================================================================

/// Remote translator plus the language policy
pub struct TranslationService {
    translator: Arc<dyn Translator>,
    policy: LanguagePolicy,
}

impl TranslationService {
    pub fn new(translator: Arc<dyn Translator>, policy: LanguagePolicy) -> Self {
        Self { translator, policy }
    }

    /// Translate already-normalized text with auto-detected source language
    pub async fn translate(&self, text: &str) -> Result<TranslationResult, TranslationError> {
        let detection = self
            .translator
            .translate(text, None, &self.policy.request_targets())
            .await?;
        self.policy.select(detection)
    }
}

/// Logging wrapper for translators
pub struct LoggingTranslator {
    inner: Arc<dyn Translator>,
    name: &'static str,
}

impl LoggingTranslator {
    pub fn new(inner: Arc<dyn Translator>, name: &'static str) -> Self {
        Self { inner, name }
    }
}

#[async_trait]
impl Translator for LoggingTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Option<LanguageTag>,
        targets: &[LanguageTag],
    ) -> Result<Detection, TranslationError> {
        let start = std::time::Instant::now();
        let result = self.inner.translate(text, source, targets).await;
        let duration = start.elapsed();

        match &result {
            Ok(detection) => {
                tracing::info!(
                    translator = self.name,
                    duration_ms = %duration.as_millis(),
                    detected = %detection.detected_language,
                    translations = detection.translations.len(),
                    "Translation completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    translator = self.name,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    transient = e.kind.is_transient(),
                    "Translation failed"
                );
            }
        }

        result
    }
}
