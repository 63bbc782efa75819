//! Azure Translator (Text Translation v3) implementation

use super::{Detection, TranslationError, Translator};
use crate::language::LanguageTag;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";
const API_VERSION: &str = "3.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Translator backed by the Azure Text Translation REST API
pub struct AzureTranslator {
    client: Client,
    key: String,
    region: String,
    url: String,
}

impl AzureTranslator {
    pub fn new(key: String, region: String, endpoint: &str) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TranslationError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            key,
            region,
            url: format!("{}/translate", endpoint.trim_end_matches('/')),
        })
    }

    fn query(source: Option<LanguageTag>, targets: &[LanguageTag]) -> Vec<(&'static str, &'static str)> {
        let mut query = vec![("api-version", API_VERSION)];
        if let Some(source) = source {
            query.push(("from", source.code()));
        }
        query.extend(targets.iter().map(|t| ("to", t.code())));
        query
    }

    fn normalize_response(
        items: Vec<AzureTranslateItem>,
        source: Option<LanguageTag>,
    ) -> Result<Detection, TranslationError> {
        let item = items
            .into_iter()
            .next()
            .ok_or_else(|| TranslationError::unknown("No translation in response"))?;

        let detected_language = match (item.detected_language, source) {
            (Some(detected), _) => detected.language,
            (None, Some(source)) => source.code().to_string(),
            (None, None) => {
                return Err(TranslationError::unknown(
                    "Response carried no detected language",
                ))
            }
        };

        let translations = item
            .translations
            .into_iter()
            .filter_map(|t| match LanguageTag::from_code(&t.to) {
                Some(tag) => Some((tag, t.text)),
                None => {
                    tracing::warn!(to = %t.to, "Ignoring translation into unsupported language");
                    None
                }
            })
            .collect();

        Ok(Detection {
            detected_language,
            translations,
        })
    }
}

#[async_trait]
impl Translator for AzureTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Option<LanguageTag>,
        targets: &[LanguageTag],
    ) -> Result<Detection, TranslationError> {
        let body = [AzureTranslateInput { text }];

        let response = self
            .client
            .post(&self.url)
            .query(&Self::query(source, targets))
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Ocp-Apim-Subscription-Region", &self.region)
            .header("X-ClientTraceId", uuid::Uuid::new_v4().to_string())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranslationError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    TranslationError::network(format!("Connection failed: {e}"))
                } else {
                    TranslationError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<AzureErrorResponse>(&body)
                .map_or(body, |e| format!("{} (code {})", e.error.message, e.error.code));
            return Err(TranslationError::from_status(status.as_u16(), &message));
        }

        let items: Vec<AzureTranslateItem> = serde_json::from_str(&body).map_err(|e| {
            TranslationError::unknown(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        Self::normalize_response(items, source)
    }
}

// ============================================================================
// Azure API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct AzureTranslateInput<'a> {
    #[serde(rename = "Text")]
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzureTranslateItem {
    #[serde(default)]
    detected_language: Option<AzureDetectedLanguage>,
    translations: Vec<AzureTranslationText>,
}

#[derive(Debug, Deserialize)]
struct AzureDetectedLanguage {
    language: String,
}

#[derive(Debug, Deserialize)]
struct AzureTranslationText {
    text: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct AzureErrorResponse {
    error: AzureErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AzureErrorDetail {
    code: i64,
    message: String,
}
