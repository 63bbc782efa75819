//! Azure Speech text-to-speech REST implementation

use super::{SpeechSynthesizer, SynthesisError};
use crate::language::LanguageTag;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// 24kHz 16-bit mono PCM in a RIFF container
const OUTPUT_FORMAT: &str = "riff-24khz-16bit-mono-pcm";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("transvoice/", env!("CARGO_PKG_VERSION"));

/// Synthesizer backed by the Azure Speech REST API
pub struct AzureSpeechSynthesizer {
    client: Client,
    key: String,
    url: String,
}

impl AzureSpeechSynthesizer {
    pub fn new(key: String, region: &str) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SynthesisError::error(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            key,
            url: format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1"),
        })
    }
}

/// SSML document speaking `text` with the voice of `voice`
pub fn build_ssml(text: &str, voice: LanguageTag) -> String {
    format!(
        "<speak version='1.0' xml:lang='{locale}'><voice xml:lang='{locale}' name='{name}'>{text}</voice></speak>",
        locale = voice.voice_locale(),
        name = voice.voice_name(),
        text = quick_xml::escape::escape(text),
    )
}

#[async_trait]
impl SpeechSynthesizer for AzureSpeechSynthesizer {
    async fn synthesize(&self, text: &str, voice: LanguageTag) -> Result<Vec<u8>, SynthesisError> {
        let response = self
            .client
            .post(&self.url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .header("User-Agent", USER_AGENT)
            .body(build_ssml(text, voice))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::error(format!("Request timeout: {e}"))
                } else {
                    SynthesisError::error(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::from_status(status.as_u16(), &body));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::error(format!("Failed to read audio: {e}")))?;

        if audio.is_empty() {
            return Err(SynthesisError::other("Service returned no audio"));
        }

        Ok(audio.to_vec())
    }
}
