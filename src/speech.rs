//! Speech gateway
//!
//! Turns translated text into an audio file under the public audio
//! directory and reports how long it plays.

mod azure;
mod error;
mod probe;
pub mod retention;

pub use azure::AzureSpeechSynthesizer;
pub use error::{CancellationReason, SynthesisError};

use crate::language::LanguageTag;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Common interface for remote speech synthesis services
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with the voice for `voice`, returning an encoded WAV file
    async fn synthesize(&self, text: &str, voice: LanguageTag) -> Result<Vec<u8>, SynthesisError>;
}

/// A synthesized audio file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub language: LanguageTag,
    /// File name inside the audio directory, unique per synthesis
    pub file_name: String,
    pub path: PathBuf,
    pub duration_ms: u64,
}

/// Unique file name for one synthesis: canonical stem plus a fresh token
pub fn artifact_file_name(language: LanguageTag) -> String {
    format!("{}-{}.wav", language.audio_stem(), uuid::Uuid::new_v4().simple())
}

/// Remote synthesizer plus file placement and duration probing
pub struct SpeechService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    audio_dir: PathBuf,
}

impl SpeechService {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, audio_dir: PathBuf) -> Self {
        Self {
            synthesizer,
            audio_dir,
        }
    }

    pub async fn synthesize(
        &self,
        text: &str,
        voice: LanguageTag,
    ) -> Result<AudioArtifact, SynthesisError> {
        let start = std::time::Instant::now();
        let audio = self.synthesizer.synthesize(text, voice).await.inspect_err(|e| {
            tracing::error!(
                language = %voice,
                reason = %e.reason,
                error = %e.message,
                "Speech synthesis canceled"
            );
        })?;

        let file_name = artifact_file_name(voice);
        let path = self.audio_dir.join(&file_name);
        tokio::fs::write(&path, &audio).await.map_err(|e| {
            SynthesisError::error(format!("Failed to write {}: {e}", path.display()))
        })?;

        let probe_path = path.clone();
        let probed = tokio::task::spawn_blocking(move || probe::wav_duration_ms(&probe_path))
            .await
            .map_err(|e| SynthesisError::error(format!("Duration probe panicked: {e}")))
            .and_then(|duration| duration);
        let duration_ms = match probed {
            Ok(duration_ms) => duration_ms,
            Err(e) => {
                // Never leave an unplayable file in the public directory
                if let Err(remove) = tokio::fs::remove_file(&path).await {
                    tracing::warn!(file = %path.display(), error = %remove, "Failed to remove undecodable audio");
                }
                return Err(e);
            }
        };

        tracing::info!(
            language = %voice,
            file = %file_name,
            duration_ms,
            bytes = audio.len(),
            elapsed_ms = %start.elapsed().as_millis(),
            "Speech synthesized"
        );

        Ok(AudioArtifact {
            language: voice,
            file_name,
            path,
            duration_ms,
        })
    }
}
