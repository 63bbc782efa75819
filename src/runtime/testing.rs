//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::language::LanguageTag;
use crate::reply::ReplyPayload;
use crate::speech::{artifact_file_name, AudioArtifact, SynthesisError};
use crate::translation::{TranslationError, TranslationResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

// ============================================================================
// Mock Translation Gateway
// ============================================================================

/// Mock translator that returns queued results
pub struct MockTranslationGateway {
    results: Mutex<VecDeque<Result<TranslationResult, TranslationError>>>,
    /// Record of all texts sent for translation
    pub texts: Mutex<Vec<String>>,
}

impl MockTranslationGateway {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            texts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful result
    pub fn queue_result(&self, result: TranslationResult) {
        self.results.lock().unwrap().push_back(Ok(result));
    }

    /// Queue an error
    pub fn queue_error(&self, error: TranslationError) {
        self.results.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

impl Default for MockTranslationGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationGateway for MockTranslationGateway {
    async fn translate(&self, text: &str) -> Result<TranslationResult, TranslationError> {
        self.texts.lock().unwrap().push(text.to_string());
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TranslationError::network("No mock result queued")))
    }
}

// ============================================================================
// Mock Speech Gateway
// ============================================================================

/// Mock synthesizer that succeeds unless a language is set to fail
pub struct MockSpeechGateway {
    failures: Mutex<HashMap<LanguageTag, SynthesisError>>,
    /// Record of (text, voice) pairs requested
    pub requests: Mutex<Vec<(String, LanguageTag)>>,
}

impl MockSpeechGateway {
    /// Duration reported for every successful artifact
    pub const DURATION_MS: u64 = 1800;

    pub fn new() -> Self {
        Self {
            failures: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Make every synthesis for `language` fail with `error`
    pub fn fail_language(&self, language: LanguageTag, error: SynthesisError) {
        self.failures.lock().unwrap().insert(language, error);
    }

    pub fn recorded_requests(&self) -> Vec<(String, LanguageTag)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockSpeechGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechGateway for MockSpeechGateway {
    async fn synthesize(
        &self,
        text: &str,
        voice: LanguageTag,
    ) -> Result<AudioArtifact, SynthesisError> {
        self.requests.lock().unwrap().push((text.to_string(), voice));
        if let Some(error) = self.failures.lock().unwrap().get(&voice) {
            return Err(error.clone());
        }

        let file_name = artifact_file_name(voice);
        Ok(AudioArtifact {
            language: voice,
            path: PathBuf::from("/tmp/transvoice-mock").join(&file_name),
            file_name,
            duration_ms: Self::DURATION_MS,
        })
    }
}

// ============================================================================
// Recording Reply Sink
// ============================================================================

/// Reply sink that records every reply and can be told to fail
pub struct RecordingReplySink {
    replies: Mutex<Vec<(String, ReplyPayload)>>,
    failures: Mutex<VecDeque<ReplyError>>,
}

impl RecordingReplySink {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Fail the next reply (it is still recorded)
    pub fn fail_next(&self, error: ReplyError) {
        self.failures.lock().unwrap().push_back(error);
    }

    /// Every (reply token, payload) sent so far
    pub fn recorded(&self) -> Vec<(String, ReplyPayload)> {
        self.replies.lock().unwrap().clone()
    }
}

impl Default for RecordingReplySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplySink for RecordingReplySink {
    async fn reply(&self, reply_token: &str, payload: &ReplyPayload) -> Result<(), ReplyError> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), payload.clone()));
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
