//! Pure state transition function
//!
//! Given the same state, context and event this always yields the same new
//! state and effects. All I/O happens in the runtime that executes effects.

use super::action::{choices_for, ActionToken};
use super::{ConvContext, ConvState, Effect, Event, Failure};
use crate::language::LanguageTag;
use crate::reply::{
    self, audio_url, partial_synthesis_notice, ReplyItem, ReplyPayload,
};
use crate::speech::{AudioArtifact, CancellationReason};
use crate::translation::normalize::strip_emoji;
use crate::translation::{
    Translation, TranslationError, TranslationErrorKind, TranslationResult,
};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Conversation is busy ({0}), cannot accept another inbound event")]
    Busy(&'static str),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Text messages
        // ============================================================

        // A new message supersedes any pending audio choice
        (
            ConvState::Idle | ConvState::NoChoices { .. } | ConvState::AwaitingAudioChoice { .. },
            Event::TextMessage { text },
        ) => {
            Ok(TransitionResult::new(ConvState::Translating).with_effect(
                Effect::RequestTranslation {
                    text: strip_emoji(&text),
                },
            ))
        }

        // Blank entries cannot be sent as text messages
        (ConvState::Translating, Event::TranslationComplete { result }) => {
            let result = result.without_blank();
            if result.is_empty() {
                return Ok(translation_failed(TranslationError::missing_target(
                    "Translation service returned no usable entries",
                )));
            }
            Ok(TransitionResult::new(ConvState::Translating)
                .with_effect(Effect::PersistResult { result }))
        }

        (ConvState::Translating, Event::TranslationFailed { error }) => {
            Ok(translation_failed(error))
        }

        (ConvState::Translating, Event::ResultStored { version, result }) => {
            let payload = translation_reply(&result, version);
            let new_state = if result.offers_choices() {
                ConvState::AwaitingAudioChoice { version, result }
            } else {
                ConvState::NoChoices { version }
            };
            Ok(TransitionResult::new(new_state).with_effect(Effect::reply(payload)))
        }

        // ============================================================
        // Postbacks
        // ============================================================

        (ConvState::Idle, Event::Postback { .. }) => Ok(TransitionResult::new(ConvState::Idle)
            .with_effect(Effect::reply_text(reply::SESSION_MISSING))
            .with_effect(Effect::record(Failure::MissingSession))),

        (ConvState::NoChoices { version }, Event::Postback { .. }) => {
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::reply_text(reply::SESSION_MISSING))
                .with_effect(Effect::record(Failure::NoChoicesOffered { version: *version })))
        }

        (ConvState::AwaitingAudioChoice { version, result }, Event::Postback { data }) => {
            Ok(resolve_postback(state, *version, result, &data))
        }

        // ============================================================
        // Synthesis
        // ============================================================
        (
            ConvState::Synthesizing {
                version,
                current,
                pending,
                completed,
                failed,
            },
            Event::SynthesisComplete { artifact },
        ) if artifact.language == *current => {
            let mut completed = completed.clone();
            completed.push(artifact);
            Ok(next_synthesis(
                context,
                *version,
                pending.clone(),
                completed,
                failed.clone(),
            ))
        }

        (
            ConvState::Synthesizing {
                version,
                current,
                pending,
                completed,
                failed,
            },
            Event::SynthesisFailed { language, error },
        ) if language == *current => {
            let mut failed = failed.clone();
            failed.push((language, error.reason));
            Ok(next_synthesis(
                context,
                *version,
                pending.clone(),
                completed.clone(),
                failed,
            )
            .with_effect(Effect::record(Failure::Synthesis { language, error })))
        }

        // ============================================================
        // Rejections
        // ============================================================
        (state, event) if state.is_busy() && event.is_inbound() => {
            Err(TransitionError::Busy(state.name()))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} in state {}",
            state.name()
        ))),
    }
}

/// Reply for a stored result: one text per entry, then the audio prompt
/// with its choices when the result offers any.
pub fn translation_reply(result: &TranslationResult, version: u64) -> ReplyPayload {
    let mut items: Vec<ReplyItem> = result
        .entries()
        .iter()
        .map(|entry| ReplyItem::text(entry.text.clone()))
        .collect();

    let choices = choices_for(result, version);
    if choices.is_empty() {
        return ReplyPayload::new(items);
    }

    items.push(ReplyItem::text(reply::AUDIO_PROMPT));
    ReplyPayload::new(items).with_quick_replies(choices)
}

fn translation_failed(error: TranslationError) -> TransitionResult {
    let text = if error.kind == TranslationErrorKind::InvalidRequest {
        reply::TRANSLATION_REJECTED
    } else {
        reply::TRANSLATION_UNAVAILABLE
    };
    TransitionResult::new(ConvState::Idle)
        .with_effect(Effect::reply_text(text))
        .with_effect(Effect::record(Failure::Translation(error)))
}

fn resolve_postback(
    state: &ConvState,
    version: u64,
    result: &TranslationResult,
    data: &str,
) -> TransitionResult {
    // Invalid choices leave the offered choices usable
    let stay = || TransitionResult::new(state.clone());

    let token = match ActionToken::parse(data) {
        Ok(token) => token,
        Err(_) => {
            return stay()
                .with_effect(Effect::reply_text(reply::UNKNOWN_CHOICE))
                .with_effect(Effect::record(Failure::UnknownAction {
                    data: data.to_string(),
                }));
        }
    };

    if token.version != version {
        return stay()
            .with_effect(Effect::reply_text(reply::STALE_CHOICE))
            .with_effect(Effect::record(Failure::StaleAction {
                token_version: token.version,
                current_version: version,
            }));
    }

    let Some(mut entries) = token.choice.resolve(result).filter(|e| !e.is_empty()) else {
        return stay()
            .with_effect(Effect::reply_text(reply::UNKNOWN_CHOICE))
            .with_effect(Effect::record(Failure::Unresolvable {
                choice: token.choice.to_string(),
            }));
    };

    let first = entries.remove(0);
    TransitionResult::new(ConvState::Synthesizing {
        version,
        current: first.language,
        pending: entries,
        completed: vec![],
        failed: vec![],
    })
    .with_effect(Effect::RequestSynthesis { translation: first })
}

fn next_synthesis(
    context: &ConvContext,
    version: u64,
    mut pending: Vec<Translation>,
    completed: Vec<AudioArtifact>,
    failed: Vec<(LanguageTag, CancellationReason)>,
) -> TransitionResult {
    if pending.is_empty() {
        let payload = audio_reply(context, &completed, &failed);
        return TransitionResult::new(ConvState::Idle).with_effect(Effect::reply(payload));
    }

    let next = pending.remove(0);
    TransitionResult::new(ConvState::Synthesizing {
        version,
        current: next.language,
        pending,
        completed,
        failed,
    })
    .with_effect(Effect::RequestSynthesis { translation: next })
}

/// One audio item per artifact, then a notice for anything that failed
fn audio_reply(
    context: &ConvContext,
    completed: &[AudioArtifact],
    failed: &[(LanguageTag, CancellationReason)],
) -> ReplyPayload {
    let mut items: Vec<ReplyItem> = completed
        .iter()
        .map(|artifact| {
            ReplyItem::audio(
                audio_url(&context.public_base_url, &artifact.file_name),
                artifact.duration_ms,
            )
        })
        .collect();

    if !failed.is_empty() {
        let notice = if completed.is_empty() {
            let all_quota = failed
                .iter()
                .all(|(_, reason)| *reason == CancellationReason::Quota);
            if all_quota {
                reply::SYNTHESIS_QUOTA.to_string()
            } else {
                reply::SYNTHESIS_FAILED.to_string()
            }
        } else {
            let languages: Vec<LanguageTag> = failed.iter().map(|(tag, _)| *tag).collect();
            partial_synthesis_notice(&languages)
        };
        items.push(ReplyItem::text(notice));
    }

    ReplyPayload::new(items)
}
