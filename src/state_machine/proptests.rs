//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::*;
use super::*;
use crate::language::LanguageTag;
use crate::reply::{self, ReplyPayload};
use crate::session::ConversationKey;
use crate::speech::{AudioArtifact, CancellationReason, SynthesisError};
use crate::translation::{Translation, TranslationError, TranslationResult};
use proptest::prelude::*;
use std::path::PathBuf;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ConvContext {
    ConvContext::new(ConversationKey::user("U-prop"), "https://bot.example.com")
}

fn replies(effects: &[Effect]) -> Vec<&ReplyPayload> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::Reply { payload } => Some(payload),
            _ => None,
        })
        .collect()
}

fn synthesis_requests(effects: &[Effect]) -> Vec<&Translation> {
    effects
        .iter()
        .filter_map(|e| match e {
            Effect::RequestSynthesis { translation } => Some(translation),
            _ => None,
        })
        .collect()
}

fn next_request(effects: &[Effect]) -> Option<Translation> {
    synthesis_requests(effects).first().map(|t| (*t).clone())
}

fn artifact_for(translation: &Translation) -> AudioArtifact {
    let file_name = format!("{}-prop.wav", translation.language.audio_stem());
    AudioArtifact {
        language: translation.language,
        path: PathBuf::from("/tmp").join(&file_name),
        file_name,
        duration_ms: 1000,
    }
}

/// Drive a synthesis run to completion, succeeding every request
fn run_synthesis(start: TransitionResult, ctx: &ConvContext) -> (ConvState, Vec<ReplyPayload>) {
    let mut state = start.new_state;
    let mut effects = start.effects;
    let mut sent = Vec::new();

    loop {
        sent.extend(replies(&effects).into_iter().cloned());
        let Some(translation) = next_request(&effects) else {
            return (state, sent);
        };
        let result = transition(
            &state,
            ctx,
            Event::SynthesisComplete {
                artifact: artifact_for(&translation),
            },
        )
        .expect("synthesis completion accepted");
        state = result.new_state;
        effects = result.effects;
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_language() -> impl Strategy<Value = LanguageTag> {
    prop::sample::select(LanguageTag::ALL.to_vec())
}

fn arb_result(max: usize) -> impl Strategy<Value = TranslationResult> {
    prop::sample::subsequence(LanguageTag::ALL.to_vec(), 1..=max).prop_flat_map(|langs| {
        let n = langs.len();
        proptest::collection::vec("[a-zA-Z ]{1,20}", n).prop_map(move |texts| {
            TranslationResult::new(
                langs
                    .iter()
                    .zip(texts)
                    .map(|(lang, text)| Translation::new(*lang, text)),
            )
        })
    })
}

fn arb_two_entry_result() -> impl Strategy<Value = TranslationResult> {
    (
        prop::sample::subsequence(LanguageTag::ALL.to_vec(), 2),
        "[a-zA-Z ]{1,20}",
        "[a-zA-Z ]{1,20}",
    )
        .prop_map(|(langs, a, b)| {
            TranslationResult::new([Translation::new(langs[0], a), Translation::new(langs[1], b)])
        })
}

fn arb_non_busy_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::Idle),
        (1u64..1000).prop_map(|version| ConvState::NoChoices { version }),
        (1u64..1000, arb_two_entry_result())
            .prop_map(|(version, result)| ConvState::AwaitingAudioChoice { version, result }),
    ]
}

fn arb_busy_state() -> impl Strategy<Value = ConvState> {
    prop_oneof![
        Just(ConvState::Translating),
        (1u64..1000, arb_language()).prop_map(|(version, current)| ConvState::Synthesizing {
            version,
            current,
            pending: vec![],
            completed: vec![],
            failed: vec![],
        }),
    ]
}

fn arb_inbound() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-zA-Z0-9 ]{0,30}".prop_map(|text| Event::TextMessage { text }),
        "[a-z:0-9]{0,20}".prop_map(|data| Event::Postback { data }),
    ]
}

fn arb_cancellation() -> impl Strategy<Value = SynthesisError> {
    prop_oneof![
        Just(SynthesisError::error("failed")),
        Just(SynthesisError::quota("quota")),
        Just(SynthesisError::other("other")),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Text in any non-busy state starts a translation and nothing else
    #[test]
    fn prop_text_always_requests_translation(
        state in arb_non_busy_state(),
        text in "[a-zA-Z0-9 ]{0,40}",
    ) {
        let result = transition(&state, &test_context(), Event::TextMessage { text }).unwrap();
        prop_assert_eq!(result.new_state, ConvState::Translating);
        prop_assert_eq!(result.effects.len(), 1);
        prop_assert!(matches!(result.effects[0], Effect::RequestTranslation { .. }), "expected translation request");
    }

    // Busy states never accept user input
    #[test]
    fn prop_busy_rejects_inbound(state in arb_busy_state(), event in arb_inbound()) {
        let result = transition(&state, &test_context(), event);
        prop_assert!(matches!(result, Err(TransitionError::Busy(_))), "expected busy rejection");
    }

    // One text per entry; choices (plus their prompt) only for multi-entry results
    #[test]
    fn prop_stored_result_reply_shape(result in arb_result(3), version in 1u64..1000) {
        let n = result.len();
        let out = transition(
            &ConvState::Translating,
            &test_context(),
            Event::ResultStored { version, result: result.clone() },
        ).unwrap();

        let sent = replies(&out.effects);
        prop_assert_eq!(sent.len(), 1);
        let payload = sent[0];

        if n > 1 {
            prop_assert_eq!(payload.texts().len(), n + 1);
            let expected_choices = if n == 2 { 3 } else { n };
            prop_assert_eq!(payload.quick_replies.len(), expected_choices);
            for choice in &payload.quick_replies {
                let token = ActionToken::parse(&choice.token).unwrap();
                prop_assert_eq!(token.version, version);
            }
            prop_assert_eq!(out.new_state, ConvState::AwaitingAudioChoice { version, result });
        } else {
            prop_assert_eq!(payload.texts().len(), 1);
            prop_assert!(payload.quick_replies.is_empty());
            prop_assert_eq!(out.new_state, ConvState::NoChoices { version });
        }
    }

    // Every offered choice resolves and yields one audio item per selected entry
    #[test]
    fn prop_offered_choices_resolve(result in arb_two_entry_result(), version in 1u64..1000) {
        let ctx = test_context();
        let state = ConvState::AwaitingAudioChoice { version, result: result.clone() };

        for choice in choices_for(&result, version) {
            let start = transition(&state, &ctx, Event::Postback { data: choice.token.clone() }).unwrap();
            let (end, sent) = run_synthesis(start, &ctx);
            prop_assert_eq!(end, ConvState::Idle);
            prop_assert_eq!(sent.len(), 1);

            let token = ActionToken::parse(&choice.token).unwrap();
            let expected = token.choice.resolve(&result).unwrap().len();
            prop_assert_eq!(sent[0].audio_count(), expected);
        }
    }

    // Resolving the same choice twice against the same stored result
    // synthesizes the same texts both times
    #[test]
    fn prop_choice_resolution_is_idempotent(result in arb_two_entry_result(), version in 1u64..1000) {
        let ctx = test_context();
        let state = ConvState::AwaitingAudioChoice { version, result };
        let data = ActionToken::new(AudioChoice::Both, version).encode();

        let synthesized = || -> Vec<Translation> {
            let start = transition(&state, &ctx, Event::Postback { data: data.clone() }).unwrap();
            let mut current = start.new_state;
            let mut effects = start.effects;
            let mut seen = Vec::new();
            while let Some(translation) = next_request(&effects) {
                let next = transition(
                    &current,
                    &ctx,
                    Event::SynthesisComplete { artifact: artifact_for(&translation) },
                ).unwrap();
                seen.push(translation);
                current = next.new_state;
                effects = next.effects;
            }
            seen
        };

        let first = synthesized();
        prop_assert_eq!(first.len(), 2);
        prop_assert_eq!(first, synthesized());
    }

    // Tokens from an older result never trigger synthesis
    #[test]
    fn prop_stale_token_never_synthesizes(
        result in arb_two_entry_result(),
        version in 2u64..1000,
        lag in 1u64..10,
    ) {
        let old = version.saturating_sub(lag);
        let state = ConvState::AwaitingAudioChoice { version, result: result.clone() };

        for choice in choices_for(&result, old) {
            let out = transition(&state, &test_context(), Event::Postback { data: choice.token }).unwrap();
            prop_assert!(synthesis_requests(&out.effects).is_empty());
            prop_assert_eq!(&out.new_state, &state);
            prop_assert_eq!(replies(&out.effects)[0].texts(), vec![reply::STALE_CHOICE]);
        }
    }

    // A postback with nothing stored always gets exactly one graceful reply
    #[test]
    fn prop_postback_without_session_replies_once(data in "[a-z:0-9]{0,20}") {
        let out = transition(&ConvState::Idle, &test_context(), Event::Postback { data }).unwrap();
        prop_assert_eq!(out.new_state, ConvState::Idle);
        prop_assert_eq!(replies(&out.effects).len(), 1);
        prop_assert!(synthesis_requests(&out.effects).is_empty());
    }

    // Failures never leave the run stuck: it ends in Idle with exactly one reply
    #[test]
    fn prop_synthesis_failures_still_reply(
        result in arb_two_entry_result(),
        errors in proptest::collection::vec(arb_cancellation(), 2),
    ) {
        let ctx = test_context();
        let state = ConvState::AwaitingAudioChoice { version: 1, result };
        let data = ActionToken::new(AudioChoice::Both, 1).encode();

        let mut out = transition(&state, &ctx, Event::Postback { data }).unwrap();
        let mut sent = 0;
        for error in errors.clone() {
            let translation = synthesis_requests(&out.effects)[0].clone();
            out = transition(
                &out.new_state,
                &ctx,
                Event::SynthesisFailed { language: translation.language, error },
            ).unwrap();
            sent += replies(&out.effects).len();
        }

        prop_assert_eq!(out.new_state, ConvState::Idle);
        prop_assert_eq!(sent, 1);
        let text = replies(&out.effects)[0].texts();
        let all_quota = errors.iter().all(|e| e.reason == CancellationReason::Quota);
        let expected = if all_quota { reply::SYNTHESIS_QUOTA } else { reply::SYNTHESIS_FAILED };
        prop_assert_eq!(text, vec![expected]);
    }

    // Gateway failures during translation always end in Idle with an apology
    #[test]
    fn prop_translation_failure_ends_idle(message in "[a-z ]{0,20}", auth in any::<bool>()) {
        let error = if auth { TranslationError::auth(message) } else { TranslationError::network(message) };
        let out = transition(&ConvState::Translating, &test_context(), Event::TranslationFailed { error }).unwrap();
        prop_assert_eq!(out.new_state, ConvState::Idle);
        prop_assert_eq!(replies(&out.effects)[0].texts(), vec![reply::TRANSLATION_UNAVAILABLE]);
    }
}
