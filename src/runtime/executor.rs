//! Conversation runtime executor

use super::traits::{ReplyError, ReplySink, SpeechGateway, TranslationGateway};
use super::{InboundEvent, InboundKind};

use crate::reply::ReplyPayload;
use crate::session::SessionStore;
use crate::state_machine::{
    transition, ConvContext, ConvState, Effect, Event, TransitionError,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Reply(#[from] ReplyError),
    #[error("Event for {0} finished without a reply")]
    NoReply(String),
}

/// Generic conversation runtime that can work with any translation, speech
/// and reply implementations
pub struct ConversationRuntime<T, S, R>
where
    T: TranslationGateway,
    S: SpeechGateway,
    R: ReplySink,
{
    sessions: Arc<SessionStore>,
    translator: T,
    speech: S,
    replies: R,
    /// Base of the public audio URLs
    public_base_url: String,
}

/// Reply bookkeeping for one inbound event
struct RunOutcome<'a> {
    reply_token: &'a str,
    replied: bool,
}

impl<T, S, R> ConversationRuntime<T, S, R>
where
    T: TranslationGateway,
    S: SpeechGateway,
    R: ReplySink,
{
    pub fn new(
        sessions: Arc<SessionStore>,
        translator: T,
        speech: S,
        replies: R,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            sessions,
            translator,
            speech,
            replies,
            public_base_url: public_base_url.into(),
        }
    }

    /// Drive one inbound event to completion, sending exactly one reply
    pub async fn process(&self, inbound: InboundEvent) -> Result<(), RuntimeError> {
        let InboundEvent {
            conversation,
            reply_token,
            kind,
        } = inbound;

        let stored = self.sessions.get(&conversation).await;
        let mut state = ConvState::from_session(stored.as_ref());
        let context = ConvContext::new(conversation, self.public_base_url.clone());

        let event = match kind {
            InboundKind::Text(text) => Event::TextMessage { text },
            InboundKind::Postback(data) => Event::Postback { data },
        };

        tracing::info!(
            conversation = %context.conversation,
            state = state.name(),
            event = event_name(&event),
            "Processing inbound event"
        );

        let mut outcome = RunOutcome {
            reply_token: &reply_token,
            replied: false,
        };

        // Process events in a loop to handle chained effects
        let mut events_to_process = vec![event];

        while let Some(current_event) = events_to_process.pop() {
            // Pure state transition
            let result = transition(&state, &context, current_event).inspect_err(|e| {
                tracing::error!(
                    conversation = %context.conversation,
                    state = state.name(),
                    error = %e,
                    "Transition rejected"
                );
            })?;

            if result.new_state.name() != state.name() {
                tracing::debug!(
                    conversation = %context.conversation,
                    from = state.name(),
                    to = result.new_state.name(),
                    "State changed"
                );
            }
            state = result.new_state;

            // Execute effects and collect generated events
            for effect in result.effects {
                if let Some(generated_event) =
                    self.execute_effect(&context, effect, &mut outcome).await?
                {
                    events_to_process.push(generated_event);
                }
            }
        }

        if outcome.replied {
            Ok(())
        } else {
            Err(RuntimeError::NoReply(context.conversation.to_string()))
        }
    }

    /// Execute an effect and optionally return a generated event
    async fn execute_effect(
        &self,
        context: &ConvContext,
        effect: Effect,
        outcome: &mut RunOutcome<'_>,
    ) -> Result<Option<Event>, RuntimeError> {
        match effect {
            Effect::RequestTranslation { text } => {
                let event = match self.translator.translate(&text).await {
                    Ok(result) => Event::TranslationComplete { result },
                    Err(error) => Event::TranslationFailed { error },
                };
                Ok(Some(event))
            }

            Effect::PersistResult { result } => {
                let version = self
                    .sessions
                    .put(context.conversation.clone(), result.clone())
                    .await;
                tracing::debug!(
                    conversation = %context.conversation,
                    version,
                    entries = result.len(),
                    "Stored translation"
                );
                Ok(Some(Event::ResultStored { version, result }))
            }

            Effect::RequestSynthesis { translation } => {
                let event = match self
                    .speech
                    .synthesize(&translation.text, translation.language)
                    .await
                {
                    Ok(artifact) => Event::SynthesisComplete { artifact },
                    Err(error) => Event::SynthesisFailed {
                        language: translation.language,
                        error,
                    },
                };
                Ok(Some(event))
            }

            Effect::Reply { payload } => {
                self.send_reply(context, &payload, outcome).await?;
                Ok(None)
            }

            Effect::RecordFailure { failure } => {
                tracing::warn!(
                    conversation = %context.conversation,
                    failure = %failure,
                    "Event degraded"
                );
                Ok(None)
            }
        }
    }

    async fn send_reply(
        &self,
        context: &ConvContext,
        payload: &ReplyPayload,
        outcome: &mut RunOutcome<'_>,
    ) -> Result<(), RuntimeError> {
        if outcome.replied {
            // Reply tokens are single use
            tracing::error!(
                conversation = %context.conversation,
                "Dropping second reply for one event"
            );
            return Ok(());
        }
        outcome.replied = true;

        self.replies
            .reply(outcome.reply_token, payload)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    conversation = %context.conversation,
                    error = %e,
                    "Failed to send reply"
                );
            })?;

        tracing::info!(
            conversation = %context.conversation,
            texts = payload.texts().len(),
            audio = payload.audio_count(),
            quick_replies = payload.quick_replies.len(),
            "Reply sent"
        );
        Ok(())
    }
}

fn event_name(event: &Event) -> &'static str {
    match event {
        Event::TextMessage { .. } => "text",
        Event::Postback { .. } => "postback",
        _ => "internal",
    }
}
