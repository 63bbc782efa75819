//! HTTP API
//!
//! Webhook endpoint, public audio files and health probes.

mod handlers;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::line::LineWebhook;
use crate::runtime::{
    ConversationRuntime, InboundEvent, ReplySink, RuntimeError, SpeechGateway,
    TranslationGateway,
};
use crate::session::SessionStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// Processes authenticated inbound events
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn handle(&self, event: InboundEvent) -> Result<(), RuntimeError>;
}

#[async_trait]
impl<T, S, R> InboundHandler for ConversationRuntime<T, S, R>
where
    T: TranslationGateway,
    S: SpeechGateway,
    R: ReplySink,
{
    async fn handle(&self, event: InboundEvent) -> Result<(), RuntimeError> {
        self.process(event).await
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<dyn InboundHandler>,
    pub webhook: LineWebhook,
    pub sessions: Arc<SessionStore>,
    /// Directory served under [`crate::reply::AUDIO_ROUTE`]
    pub audio_dir: PathBuf,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        runtime: Arc<dyn InboundHandler>,
        webhook: LineWebhook,
        sessions: Arc<SessionStore>,
        audio_dir: PathBuf,
    ) -> Self {
        Self {
            runtime,
            webhook,
            sessions,
            audio_dir,
            started_at: Utc::now(),
        }
    }
}
