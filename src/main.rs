//! Transvoice - translating LINE bot with on-demand speech
//!
//! Receives chat messages over a webhook, translates them, and offers the
//! translations as synthesized audio through quick-reply choices.

mod api;
mod config;
mod language;
mod line;
mod reply;
mod runtime;
mod session;
mod speech;
mod state_machine;
mod translation;

use api::{create_router, AppState};
use config::AppConfig;
use line::{LineClient, LineWebhook};
use runtime::ProductionRuntime;
use session::SessionStore;
use speech::{AzureSpeechSynthesizer, SpeechService};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use translation::{AzureTranslator, LoggingTranslator, TranslationService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bounds for how often background cleanup runs
const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);
const MAX_CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local development: pick up a .env file if present
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transvoice=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    if let Ok(path) = dotenv {
        tracing::info!(path = %path.display(), "Loaded environment file");
    }

    // Configuration
    let config = AppConfig::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;

    // Ensure audio directory exists
    tokio::fs::create_dir_all(&config.audio_dir).await?;
    tracing::info!(path = %config.audio_dir.display(), "Serving audio files");

    // Gateways
    let translator = Arc::new(LoggingTranslator::new(
        Arc::new(AzureTranslator::new(
            config.translator.key.clone(),
            config.translator.region.clone(),
            &config.translator.endpoint,
        )?),
        "azure",
    ));
    let translation = Arc::new(TranslationService::new(translator, config.policy.clone()));

    let synthesizer = Arc::new(AzureSpeechSynthesizer::new(
        config.speech.key.clone(),
        &config.speech.region,
    )?);
    let speech = Arc::new(SpeechService::new(synthesizer, config.audio_dir.clone()));

    let replies = Arc::new(LineClient::new(config.line.channel_access_token.clone())?);

    tracing::info!(
        local = %config.policy.local_target(),
        foreign = ?config.policy.foreign_targets(),
        "Language policy configured"
    );

    // Session store and background cleanup
    let sessions = Arc::new(SessionStore::new(config.session_ttl));
    let shutdown = CancellationToken::new();
    let mut background = Vec::new();

    if let Some(ttl) = config.session_ttl {
        tracing::info!(ttl_secs = ttl.as_secs(), "Session expiry enabled");
        background.push(session::spawn_evictor(
            sessions.clone(),
            cleanup_interval(ttl),
            shutdown.child_token(),
        ));
    }
    if let Some(max_age) = config.audio_retention {
        tracing::info!(max_age_secs = max_age.as_secs(), "Audio retention enabled");
        background.push(speech::retention::spawn_sweeper(
            config.audio_dir.clone(),
            max_age,
            cleanup_interval(max_age),
            shutdown.child_token(),
        ));
    }

    // Create application state
    let runtime: ProductionRuntime = runtime::ConversationRuntime::new(
        sessions.clone(),
        translation,
        speech,
        replies,
        config.public_url.clone(),
    );
    let state = AppState::new(
        Arc::new(runtime),
        LineWebhook::new(config.line.channel_secret.clone()),
        sessions,
        config.audio_dir.clone(),
    );

    let app = create_router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Transvoice listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    for handle in background {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Background task ended abnormally");
        }
    }
    tracing::info!("Shut down");

    Ok(())
}

fn cleanup_interval(age: Duration) -> Duration {
    (age / 2).clamp(MIN_CLEANUP_INTERVAL, MAX_CLEANUP_INTERVAL)
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                shutdown.cancelled().await;
                return;
            }
            tracing::info!("Shutdown requested");
        }
        () = shutdown.cancelled() => {}
    }
}
