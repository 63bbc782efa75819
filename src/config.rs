//! Application configuration from environment variables

use crate::language::{parse_tag_list, LanguageTag};
use crate::translation::{LanguagePolicy, PolicyError, DEFAULT_ENDPOINT};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_AUDIO_DIR: &str = "static";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
    #[error("Invalid language policy: {0}")]
    Policy(#[from] PolicyError),
}

/// Messaging platform credentials
#[derive(Debug, Clone)]
pub struct LineConfig {
    pub channel_secret: String,
    pub channel_access_token: String,
}

/// Azure Translator credentials
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub key: String,
    pub region: String,
    pub endpoint: String,
}

/// Azure Speech credentials
#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub key: String,
    pub region: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub line: LineConfig,
    pub translator: TranslatorConfig,
    pub speech: SpeechConfig,
    /// Base URL the bot is reachable at; audio links are built from it
    pub public_url: String,
    pub policy: LanguagePolicy,
    pub audio_dir: PathBuf,
    pub port: u16,
    /// `None` keeps stored translations forever
    pub session_ttl: Option<Duration>,
    /// `None` never deletes synthesized audio
    pub audio_retention: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let local = tag_list(get("TRANSVOICE_LOCAL_LANGUAGES"), "TRANSVOICE_LOCAL_LANGUAGES")?
            .unwrap_or_else(|| vec![LanguageTag::ZhHant, LanguageTag::ZhHans]);
        let foreign = tag_list(get("TRANSVOICE_FOREIGN_TARGETS"), "TRANSVOICE_FOREIGN_TARGETS")?
            .unwrap_or_else(|| vec![LanguageTag::En, LanguageTag::Ja]);

        let public_url = require("TRANSVOICE_PUBLIC_URL")?;
        if !(public_url.starts_with("https://") || public_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                name: "TRANSVOICE_PUBLIC_URL",
                reason: format!("expected an http(s) URL, got {public_url}"),
            });
        }

        let port = match get("TRANSVOICE_PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
                name: "TRANSVOICE_PORT",
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            line: LineConfig {
                channel_secret: require("LINE_CHANNEL_SECRET")?,
                channel_access_token: require("LINE_CHANNEL_ACCESS_TOKEN")?,
            },
            translator: TranslatorConfig {
                key: require("AZURE_TRANSLATOR_KEY")?,
                region: require("AZURE_TRANSLATOR_REGION")?,
                endpoint: get("AZURE_TRANSLATOR_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            },
            speech: SpeechConfig {
                key: require("AZURE_SPEECH_KEY")?,
                region: require("AZURE_SPEECH_REGION")?,
            },
            public_url: public_url.trim_end_matches('/').to_string(),
            policy: LanguagePolicy::new(local, foreign)?,
            audio_dir: get("TRANSVOICE_AUDIO_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_AUDIO_DIR), PathBuf::from),
            port,
            session_ttl: seconds(get("TRANSVOICE_SESSION_TTL_SECS"), "TRANSVOICE_SESSION_TTL_SECS")?,
            audio_retention: seconds(
                get("TRANSVOICE_AUDIO_RETENTION_SECS"),
                "TRANSVOICE_AUDIO_RETENTION_SECS",
            )?,
        })
    }
}

fn tag_list(
    raw: Option<String>,
    name: &'static str,
) -> Result<Option<Vec<LanguageTag>>, ConfigError> {
    raw.map(|raw| {
        parse_tag_list(&raw).map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        })
    })
    .transpose()
}

fn seconds(raw: Option<String>, name: &'static str) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
        Err(e) => Err(ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}
