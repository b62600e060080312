//! Client configuration loading and saving.
//!
//! `config.json` lives in the storage root. A missing file means defaults; a
//! malformed file is logged and also yields defaults so a bad edit never keeps
//! the overlay from starting. Environment variables override the file:
//!
//! - `IRONQUEST_API_URL`: API base URL
//! - `IRONQUEST_SYNC`: `auto`, `hub` or `journal`

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::{QuestError, Result};
use crate::storage::StorageConfig;
use crate::sync::{SharePredicate, StrategyKind};

const API_URL_ENV: &str = "IRONQUEST_API_URL";
const SYNC_ENV: &str = "IRONQUEST_SYNC";

pub const DEFAULT_API_BASE_URL: &str = "https://iron-quest.herokuapp.com";
pub const DEFAULT_API_PREFIX: &str = "/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Path prefix in front of `/quests`; `/api` for the hosted deployment,
    /// empty when talking to the server directly.
    pub api_prefix: String,
    /// `None` waits forever, which leaves the UI loading until the server
    /// answers.
    pub request_timeout_secs: Option<u64>,
    pub sync_strategy: StrategyKind,
    pub share: SharePredicate,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            sync_strategy: StrategyKind::Auto,
            share: SharePredicate::All,
        }
    }
}

/// Resolved API endpoint URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub path: Url,
    pub quests: Url,
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn endpoints(&self) -> Result<Endpoints> {
        let base = self.api_base_url.trim().trim_end_matches('/');
        let prefix = self.api_prefix.trim().trim_matches('/');
        let root = if prefix.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, prefix)
        };

        let parse = |suffix: &str| {
            let raw = format!("{}{}", root, suffix);
            Url::parse(&raw).map_err(|e| QuestError::InvalidApiUrl {
                url: raw.clone(),
                details: e.to_string(),
            })
        };

        Ok(Endpoints {
            path: parse("/quests/path")?,
            quests: parse("/quests")?,
        })
    }

    /// Applies `IRONQUEST_*` environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
        if let Ok(value) = std::env::var(SYNC_ENV) {
            match value.parse::<StrategyKind>() {
                Ok(kind) => self.sync_strategy = kind,
                Err(err) => tracing::warn!(error = %err, "Ignoring {}", SYNC_ENV),
            }
        }
        self
    }
}

/// Loads the client configuration, returning defaults if the file doesn't exist.
pub fn load_client_config(storage: &StorageConfig) -> ClientConfig {
    let path = storage.config_file();
    let content = match fs_err::read_to_string(&path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return ClientConfig::default().with_env_overrides()
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to read client config; using defaults");
            return ClientConfig::default().with_env_overrides();
        }
    };

    match serde_json::from_str::<ClientConfig>(&content) {
        Ok(config) => config.with_env_overrides(),
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %path.display(),
                "Client config malformed; using defaults"
            );
            ClientConfig::default().with_env_overrides()
        }
    }
}

/// Saves the client configuration to disk.
pub fn save_client_config(storage: &StorageConfig, config: &ClientConfig) -> Result<()> {
    storage.ensure_dirs()?;
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| QuestError::json("serializing client config", e))?;
    fs_err::write(storage.config_file(), content)
        .map_err(|e| QuestError::io("writing client config", e))
}
