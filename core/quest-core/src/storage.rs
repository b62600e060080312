//! Storage configuration and path management for IronQuest.
//!
//! All on-disk locations are derived from one root directory so tests can
//! point the whole client at a temp dir.
//!
//! ## Layout
//!
//! ```text
//! ~/.ironquest/
//!   parameters.json      persisted search parameters (cold-start source)
//!   config.json          client configuration
//!   sync-journal.jsonl   storage-event sync journal
//!   sync.sock            sync hub socket
//!   logs/                rolling log files
//! ```

use std::path::{Path, PathBuf};

use crate::error::{QuestError, Result};

const HOME_ENV: &str = "IRONQUEST_HOME";

/// Central configuration for all IronQuest storage paths.
///
/// Production code uses [`StorageConfig::from_env`], which honours
/// `IRONQUEST_HOME` and otherwise points to `~/.ironquest/`.
/// Tests use [`StorageConfig::with_root`] for isolation.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    root: PathBuf,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self> {
        if let Ok(root) = std::env::var(HOME_ENV) {
            if !root.trim().is_empty() {
                return Ok(Self::with_root(PathBuf::from(root)));
            }
        }
        let home = dirs::home_dir().ok_or(QuestError::HomeDirNotFound)?;
        Ok(Self::with_root(home.join(".ironquest")))
    }

    /// Creates a StorageConfig with a custom root directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Files
    // ─────────────────────────────────────────────────────────────────────────────

    pub fn parameters_file(&self) -> PathBuf {
        self.root.join("parameters.json")
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn sync_journal_file(&self) -> PathBuf {
        self.root.join("sync-journal.jsonl")
    }

    pub fn hub_socket(&self) -> PathBuf {
        self.root.join("sync.sock")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Ensures the root directory exists.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs_err::create_dir_all(&self.root)
            .map_err(|e| QuestError::io("creating storage root", e))
    }
}
