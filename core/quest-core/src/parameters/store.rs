//! Persistence for [`Parameters`].
//!
//! The store reads one blob at start-up and writes it back whenever a committed
//! mutation leaves the parameters different from what was last written. It is
//! registered as a [`Subscriber`] on the application store; nothing else
//! calls `save`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;

use super::Parameters;
use crate::error::{QuestError, Result};
use crate::mutation::{AppState, Mutation};
use crate::store::Subscriber;

/// A key-value slot holding the serialized parameters.
pub trait ParameterSlot: Send {
    /// Returns `None` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>>;
    fn write(&mut self, contents: &str) -> Result<()>;
}

/// `parameters.json` in the storage root, replaced atomically on write.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ParameterSlot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match fs_err::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(QuestError::io("reading stored parameters", err)),
        }
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| QuestError::Io {
            context: format!("{} has no parent directory", self.path.display()),
            source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
        })?;
        fs_err::create_dir_all(parent)
            .map_err(|e| QuestError::io("creating parameters directory", e))?;

        let mut temp_file = NamedTempFile::new_in(parent)
            .map_err(|e| QuestError::io("creating temp parameters file", e))?;
        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| QuestError::io("writing temp parameters file", e))?;
        temp_file
            .flush()
            .map_err(|e| QuestError::io("flushing temp parameters file", e))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| QuestError::io("replacing parameters file", e.error))?;
        Ok(())
    }
}

/// In-memory slot; clones share the same cell so tests can inspect writes.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    cell: Arc<Mutex<Option<String>>>,
}

impl MemorySlot {
    pub fn with_contents(contents: &str) -> Self {
        Self {
            cell: Arc::new(Mutex::new(Some(contents.to_string()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.cell
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl ParameterSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        let mut guard = self
            .cell
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(contents.to_string());
        Ok(())
    }
}

pub struct ParameterStore {
    slot: Box<dyn ParameterSlot>,
    last_saved: Option<Parameters>,
}

impl ParameterStore {
    pub fn new(slot: impl ParameterSlot + 'static) -> Self {
        Self {
            slot: Box::new(slot),
            last_saved: None,
        }
    }

    /// Reads the stored parameters, merged over the defaults.
    ///
    /// Never fails: an unreadable slot is logged and treated as empty.
    pub fn load(&mut self) -> Parameters {
        let stored = match self.slot.read() {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read stored parameters; using defaults");
                None
            }
        };
        let params = Parameters::from_stored(stored.as_deref());
        self.last_saved = Some(params.clone());
        params
    }

    pub fn save(&mut self, params: &Parameters) -> Result<()> {
        let contents = serde_json::to_string(params)
            .map_err(|e| QuestError::json("serializing parameters", e))?;
        self.slot.write(&contents)?;
        self.last_saved = Some(params.clone());
        Ok(())
    }
}

impl Subscriber for ParameterStore {
    fn on_commit(&mut self, mutation: &Mutation, state: &AppState) {
        if self.last_saved.as_ref() == Some(&state.parameters) {
            return;
        }
        if let Err(err) = self.save(&state.parameters) {
            tracing::warn!(
                error = %err,
                mutation = mutation.name(),
                "Failed to persist parameters"
            );
        }
    }
}
