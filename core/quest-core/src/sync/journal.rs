//! Journal strategy: an append-only JSON-lines file shared by all windows.
//!
//! Every window appends its envelopes and polls from the byte offset it last
//! read up to. A window starts reading at the end of the journal; older
//! history is covered by the persisted parameters.
//!
//! An oversized journal is rotated when a window opens it: the file is
//! renamed to `<name>.1` and a fresh one takes its place. Readers remember
//! the inode they were reading, so after a rotation they finish the rotated
//! file from their old offset before starting the new file at zero.

use std::ffi::OsString;
use std::io::{Read, Seek, SeekFrom, Write};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use ironquest_sync_protocol::{encode_line, SyncEnvelope};

use super::SyncStrategy;
use crate::error::{QuestError, Result};

const MAX_JOURNAL_BYTES: u64 = 4 * 1024 * 1024;

pub struct JournalStrategy {
    path: PathBuf,
    inode: u64,
    offset: u64,
}

impl JournalStrategy {
    pub fn open(path: PathBuf) -> Result<Self> {
        Self::open_with_limit(path, MAX_JOURNAL_BYTES)
    }

    fn open_with_limit(path: PathBuf, max_bytes: u64) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)
                .map_err(|e| QuestError::io("creating sync journal directory", e))?;
        }

        let mut metadata = open_for_append(&path)?
            .metadata()
            .map_err(|e| QuestError::io("reading sync journal metadata", e))?;
        if metadata.len() > max_bytes {
            tracing::info!(bytes = metadata.len(), "Rotating oversized sync journal");
            fs_err::rename(&path, rotated_path(&path))
                .map_err(|e| QuestError::io("rotating sync journal", e))?;
            metadata = open_for_append(&path)?
                .metadata()
                .map_err(|e| QuestError::io("reading sync journal metadata", e))?;
        }

        Ok(Self {
            path,
            inode: metadata.ino(),
            offset: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads what is left of the rotated file if it is the one this reader
    /// was following.
    fn drain_rotated(&mut self) -> Result<Vec<SyncEnvelope>> {
        let mut file = match fs_err::File::open(rotated_path(&self.path)) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(QuestError::io("opening rotated sync journal", err)),
        };
        let inode = file
            .metadata()
            .map_err(|e| QuestError::io("reading sync journal metadata", e))?
            .ino();
        if inode != self.inode {
            return Ok(Vec::new());
        }
        read_complete_lines(&mut file, &mut self.offset)
    }
}

impl SyncStrategy for JournalStrategy {
    fn name(&self) -> &'static str {
        "journal"
    }

    fn publish(&mut self, envelope: &SyncEnvelope) -> Result<()> {
        let line =
            encode_line(envelope).map_err(|e| QuestError::json("encoding sync envelope", e))?;
        open_for_append(&self.path)?
            .write_all(&line)
            .map_err(|e| QuestError::io("appending to sync journal", e))
    }

    fn poll(&mut self) -> Result<Vec<SyncEnvelope>> {
        let mut file = match fs_err::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                self.offset = 0;
                return Ok(Vec::new());
            }
            Err(err) => return Err(QuestError::io("opening sync journal", err)),
        };

        let inode = file
            .metadata()
            .map_err(|e| QuestError::io("reading sync journal metadata", e))?
            .ino();
        let mut envelopes = Vec::new();
        if inode != self.inode {
            tracing::debug!("Sync journal was rotated; finishing the old file");
            envelopes = self.drain_rotated()?;
            self.inode = inode;
            self.offset = 0;
        }

        envelopes.extend(read_complete_lines(&mut file, &mut self.offset)?);
        Ok(envelopes)
    }
}

fn open_for_append(path: &Path) -> Result<fs_err::File> {
    fs_err::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| QuestError::io("opening sync journal", e))
}

fn rotated_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| OsString::from("sync-journal.jsonl"));
    name.push(".1");
    path.with_file_name(name)
}

/// Parses the complete lines after `offset` and advances it past them.
fn read_complete_lines(file: &mut fs_err::File, offset: &mut u64) -> Result<Vec<SyncEnvelope>> {
    let len = file
        .metadata()
        .map_err(|e| QuestError::io("reading sync journal metadata", e))?
        .len();
    if len < *offset {
        tracing::debug!("Sync journal was truncated; rereading from start");
        *offset = 0;
    }
    if len == *offset {
        return Ok(Vec::new());
    }

    file.seek(SeekFrom::Start(*offset))
        .map_err(|e| QuestError::io("seeking sync journal", e))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .map_err(|e| QuestError::io("reading sync journal", e))?;

    // A writer may be mid-line; leave the partial tail for the next poll.
    let complete = match buffer.iter().rposition(|byte| *byte == b'\n') {
        Some(last_newline) => last_newline + 1,
        None => return Ok(Vec::new()),
    };
    *offset += complete as u64;

    Ok(buffer[..complete]
        .split(|byte| *byte == b'\n')
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_slice::<SyncEnvelope>(line) {
            Ok(envelope) => Some(envelope),
            Err(err) => {
                tracing::warn!(error = %err, "Skipping malformed sync journal line");
                None
            }
        })
        .collect())
}
