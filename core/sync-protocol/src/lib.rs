//! Wire protocol types and validation for IronQuest cross-window sync.
//!
//! This crate is shared by the sync hub and the window clients so both sides
//! agree on the framing. Every frame is a single line of JSON terminated by
//! `\n`. Clients write [`SyncEnvelope`] lines; the hub answers with
//! [`HubFrame`] lines (relayed envelopes from other windows, or an error
//! addressed to the sender only).

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, Read};

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_FRAME_BYTES: usize = 256 * 1024; // 256KB
pub const MAX_ORIGIN_LEN: usize = 64;
pub const MAX_MUTATION_NAME_LEN: usize = 64;

/// One store mutation, as broadcast by the window that committed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncEnvelope {
    pub protocol_version: u32,
    /// Stable id of the sending window for the lifetime of its process.
    pub origin: String,
    /// Per-origin sequence number, starting at 1.
    pub seq: u64,
    pub recorded_at: String,
    /// Mutation name, e.g. `setParameters`.
    pub mutation: String,
    #[serde(default)]
    pub payload: Option<Value>,
}

impl SyncEnvelope {
    pub fn validate(&self) -> Result<(), ErrorInfo> {
        if self.protocol_version != PROTOCOL_VERSION {
            return Err(ErrorInfo::new(
                "unsupported_version",
                format!(
                    "protocol_version {} is not supported (expected {})",
                    self.protocol_version, PROTOCOL_VERSION
                ),
            ));
        }

        if self.origin.trim().is_empty() {
            return Err(ErrorInfo::new("invalid_origin", "origin is required"));
        }
        if self.origin.len() > MAX_ORIGIN_LEN {
            return Err(ErrorInfo::new(
                "invalid_origin",
                format!("origin must be {} characters or fewer", MAX_ORIGIN_LEN),
            ));
        }

        if self.seq == 0 {
            return Err(ErrorInfo::new("invalid_seq", "seq must start at 1"));
        }

        if DateTime::parse_from_rfc3339(&self.recorded_at).is_err() {
            return Err(ErrorInfo::new(
                "invalid_timestamp",
                "recorded_at must be RFC3339",
            ));
        }

        if self.mutation.trim().is_empty() || self.mutation.len() > MAX_MUTATION_NAME_LEN {
            return Err(ErrorInfo::new(
                "invalid_mutation",
                "mutation name is required and must be short",
            ));
        }

        Ok(())
    }

    /// Identity used by receivers to drop duplicate deliveries.
    pub fn delivery_key(&self) -> (String, u64) {
        (self.origin.clone(), self.seq)
    }
}

/// Frames written by the hub to its clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HubFrame {
    Relay { envelope: SyncEnvelope },
    Error { error: ErrorInfo },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

pub fn parse_envelope(line: &[u8]) -> Result<SyncEnvelope, ErrorInfo> {
    if line.len() > MAX_FRAME_BYTES {
        return Err(ErrorInfo::new("frame_too_large", "envelope exceeds size limit"));
    }
    let envelope: SyncEnvelope = serde_json::from_slice(line).map_err(|err| {
        ErrorInfo::new("invalid_json", format!("envelope is invalid JSON: {}", err))
    })?;
    envelope.validate()?;
    Ok(envelope)
}

/// Serializes a frame as one newline-terminated JSON line.
pub fn encode_line<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Reads the next newline-delimited frame, without the trailing newline.
///
/// Returns `Ok(None)` at end of stream. Frames longer than
/// [`MAX_FRAME_BYTES`] are reported as `InvalidData` so the caller can drop
/// the connection instead of buffering without bound.
pub fn read_frame<R: BufRead>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut buffer = Vec::new();
    let limit = (MAX_FRAME_BYTES + 1) as u64;
    let read = reader.by_ref().take(limit).read_until(b'\n', &mut buffer)?;

    if read == 0 {
        return Ok(None);
    }

    if buffer.last() == Some(&b'\n') {
        buffer.pop();
    } else if buffer.len() > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "frame exceeded maximum size",
        ));
    }

    Ok(Some(buffer))
}
