//! Per-connection read loop and envelope validation.

use std::io::{BufReader, ErrorKind};
use std::os::unix::net::UnixStream;
use std::sync::Arc;

use ironquest_sync_protocol::{encode_line, parse_envelope, read_frame, ErrorInfo, HubFrame};
use tracing::{debug, warn};

use crate::registry::{ClientId, Registry};

pub fn handle_connection(stream: UnixStream, registry: Arc<Registry>) {
    let id = match registry.register_stream(&stream) {
        Ok(id) => id,
        Err(err) => {
            warn!(error = %err, "Failed to register client");
            return;
        }
    };

    let mut reader = BufReader::new(stream);
    loop {
        match read_frame(&mut reader) {
            Ok(Some(line)) => handle_line(&registry, id, &line),
            Ok(None) => break,
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                warn!(client = id, "Closing client after oversized frame");
                reply_error(
                    &registry,
                    id,
                    ErrorInfo::new("frame_too_large", "envelope exceeds size limit"),
                );
                break;
            }
            Err(err) => {
                debug!(client = id, error = %err, "Client read failed");
                break;
            }
        }
    }

    registry.remove(id);
}

/// Validates one line from `from` and relays it, or answers with an error.
pub fn handle_line(registry: &Registry, from: ClientId, line: &[u8]) {
    if line.iter().all(u8::is_ascii_whitespace) {
        return;
    }

    let envelope = match parse_envelope(line) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!(client = from, code = %err.code, message = %err.message, "Rejected envelope");
            reply_error(registry, from, err);
            return;
        }
    };

    debug!(
        client = from,
        origin = %envelope.origin,
        seq = envelope.seq,
        mutation = %envelope.mutation,
        "Relaying envelope"
    );
    match encode_line(&HubFrame::Relay { envelope }) {
        Ok(bytes) => {
            registry.relay(from, &bytes);
        }
        Err(err) => warn!(error = %err, "Failed to encode relay frame"),
    }
}

fn reply_error(registry: &Registry, to: ClientId, error: ErrorInfo) {
    match encode_line(&HubFrame::Error { error }) {
        Ok(bytes) => registry.reply(to, &bytes),
        Err(err) => warn!(error = %err, "Failed to encode error frame"),
    }
}
