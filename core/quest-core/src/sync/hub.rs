//! Hub channel: a long-lived Unix socket connection to the sync hub.
//!
//! Writes happen on the caller's thread. A dedicated reader thread decodes
//! relayed frames and queues them on an mpsc channel that `poll` drains
//! without blocking.

use std::io::{BufReader, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ironquest_sync_protocol::{encode_line, read_frame, HubFrame, SyncEnvelope};

use super::SyncStrategy;
use crate::error::{QuestError, Result};

const WRITE_TIMEOUT_MS: u64 = 600;

pub struct HubChannel {
    stream: UnixStream,
    incoming: Receiver<SyncEnvelope>,
    closed: Arc<AtomicBool>,
}

impl HubChannel {
    pub fn connect(socket: &Path) -> Result<Self> {
        let stream = UnixStream::connect(socket).map_err(|e| {
            QuestError::io(format!("connecting to sync hub at {}", socket.display()), e)
        })?;
        stream
            .set_write_timeout(Some(Duration::from_millis(WRITE_TIMEOUT_MS)))
            .map_err(|e| QuestError::io("configuring sync hub socket", e))?;
        let reader = stream
            .try_clone()
            .map_err(|e| QuestError::io("cloning sync hub socket", e))?;

        let (sender, incoming) = mpsc::channel();
        let closed = Arc::new(AtomicBool::new(false));
        let reader_closed = Arc::clone(&closed);

        thread::Builder::new()
            .name("ironquest-sync-reader".to_string())
            .spawn(move || {
                read_relays(reader, sender);
                reader_closed.store(true, Ordering::SeqCst);
            })
            .map_err(|e| QuestError::io("spawning sync hub reader", e))?;

        tracing::debug!(socket = %socket.display(), "Connected to sync hub");
        Ok(Self {
            stream,
            incoming,
            closed,
        })
    }
}

fn read_relays(stream: UnixStream, sender: mpsc::Sender<SyncEnvelope>) {
    let mut reader = BufReader::new(stream);
    loop {
        let line = match read_frame(&mut reader) {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("Sync hub closed the connection");
                return;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Sync hub read failed");
                return;
            }
        };

        match serde_json::from_slice::<HubFrame>(&line) {
            Ok(HubFrame::Relay { envelope }) => {
                if sender.send(envelope).is_err() {
                    return;
                }
            }
            Ok(HubFrame::Error { error }) => {
                tracing::warn!(code = %error.code, message = %error.message, "Sync hub rejected an envelope");
            }
            Err(err) => {
                tracing::warn!(error = %err, "Ignoring malformed sync hub frame");
            }
        }
    }
}

impl SyncStrategy for HubChannel {
    fn name(&self) -> &'static str {
        "hub"
    }

    fn publish(&mut self, envelope: &SyncEnvelope) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(QuestError::Sync("sync hub connection closed".to_string()));
        }
        let line =
            encode_line(envelope).map_err(|e| QuestError::json("encoding sync envelope", e))?;
        self.stream
            .write_all(&line)
            .map_err(|e| QuestError::io("writing to sync hub", e))
    }

    fn poll(&mut self) -> Result<Vec<SyncEnvelope>> {
        let mut envelopes = Vec::new();
        loop {
            match self.incoming.try_recv() {
                Ok(envelope) => envelopes.push(envelope),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if envelopes.is_empty() {
                        return Err(QuestError::Sync(
                            "sync hub connection closed".to_string(),
                        ));
                    }
                    break;
                }
            }
        }
        Ok(envelopes)
    }
}

impl Drop for HubChannel {
    fn drop(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ironquest_sync_protocol::PROTOCOL_VERSION;
    use std::io::BufRead;
    use std::os::unix::net::UnixListener;
    use std::time::Instant;
    use tempfile::TempDir;

    fn envelope(origin: &str, seq: u64) -> SyncEnvelope {
        SyncEnvelope {
            protocol_version: PROTOCOL_VERSION,
            origin: origin.to_string(),
            seq,
            recorded_at: Utc::now().to_rfc3339(),
            mutation: "showLoader".to_string(),
            payload: None,
        }
    }

    fn poll_until_some(channel: &mut HubChannel) -> Vec<SyncEnvelope> {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            let received = channel.poll().unwrap();
            if !received.is_empty() || Instant::now() > deadline {
                return received;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_connect_fails_without_hub() {
        let temp = TempDir::new().unwrap();
        assert!(HubChannel::connect(&temp.path().join("sync.sock")).is_err());
    }

    #[test]
    fn test_publish_writes_line_and_poll_reads_relays() {
        let temp = TempDir::new().unwrap();
        let socket = temp.path().join("sync.sock");
        let listener = UnixListener::bind(&socket).unwrap();

        let mut channel = HubChannel::connect(&socket).unwrap();
        let (server, _) = listener.accept().unwrap();

        channel.publish(&envelope("me", 1)).unwrap();
        let mut line = String::new();
        BufReader::new(server.try_clone().unwrap())
            .read_line(&mut line)
            .unwrap();
        let published: SyncEnvelope = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(published.origin, "me");

        let relay = HubFrame::Relay {
            envelope: envelope("sibling", 4),
        };
        (&server).write_all(&encode_line(&relay).unwrap()).unwrap();

        let received = poll_until_some(&mut channel);
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].delivery_key(), ("sibling".to_string(), 4));
    }
}
