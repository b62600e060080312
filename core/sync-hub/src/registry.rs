//! Connected clients and fan-out.
//!
//! Each connection registers a cloned write half. Relays go to every client
//! except the sender; a client whose write fails is dropped from the registry
//! and its reader thread finishes on the next read error or EOF.

use std::collections::BTreeMap;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};

const WRITE_TIMEOUT_MS: u64 = 500;

pub type ClientId = u64;

/// A write half the registry can fan out to. Implemented for Unix streams;
/// tests use in-memory buffers.
pub trait ClientSink: Send {
    fn send_line(&mut self, line: &[u8]) -> std::io::Result<()>;
}

impl ClientSink for UnixStream {
    fn send_line(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.write_all(line)?;
        self.flush()
    }
}

#[derive(Default)]
pub struct Registry {
    clients: Mutex<BTreeMap<ClientId, Box<dyn ClientSink>>>,
    next_id: AtomicU64,
}

impl Registry {
    pub fn register(&self, sink: Box<dyn ClientSink>) -> ClientId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut clients = self.lock();
        clients.insert(id, sink);
        debug!(client = id, connected = clients.len(), "Client registered");
        id
    }

    pub fn register_stream(&self, stream: &UnixStream) -> std::io::Result<ClientId> {
        let writer = stream.try_clone()?;
        writer.set_write_timeout(Some(Duration::from_millis(WRITE_TIMEOUT_MS)))?;
        Ok(self.register(Box::new(writer)))
    }

    pub fn remove(&self, id: ClientId) {
        let mut clients = self.lock();
        if clients.remove(&id).is_some() {
            debug!(client = id, connected = clients.len(), "Client removed");
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Writes `line` to every client but `from`; returns how many received it.
    pub fn relay(&self, from: ClientId, line: &[u8]) -> usize {
        let mut clients = self.lock();
        let mut failed = Vec::new();
        let mut delivered = 0;

        for (&id, sink) in clients.iter_mut() {
            if id == from {
                continue;
            }
            match sink.send_line(line) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    warn!(client = id, error = %err, "Dropping unreachable client");
                    failed.push(id);
                }
            }
        }

        for id in failed {
            clients.remove(&id);
        }
        delivered
    }

    /// Writes `line` to `to` only.
    pub fn reply(&self, to: ClientId, line: &[u8]) {
        let mut clients = self.lock();
        let failed = match clients.get_mut(&to) {
            Some(sink) => sink.send_line(line).is_err(),
            None => false,
        };
        if failed {
            clients.remove(&to);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<ClientId, Box<dyn ClientSink>>> {
        self.clients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Arc;

    /// Sink that records lines, optionally failing every write.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink {
        pub lines: Arc<Mutex<Vec<Vec<u8>>>>,
        pub broken: bool,
    }

    impl ClientSink for RecordingSink {
        fn send_line(&mut self, line: &[u8]) -> std::io::Result<()> {
            if self.broken {
                return Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
            }
            self.lines.lock().unwrap().push(line.to_vec());
            Ok(())
        }
    }

    #[test]
    fn relay_skips_sender() {
        let registry = Registry::default();
        let a = RecordingSink::default();
        let b = RecordingSink::default();
        let a_id = registry.register(Box::new(a.clone()));
        registry.register(Box::new(b.clone()));

        assert_eq!(registry.relay(a_id, b"hello\n"), 1);
        assert!(a.lines.lock().unwrap().is_empty());
        assert_eq!(b.lines.lock().unwrap().as_slice(), &[b"hello\n".to_vec()]);
    }

    #[test]
    fn broken_clients_are_dropped() {
        let registry = Registry::default();
        let sender = registry.register(Box::new(RecordingSink::default()));
        registry.register(Box::new(RecordingSink {
            broken: true,
            ..RecordingSink::default()
        }));
        assert_eq!(registry.len(), 2);

        assert_eq!(registry.relay(sender, b"x\n"), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reply_goes_to_one_client() {
        let registry = Registry::default();
        let a = RecordingSink::default();
        let b = RecordingSink::default();
        let a_id = registry.register(Box::new(a.clone()));
        registry.register(Box::new(b.clone()));

        registry.reply(a_id, b"err\n");
        assert_eq!(a.lines.lock().unwrap().len(), 1);
        assert!(b.lines.lock().unwrap().is_empty());
    }
}
