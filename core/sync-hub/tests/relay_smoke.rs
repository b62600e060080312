use chrono::Utc;
use ironquest_sync_protocol::{encode_line, HubFrame, SyncEnvelope, PROTOCOL_VERSION};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};
use tempfile::TempDir;

struct HubGuard {
    child: Child,
}

impl Drop for HubGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn spawn_hub(root: &Path) -> HubGuard {
    let child = Command::new(env!("CARGO_BIN_EXE_ironquest-sync-hub"))
        .env("IRONQUEST_HOME", root)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn ironquest-sync-hub");
    HubGuard { child }
}

fn connect(socket: &Path, timeout: Duration) -> UnixStream {
    let deadline = Instant::now() + timeout;
    loop {
        match UnixStream::connect(socket) {
            Ok(stream) => {
                stream
                    .set_read_timeout(Some(Duration::from_secs(3)))
                    .expect("set read timeout");
                return stream;
            }
            Err(_) if Instant::now() < deadline => sleep(Duration::from_millis(25)),
            Err(err) => panic!("Timed out connecting to hub at {}: {}", socket.display(), err),
        }
    }
}

fn envelope(origin: &str, seq: u64) -> SyncEnvelope {
    SyncEnvelope {
        protocol_version: PROTOCOL_VERSION,
        origin: origin.to_string(),
        seq,
        recorded_at: Utc::now().to_rfc3339(),
        mutation: "updateField".to_string(),
        payload: Some(serde_json::json!({ "field": "ironman", "value": true })),
    }
}

fn read_frame(stream: &UnixStream) -> HubFrame {
    let mut line = String::new();
    BufReader::new(stream)
        .read_line(&mut line)
        .expect("Failed to read hub frame");
    serde_json::from_str(line.trim_end()).expect("Failed to parse hub frame")
}

#[test]
fn relays_to_other_clients_only() {
    let temp = TempDir::new().expect("tempdir");
    let _hub = spawn_hub(temp.path());
    let socket = temp.path().join("sync.sock");

    let mut sender = connect(&socket, Duration::from_secs(5));
    let receiver = connect(&socket, Duration::from_secs(5));
    // Give the hub a moment to register both connections.
    sleep(Duration::from_millis(100));

    sender
        .write_all(&encode_line(&envelope("window-a", 1)).unwrap())
        .expect("write envelope");

    match read_frame(&receiver) {
        HubFrame::Relay { envelope } => {
            assert_eq!(envelope.origin, "window-a");
            assert_eq!(envelope.seq, 1);
        }
        other => panic!("expected relay, got {:?}", other),
    }

    sender
        .set_read_timeout(Some(Duration::from_millis(200)))
        .unwrap();
    let mut echo = String::new();
    let read = BufReader::new(&sender).read_line(&mut echo);
    assert!(
        read.is_err() || echo.is_empty(),
        "sender received its own envelope: {}",
        echo
    );
}

#[test]
fn invalid_envelope_is_answered_with_error() {
    let temp = TempDir::new().expect("tempdir");
    let _hub = spawn_hub(temp.path());
    let socket = temp.path().join("sync.sock");

    let mut client = connect(&socket, Duration::from_secs(5));
    let mut bad = envelope("window-a", 0);
    bad.mutation = "setParameters".to_string();
    client
        .write_all(&encode_line(&bad).unwrap())
        .expect("write envelope");

    match read_frame(&client) {
        HubFrame::Error { error } => assert_eq!(error.code, "invalid_seq"),
        other => panic!("expected error, got {:?}", other),
    }
}
