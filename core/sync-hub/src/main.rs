//! IronQuest sync hub entrypoint.
//!
//! Relays store mutations between overlay windows. Each window holds one
//! long-lived connection to `~/.ironquest/sync.sock` and writes one JSON
//! envelope per line; the hub validates each line and forwards it to every
//! other connected window. The hub keeps no history: a window that connects
//! late starts from the persisted parameters.

use fs_err as fs;
use std::env;
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod registry;
mod relay;

use registry::Registry;

const HOME_ENV: &str = "IRONQUEST_HOME";
const DEBUG_ENV: &str = "IRONQUEST_DEBUG_LOG";
const SOCKET_NAME: &str = "sync.sock";

fn main() {
    init_logging();

    let socket_path = match hub_socket_path() {
        Ok(path) => path,
        Err(err) => {
            error!(error = %err, "Failed to resolve sync hub socket path");
            std::process::exit(1);
        }
    };

    if let Err(err) = prepare_socket_dir(&socket_path) {
        error!(error = %err, "Failed to prepare sync hub socket directory");
        std::process::exit(1);
    }

    if let Err(err) = remove_existing_socket(&socket_path) {
        error!(error = %err, path = %socket_path.display(), "Failed to remove existing socket");
        std::process::exit(1);
    }

    let listener = match UnixListener::bind(&socket_path) {
        Ok(listener) => listener,
        Err(err) => {
            error!(error = %err, path = %socket_path.display(), "Failed to bind sync hub socket");
            std::process::exit(1);
        }
    };

    info!(path = %socket_path.display(), "IronQuest sync hub started");

    let registry = Arc::new(Registry::default());
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let registry = Arc::clone(&registry);
                thread::spawn(move || relay::handle_connection(stream, registry));
            }
            Err(err) => {
                warn!(error = %err, "Failed to accept sync hub connection");
            }
        }
    }
}

fn init_logging() {
    let debug_enabled = env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn hub_socket_path() -> Result<PathBuf, String> {
    if let Ok(root) = env::var(HOME_ENV) {
        if !root.trim().is_empty() {
            return Ok(PathBuf::from(root).join(SOCKET_NAME));
        }
    }
    let home = dirs::home_dir().ok_or_else(|| "Home directory not found".to_string())?;
    Ok(home.join(".ironquest").join(SOCKET_NAME))
}

fn prepare_socket_dir(socket_path: &Path) -> Result<(), String> {
    let parent = socket_path
        .parent()
        .ok_or_else(|| "Socket path has no parent".to_string())?;
    fs::create_dir_all(parent).map_err(|err| format!("Failed to create socket directory: {}", err))
}

fn remove_existing_socket(socket_path: &Path) -> Result<(), String> {
    if socket_path.exists() {
        fs::remove_file(socket_path)
            .map_err(|err| format!("Failed to remove existing socket: {}", err))?;
    }
    Ok(())
}
