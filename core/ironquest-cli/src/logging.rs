//! Logging for the `ironquest` binary.
//!
//! Warnings and errors go to stderr so a failing command says why. Everything
//! at the active filter level also goes to `~/.ironquest/logs/ironquest.log.<date>`.
//! `IRONQUEST_DEBUG_LOG=1` forces `debug`; otherwise `RUST_LOG` applies,
//! defaulting to `info`.

use std::path::PathBuf;

use quest_core::StorageConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const DEBUG_ENV: &str = "IRONQUEST_DEBUG_LOG";
const LOG_FILE_PREFIX: &str = "ironquest.log";

/// Installs the global subscriber. Keep the returned guard alive until exit
/// or buffered file lines are lost. Without a usable logs directory only
/// the stderr layer is installed.
pub fn init() -> Option<WorkerGuard> {
    let (file, guard) = match logs_dir() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(env_filter(std::env::var(DEBUG_ENV).ok().as_deref()))
        .with(file)
        .with(stderr)
        .init();
    guard
}

fn env_filter(debug_flag: Option<&str>) -> EnvFilter {
    let debug_enabled = matches!(debug_flag, Some("1" | "true" | "TRUE" | "yes" | "YES"));
    if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn logs_dir() -> Option<PathBuf> {
    let dir = StorageConfig::from_env().ok()?.logs_dir();
    fs_err::create_dir_all(&dir).ok()?;
    Some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_forces_debug_level() {
        assert_eq!(env_filter(Some("1")).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(env_filter(Some("yes")).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
