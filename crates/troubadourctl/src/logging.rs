//! Diagnostic tracing for troubadourctl
//!
//! The terminal presenter owns the screen, so diagnostics never go to
//! stdout or stderr. They are appended to a trace file found through a
//! fallback chain:
//!
//! 1. `[log] file` from the config (explicit override)
//! 2. /var/log/troubadour/troubadourctl.log
//! 3. $XDG_STATE_HOME/troubadour/troubadourctl.log
//! 4. ~/.local/state/troubadour/troubadourctl.log
//!
//! If none can be opened, diagnostics are discarded.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use troubadour_common::config::LogConfig;

const TRACE_FILE: &str = "troubadourctl.log";
const SYSTEM_LOG_DIR: &str = "/var/log/troubadour";

/// Candidate trace file locations in priority order
pub fn candidate_paths(config: &LogConfig) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(file) = &config.file {
        paths.push(file.clone());
    }

    paths.push(Path::new(SYSTEM_LOG_DIR).join(TRACE_FILE));

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        if !xdg_state.is_empty() {
            paths.push(Path::new(&xdg_state).join("troubadour").join(TRACE_FILE));
        }
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(
            home.join(".local")
                .join("state")
                .join("troubadour")
                .join(TRACE_FILE),
        );
    }

    paths
}

fn open_append(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// First candidate that opens for appending
pub fn open_trace_file(config: &LogConfig) -> Option<(PathBuf, File)> {
    candidate_paths(config)
        .into_iter()
        .find_map(|path| open_append(&path).map(|file| (path, file)))
}

/// Install the global subscriber. `RUST_LOG` overrides `level`.
///
/// Returns the trace file in use, if any.
pub fn init(config: &LogConfig, verbose: bool) -> Option<PathBuf> {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match open_trace_file(config) {
        Some((path, file)) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file))
                .try_init();
            Some(path)
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::sink)
                .try_init();
            None
        }
    }
}
