// SPDX-License-Identifier: GPL-3.0-only

//! Tracing subscriber setup
//!
//! The interactive scanner owns the terminal while it runs, so its logs go
//! to `$XDG_STATE_HOME/qrreader/qrreader.log` instead of stderr. The other
//! commands log to stderr. `RUST_LOG` sets the filter, `warn` otherwise.

use crate::constants;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Where log lines are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    /// No writable location; logs are dropped
    Discard,
}

impl LogTarget {
    /// Target for a command. Interactive commands never write to stderr.
    pub fn for_command(interactive: bool) -> Self {
        if !interactive {
            return Self::Stderr;
        }
        log_file_path().map_or(Self::Discard, Self::File)
    }
}

/// Log file location, preferring the state directory over the cache directory
pub fn log_file_path() -> Option<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|dir| dir.join(constants::APP_ID).join(constants::LOG_FILE_NAME))
}

/// Open `path` for appending, creating parent directories
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Writer for `target`. A file that cannot be opened discards the logs.
pub fn make_writer(target: &LogTarget) -> BoxMakeWriter {
    match target {
        LogTarget::Stderr => BoxMakeWriter::new(io::stderr),
        LogTarget::File(path) => match open_log_file(path) {
            Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
            Err(_) => BoxMakeWriter::new(io::sink),
        },
        LogTarget::Discard => BoxMakeWriter::new(io::sink),
    }
}

/// Install the global subscriber. Call once, before any events fire.
pub fn init(target: &LogTarget) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(*target == LogTarget::Stderr)
        .with_writer(make_writer(target))
        .try_init();

    if let Err(e) = result {
        eprintln!("Failed to initialise tracing: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("qrreader-log-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_interactive_never_uses_stderr() {
        assert_ne!(LogTarget::for_command(true), LogTarget::Stderr);
        assert_eq!(LogTarget::for_command(false), LogTarget::Stderr);
    }

    #[test]
    fn test_log_file_path_name() {
        if let Some(path) = log_file_path() {
            assert!(path.ends_with("qrreader/qrreader.log"));
        }
    }

    #[test]
    fn test_file_writer_appends() {
        let dir = scratch("append");
        let path = dir.join("nested").join("qrreader.log");

        let writer = make_writer(&LogTarget::File(path.clone()));
        writer.make_writer().write_all(b"first\n").unwrap();
        drop(writer);

        let writer = make_writer(&LogTarget::File(path.clone()));
        writer.make_writer().write_all(b"second\n").unwrap();
        drop(writer);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unopenable_file_is_discarded() {
        let dir = scratch("blocked");
        std::fs::create_dir_all(&dir).unwrap();
        // A regular file where the parent directory should be
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let writer = make_writer(&LogTarget::File(blocker.join("qrreader.log")));
        writer.make_writer().write_all(b"dropped\n").unwrap();
        assert_eq!(std::fs::read(&blocker).unwrap(), b"");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
