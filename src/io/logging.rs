use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Name of the log file written while the TUI owns the terminal
pub const LOG_FILE: &str = "council.log";

/// Where log output goes
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// `RUST_LOG` wins over the configured level
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

pub fn log_file_path(state_dir: &Path) -> PathBuf {
    state_dir.join(LOG_FILE)
}

/// Install the global subscriber. Calling twice is harmless; the second
/// install is ignored.
pub fn init_logging(level: &str, target: &LogTarget) -> io::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter(level));
    let result = match target {
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_lives_in_state_dir() {
        assert_eq!(
            log_file_path(Path::new("/tmp/council")),
            PathBuf::from("/tmp/council/council.log")
        );
    }
}
