use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::ClientConfig;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "COUNCIL_CONFIG";

const CONFIG_FILE: &str = "council.toml";
const APP_DIR: &str = "council";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no data directory available; set [storage] dir in {CONFIG_FILE}")]
    NoStateDir,
}

/// Where the config file is expected: an explicit path wins, then
/// `$COUNCIL_CONFIG`, then the platform config directory.
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(env_path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(env_path));
    }
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

/// Read the client config. A missing file yields defaults; a file that
/// exists but does not parse is an error.
pub fn read_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let path = match path {
        Some(p) => p,
        None => return Ok(ClientConfig::default()),
    };
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ClientConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the state directory: configured dir, else `<data dir>/council`
pub fn state_dir(config: &ClientConfig) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = &config.storage.dir {
        return Ok(dir.clone());
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .ok_or(ConfigError::NoStateDir)
}
