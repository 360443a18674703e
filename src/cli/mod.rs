pub mod commands;
pub mod handlers;
pub mod output;

use crate::api::ApiError;
use crate::io::config_io::ConfigError;

/// Error type for one-shot commands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown filter '{0}' (expected: all, resubmitted, none, other)")]
    BadFilter(String),
    #[error("{0}")]
    Failed(String),
    #[error("could not write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}
