use std::sync::Arc;

use clap::Parser;
use council::api::{HttpGateway, HttpGatewayConfig};
use council::cli::commands::Cli;
use council::cli::handlers;
use council::io::config_io::{config_path, read_config, state_dir};
use council::io::logging::{LogTarget, init_logging, log_file_path};
use council::io::state::{FileKvStore, KvStore, MemoryKvStore};
use council::sync::AppState;

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = read_config(config_path(cli.config.as_deref()).as_deref())?;
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if let Some(dir) = cli.state_dir {
        config.storage.dir = Some(dir);
    }

    let dir = if cli.ephemeral {
        std::env::temp_dir()
    } else {
        state_dir(&config)?
    };

    // The TUI owns the terminal, so its log goes to a file
    let target = match cli.command {
        None => LogTarget::File(log_file_path(&dir)),
        Some(_) => LogTarget::Stderr,
    };
    init_logging(&config.log.level, &target)?;

    let store: Box<dyn KvStore> = if cli.ephemeral {
        Box::new(MemoryKvStore::new())
    } else {
        Box::new(FileKvStore::new(dir.clone()))
    };
    let gateway = HttpGateway::new(HttpGatewayConfig {
        base_url: config.api.base_url.clone(),
        timeout_ms: config.api.timeout_ms,
        llm_timeout_ms: config.api.llm_timeout_ms,
    })?;
    let mut state = AppState::new(store);
    tracing::info!(api = %config.api.base_url, ephemeral = cli.ephemeral, "starting");

    match cli.command {
        None => council::tui::run(Arc::new(gateway), state, &config),
        Some(command) => Ok(handlers::dispatch(command, cli.json, &gateway, &mut state)?),
    }
}
