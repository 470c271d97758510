//! CLI command implementations
//!
//! `start` boot sequence:
//! 1. Configuration load (file or defaults)
//! 2. Logging init
//! 3. Resource definitions load
//! 4. HTTP activation

use std::path::Path;

use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::http::ResourceServer;
use crate::resource::ResourceRegistry;
use crate::schema::SchemaLoader;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::write_json;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Start { config, port } => start(config.as_deref(), port),
        Command::Check { config } => check(config.as_deref()),
    }
}

/// Load resources and serve them until Ctrl+C
pub fn start(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }
    init_logging(&config.log_filter);

    let registry = load_resources(&config)?;
    if registry.is_empty() {
        warn!(dir = %config.resources_dir.display(), "No resources loaded");
    }
    info!(count = registry.len(), "Resources loaded");

    let server = ResourceServer::new(registry);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(server.serve(&config.http))
        .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
}

/// Validate configuration and resource definitions, print them, exit
pub fn check(config_path: Option<&Path>) -> CliResult<()> {
    let config = load_config(config_path)?;
    init_logging(&config.log_filter);

    let mut loader = SchemaLoader::new(&config.resources_dir);
    loader.load_all()?;

    let resources: Vec<_> = loader.schemas().collect();
    write_json(&json!({
        "ok": true,
        "listen": config.http.socket_addr(),
        "resources": resources,
    }))
}

/// Reads every resource definition under the configured directory
pub fn load_resources(config: &AppConfig) -> CliResult<ResourceRegistry> {
    let mut loader = SchemaLoader::new(&config.resources_dir);
    loader.load_all()?;
    Ok(ResourceRegistry::from_loader(loader))
}

fn load_config(path: Option<&Path>) -> CliResult<AppConfig> {
    match path {
        Some(path) => Ok(AppConfig::load(path)?),
        None => Ok(AppConfig::default()),
    }
}

/// `RUST_LOG` wins over the configured filter
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
