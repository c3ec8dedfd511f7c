//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::http_server::HttpServer;
use crate::observability::Logger;
use crate::rest_api::RestService;
use crate::store::{JsonDocument, MemoryStore};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Check { config } => check(&config),
    }
}

/// Serve an empty in-memory store over HTTP until Ctrl-C
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::load(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }
    Logger::set_min_severity(config.severity());

    let registry = config.registry();
    let index_names = registry.names().join(",");
    Logger::info(
        "SERVICE_CONFIGURED",
        &[
            ("indexes", index_names.as_str()),
            ("key_type", config.key_type.as_str()),
        ],
    );

    let store = Arc::new(MemoryStore::<JsonDocument>::new());
    let service = RestService::new(store, registry);
    let server = HttpServer::new(config.server.clone(), service);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create runtime: {}", e)))?;

    rt.block_on(async {
        server.start().await.map_err(|e| {
            let message = e.to_string();
            Logger::error("SERVER_FAILED", &[("error", message.as_str())]);
            CliError::serve_failed(format!("HTTP server failed: {}", message))
        })
    })
}

/// Validate the configuration and print what would be served
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    write_response(summary(&config))
}

fn summary(config: &Config) -> serde_json::Value {
    let registry = config.registry();
    json!({
        "address": config.server.socket_addr(),
        "mount_path": config.server.mount_path,
        "key_type": config.key_type.as_str(),
        "indexes": registry.names(),
        "log_level": config.log_level,
    })
}
