//! MCP Server Entry Point
//!
//! Initializes logging, loads configuration and serves MCP over stdio until
//! the client closes stdin.

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use tempo_mcp_server::core::config::LoggingConfig;
use tempo_mcp_server::core::{Config, McpServer, StdioTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries protocol messages only.
    // Installed first so configuration warnings are printed.
    let logging = LoggingConfig::from_env();
    init_logging(&logging.level, logging.with_timestamps);

    // Load configuration from environment
    let config = Config::from_env();

    info!("Starting {} v{}", config.server.name, config.server.version);
    info!("Tempo backend: {}", config.tempo.base_url);

    let server = McpServer::new(config)?;

    info!("Server initialized with {} tools", server.registry().len());

    StdioTransport::run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
fn init_logging(level: &str, with_timestamps: bool) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    if with_timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
