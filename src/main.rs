/// MCP Server Entry Point
///
/// Loads `ServerConfig` from the environment (see `core::config` for the
/// variables), installs logging, builds the tool registry and starts the
/// configured transport(s).

use std::sync::Arc;

use simple_mcp_server::core::clock::SystemClock;
use simple_mcp_server::core::config::TransportMode;
use simple_mcp_server::core::{logging, server};
use simple_mcp_server::{ServerConfig, ToolContext, build_registry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    logging::init(&config.log_filter, config.log_format);

    let registry = Arc::new(build_registry(ToolContext {
        clock: Arc::new(SystemClock),
        server: config.info.clone(),
    })?);
    tracing::info!(tools = registry.len(), transport = ?config.transport, "tool registry ready");

    match config.transport {
        TransportMode::Stdio => server::run_server_stdio(registry).await?,
        TransportMode::Http => server::run_server_http(&config, registry).await?,
        TransportMode::Both => {
            // STDIO in the background so MCP Inspector can attach while HTTP serves
            let stdio_registry = Arc::clone(&registry);
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = server::run_server_stdio(stdio_registry).await {
                    tracing::error!(error = %e, "STDIO server error");
                }
            });

            let http_result = server::run_server_http(&config, registry).await;

            // If HTTP server exits, abort STDIO task
            stdio_handle.abort();
            http_result?
        }
    }

    Ok(())
}
