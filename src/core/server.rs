/// MCP Server Transports
///
/// This module contains the two transports that carry MCP requests to the
/// tool registry:
/// - HTTP server setup with Actix Web (JSON-RPC over POST, liveness, metrics,
///   SSE tool discovery, CORS)
/// - STDIO server for line-based communication
///
/// Both transports share `protocol::handle_request`, so a request behaves the
/// same no matter how it arrives.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{
    App, HttpResponse, HttpServer, Result, http::header,
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::core::config::{CorsConfig, ServerConfig};
use crate::core::protocol::{self, INTERNAL_ERROR, MCPResponse, PARSE_ERROR};
use crate::core::registry::ToolRegistry;

/// Application state shared across all worker threads in HTTP mode.
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
    /// Total MCP requests received over HTTP
    pub requests: AtomicU64,
}

impl AppState {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            requests: AtomicU64::new(0),
        }
    }
}

/// Register all HTTP routes. Expects `web::Data<AppState>` in app data.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/sse", web::get().to(sse_tools_discovery))
        .route("/mcp", web::post().to(mcp_handler))
        .route("/", web::post().to(mcp_handler))
        .route("/", web::get().to(health));
}

/// Build the CORS middleware for `config`.
///
/// With no explicit origins, the request's own origin is echoed back.
pub fn cors_middleware(config: &CorsConfig) -> Cors {
    let cors = if config.allows_any_origin() {
        Cors::default().allow_any_origin()
    } else {
        config
            .allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };
    let cors = cors
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    if config.allow_credentials {
        cors.supports_credentials()
    } else {
        cors
    }
}

/// Process liveness check for load balancers and container health checks.
///
/// Independent of the `health` tool: it never touches the registry.
async fn health(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "server": state.registry.server_info().name
    })))
}

/// MCP JSON-RPC request handler.
///
/// Counts the request, routes it through the protocol layer and returns the
/// JSON-RPC response. Notifications are acknowledged with 202 and no body.
async fn mcp_handler(state: web::Data<AppState>, body: Bytes) -> Result<HttpResponse> {
    // Relaxed is enough: the counter is only ever read for reporting.
    state.requests.fetch_add(1, Ordering::Relaxed);

    let Ok(raw) = std::str::from_utf8(&body) else {
        tracing::warn!("rejected MCP request body that is not valid UTF-8");
        return Ok(HttpResponse::Ok().json(MCPResponse::failure(
            None,
            PARSE_ERROR,
            "Parse error: request body is not valid UTF-8",
        )));
    };
    let response = match protocol::parse_request(raw) {
        Ok(req) => {
            tracing::debug!(method = %req.method, "MCP request");
            protocol::handle_request(&state.registry, &req)
        }
        Err(error_response) => {
            tracing::warn!("rejected malformed MCP request");
            Some(error_response)
        }
    };

    Ok(match response {
        Some(response) => HttpResponse::Ok().json(response),
        None => HttpResponse::Accepted().finish(),
    })
}

/// Metrics endpoint handler for monitoring.
async fn metrics_handler(state: web::Data<AppState>) -> Result<HttpResponse> {
    let count = state.requests.load(Ordering::Relaxed);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "requests_total": count,
        "tools_registered": state.registry.len(),
        "status": "ok"
    })))
}

/// Server-Sent Events endpoint for tools discovery.
///
/// Emits a single `data:` event with the same tool definitions as
/// `tools/list`, plus a count.
async fn sse_tools_discovery(state: web::Data<AppState>) -> Result<HttpResponse> {
    let definitions = state.registry.definitions();
    let tools_data = serde_json::json!({
        "count": definitions.len(),
        "tools": definitions,
    });
    let event = Bytes::from(format!("data: {}\n\n", tools_data));

    let stream = futures_util::stream::once(async move { Ok::<_, std::convert::Infallible>(event) });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(header::CacheControl(vec![
            header::CacheDirective::NoCache,
            header::CacheDirective::NoStore,
            header::CacheDirective::MustRevalidate,
        ]))
        // Disable nginx buffering
        .insert_header(("x-accel-buffering", "no"))
        .streaming(stream))
}

/// Run the MCP server in HTTP mode.
///
/// # Configuration
/// - Worker threads: from `ServerConfig::workers`
/// - Max connections: 10,000 concurrent connections
/// - Connection rate limit: 1,000 connections per second
/// - Keep-alive: 30 seconds
/// - Request timeout: 30 seconds
/// - Disconnect timeout: 2 seconds
/// - Shutdown timeout: 10 seconds
pub async fn run_server_http(config: &ServerConfig, registry: Arc<ToolRegistry>) -> std::io::Result<()> {
    let bind_addr = config.bind_addr();
    let state = web::Data::new(AppState::new(registry));
    let cors = config.cors.clone();

    tracing::info!(
        name = %config.info.name,
        version = %config.info.version,
        bind = %bind_addr,
        workers = config.workers,
        any_origin = cors.allows_any_origin(),
        "MCP server starting (HTTP mode)"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block")),
            )
            // %r = request line, %s = status, %Dms = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .wrap(cors_middleware(&cors))
            .configure(routes)
    })
    .workers(config.workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Run the MCP server in STDIO mode.
///
/// Reads JSON-RPC requests line-by-line from stdin and writes responses to
/// stdout. All logging goes to stderr.
pub async fn run_server_stdio(registry: Arc<ToolRegistry>) -> std::io::Result<()> {
    let info = registry.server_info();
    tracing::info!(name = %info.name, version = %info.version, "MCP server starting (STDIO mode)");

    // 8KB buffers balance memory usage with I/O efficiency
    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());
    serve_lines(&registry, stdin, stdout).await
}

/// Serve newline-delimited JSON-RPC from `reader` to `writer` until EOF.
///
/// Requests are processed one at a time; each response is written on its own
/// line and flushed immediately. Notifications produce no output.
pub async fn serve_lines<R, W>(registry: &ToolRegistry, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match protocol::parse_request(&line) {
            Ok(req) => protocol::handle_request(registry, &req),
            Err(error_response) => {
                tracing::warn!("rejected malformed MCP request on stdin");
                Some(error_response)
            }
        };

        if let Some(response) = response {
            write_response(&mut writer, &response).await?;
        }
    }

    writer.flush().await
}

async fn write_response<W>(writer: &mut W, response: &MCPResponse) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = encode_line(&response.id, response);
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// Serialize `message`, falling back to an internal error for `id` so the
/// caller still gets exactly one reply.
fn encode_line<T: Serialize>(id: &Option<Value>, message: &T) -> String {
    match serde_json::to_string(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response");
            let fallback = MCPResponse::failure(id.clone(), INTERNAL_ERROR, "Internal error");
            serde_json::to_string(&fallback).unwrap_or_else(|_| {
                r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Internal error"}}"#.to_string()
            })
        }
    }
}
