/// Server Configuration
///
/// All process-wide settings are read once at startup into a `ServerConfig`
/// and handed to the transports. Nothing below `main` reads the environment.
///
/// Environment Variables:
/// - SERVER_NAME: Name of the server (default: "simple-test-server")
/// - SERVER_VERSION: Version string (default: "1.0.0")
/// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "http")
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 8080)
/// - WORKER_THREADS: HTTP worker count (default: CPU count, capped at 16)
/// - CORS_ALLOWED_ORIGINS: Comma-separated origins or "*" (default: "*")
/// - CORS_ALLOW_CREDENTIALS: "true" or "false" (default: "true")
/// - RUST_LOG: tracing filter directive (default: "info")
/// - LOG_FORMAT: "text" or "json" (default: "text")

use std::str::FromStr;

use actix_web::http::Uri;

use crate::core::error::ConfigError;

pub const DEFAULT_SERVER_NAME: &str = "simple-test-server";
pub const DEFAULT_SERVER_VERSION: &str = "1.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Server identity reported by `initialize` and the `health` tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            version: DEFAULT_SERVER_VERSION.to_string(),
        }
    }
}

/// Which transports to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Line-delimited JSON-RPC over stdin/stdout (MCP Inspector, local use)
    Stdio,
    /// JSON-RPC over HTTP with Actix Web
    Http,
    /// STDIO in a background task, HTTP in the foreground
    Both,
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(TransportMode::Stdio),
            "http" => Ok(TransportMode::Http),
            "both" => Ok(TransportMode::Both),
            _ => Err(ConfigError::InvalidTransport(s.to_string())),
        }
    }
}

/// Log line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Cross-origin policy applied to every HTTP route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Explicit origins; empty means any origin is allowed.
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.is_empty()
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub info: ServerInfo,
    pub transport: TransportMode,
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub cors: CorsConfig,
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            info: ServerInfo::default(),
            transport: TransportMode::Http,
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            workers: default_workers(),
            cors: CorsConfig::default(),
            log_filter: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment, after merging any
    /// `.env` file found in the working directory or its parents.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unset and empty
    /// values fall back to defaults; malformed values are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let info = ServerInfo {
            name: get("SERVER_NAME").unwrap_or(defaults.info.name),
            version: get("SERVER_VERSION").unwrap_or(defaults.info.version),
        };

        let transport = match get("MCP_TRANSPORT_MODE") {
            Some(raw) => raw.parse()?,
            None => defaults.transport,
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value: raw })?,
            None => defaults.port,
        };

        let workers = match get("WORKER_THREADS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidValue { key: "WORKER_THREADS", value: raw }),
            },
            None => defaults.workers,
        };

        let allowed_origins = match get("CORS_ALLOWED_ORIGINS") {
            Some(raw) => parse_origins(&raw)?,
            None => defaults.cors.allowed_origins,
        };

        let allow_credentials = match get("CORS_ALLOW_CREDENTIALS") {
            Some(raw) => parse_bool("CORS_ALLOW_CREDENTIALS", raw)?,
            None => defaults.cors.allow_credentials,
        };

        let log_format = match get("LOG_FORMAT").map(|v| v.to_ascii_lowercase()) {
            None => defaults.log_format,
            Some(v) if v == "text" => LogFormat::Text,
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) => return Err(ConfigError::InvalidValue { key: "LOG_FORMAT", value: v }),
        };

        Ok(Self {
            info,
            transport,
            host: get("HOST").unwrap_or(defaults.host),
            port,
            workers,
            cors: CorsConfig {
                allowed_origins,
                allow_credentials,
            },
            log_filter: get("RUST_LOG").unwrap_or(defaults.log_filter),
            log_format,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// CPU count, capped at 16 to avoid excessive context switching.
fn default_workers() -> usize {
    num_cpus::get().clamp(1, 16)
}

fn parse_bool(key: &'static str, raw: String) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: raw }),
    }
}

/// `*` anywhere in the list means any origin.
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut origins = Vec::new();
    for origin in raw.split(',').map(str::trim).filter(|o| !o.is_empty()) {
        if origin == "*" {
            return Ok(Vec::new());
        }
        if !is_origin(origin) {
            return Err(ConfigError::InvalidOrigin(origin.to_string()));
        }
        origins.push(origin.trim_end_matches('/').to_string());
    }
    Ok(origins)
}

/// `scheme://host[:port]` with an http(s) scheme and nothing after the host
/// except an optional trailing `/`.
fn is_origin(candidate: &str) -> bool {
    let Ok(uri) = candidate.parse::<Uri>() else {
        return false;
    };
    let http_scheme = matches!(uri.scheme_str(), Some("http") | Some("https"));
    let has_host = uri.host().is_some_and(|host| !host.is_empty());
    let bare = matches!(uri.path(), "" | "/") && uri.query().is_none();
    let no_userinfo = uri.authority().is_some_and(|a| !a.as_str().contains('@'));
    http_scheme && has_host && bare && no_userinfo
}
