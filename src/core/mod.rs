/// Core Server Framework Module
///
/// - clock.rs: injectable wall clock and time rendering
/// - config.rs: environment-driven server configuration
/// - error.rs: classified tool and configuration errors
/// - logging.rs: tracing subscriber setup
/// - protocol.rs: JSON-RPC 2.0 / MCP method routing
/// - registry.rs: tool descriptors, argument validation and invocation
/// - server.rs: HTTP and STDIO transports

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod registry;
pub mod server;
