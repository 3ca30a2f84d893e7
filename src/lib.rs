/// Simple Test MCP Server
///
/// A small Model Context Protocol server exposing four demonstration tools
/// (`get_current_time`, `calculate_rectangle_area`, `reverse_string`,
/// `health`) over HTTP and STDIO.

pub mod core;
pub mod tools;

pub use crate::core::config::{ServerConfig, ServerInfo};
pub use crate::core::error::{ConfigError, ToolError};
pub use crate::core::registry::{ToolContext, ToolRegistry};
pub use crate::tools::{ToolOutput, build_registry};
