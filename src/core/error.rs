/// Error Types
///
/// Classified failures for tool registration and invocation, plus the
/// configuration errors raised while reading the environment at startup.
/// Transports map these onto JSON-RPC / MCP response shapes.

use thiserror::Error;

/// Classified outcome of a failed tool operation.
///
/// Every invocation either succeeds or returns one of these variants; no
/// other failure crosses the invocation boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// The requested tool name is not registered.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// A required parameter is missing, a value has the wrong type, or the
    /// computation rejected its input.
    #[error("{0}")]
    InvalidArgument(String),

    /// A tool with the same name is already registered. Only raised while
    /// building the registry.
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),
}

impl ToolError {
    /// Short machine-readable tag for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::InvalidArgument(_) => "invalid_argument",
            ToolError::DuplicateTool(_) => "duplicate_tool",
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ToolError::InvalidArgument(message.into())
    }
}

/// Invalid server configuration read from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid transport mode '{0}'. Must be 'stdio', 'http', or 'both'")]
    InvalidTransport(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid CORS origin '{0}': expected '*' or an http(s) origin")]
    InvalidOrigin(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ToolError::UnknownTool("nonexistent".to_string()).to_string(),
            "Unknown tool: nonexistent"
        );
        assert_eq!(
            ToolError::invalid("Text parameter cannot be empty").to_string(),
            "Text parameter cannot be empty"
        );
        assert_eq!(
            ConfigError::InvalidValue { key: "PORT", value: "abc".to_string() }.to_string(),
            "Invalid value for PORT: 'abc'"
        );
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(ToolError::UnknownTool("x".into()).kind(), "unknown_tool");
        assert_eq!(ToolError::invalid("x").kind(), "invalid_argument");
        assert_eq!(ToolError::DuplicateTool("x".into()).kind(), "duplicate_tool");
    }
}
