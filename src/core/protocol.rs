/// MCP Protocol Handling
///
/// JSON-RPC 2.0 request/response structures and the method router shared by
/// the HTTP and STDIO transports. Supported MCP methods:
/// - initialize: protocol version, capabilities and server info
/// - ping: liveness round-trip
/// - tools/list: tool discovery
/// - tools/call: tool invocation

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::core::error::ToolError;
use crate::core::registry::ToolRegistry;

/// MCP protocol revision advertised in `initialize`.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// JSON-RPC 2.0 request structure for MCP protocol.
///
/// `id` is None only when the member is absent (a notification); an explicit
/// `"id": null` is kept as `Some(Value::Null)` and answered.
#[derive(Deserialize, Debug, Clone)]
pub struct MCPRequest {
    /// JSON-RPC version identifier, must be "2.0"
    pub jsonrpc: String,
    /// Request ID for correlating responses
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    /// MCP method name (e.g., "initialize", "tools/list", "tools/call")
    pub method: String,
    /// Method-specific parameters
    #[serde(default)]
    pub params: Option<Value>,
}

/// Called only when the `id` member exists, so `null` becomes `Some(Null)`.
fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl MCPRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response structure for MCP protocol.
///
/// Exactly one of `result` and `error` is present.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MCPResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MCPError>,
}

/// JSON-RPC 2.0 error structure.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MCPError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl MCPResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(MCPError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// Parse one JSON-RPC message.
///
/// On failure the returned response carries the request id when it can be
/// recovered from the raw text, and `null` otherwise.
pub fn parse_request(raw: &str) -> Result<MCPRequest, MCPResponse> {
    match serde_json::from_str::<MCPRequest>(raw) {
        Ok(req) if req.jsonrpc == "2.0" => Ok(req),
        Ok(req) => Err(MCPResponse::failure(
            req.id,
            INVALID_REQUEST,
            format!("Invalid request: unsupported jsonrpc version '{}'", req.jsonrpc),
        )),
        Err(e) => {
            let (id, code) = match serde_json::from_str::<Value>(raw) {
                // Well-formed JSON that is not a request object
                Ok(partial) => (partial.get("id").cloned(), INVALID_REQUEST),
                Err(_) => (None, PARSE_ERROR),
            };
            let label = if code == PARSE_ERROR { "Parse error" } else { "Invalid request" };
            Err(MCPResponse::failure(id, code, format!("{}: {}", label, e)))
        }
    }
}

/// Route a request to its method handler.
///
/// Returns None for notifications.
pub fn handle_request(registry: &ToolRegistry, req: &MCPRequest) -> Option<MCPResponse> {
    if req.is_notification() {
        tracing::debug!(method = %req.method, "notification received");
        return None;
    }

    let id = req.id.clone();
    let response = match req.method.as_str() {
        "initialize" => handle_initialize(registry, id),
        "ping" => MCPResponse::success(id, json!({})),
        "tools/list" => handle_tools_list(registry, id),
        "tools/call" => handle_tools_call(registry, id, req.params.as_ref()),
        _ => MCPResponse::failure(
            id,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    };
    Some(response)
}

/// Handle MCP initialize method.
fn handle_initialize(registry: &ToolRegistry, id: Option<Value>) -> MCPResponse {
    let info = registry.server_info();
    MCPResponse::success(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            },
            "serverInfo": {
                "name": info.name,
                "version": info.version
            }
        }),
    )
}

/// Handle MCP tools/list method.
fn handle_tools_list(registry: &ToolRegistry, id: Option<Value>) -> MCPResponse {
    MCPResponse::success(id, json!({ "tools": registry.definitions() }))
}

/// Handle MCP tools/call method.
///
/// Tool-level failures (bad arguments, rejected input) are reported inside a
/// result with `isError: true` so the caller's model can see them; an
/// unknown tool name is a protocol error.
fn handle_tools_call(registry: &ToolRegistry, id: Option<Value>, params: Option<&Value>) -> MCPResponse {
    let Some(params) = params else {
        return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params");
    };

    let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
        return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params: missing tool name");
    };

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    match registry.invoke(tool_name, &arguments) {
        Ok(output) => match serde_json::to_value(&output) {
            Ok(structured) => MCPResponse::success(
                id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": structured.to_string()
                        }
                    ],
                    "structuredContent": structured,
                    "isError": false
                }),
            ),
            Err(e) => {
                tracing::error!(tool = tool_name, error = %e, "failed to serialize tool output");
                MCPResponse::failure(id, INTERNAL_ERROR, "Internal error")
            }
        },
        Err(ToolError::UnknownTool(name)) => {
            MCPResponse::failure(id, INVALID_PARAMS, format!("Unknown tool: {}", name))
        }
        Err(e) => MCPResponse::success(
            id,
            json!({
                "content": [
                    {
                        "type": "text",
                        "text": format!("Error: {}", e)
                    }
                ],
                "isError": true
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::config::ServerInfo;
    use crate::core::registry::ToolContext;
    use crate::tools::build_registry;
    use chrono::DateTime;
    use std::sync::Arc;

    fn registry() -> ToolRegistry {
        let instant = DateTime::parse_from_rfc3339("2024-01-01T12:34:56+00:00").unwrap();
        build_registry(ToolContext {
            clock: Arc::new(FixedClock(instant)),
            server: ServerInfo::default(),
        })
        .unwrap()
    }

    fn call(raw: Value) -> MCPResponse {
        let req = parse_request(&raw.to_string()).unwrap();
        handle_request(&registry(), &req).unwrap()
    }

    #[test]
    fn test_initialize() {
        let resp = call(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}));
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "simple-test-server");
        assert_eq!(result["serverInfo"]["version"], "1.0.0");
        assert_eq!(resp.id, Some(json!(1)));
    }

    #[test]
    fn test_ping() {
        let resp = call(json!({"jsonrpc": "2.0", "id": "p", "method": "ping"}));
        assert_eq!(resp.result, Some(json!({})));
    }

    #[test]
    fn test_tools_list() {
        let resp = call(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}));
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 4);
        assert_eq!(tools[0]["name"], "get_current_time");
        assert_eq!(tools[0]["title"], "Get Current Time");
        assert_eq!(tools[0]["inputSchema"]["properties"]["format"]["default"], "readable");
        assert_eq!(tools[1]["inputSchema"]["required"], json!(["width", "height"]));
    }

    #[test]
    fn test_tools_call_success() {
        let resp = call(json!({
            "jsonrpc": "2.0", "id": 3, "method": "tools/call",
            "params": {"name": "reverse_string", "arguments": {"text": "Racecar"}}
        }));
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], false);
        assert_eq!(
            result["structuredContent"],
            json!({"original": "Racecar", "reversed": "racecaR", "palindrome": true})
        );
        let text: Value = serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap();
        assert_eq!(text, result["structuredContent"]);
    }

    #[test]
    fn test_tools_call_default_argument() {
        let resp = call(json!({
            "jsonrpc": "2.0", "id": 4, "method": "tools/call",
            "params": {"name": "get_current_time"}
        }));
        let structured = &resp.result.unwrap()["structuredContent"];
        assert_eq!(structured["current_time"], "2024-01-01 12:34:56");
        assert_eq!(structured["format"], "readable");
    }

    #[test]
    fn test_tools_call_domain_error() {
        let resp = call(json!({
            "jsonrpc": "2.0", "id": 5, "method": "tools/call",
            "params": {"name": "calculate_rectangle_area", "arguments": {"width": -1, "height": 5}}
        }));
        assert!(resp.error.is_none());
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"][0]["text"], "Error: Width and height must be positive numbers");
    }

    #[test]
    fn test_tools_call_unknown_tool() {
        let resp = call(json!({
            "jsonrpc": "2.0", "id": 6, "method": "tools/call",
            "params": {"name": "nonexistent", "arguments": {}}
        }));
        let error = resp.error.unwrap();
        assert_eq!(error.code, INVALID_PARAMS);
        assert_eq!(error.message, "Unknown tool: nonexistent");
    }

    #[test]
    fn test_tools_call_missing_params() {
        let resp = call(json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call"}));
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);

        let resp = call(json!({"jsonrpc": "2.0", "id": 8, "method": "tools/call", "params": {}}));
        assert_eq!(resp.error.unwrap().message, "Invalid params: missing tool name");
    }

    #[test]
    fn test_unknown_method() {
        let resp = call(json!({"jsonrpc": "2.0", "id": 9, "method": "resources/list"}));
        let error = resp.error.unwrap();
        assert_eq!(error.code, METHOD_NOT_FOUND);
        assert_eq!(error.message, "Method not found: resources/list");
    }

    #[test]
    fn test_notification_has_no_response() {
        let req = parse_request(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        assert!(handle_request(&registry(), &req).is_none());
    }

    #[test]
    fn test_null_id_is_answered() {
        let req = parse_request(r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#).unwrap();
        assert!(!req.is_notification());

        let resp = handle_request(&registry(), &req).unwrap();
        assert_eq!(resp.id, Some(Value::Null));
        assert_eq!(resp.result, Some(json!({})));
        assert_eq!(serde_json::to_value(&resp).unwrap()["id"], Value::Null);
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_request("{not json").unwrap_err();
        assert_eq!(err.id, None);
        assert_eq!(err.error.unwrap().code, PARSE_ERROR);

        let err = parse_request(r#"{"jsonrpc":"2.0","id":11}"#).unwrap_err();
        assert_eq!(err.id, Some(json!(11)));
        assert_eq!(err.error.unwrap().code, INVALID_REQUEST);

        let err = parse_request(r#"{"jsonrpc":"1.0","id":12,"method":"ping"}"#).unwrap_err();
        assert_eq!(err.id, Some(json!(12)));
        assert_eq!(err.error.unwrap().code, INVALID_REQUEST);
    }
}
