use std::sync::Arc;

use chrono::DateTime;
use serde_json::{Value, json};

use simple_mcp_server::core::clock::FixedClock;
use simple_mcp_server::core::server::serve_lines;
use simple_mcp_server::{ServerInfo, ToolContext, ToolRegistry, build_registry};

fn registry() -> ToolRegistry {
    let instant = DateTime::parse_from_rfc3339("2024-01-01T12:34:56+00:00").unwrap();
    build_registry(ToolContext {
        clock: Arc::new(FixedClock(instant)),
        server: ServerInfo::default(),
    })
    .unwrap()
}

/// Feed `input` through the STDIO loop and parse each output line.
async fn run(input: &str) -> Vec<Value> {
    let mut output = Vec::new();
    serve_lines(&registry(), input.as_bytes(), &mut output)
        .await
        .unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_session_round_trip() {
    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "get_current_time", "arguments": {"format": "iso"}}}),
    ]
    .iter()
    .map(Value::to_string)
    .collect::<Vec<_>>()
    .join("\n");

    let responses = run(&input).await;
    assert_eq!(responses.len(), 3, "notification must not be answered");

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "simple-test-server");

    assert_eq!(responses[1]["id"], 2);
    assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 4);

    assert_eq!(responses[2]["id"], 3);
    assert_eq!(
        responses[2]["result"]["structuredContent"],
        json!({
            "current_time": "2024-01-01T12:34:56+00:00",
            "format": "iso",
            "unix_timestamp": 1_704_112_496.0,
            "timezone": "UTC"
        })
    );
}

#[tokio::test]
async fn test_blank_lines_skipped_and_errors_reported() {
    let input = "\n   \n{broken\n{\"jsonrpc\":\"2.0\",\"id\":\"x\",\"method\":\"nope\"}\n";
    let responses = run(input).await;
    assert_eq!(responses.len(), 2);

    assert_eq!(responses[0]["id"], Value::Null);
    assert_eq!(responses[0]["error"]["code"], -32700);

    assert_eq!(responses[1]["id"], "x");
    assert_eq!(responses[1]["error"]["code"], -32601);
}

#[tokio::test]
async fn test_errors_do_not_stop_the_loop() {
    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call",
               "params": {"name": "calculate_rectangle_area", "arguments": {"width": -1, "height": 5}}}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
               "params": {"name": "nonexistent", "arguments": {}}}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "reverse_string", "arguments": {"text": "Racecar"}}}),
    ]
    .iter()
    .map(Value::to_string)
    .collect::<Vec<_>>()
    .join("\n");

    let responses = run(&input).await;
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["result"]["isError"], true);
    assert_eq!(responses[1]["error"]["code"], -32602);
    assert_eq!(
        responses[2]["result"]["structuredContent"],
        json!({"original": "Racecar", "reversed": "racecaR", "palindrome": true})
    );
}

#[tokio::test]
async fn test_null_id_is_answered() {
    let input = "{\"jsonrpc\":\"2.0\",\"id\":null,\"method\":\"ping\"}\n";
    let responses = run(input).await;
    assert_eq!(responses, vec![json!({"jsonrpc": "2.0", "id": null, "result": {}})]);
}
