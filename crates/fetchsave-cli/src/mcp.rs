//! MCP (Model Context Protocol) server implementation

use fetchsave::{find_tool, tools, FetchRequest, FetchResult, Fetcher};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};

/// JSON-RPC 2.0 request
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct JsonRpcRequest {
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

/// JSON-RPC 2.0 response
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// MCP server exposing one tool per output kind
struct McpServer {
    fetcher: Fetcher,
}

impl McpServer {
    fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            "notifications/initialized" => JsonRpcResponse::success(request.id, json!(null)),
            _ => JsonRpcResponse::error(
                request.id,
                -32601,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "fetchsave",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let list: Vec<Value> = tools()
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "inputSchema": tool.input_schema()
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "tools": list }))
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or_default();

        let Some(tool) = find_tool(tool_name) else {
            return JsonRpcResponse::error(id, -32602, format!("Unknown tool: {}", tool_name));
        };

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        let result = match serde_json::from_value::<FetchRequest>(arguments) {
            Ok(request) => {
                debug!(tool = tool.name, url = %request.url, "Tool call");
                self.fetcher.fetch(&request, tool.kind).await
            }
            Err(e) => FetchResult::error(format!("Invalid arguments: {}", e)),
        };

        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, -32603, format!("Internal error: {}", e)),
        }
    }
}

/// Run the MCP server over stdio
pub async fn run_server(fetcher: Fetcher) {
    let server = McpServer::new(fetcher);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "Error reading stdin");
                continue;
            }
        };

        if line.is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(&line) {
            Ok(req) => req,
            Err(e) => {
                let response = JsonRpcResponse::error(None, -32700, format!("Parse error: {}", e));
                let json = serde_json::to_string(&response).unwrap_or_default();
                let _ = writeln!(stdout, "{}", json);
                let _ = stdout.flush();
                continue;
            }
        };

        // Skip notifications (no id)
        if request.id.is_none() && request.method.starts_with("notifications/") {
            continue;
        }

        let response = server.handle_request(request).await;
        let json = serde_json::to_string(&response).unwrap_or_default();
        let _ = writeln!(stdout, "{}", json);
        let _ = stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(dir: &std::path::Path) -> McpServer {
        McpServer::new(Fetcher::new(dir).unwrap())
    }

    fn request(method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_initialize() {
        let tmp = tempfile::tempdir().unwrap();
        let response = server(tmp.path())
            .handle_request(request("initialize", json!({})))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "fetchsave");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let tmp = tempfile::tempdir().unwrap();
        let response = server(tmp.path())
            .handle_request(request("tools/list", json!({})))
            .await;

        let result = response.result.unwrap();
        let names: Vec<&str> = result["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["fetch_html", "fetch_json", "fetch_txt", "fetch_markdown"]
        );
        assert!(result["tools"][0]["inputSchema"]["properties"]["url"].is_object());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let tmp = tempfile::tempdir().unwrap();
        let response = server(tmp.path())
            .handle_request(request(
                "tools/call",
                json!({"name": "fetch_pdf", "arguments": {"url": "https://example.com"}}),
            ))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.code, -32602);
        assert!(error.message.contains("fetch_pdf"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_tool_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let response = server(tmp.path())
            .handle_request(request(
                "tools/call",
                json!({"name": "fetch_html", "arguments": {"headers": {}}}),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Invalid arguments"));
    }

    #[tokio::test]
    async fn test_call_returns_fetch_result() {
        let tmp = tempfile::tempdir().unwrap();
        let response = server(tmp.path())
            .handle_request(request(
                "tools/call",
                json!({"name": "fetch_txt", "arguments": {"url": "http://127.0.0.1/admin"}}),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["content"].as_array().unwrap().len(), 1);
        assert!(result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("private IP"));
    }

    #[tokio::test]
    async fn test_method_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let response = server(tmp.path())
            .handle_request(request("resources/list", json!({})))
            .await;

        assert_eq!(response.error.unwrap().code, -32601);
    }
}
