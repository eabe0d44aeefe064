//! Model Context Protocol adapter.
//!
//! Two layers: [`McpToolSink`] is the registration interface (one
//! `register_tool(name, {description, parameters, handler})` call per
//! descriptor), and [`McpServer`] is an in-crate sink that also speaks
//! newline-delimited JSON-RPC 2.0 over stdio (`initialize`, `tools/list`,
//! `tools/call`).

use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::tools::{agent_tools, AgentContext};

use super::{shape_output, AdapterOptions};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Error surfaced by a tool handler before execution starts.
#[derive(Debug, Error)]
pub enum McpToolError {
    #[error("Invalid params: {0}")]
    InvalidParams(String),
}

pub type McpToolHandler =
    Box<dyn Fn(Value) -> BoxFuture<'static, Result<Value, McpToolError>> + Send + Sync>;

/// Everything a server needs to expose one tool.
pub struct ToolRegistration {
    pub description: String,
    pub parameters: Value,
    pub handler: McpToolHandler,
}

/// Registration interface: any MCP server implementation can consume the
/// catalog by accepting one registration per descriptor.
pub trait McpToolSink {
    fn register_tool(&mut self, name: &str, registration: ToolRegistration);
}

/// Register the selected tools with a sink. Hydrate-summary defaults to off.
pub fn register_agent_tools(
    sink: &mut dyn McpToolSink,
    context: Arc<AgentContext>,
    options: AdapterOptions,
) {
    let hydrate = options.hydrate_summary.unwrap_or(false);

    for tool in agent_tools(&options.selection) {
        let handler_tool = Arc::clone(&tool);
        let handler_ctx = Arc::clone(&context);
        let handler: McpToolHandler = Box::new(move |input: Value| {
            let tool = Arc::clone(&handler_tool);
            let ctx = Arc::clone(&handler_ctx);
            async move {
                tool.check_input(&input)
                    .map_err(|e| McpToolError::InvalidParams(e.to_string()))?;
                let result = tool.execute(&ctx, input).await;
                Ok(shape_output(&ctx, &result, hydrate))
            }
            .boxed()
        });

        sink.register_tool(
            tool.name(),
            ToolRegistration {
                description: tool.description().to_string(),
                parameters: tool.input_schema(),
                handler,
            },
        );
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC protocol types
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<JsonRpcId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<JsonRpcId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC ID (string, number, or null per JSON-RPC 2.0).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum JsonRpcId {
    String(String),
    Number(i64),
    Null,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Option<JsonRpcId>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<JsonRpcId>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    /// A notification was handled; nothing should be written back.
    fn none() -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: None,
            result: None,
            error: None,
        }
    }

    fn is_none(&self) -> bool {
        self.id.is_none() && self.result.is_none() && self.error.is_none()
    }
}

/// JSON-RPC error codes.
pub mod error_codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const TOOL_NOT_FOUND: i32 = -32001;
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Minimal MCP server over stdio.
pub struct McpServer {
    name: String,
    version: String,
    tools: Vec<(String, ToolRegistration)>,
}

impl McpToolSink for McpServer {
    fn register_tool(&mut self, name: &str, registration: ToolRegistration) {
        self.tools.push((name.to_string(), registration));
    }
}

impl McpServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            tools: Vec::new(),
        }
    }

    /// Build a server pre-loaded with the selected agent tools.
    pub fn with_agent_tools(context: Arc<AgentContext>, options: AdapterOptions) -> Self {
        let mut server = Self::new("agentry", env!("CARGO_PKG_VERSION"));
        register_agent_tools(&mut server, context, options);
        server
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Handle one raw JSON-RPC line.
    pub async fn handle_request(&self, input: &str) -> JsonRpcResponse {
        let request: JsonRpcRequest = match serde_json::from_str(input) {
            Ok(request) => request,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                );
            }
        };

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                "Invalid JSON-RPC version",
            );
        }

        match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                request.id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": { "name": self.name.clone(), "version": self.version.clone() },
                }),
            ),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            method if method.starts_with("notifications/") => {
                debug!("Notification received: {}", method);
                JsonRpcResponse::none()
            }
            method => JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {}", method),
            ),
        }
    }

    fn handle_tools_list(&self, id: Option<JsonRpcId>) -> JsonRpcResponse {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|(name, registration)| {
                json!({
                    "name": name,
                    "description": registration.description.clone(),
                    "inputSchema": registration.parameters.clone(),
                })
            })
            .collect();

        JsonRpcResponse::success(id, json!({ "tools": tools }))
    }

    async fn handle_tools_call(
        &self,
        id: Option<JsonRpcId>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params = params.unwrap_or(Value::Null);
        let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "Missing tool name in params",
            );
        };
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(Value::Object(serde_json::Map::new()));

        let Some((_, registration)) = self.tools.iter().find(|(n, _)| n == name) else {
            return JsonRpcResponse::error(
                id,
                error_codes::TOOL_NOT_FOUND,
                format!("Tool not found: {}", name),
            );
        };

        match (registration.handler)(arguments).await {
            Ok(value) => {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                JsonRpcResponse::success(
                    id,
                    json!({ "content": [{ "type": "text", "text": text }] }),
                )
            }
            Err(McpToolError::InvalidParams(message)) => {
                JsonRpcResponse::error(id, error_codes::INVALID_PARAMS, message)
            }
        }
    }

    /// Serve newline-delimited JSON-RPC on stdin/stdout until EOF.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        info!(
            "MCP server {} v{} serving {} tools on stdio",
            self.name,
            self.version,
            self.tools.len()
        );

        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut lines = stdin.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            debug!("Received: {}", line);

            let response = self.handle_request(&line).await;
            if response.is_none() {
                continue;
            }

            let response_json = serde_json::to_string(&response)?;
            debug!("Sending: {}", response_json);

            stdout.write_all(response_json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        info!("MCP server shutting down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubRegistryClient;
    use crate::tools::{ContextOptions, ToolCategory, ToolSelection};

    async fn server_with(options: AdapterOptions) -> McpServer {
        let ctx = AgentContext::resolve(
            Arc::new(StubRegistryClient::new().with_metadata_value("TestAgent")),
            ContextOptions::default(),
        )
        .await
        .unwrap();
        McpServer::with_agent_tools(Arc::new(ctx), options)
    }

    struct RecordingSink {
        names: Vec<String>,
    }

    impl McpToolSink for RecordingSink {
        fn register_tool(&mut self, name: &str, _registration: ToolRegistration) {
            self.names.push(name.to_string());
        }
    }

    #[tokio::test]
    async fn test_registration_call_per_descriptor() {
        let ctx = AgentContext::resolve(
            Arc::new(StubRegistryClient::new()),
            ContextOptions::default(),
        )
        .await
        .unwrap();
        let mut sink = RecordingSink { names: Vec::new() };
        register_agent_tools(
            &mut sink,
            Arc::new(ctx),
            AdapterOptions::with_selection(ToolSelection {
                categories: vec![ToolCategory::Reputation],
                ..Default::default()
            }),
        );
        assert_eq!(sink.names.len(), 13);
        assert_eq!(sink.names[0], "reputation_createFeedbackAuth");
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = server_with(AdapterOptions::default()).await;
        let response = server
            .handle_request(r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#)
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "agentry");
    }

    #[tokio::test]
    async fn test_tools_list() {
        let server = server_with(AdapterOptions::default()).await;
        let response = server
            .handle_request(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await;
        let tools = response.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 22);
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let server = server_with(AdapterOptions::default()).await;
        let request = r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"identity_getMetadata","arguments":{"agentId":"1","key":"agentName"}}}"#;
        let response = server.handle_request(request).await;
        assert!(response.error.is_none());
        let text = response.result.unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(text.contains("TestAgent"));
    }

    #[tokio::test]
    async fn test_tools_call_validation_error_is_rpc_error() {
        let server = server_with(AdapterOptions::default()).await;
        let request = r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"identity_getOwner","arguments":{"agentId":-1}}}"#;
        let response = server.handle_request(request).await;
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tools_call_execution_failure_stays_in_band() {
        let ctx = AgentContext::resolve(
            Arc::new(StubRegistryClient::new().failing("revert")),
            ContextOptions::default(),
        )
        .await
        .unwrap();
        let server = McpServer::with_agent_tools(Arc::new(ctx), AdapterOptions::default());

        let request = r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"name":"identity_getOwner","arguments":{"agentId":"1"}}}"#;
        let response = server.handle_request(request).await;
        // Execution failures are tool output, not protocol errors.
        assert!(response.error.is_none());
        let text = response.result.unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(text.contains("N/A"));
    }

    #[tokio::test]
    async fn test_unknown_tool_and_method() {
        let server = server_with(AdapterOptions::default()).await;

        let response = server
            .handle_request(
                r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"nope"}}"#,
            )
            .await;
        assert_eq!(response.error.unwrap().code, error_codes::TOOL_NOT_FOUND);

        let response = server
            .handle_request(r#"{"jsonrpc":"2.0","id":7,"method":"bogus"}"#)
            .await;
        assert_eq!(response.error.unwrap().code, error_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_parse_error_and_bad_version() {
        let server = server_with(AdapterOptions::default()).await;

        let response = server.handle_request("not json").await;
        assert_eq!(response.error.unwrap().code, error_codes::PARSE_ERROR);

        let response = server
            .handle_request(r#"{"jsonrpc":"1.0","id":8,"method":"ping"}"#)
            .await;
        assert_eq!(response.error.unwrap().code, error_codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_notification_produces_no_response() {
        let server = server_with(AdapterOptions::default()).await;
        let response = server
            .handle_request(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_hydrated_server_returns_summary_text() {
        let server = server_with(AdapterOptions {
            hydrate_summary: Some(true),
            ..Default::default()
        })
        .await;
        let request = r#"{"jsonrpc":"2.0","id":9,"method":"tools/call","params":{"name":"identity_getMetadata","arguments":{"agentId":"1","key":"agentName"}}}"#;
        let response = server.handle_request(request).await;
        let text = response.result.unwrap()["content"][0]["text"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(text.starts_with("Metadata agentName for agent 1"));
    }
}
