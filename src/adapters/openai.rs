//! OpenAI-compatible function-calling adapter.
//!
//! Produces `{"type": "function", "function": {...}}` tool payloads for chat
//! completion requests and dispatches tool calls by name. Hydrate-summary
//! defaults to off: chat frameworks usually want the structured payload.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::tools::schema::InputError;
use crate::tools::{agent_tools, AgentContext, AgentTool};

use super::{shape_output, AdapterOptions};

/// Function declaration as it appears in a chat completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Wire-level tool entry: `{"type": "function", "function": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDef,
}

#[derive(Debug, Error)]
pub enum ToolkitError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error(transparent)]
    InvalidParameters(#[from] InputError),
}

/// The selected tools bound to one context, dispatchable by name.
pub struct FunctionToolkit {
    context: Arc<AgentContext>,
    tools: Vec<Arc<dyn AgentTool>>,
    hydrate_summary: bool,
}

impl FunctionToolkit {
    pub fn new(context: Arc<AgentContext>, options: AdapterOptions) -> Self {
        let tools = agent_tools(&options.selection);
        Self {
            context,
            tools,
            hydrate_summary: options.hydrate_summary.unwrap_or(false),
        }
    }

    /// Tool payloads for the request's `tools` array, in selection order.
    pub fn definitions(&self) -> Vec<FunctionTool> {
        self.tools
            .iter()
            .map(|tool| FunctionTool {
                tool_type: "function".to_string(),
                function: FunctionDef {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.input_schema(),
                },
            })
            .collect()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|tool| tool.name()).collect()
    }

    /// Dispatch one tool call.
    ///
    /// Schema violations surface as [`ToolkitError::InvalidParameters`];
    /// execution failures come back as a successful call whose shaped value
    /// carries the envelope's error message.
    pub async fn call(&self, name: &str, arguments: Value) -> Result<Value, ToolkitError> {
        let tool = self
            .tools
            .iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| ToolkitError::UnknownTool(name.to_string()))?;

        tool.check_input(&arguments)?;
        let result = tool.execute(&self.context, arguments).await;
        Ok(shape_output(&self.context, &result, self.hydrate_summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubRegistryClient;
    use crate::tools::{ContextOptions, ExecutionMode, ToolCategory, ToolSelection};
    use serde_json::json;

    async fn toolkit(options: AdapterOptions) -> FunctionToolkit {
        let ctx = AgentContext::resolve(
            Arc::new(StubRegistryClient::new().with_metadata_value("TestAgent")),
            ContextOptions::default(),
        )
        .await
        .unwrap();
        FunctionToolkit::new(Arc::new(ctx), options)
    }

    #[tokio::test]
    async fn test_definitions_shape() {
        let toolkit = toolkit(AdapterOptions::default()).await;
        let defs = toolkit.definitions();
        assert_eq!(defs.len(), 22);

        let get_owner = defs
            .iter()
            .find(|d| d.function.name == "identity_getOwner")
            .unwrap();
        assert_eq!(get_owner.tool_type, "function");
        assert!(!get_owner.function.description.is_empty());
        assert_eq!(get_owner.function.parameters["type"], "object");
    }

    #[tokio::test]
    async fn test_call_returns_data_by_default() {
        let toolkit = toolkit(AdapterOptions::default()).await;
        let value = toolkit
            .call("identity_getMetadata", json!({"agentId": "1", "key": "agentName"}))
            .await
            .unwrap();
        assert_eq!(value["value"], "TestAgent");
    }

    #[tokio::test]
    async fn test_call_hydrates_when_enabled() {
        let toolkit = toolkit(AdapterOptions {
            hydrate_summary: Some(true),
            ..Default::default()
        })
        .await;
        let value = toolkit
            .call("identity_getMetadata", json!({"agentId": "1", "key": "agentName"}))
            .await
            .unwrap();
        assert!(value.as_str().unwrap().contains("TestAgent"));
    }

    #[tokio::test]
    async fn test_validation_error_is_distinguishable() {
        let toolkit = toolkit(AdapterOptions::default()).await;
        let err = toolkit
            .call("identity_getOwner", json!({"agentId": -5}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolkitError::InvalidParameters(_)));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let toolkit = toolkit(AdapterOptions::default()).await;
        let err = toolkit.call("nope", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolkitError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn test_selection_limits_exposed_tools() {
        let toolkit = toolkit(AdapterOptions::with_selection(ToolSelection {
            categories: vec![ToolCategory::Identity],
            ..Default::default()
        }))
        .await;
        assert_eq!(toolkit.definitions().len(), 9);
        let err = toolkit
            .call("reputation_getClients", json!({"agentId": "1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolkitError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn test_return_raw_mode_bypasses_hydration() {
        let ctx = AgentContext::resolve(
            Arc::new(StubRegistryClient::new().with_metadata_value("TestAgent")),
            ContextOptions {
                mode: ExecutionMode::ReturnRaw,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let toolkit = FunctionToolkit::new(
            Arc::new(ctx),
            AdapterOptions {
                hydrate_summary: Some(true),
                ..Default::default()
            },
        );

        let value = toolkit
            .call("identity_getMetadata", json!({"agentId": "1", "key": "agentName"}))
            .await
            .unwrap();
        assert!(value.is_object());
        assert_eq!(value["value"], "TestAgent");
    }
}
