//! rig agent-framework adapter (`rig` feature).
//!
//! Wraps each descriptor as a `rig::tool::ToolDyn` so the catalog can be
//! attached to rig agents. This is the string-returning convention:
//! hydrate-summary defaults to on, and when no summary is available the
//! payload is JSON-serialized so the return type stays a string.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rig::completion::ToolDefinition;
use rig::tool::{ToolDyn, ToolError};
use serde_json::Value;

use crate::tools::{agent_tools, AgentContext, AgentTool};

use super::{shape_output_string, AdapterOptions};

/// One catalog descriptor bound to a context, exposed as a rig tool.
pub struct RigTool {
    tool: Arc<dyn AgentTool>,
    context: Arc<AgentContext>,
    hydrate_summary: bool,
}

impl ToolDyn for RigTool {
    fn name(&self) -> String {
        self.tool.name().to_string()
    }

    fn definition(
        &self,
        _prompt: String,
    ) -> Pin<Box<dyn Future<Output = ToolDefinition> + Send + Sync + '_>> {
        Box::pin(futures::future::ready(ToolDefinition {
            name: self.tool.name().to_string(),
            description: self.tool.description().to_string(),
            parameters: self.tool.input_schema(),
        }))
    }

    fn call(
        &self,
        args: String,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + '_>> {
        let tool = Arc::clone(&self.tool);
        let context = Arc::clone(&self.context);
        let hydrate = self.hydrate_summary;

        Box::pin(async move {
            let raw = if args.trim().is_empty() { "{}" } else { args.as_str() };
            let input: Value = serde_json::from_str(raw).map_err(ToolError::JsonError)?;

            tool.check_input(&input)
                .map_err(|e| ToolError::ToolCallError(Box::new(e)))?;

            let result = tool.execute(&context, input).await;
            Ok(shape_output_string(&context, &result, hydrate))
        })
    }
}

/// Build rig tools for the selected descriptors. Hydrate-summary defaults to
/// on for this adapter.
pub fn rig_tools(context: Arc<AgentContext>, options: AdapterOptions) -> Vec<Box<dyn ToolDyn>> {
    let hydrate_summary = options.hydrate_summary.unwrap_or(true);

    agent_tools(&options.selection)
        .into_iter()
        .map(|tool| {
            Box::new(RigTool {
                tool,
                context: Arc::clone(&context),
                hydrate_summary,
            }) as Box<dyn ToolDyn>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubRegistryClient;
    use crate::tools::{ContextOptions, ExecutionMode};
    use serde_json::json;

    async fn tools_with_mode(mode: ExecutionMode) -> Vec<Box<dyn ToolDyn>> {
        let ctx = AgentContext::resolve(
            Arc::new(StubRegistryClient::new().with_metadata_value("TestAgent")),
            ContextOptions {
                mode,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        rig_tools(Arc::new(ctx), AdapterOptions::default())
    }

    fn find<'a>(tools: &'a [Box<dyn ToolDyn>], name: &str) -> &'a dyn ToolDyn {
        tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
            .unwrap()
    }

    #[tokio::test]
    async fn test_definitions_cover_catalog() {
        let tools = tools_with_mode(ExecutionMode::Execute).await;
        assert_eq!(tools.len(), 22);

        let definition = find(&tools, "identity_getOwner")
            .definition(String::new())
            .await;
        assert_eq!(definition.name, "identity_getOwner");
        assert_eq!(definition.parameters["type"], "object");
    }

    #[tokio::test]
    async fn test_call_hydrates_summary_by_default() {
        let tools = tools_with_mode(ExecutionMode::Execute).await;
        let output = find(&tools, "identity_getMetadata")
            .call(r#"{"agentId":"1","key":"agentName"}"#.to_string())
            .await
            .unwrap();
        assert!(output.contains("TestAgent"));
        assert!(!output.starts_with('{'));
    }

    #[tokio::test]
    async fn test_call_return_raw_serializes_data() {
        let tools = tools_with_mode(ExecutionMode::ReturnRaw).await;
        let output = find(&tools, "identity_getMetadata")
            .call(r#"{"agentId":"1","key":"agentName"}"#.to_string())
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!({"agentId": "1", "key": "agentName", "value": "TestAgent"}));
    }

    #[tokio::test]
    async fn test_call_invalid_input_is_tool_error() {
        let tools = tools_with_mode(ExecutionMode::Execute).await;
        let err = find(&tools, "identity_getOwner")
            .call(r#"{"agentId":-3}"#.to_string())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid parameters"));
    }
}
