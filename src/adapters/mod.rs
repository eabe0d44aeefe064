//! Framework adapters.
//!
//! Each submodule translates the selected tool descriptors plus an
//! [`AgentContext`] into one target convention: OpenAI-compatible function
//! calling ([`openai`]), the Model Context Protocol ([`mcp`]), and the rig
//! agent framework ([`rig`], behind the `rig` feature). Adding a fourth
//! framework means adding one module here; the catalog stays untouched.
//!
//! All adapters share the same invocation contract: validate raw input
//! against the descriptor's schema (failures surface as framework-level
//! validation errors), execute with the shared context, then shape the
//! output with [`shape_output`].

pub mod mcp;
pub mod openai;
#[cfg(feature = "rig")]
pub mod rig;

use serde_json::Value;

use crate::tools::{AgentContext, ExecutionMode, ToolExecutionResult, ToolSelection};

/// Common adapter options: which tools to expose and whether to hydrate
/// summaries. `hydrate_summary: None` picks the adapter's own default.
#[derive(Debug, Clone, Default)]
pub struct AdapterOptions {
    pub selection: ToolSelection,
    pub hydrate_summary: Option<bool>,
}

impl AdapterOptions {
    pub fn with_selection(selection: ToolSelection) -> Self {
        Self {
            selection,
            hydrate_summary: None,
        }
    }
}

/// Shape a tool result for the consuming framework.
///
/// `return-raw` mode always yields the structured payload, regardless of the
/// hydrate flag. Otherwise a non-empty summary is returned as a string when
/// hydration is on, and the payload when it is off or the summary is empty.
pub(crate) fn shape_output(
    ctx: &AgentContext,
    result: &ToolExecutionResult,
    hydrate: bool,
) -> Value {
    if ctx.mode == ExecutionMode::ReturnRaw {
        return result.data.clone();
    }
    if hydrate && !result.summary.is_empty() {
        return Value::String(result.summary.clone());
    }
    result.data.clone()
}

/// Variant for adapters that guarantee a string return: falls back to the
/// JSON-serialized payload when no summary is available.
#[cfg(feature = "rig")]
pub(crate) fn shape_output_string(
    ctx: &AgentContext,
    result: &ToolExecutionResult,
    hydrate: bool,
) -> String {
    match shape_output(ctx, result, hydrate) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubRegistryClient;
    use crate::tools::{tool_result, ContextOptions};
    use serde_json::json;
    use std::sync::Arc;

    async fn ctx_with_mode(mode: ExecutionMode) -> AgentContext {
        AgentContext::resolve(
            Arc::new(StubRegistryClient::new()),
            ContextOptions {
                mode,
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_return_raw_ignores_hydrate_flag() {
        let ctx = ctx_with_mode(ExecutionMode::ReturnRaw).await;
        let result = tool_result(json!({"k": "v"}), "A summary", None);

        for hydrate in [true, false] {
            assert_eq!(shape_output(&ctx, &result, hydrate), json!({"k": "v"}));
        }
    }

    #[tokio::test]
    async fn test_hydrate_returns_summary_string() {
        let ctx = ctx_with_mode(ExecutionMode::Execute).await;
        let result = tool_result(json!({"k": "v"}), "A summary", None);

        assert_eq!(shape_output(&ctx, &result, true), json!("A summary"));
        assert_eq!(shape_output(&ctx, &result, false), json!({"k": "v"}));
    }

    #[tokio::test]
    async fn test_empty_summary_falls_back_to_data() {
        let ctx = ctx_with_mode(ExecutionMode::Execute).await;
        let result = tool_result(json!({"k": "v"}), "", None);

        assert_eq!(shape_output(&ctx, &result, true), json!({"k": "v"}));
    }
}
