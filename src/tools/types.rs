//! Tool trait and execution envelope.

use async_trait::async_trait;
use serde_json::Value;

use super::context::AgentContext;
use super::schema::InputError;

/// Placeholder used in failure payloads for fields that could not be recovered.
pub const NA: &str = "N/A";

/// Uniform result of one tool execution.
///
/// `data` is always populated; failed executions carry placeholder values
/// plus `error_message`. Callers distinguish success from failure solely by
/// `error_message` being present, never by a raised error.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ToolExecutionResult {
    pub data: Value,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ToolExecutionResult {
    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }
}

/// Build an execution result. With an error message the summary becomes
/// `"{summary} | Error: {message}"`.
pub fn tool_result(
    data: Value,
    summary: impl Into<String>,
    error_message: Option<String>,
) -> ToolExecutionResult {
    let summary = summary.into();
    match error_message {
        Some(message) => ToolExecutionResult {
            data,
            summary: format!("{} | Error: {}", summary, message),
            error_message: Some(message),
        },
        None => ToolExecutionResult {
            data,
            summary,
            error_message: None,
        },
    }
}

/// Build a transaction result. The summary reads
/// `"{action}: {details} (tx {hash})"`, with `n/a` for an empty hash; `data`
/// is expected to carry a `txHash` field.
pub fn tx_result(
    action: &str,
    data: Value,
    extra_details: Option<String>,
    error_message: Option<String>,
) -> ToolExecutionResult {
    let tx_hash = data
        .get("txHash")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("n/a")
        .to_string();

    let summary = match extra_details {
        Some(details) => format!("{}: {} (tx {})", action, details, tx_hash),
        None => format!("{}: submitted transaction {}", action, tx_hash),
    };

    tool_result(data, summary, error_message)
}

/// Echo a raw input field into failure placeholder data, falling back to
/// `"N/A"` when absent or unusable.
pub(crate) fn echo_str(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => NA.to_string(),
    }
}

/// A single operation in the catalog.
///
/// Implementations are stateless unit structs; the catalog holds them as
/// `Arc<dyn AgentTool>` and adapters only ever borrow those references.
#[async_trait]
pub trait AgentTool: Send + Sync {
    /// Unique wire name, e.g. `identity_getOwner`.
    fn name(&self) -> &'static str;

    /// Natural-language description surfaced to the consuming framework.
    fn description(&self) -> &'static str;

    /// JSON Schema for the tool's input object.
    fn input_schema(&self) -> Value;

    /// Validate raw input without executing. Adapters use this before
    /// dispatch so malformed input can surface as a framework-level
    /// validation error, distinct from an execution failure.
    fn check_input(&self, raw: &Value) -> Result<(), InputError>;

    /// Execute against the registry client in `ctx`. Never fails: every
    /// outcome, including invalid input and client errors, is encoded in the
    /// returned envelope.
    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult;
}
