//! ERC-8004 agent identity and reputation toolkit for AI tool-calling
//! frameworks.
//!
//! The crate exposes the on-chain identity and reputation registries as a
//! fixed catalog of typed tool descriptors (`tools`), resolved against a
//! session context, and translated for consumer frameworks by the `adapters`
//! modules (OpenAI-compatible function calling, MCP, rig).
//!
//! ```no_run
//! use std::sync::Arc;
//! use agentry::adapters::openai::FunctionToolkit;
//! use agentry::adapters::AdapterOptions;
//! use agentry::client::EthRegistryClient;
//! use agentry::tools::{AgentContext, ContextOptions};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let client = EthRegistryClient::for_chain(84532, None)?;
//! let context = AgentContext::resolve(Arc::new(client), ContextOptions::default()).await?;
//! let toolkit = FunctionToolkit::new(Arc::new(context), AdapterOptions::default());
//!
//! let tools = toolkit.definitions(); // goes into the chat request
//! let output = toolkit
//!     .call("identity_getOwner", serde_json::json!({ "agentId": "1" }))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod abi;
pub mod adapters;
pub mod chains;
pub mod client;
pub mod config;
pub mod errors;
pub mod registration;
pub mod tools;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use adapters::AdapterOptions;
pub use client::{EthRegistryClient, RegistryClient};
pub use errors::AgentryError;
pub use tools::{
    agent_tools, tool_by_name, AgentContext, AgentTool, ContextOptions, ContextOverrides,
    ExecutionMode, ToolCategory, ToolExecutionResult, ToolSelection,
};
