//! Identity registry tool catalog.
//!
//! One unit struct per operation; `IDENTITY_TOOLS` holds them in declaration
//! order for deterministic selection.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::context::AgentContext;
use super::schema::{
    self, object_schema, string_prop, to_uint_string, uint_prop, uri_prop, InputError,
    MetadataEntryInput, Uint, Uri,
};
use super::types::{echo_str, tool_result, tx_result, AgentTool, ToolExecutionResult, NA};

/// `identity_register`
pub struct Register;

#[derive(Deserialize)]
struct RegisterInput {}

#[async_trait]
impl AgentTool for Register {
    fn name(&self) -> &'static str {
        "identity_register"
    }

    fn description(&self) -> &'static str {
        "Register a new agent without a token URI and return the transaction hash."
    }

    fn input_schema(&self) -> Value {
        object_schema(json!({}), &[])
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<RegisterInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        if let Err(err) = schema::check_input::<RegisterInput>(&raw) {
            return tx_result(
                "Registered agent",
                json!({ "agentId": NA, "txHash": "" }),
                None,
                Some(err.to_string()),
            );
        }

        match ctx.client.register().await {
            Ok(receipt) => {
                let agent_id = to_uint_string(receipt.agent_id);
                let data = json!({ "agentId": agent_id, "txHash": receipt.tx_hash });
                tx_result(
                    "Registered agent",
                    data,
                    Some(format!("agent {} on chain {}", agent_id, ctx.chain_id)),
                    None,
                )
            }
            Err(e) => tx_result(
                "Registered agent",
                json!({ "agentId": NA, "txHash": "" }),
                None,
                Some(e.to_string()),
            ),
        }
    }
}

/// `identity_registerWithUri`
pub struct RegisterWithUri;

#[derive(Deserialize)]
struct RegisterWithUriInput {
    #[serde(rename = "tokenURI")]
    token_uri: Uri,
}

#[async_trait]
impl AgentTool for RegisterWithUri {
    fn name(&self) -> &'static str {
        "identity_registerWithUri"
    }

    fn description(&self) -> &'static str {
        "Register a new agent with the provided token URI and return identifiers."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({ "tokenURI": uri_prop("Registration document URI for the new agent") }),
            &["tokenURI"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<RegisterWithUriInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: RegisterWithUriInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tx_result(
                    "Registered agent with URI",
                    json!({ "agentId": NA, "txHash": "", "tokenURI": echo_str(&raw, "tokenURI") }),
                    None,
                    Some(err.to_string()),
                )
            }
        };

        match ctx.client.register_with_uri(&input.token_uri.0).await {
            Ok(receipt) => {
                let agent_id = to_uint_string(receipt.agent_id);
                let data = json!({
                    "agentId": agent_id,
                    "txHash": receipt.tx_hash,
                    "tokenURI": input.token_uri.0,
                });
                tx_result(
                    "Registered agent with URI",
                    data,
                    Some(format!("agent {} using {}", agent_id, input.token_uri)),
                    None,
                )
            }
            Err(e) => tx_result(
                "Registered agent with URI",
                json!({ "agentId": NA, "txHash": "", "tokenURI": input.token_uri.0 }),
                None,
                Some(e.to_string()),
            ),
        }
    }
}

/// `identity_registerWithMetadata`
pub struct RegisterWithMetadata;

#[derive(Deserialize)]
struct RegisterWithMetadataInput {
    #[serde(rename = "tokenURI")]
    token_uri: Uri,
    #[serde(default)]
    metadata: Vec<MetadataEntryInput>,
}

#[async_trait]
impl AgentTool for RegisterWithMetadata {
    fn name(&self) -> &'static str {
        "identity_registerWithMetadata"
    }

    fn description(&self) -> &'static str {
        "Register a new agent with a token URI plus metadata entries."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "tokenURI": uri_prop("Registration document URI for the new agent"),
                "metadata": {
                    "type": "array",
                    "description": "Metadata entries to set at registration time",
                    "items": {
                        "type": "object",
                        "properties": {
                            "key": string_prop("Metadata key"),
                            "value": string_prop("Metadata value"),
                        },
                        "required": ["key"],
                    },
                },
            }),
            &["tokenURI"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<RegisterWithMetadataInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: RegisterWithMetadataInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tx_result(
                    "Registered agent with metadata",
                    json!({
                        "agentId": NA,
                        "txHash": "",
                        "tokenURI": echo_str(&raw, "tokenURI"),
                        "metadataCount": 0,
                    }),
                    None,
                    Some(err.to_string()),
                )
            }
        };

        let entries: Vec<crate::client::MetadataEntry> = input
            .metadata
            .into_iter()
            .map(MetadataEntryInput::into_entry)
            .collect();

        match ctx
            .client
            .register_with_metadata(&input.token_uri.0, &entries)
            .await
        {
            Ok(receipt) => {
                let agent_id = to_uint_string(receipt.agent_id);
                let data = json!({
                    "agentId": agent_id,
                    "txHash": receipt.tx_hash,
                    "tokenURI": input.token_uri.0,
                    "metadataCount": entries.len(),
                });
                tx_result(
                    "Registered agent with metadata",
                    data,
                    Some(format!(
                        "agent {} with {} metadata entries",
                        agent_id,
                        entries.len()
                    )),
                    None,
                )
            }
            Err(e) => tx_result(
                "Registered agent with metadata",
                json!({
                    "agentId": NA,
                    "txHash": "",
                    "tokenURI": input.token_uri.0,
                    "metadataCount": entries.len(),
                }),
                None,
                Some(e.to_string()),
            ),
        }
    }
}

/// `identity_getTokenUri`
pub struct GetTokenUri;

#[derive(Deserialize)]
struct GetTokenUriInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
}

#[async_trait]
impl AgentTool for GetTokenUri {
    fn name(&self) -> &'static str {
        "identity_getTokenUri"
    }

    fn description(&self) -> &'static str {
        "Fetch the token URI associated with an agent ID."
    }

    fn input_schema(&self) -> Value {
        object_schema(json!({ "agentId": uint_prop("Agent ID to look up") }), &["agentId"])
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<GetTokenUriInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: GetTokenUriInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tool_result(
                    json!({ "agentId": echo_str(&raw, "agentId"), "tokenURI": NA }),
                    "Failed to retrieve token URI",
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        match ctx.client.token_uri(input.agent_id.value()).await {
            Ok(token_uri) => tool_result(
                json!({ "agentId": agent_id, "tokenURI": token_uri }),
                format!("Retrieved token URI for agent {}", agent_id),
                None,
            ),
            Err(e) => tool_result(
                json!({ "agentId": agent_id, "tokenURI": NA }),
                format!("Failed to retrieve token URI for agent {}", agent_id),
                Some(e.to_string()),
            ),
        }
    }
}

/// `identity_setAgentUri`
pub struct SetAgentUri;

#[derive(Deserialize)]
struct SetAgentUriInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    #[serde(rename = "tokenURI")]
    token_uri: Uri,
}

#[async_trait]
impl AgentTool for SetAgentUri {
    fn name(&self) -> &'static str {
        "identity_setAgentUri"
    }

    fn description(&self) -> &'static str {
        "Update the token URI associated with an agent."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent ID to update"),
                "tokenURI": uri_prop("New registration document URI"),
            }),
            &["agentId", "tokenURI"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<SetAgentUriInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: SetAgentUriInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tx_result(
                    "Updated agent URI",
                    json!({
                        "agentId": echo_str(&raw, "agentId"),
                        "txHash": "",
                        "tokenURI": echo_str(&raw, "tokenURI"),
                    }),
                    None,
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        match ctx
            .client
            .set_agent_uri(input.agent_id.value(), &input.token_uri.0)
            .await
        {
            Ok(receipt) => {
                let data = json!({
                    "agentId": agent_id,
                    "txHash": receipt.tx_hash,
                    "tokenURI": input.token_uri.0,
                });
                tx_result(
                    "Updated agent URI",
                    data,
                    Some(format!("agent {} set to {}", agent_id, input.token_uri)),
                    None,
                )
            }
            Err(e) => tx_result(
                "Updated agent URI",
                json!({ "agentId": agent_id, "txHash": "", "tokenURI": input.token_uri.0 }),
                None,
                Some(e.to_string()),
            ),
        }
    }
}

/// `identity_getOwner`
pub struct GetOwner;

#[derive(Deserialize)]
struct GetOwnerInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
}

#[async_trait]
impl AgentTool for GetOwner {
    fn name(&self) -> &'static str {
        "identity_getOwner"
    }

    fn description(&self) -> &'static str {
        "Look up the current owner address for an agent."
    }

    fn input_schema(&self) -> Value {
        object_schema(json!({ "agentId": uint_prop("Agent ID to look up") }), &["agentId"])
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<GetOwnerInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: GetOwnerInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tool_result(
                    json!({ "agentId": echo_str(&raw, "agentId"), "owner": NA }),
                    "Failed to look up owner",
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        match ctx.client.owner_of(input.agent_id.value()).await {
            Ok(owner) => tool_result(
                json!({ "agentId": agent_id, "owner": format!("{}", owner) }),
                format!("Owner for agent {} is {}", agent_id, owner),
                None,
            ),
            Err(e) => tool_result(
                json!({ "agentId": agent_id, "owner": NA }),
                format!("Failed to look up owner for agent {}", agent_id),
                Some(e.to_string()),
            ),
        }
    }
}

/// `identity_getMetadata`
pub struct GetMetadata;

#[derive(Deserialize)]
struct GetMetadataInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    key: schema::NonEmptyString,
}

#[async_trait]
impl AgentTool for GetMetadata {
    fn name(&self) -> &'static str {
        "identity_getMetadata"
    }

    fn description(&self) -> &'static str {
        "Read an on-chain metadata value by key for the given agent."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent ID to read from"),
                "key": string_prop("Metadata key to read"),
            }),
            &["agentId", "key"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<GetMetadataInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: GetMetadataInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tool_result(
                    json!({
                        "agentId": echo_str(&raw, "agentId"),
                        "key": echo_str(&raw, "key"),
                        "value": NA,
                    }),
                    "Failed to read metadata",
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        match ctx
            .client
            .get_metadata(input.agent_id.value(), &input.key.0)
            .await
        {
            Ok(value) => tool_result(
                json!({ "agentId": agent_id, "key": input.key.0, "value": value }),
                format!(
                    "Metadata {} for agent {} is {}",
                    input.key, agent_id, value
                ),
                None,
            ),
            Err(e) => tool_result(
                json!({ "agentId": agent_id, "key": input.key.0, "value": NA }),
                format!("Failed to read metadata {} for agent {}", input.key, agent_id),
                Some(e.to_string()),
            ),
        }
    }
}

/// `identity_setMetadata`
pub struct SetMetadata;

#[derive(Deserialize)]
struct SetMetadataInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    key: schema::NonEmptyString,
    #[serde(default)]
    value: String,
}

#[async_trait]
impl AgentTool for SetMetadata {
    fn name(&self) -> &'static str {
        "identity_setMetadata"
    }

    fn description(&self) -> &'static str {
        "Persist an on-chain metadata key/value pair for an agent."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent ID to update"),
                "key": string_prop("Metadata key to write"),
                "value": string_prop("Metadata value to write"),
            }),
            &["agentId", "key", "value"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<SetMetadataInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: SetMetadataInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tx_result(
                    "Updated metadata",
                    json!({
                        "agentId": echo_str(&raw, "agentId"),
                        "key": echo_str(&raw, "key"),
                        "txHash": "",
                    }),
                    None,
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        match ctx
            .client
            .set_metadata(input.agent_id.value(), &input.key.0, &input.value)
            .await
        {
            Ok(receipt) => {
                let data = json!({
                    "agentId": agent_id,
                    "key": input.key.0,
                    "txHash": receipt.tx_hash,
                });
                tx_result(
                    "Updated metadata",
                    data,
                    Some(format!("agent {} key {}", agent_id, input.key)),
                    None,
                )
            }
            Err(e) => tx_result(
                "Updated metadata",
                json!({ "agentId": agent_id, "key": input.key.0, "txHash": "" }),
                None,
                Some(e.to_string()),
            ),
        }
    }
}

/// `identity_getRegistrationFile`
pub struct GetRegistrationFile;

#[derive(Deserialize)]
struct GetRegistrationFileInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
}

#[async_trait]
impl AgentTool for GetRegistrationFile {
    fn name(&self) -> &'static str {
        "identity_getRegistrationFile"
    }

    fn description(&self) -> &'static str {
        "Fetch and return the full registration JSON referenced by the agent token URI."
    }

    fn input_schema(&self) -> Value {
        object_schema(json!({ "agentId": uint_prop("Agent ID to look up") }), &["agentId"])
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<GetRegistrationFileInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: GetRegistrationFileInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tool_result(
                    json!({ "agentId": echo_str(&raw, "agentId"), "registration": Value::Null }),
                    "Failed to fetch registration file",
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        match ctx.client.registration_file(input.agent_id.value()).await {
            Ok(registration) => {
                let registration_json =
                    serde_json::to_value(&registration).unwrap_or(Value::Null);
                tool_result(
                    json!({ "agentId": agent_id, "registration": registration_json }),
                    format!("Fetched registration file for agent {}", agent_id),
                    None,
                )
            }
            Err(e) => tool_result(
                json!({ "agentId": agent_id, "registration": Value::Null }),
                format!("Failed to fetch registration file for agent {}", agent_id),
                Some(e.to_string()),
            ),
        }
    }
}

/// Identity tools in declaration order.
pub(crate) static IDENTITY_TOOLS: LazyLock<Vec<Arc<dyn AgentTool>>> = LazyLock::new(|| {
    vec![
        Arc::new(Register),
        Arc::new(RegisterWithUri),
        Arc::new(RegisterWithMetadata),
        Arc::new(GetTokenUri),
        Arc::new(SetAgentUri),
        Arc::new(GetOwner),
        Arc::new(GetMetadata),
        Arc::new(SetMetadata),
        Arc::new(GetRegistrationFile),
    ]
});
