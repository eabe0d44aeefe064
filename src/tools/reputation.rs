//! Reputation registry tool catalog.

use std::sync::{Arc, LazyLock};

use alloy::primitives::U256;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::FeedbackAuth;

use super::context::{resolve_field, AgentContext};
use super::schema::{
    self, address_array_prop, address_prop, bool_prop, bytes32_prop, object_schema, score_prop,
    string_prop, to_uint_string, uint_prop, uri_prop, AddressField, Hash32, HexBytes, InputError,
    NonEmptyString, Score, Uint, Uri,
};
use super::types::{echo_str, tool_result, tx_result, AgentTool, ToolExecutionResult, NA};

/// Unsigned authorization tuple as it appears in tool input and output.
#[derive(Debug, Clone, Deserialize)]
struct FeedbackAuthInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    #[serde(rename = "clientAddress")]
    client_address: AddressField,
    #[serde(rename = "indexLimit")]
    index_limit: Uint,
    expiry: Uint,
    #[serde(rename = "chainId")]
    chain_id: Uint,
    #[serde(rename = "identityRegistry")]
    identity_registry: AddressField,
    #[serde(rename = "signerAddress")]
    signer_address: AddressField,
}

impl FeedbackAuthInput {
    fn into_auth(self) -> Result<FeedbackAuth, InputError> {
        Ok(FeedbackAuth {
            agent_id: self.agent_id.value(),
            client_address: self.client_address.0,
            index_limit: self.index_limit.as_u64()?,
            expiry: self.expiry.value(),
            chain_id: self.chain_id.value(),
            identity_registry: self.identity_registry.0,
            signer_address: self.signer_address.0,
        })
    }
}

/// String-serialized JSON view of an authorization tuple.
fn auth_view(auth: &FeedbackAuth) -> Value {
    json!({
        "agentId": to_uint_string(auth.agent_id),
        "clientAddress": format!("{}", auth.client_address),
        "indexLimit": auth.index_limit.to_string(),
        "expiry": to_uint_string(auth.expiry),
        "chainId": to_uint_string(auth.chain_id),
        "identityRegistry": format!("{}", auth.identity_registry),
        "signerAddress": format!("{}", auth.signer_address),
    })
}

/// Placeholder view built from raw input for failure payloads.
fn auth_view_fallback(raw: &Value) -> Value {
    json!({
        "agentId": echo_str(raw, "agentId"),
        "clientAddress": echo_str(raw, "clientAddress"),
        "indexLimit": echo_str(raw, "indexLimit"),
        "expiry": echo_str(raw, "expiry"),
        "chainId": echo_str(raw, "chainId"),
        "identityRegistry": NA,
        "signerAddress": echo_str(raw, "signerAddress"),
    })
}

fn auth_schema_props() -> Value {
    json!({
        "agentId": uint_prop("Agent the feedback targets"),
        "clientAddress": address_prop("Address authorized to submit feedback"),
        "indexLimit": uint_prop("Highest feedback index this authorization covers"),
        "expiry": uint_prop("Authorization expiry as unix seconds"),
        "chainId": uint_prop("Chain id the authorization is valid on"),
        "identityRegistry": address_prop("Identity registry the reputation registry references"),
        "signerAddress": address_prop("Address whose signature will authorize the feedback"),
    })
}

/// `reputation_createFeedbackAuth`
pub struct CreateFeedbackAuth;

#[derive(Deserialize)]
struct CreateFeedbackAuthInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    #[serde(rename = "clientAddress")]
    client_address: AddressField,
    #[serde(rename = "indexLimit")]
    index_limit: Uint,
    expiry: Uint,
    #[serde(rename = "chainId")]
    chain_id: Option<Uint>,
    #[serde(rename = "signerAddress")]
    signer_address: Option<AddressField>,
}

/// Resolve the authorization tuple from input plus context defaults.
fn build_feedback_auth(
    ctx: &AgentContext,
    input: CreateFeedbackAuthInput,
) -> Result<FeedbackAuth, InputError> {
    let chain_id = resolve_field(
        input.chain_id.map(|c| c.value()),
        Some(U256::from(ctx.chain_id)),
        "chainId",
    )?;
    let signer_address =
        resolve_field(input.signer_address.map(|a| a.0), ctx.caller, "signerAddress")?;

    ctx.client
        .create_feedback_auth(
            input.agent_id.value(),
            input.client_address.0,
            input.index_limit.as_u64()?,
            input.expiry.value(),
            chain_id,
            signer_address,
        )
        .map_err(|e| InputError(e.to_string()))
}

#[async_trait]
impl AgentTool for CreateFeedbackAuth {
    fn name(&self) -> &'static str {
        "reputation_createFeedbackAuth"
    }

    fn description(&self) -> &'static str {
        "Generate a feedback authorization tuple for a given agent/client pair. \
         Chain id and signer address default to the session context when omitted."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent the feedback targets"),
                "clientAddress": address_prop("Address that will be authorized to submit feedback"),
                "indexLimit": uint_prop("Highest feedback index this authorization covers"),
                "expiry": uint_prop("Authorization expiry as unix seconds"),
                "chainId": uint_prop("Chain id; injected from the session context when omitted"),
                "signerAddress": address_prop("Signer; injected from the session context when omitted"),
            }),
            &["agentId", "clientAddress", "indexLimit", "expiry"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<CreateFeedbackAuthInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let parsed: Result<CreateFeedbackAuthInput, _> = schema::parse_input(&raw);
        let auth = match parsed.and_then(|input| build_feedback_auth(ctx, input)) {
            Ok(auth) => auth,
            Err(err) => {
                return tool_result(
                    json!({ "feedbackAuth": auth_view_fallback(&raw) }),
                    format!(
                        "Failed to create feedback authorization for agent {}",
                        echo_str(&raw, "agentId")
                    ),
                    Some(err.to_string()),
                )
            }
        };

        tool_result(
            json!({ "feedbackAuth": auth_view(&auth) }),
            format!(
                "Created feedback authorization for agent {}",
                to_uint_string(auth.agent_id)
            ),
            None,
        )
    }
}

/// `reputation_signFeedbackAuth`
pub struct SignFeedbackAuth;

#[derive(Deserialize)]
struct SignFeedbackAuthInput {
    #[serde(rename = "feedbackAuth")]
    feedback_auth: FeedbackAuthInput,
}

#[async_trait]
impl AgentTool for SignFeedbackAuth {
    fn name(&self) -> &'static str {
        "reputation_signFeedbackAuth"
    }

    fn description(&self) -> &'static str {
        "Sign an existing feedback authorization tuple using the configured signer."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "feedbackAuth": {
                    "type": "object",
                    "description": "Unsigned feedback authorization tuple",
                    "properties": auth_schema_props(),
                    "required": [
                        "agentId", "clientAddress", "indexLimit", "expiry",
                        "chainId", "identityRegistry", "signerAddress",
                    ],
                },
            }),
            &["feedbackAuth"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<SignFeedbackAuthInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let fallback = || {
            json!({
                "signature": NA,
                "feedbackAuth": auth_view_fallback(raw.get("feedbackAuth").unwrap_or(&Value::Null)),
            })
        };

        let parsed: Result<SignFeedbackAuthInput, _> = schema::parse_input(&raw);
        let auth = match parsed.and_then(|input| input.feedback_auth.into_auth()) {
            Ok(auth) => auth,
            Err(err) => {
                return tool_result(
                    fallback(),
                    "Failed to sign feedback authorization",
                    Some(err.to_string()),
                )
            }
        };

        match ctx.client.sign_feedback_auth(&auth).await {
            Ok(signature) => {
                let signature = format!("0x{}", hex::encode(signature));
                tool_result(
                    json!({ "signature": signature, "feedbackAuth": auth_view(&auth) }),
                    format!(
                        "Signed feedback authorization for agent {}",
                        to_uint_string(auth.agent_id)
                    ),
                    None,
                )
            }
            Err(e) => tool_result(
                json!({ "signature": NA, "feedbackAuth": auth_view(&auth) }),
                format!(
                    "Failed to sign feedback authorization for agent {}",
                    to_uint_string(auth.agent_id)
                ),
                Some(e.to_string()),
            ),
        }
    }
}

/// `reputation_createAndSignFeedbackAuth`
pub struct CreateAndSignFeedbackAuth;

#[async_trait]
impl AgentTool for CreateAndSignFeedbackAuth {
    fn name(&self) -> &'static str {
        "reputation_createAndSignFeedbackAuth"
    }

    fn description(&self) -> &'static str {
        "Create and sign a feedback authorization tuple for a given agent/client pair in one step."
    }

    fn input_schema(&self) -> Value {
        CreateFeedbackAuth.input_schema()
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<CreateFeedbackAuthInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let fallback = || {
            json!({
                "signature": NA,
                "feedbackAuth": auth_view_fallback(&raw),
            })
        };

        let parsed: Result<CreateFeedbackAuthInput, _> = schema::parse_input(&raw);
        let auth = match parsed.and_then(|input| build_feedback_auth(ctx, input)) {
            Ok(auth) => auth,
            Err(err) => {
                return tool_result(
                    fallback(),
                    format!(
                        "Failed to create and sign feedback authorization for agent {}",
                        echo_str(&raw, "agentId")
                    ),
                    Some(err.to_string()),
                )
            }
        };

        match ctx.client.sign_feedback_auth(&auth).await {
            Ok(signature) => {
                let signature = format!("0x{}", hex::encode(signature));
                tool_result(
                    json!({ "signature": signature, "feedbackAuth": auth_view(&auth) }),
                    format!(
                        "Created and signed feedback authorization for agent {}. Signature: {}",
                        to_uint_string(auth.agent_id),
                        signature
                    ),
                    None,
                )
            }
            Err(e) => tool_result(
                json!({ "signature": NA, "feedbackAuth": auth_view(&auth) }),
                format!(
                    "Failed to create and sign feedback authorization for agent {}",
                    to_uint_string(auth.agent_id)
                ),
                Some(e.to_string()),
            ),
        }
    }
}

/// `reputation_giveFeedback`
pub struct GiveFeedbackTool;

#[derive(Deserialize)]
struct GiveFeedbackInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    score: Score,
    tag1: Option<NonEmptyString>,
    tag2: Option<NonEmptyString>,
    #[serde(rename = "feedbackUri")]
    feedback_uri: Option<Uri>,
    #[serde(rename = "feedbackHash")]
    feedback_hash: Option<Hash32>,
    /// Signed authorization blob; forwarded to the registry unchanged.
    #[serde(rename = "feedbackAuth")]
    feedback_auth: HexBytes,
}

#[async_trait]
impl AgentTool for GiveFeedbackTool {
    fn name(&self) -> &'static str {
        "reputation_giveFeedback"
    }

    fn description(&self) -> &'static str {
        "Submit feedback on behalf of an authorized client."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent the feedback targets"),
                "score": score_prop("Feedback score between 0 and 100"),
                "tag1": string_prop("Optional primary tag"),
                "tag2": string_prop("Optional secondary tag"),
                "feedbackUri": uri_prop("Optional URI of the detailed feedback document"),
                "feedbackHash": bytes32_prop("Optional 32-byte hash of the feedback document"),
                "feedbackAuth": string_prop("Hex-encoded signed feedback authorization"),
            }),
            &["agentId", "score", "feedbackAuth"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<GiveFeedbackInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: GiveFeedbackInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tx_result(
                    "Submitted feedback",
                    json!({
                        "agentId": echo_str(&raw, "agentId"),
                        "txHash": "",
                        "score": raw.get("score").cloned().unwrap_or(Value::Null),
                    }),
                    None,
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        let score = input.score.0;
        let params = crate::client::GiveFeedback {
            agent_id: input.agent_id.value(),
            score,
            tag1: input.tag1.map(|t| t.0),
            tag2: input.tag2.map(|t| t.0),
            file_uri: input.feedback_uri.map(|u| u.0),
            file_hash: input.feedback_hash.map(|h| h.0),
            feedback_auth: input.feedback_auth.0,
        };

        match ctx.client.give_feedback(params).await {
            Ok(receipt) => {
                let data = json!({
                    "agentId": agent_id,
                    "txHash": receipt.tx_hash,
                    "score": score,
                });
                tx_result(
                    "Submitted feedback",
                    data,
                    Some(format!("agent {} score {}", agent_id, score)),
                    None,
                )
            }
            Err(e) => tx_result(
                "Submitted feedback",
                json!({ "agentId": agent_id, "txHash": "", "score": score }),
                None,
                Some(e.to_string()),
            ),
        }
    }
}

/// `reputation_revokeFeedback`
pub struct RevokeFeedback;

#[derive(Deserialize)]
struct RevokeFeedbackInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    #[serde(rename = "feedbackIndex")]
    feedback_index: Uint,
}

#[async_trait]
impl AgentTool for RevokeFeedback {
    fn name(&self) -> &'static str {
        "reputation_revokeFeedback"
    }

    fn description(&self) -> &'static str {
        "Revoke a previously submitted feedback entry."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent the feedback targets"),
                "feedbackIndex": uint_prop("Index of the feedback entry to revoke"),
            }),
            &["agentId", "feedbackIndex"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<RevokeFeedbackInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let fallback_data = |raw: &Value| {
            json!({
                "agentId": echo_str(raw, "agentId"),
                "feedbackIndex": echo_str(raw, "feedbackIndex"),
                "txHash": "",
            })
        };

        let parsed: Result<RevokeFeedbackInput, _> = schema::parse_input(&raw);
        let (input, index) = match parsed.and_then(|i| {
            let index = i.feedback_index.as_u64()?;
            Ok((i, index))
        }) {
            Ok(pair) => pair,
            Err(err) => {
                return tx_result(
                    "Revoked feedback",
                    fallback_data(&raw),
                    None,
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        match ctx.client.revoke_feedback(input.agent_id.value(), index).await {
            Ok(receipt) => {
                let data = json!({
                    "agentId": agent_id,
                    "feedbackIndex": index.to_string(),
                    "txHash": receipt.tx_hash,
                });
                tx_result(
                    "Revoked feedback",
                    data,
                    Some(format!("agent {} index {}", agent_id, index)),
                    None,
                )
            }
            Err(e) => tx_result(
                "Revoked feedback",
                json!({ "agentId": agent_id, "feedbackIndex": index.to_string(), "txHash": "" }),
                None,
                Some(e.to_string()),
            ),
        }
    }
}

/// `reputation_appendResponse`
pub struct AppendResponse;

#[derive(Deserialize)]
struct AppendResponseInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    #[serde(rename = "clientAddress")]
    client_address: AddressField,
    #[serde(rename = "feedbackIndex")]
    feedback_index: Uint,
    #[serde(rename = "responseUri")]
    response_uri: Option<String>,
    #[serde(rename = "responseHash")]
    response_hash: Option<Hash32>,
}

#[async_trait]
impl AgentTool for AppendResponse {
    fn name(&self) -> &'static str {
        "reputation_appendResponse"
    }

    fn description(&self) -> &'static str {
        "Attach a response URI or hash to an existing feedback entry."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent the feedback targets"),
                "clientAddress": address_prop("Client that submitted the feedback"),
                "feedbackIndex": uint_prop("Index of the feedback entry to respond to"),
                "responseUri": string_prop("Optional response document URI"),
                "responseHash": bytes32_prop("Optional 32-byte hash of the response document"),
            }),
            &["agentId", "clientAddress", "feedbackIndex"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<AppendResponseInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let fallback_data = |raw: &Value| {
            json!({
                "agentId": echo_str(raw, "agentId"),
                "clientAddress": echo_str(raw, "clientAddress"),
                "feedbackIndex": echo_str(raw, "feedbackIndex"),
                "txHash": "",
            })
        };

        let parsed: Result<AppendResponseInput, _> = schema::parse_input(&raw);
        let (input, index) = match parsed.and_then(|i| {
            let index = i.feedback_index.as_u64()?;
            Ok((i, index))
        }) {
            Ok(pair) => pair,
            Err(err) => {
                return tx_result(
                    "Appended feedback response",
                    fallback_data(&raw),
                    None,
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        let client_address = format!("{}", input.client_address.0);
        match ctx
            .client
            .append_response(
                input.agent_id.value(),
                input.client_address.0,
                index,
                input.response_uri.as_deref().unwrap_or(""),
                input.response_hash.map(|h| h.0),
            )
            .await
        {
            Ok(receipt) => {
                let data = json!({
                    "agentId": agent_id,
                    "clientAddress": client_address,
                    "feedbackIndex": index.to_string(),
                    "txHash": receipt.tx_hash,
                });
                tx_result(
                    "Appended feedback response",
                    data,
                    Some(format!("agent {} index {}", agent_id, index)),
                    None,
                )
            }
            Err(e) => tx_result(
                "Appended feedback response",
                json!({
                    "agentId": agent_id,
                    "clientAddress": client_address,
                    "feedbackIndex": index.to_string(),
                    "txHash": "",
                }),
                None,
                Some(e.to_string()),
            ),
        }
    }
}

/// `reputation_getIdentityRegistry`
pub struct GetIdentityRegistry;

#[derive(Deserialize)]
struct GetIdentityRegistryInput {}

#[async_trait]
impl AgentTool for GetIdentityRegistry {
    fn name(&self) -> &'static str {
        "reputation_getIdentityRegistry"
    }

    fn description(&self) -> &'static str {
        "Return the identity registry address that the reputation registry references."
    }

    fn input_schema(&self) -> Value {
        object_schema(json!({}), &[])
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<GetIdentityRegistryInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        if let Err(err) = schema::check_input::<GetIdentityRegistryInput>(&raw) {
            return tool_result(
                json!({ "identityRegistry": NA }),
                "Failed to fetch identity registry address",
                Some(err.to_string()),
            );
        }

        match ctx.client.identity_registry().await {
            Ok(address) => tool_result(
                json!({ "identityRegistry": format!("{}", address) }),
                format!("The reputation registry references identity registry {}", address),
                None,
            ),
            Err(e) => tool_result(
                json!({ "identityRegistry": NA }),
                "Failed to fetch identity registry address",
                Some(e.to_string()),
            ),
        }
    }
}

/// `reputation_getSummary`
pub struct GetSummary;

#[derive(Deserialize)]
struct GetSummaryInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    #[serde(rename = "clientAddresses")]
    client_addresses: Option<Vec<AddressField>>,
    tag1: Option<NonEmptyString>,
    tag2: Option<NonEmptyString>,
}

#[async_trait]
impl AgentTool for GetSummary {
    fn name(&self) -> &'static str {
        "reputation_getSummary"
    }

    fn description(&self) -> &'static str {
        "Aggregate total feedback count and average score with optional filters."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent to summarize"),
                "clientAddresses": address_array_prop("Optional client address filter"),
                "tag1": string_prop("Optional primary tag filter"),
                "tag2": string_prop("Optional secondary tag filter"),
            }),
            &["agentId"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<GetSummaryInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let filters_fallback = |raw: &Value| {
            json!({
                "clientAddresses": raw.get("clientAddresses").cloned().unwrap_or(Value::Null),
                "tag1": raw.get("tag1").cloned().unwrap_or(Value::Null),
                "tag2": raw.get("tag2").cloned().unwrap_or(Value::Null),
            })
        };

        let input: GetSummaryInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tool_result(
                    json!({
                        "agentId": echo_str(&raw, "agentId"),
                        "count": NA,
                        "averageScore": 0,
                        "filters": filters_fallback(&raw),
                    }),
                    format!("Failed to fetch summary for agent {}", echo_str(&raw, "agentId")),
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        let clients: Vec<alloy::primitives::Address> = input
            .client_addresses
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|a| a.0)
            .collect();
        let filters = json!({
            "clientAddresses": input.client_addresses.as_ref().map(|list| {
                list.iter().map(|a| format!("{}", a.0)).collect::<Vec<_>>()
            }),
            "tag1": input.tag1.as_ref().map(|t| t.0.clone()),
            "tag2": input.tag2.as_ref().map(|t| t.0.clone()),
        });

        match ctx
            .client
            .feedback_summary(
                input.agent_id.value(),
                &clients,
                input.tag1.as_ref().map(|t| t.0.as_str()),
                input.tag2.as_ref().map(|t| t.0.as_str()),
            )
            .await
        {
            Ok(summary) => tool_result(
                json!({
                    "agentId": agent_id,
                    "count": summary.count.to_string(),
                    "averageScore": summary.average_score,
                    "filters": filters,
                }),
                format!(
                    "Summary for agent {} with {} entries and average score {}",
                    agent_id, summary.count, summary.average_score
                ),
                None,
            ),
            Err(e) => tool_result(
                json!({
                    "agentId": agent_id,
                    "count": NA,
                    "averageScore": 0,
                    "filters": filters,
                }),
                format!("Failed to fetch summary for agent {}", agent_id),
                Some(e.to_string()),
            ),
        }
    }
}

/// `reputation_readFeedback`
pub struct ReadFeedback;

#[derive(Deserialize)]
struct ReadFeedbackInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    #[serde(rename = "clientAddress")]
    client_address: AddressField,
    index: Uint,
}

#[async_trait]
impl AgentTool for ReadFeedback {
    fn name(&self) -> &'static str {
        "reputation_readFeedback"
    }

    fn description(&self) -> &'static str {
        "Read a single feedback entry for an agent and client."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent the feedback targets"),
                "clientAddress": address_prop("Client that submitted the feedback"),
                "index": uint_prop("Feedback index to read"),
            }),
            &["agentId", "clientAddress", "index"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<ReadFeedbackInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let fallback_data = |raw: &Value| {
            json!({
                "agentId": echo_str(raw, "agentId"),
                "clientAddress": echo_str(raw, "clientAddress"),
                "index": echo_str(raw, "index"),
                "score": 0,
                "tag1": NA,
                "tag2": NA,
                "isRevoked": false,
            })
        };

        let parsed: Result<ReadFeedbackInput, _> = schema::parse_input(&raw);
        let (input, index) = match parsed.and_then(|i| {
            let index = i.index.as_u64()?;
            Ok((i, index))
        }) {
            Ok(pair) => pair,
            Err(err) => {
                return tool_result(
                    fallback_data(&raw),
                    "Failed to read feedback",
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        let client_address = format!("{}", input.client_address.0);
        match ctx
            .client
            .read_feedback(input.agent_id.value(), input.client_address.0, index)
            .await
        {
            Ok(entry) => tool_result(
                json!({
                    "agentId": agent_id,
                    "clientAddress": client_address,
                    "index": index.to_string(),
                    "score": entry.score,
                    "tag1": entry.tag1,
                    "tag2": entry.tag2,
                    "isRevoked": entry.is_revoked,
                }),
                format!(
                    "Feedback index {} for agent {} has score {}",
                    index, agent_id, entry.score
                ),
                None,
            ),
            Err(e) => tool_result(
                json!({
                    "agentId": agent_id,
                    "clientAddress": client_address,
                    "index": index.to_string(),
                    "score": 0,
                    "tag1": NA,
                    "tag2": NA,
                    "isRevoked": false,
                }),
                format!("Failed to read feedback index {} for agent {}", index, agent_id),
                Some(e.to_string()),
            ),
        }
    }
}

/// `reputation_readAllFeedback`
pub struct ReadAllFeedback;

#[derive(Deserialize)]
struct ReadAllFeedbackInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    #[serde(rename = "clientAddresses")]
    client_addresses: Option<Vec<AddressField>>,
    tag1: Option<NonEmptyString>,
    tag2: Option<NonEmptyString>,
    #[serde(rename = "includeRevoked")]
    include_revoked: Option<bool>,
}

#[async_trait]
impl AgentTool for ReadAllFeedback {
    fn name(&self) -> &'static str {
        "reputation_readAllFeedback"
    }

    fn description(&self) -> &'static str {
        "Read all feedback entries with optional client and tag filters."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent the feedback targets"),
                "clientAddresses": address_array_prop("Optional client address filter"),
                "tag1": string_prop("Optional primary tag filter"),
                "tag2": string_prop("Optional secondary tag filter"),
                "includeRevoked": bool_prop("Whether to include revoked entries"),
            }),
            &["agentId"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<ReadAllFeedbackInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: ReadAllFeedbackInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tool_result(
                    json!({
                        "agentId": echo_str(&raw, "agentId"),
                        "clientAddresses": [],
                        "scores": [],
                        "tag1s": [],
                        "tag2s": [],
                        "revokedStatuses": [],
                        "filters": Value::Null,
                    }),
                    "Failed to read feedback entries",
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        let clients: Vec<alloy::primitives::Address> = input
            .client_addresses
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|a| a.0)
            .collect();
        let filters = json!({
            "clientAddresses": input.client_addresses.as_ref().map(|list| {
                list.iter().map(|a| format!("{}", a.0)).collect::<Vec<_>>()
            }),
            "tag1": input.tag1.as_ref().map(|t| t.0.clone()),
            "tag2": input.tag2.as_ref().map(|t| t.0.clone()),
            "includeRevoked": input.include_revoked,
        });

        match ctx
            .client
            .read_all_feedback(
                input.agent_id.value(),
                &clients,
                input.tag1.as_ref().map(|t| t.0.as_str()),
                input.tag2.as_ref().map(|t| t.0.as_str()),
                input.include_revoked.unwrap_or(false),
            )
            .await
        {
            Ok(log) => {
                let entry_count = log.scores.len();
                tool_result(
                    json!({
                        "agentId": agent_id,
                        "clientAddresses": log.clients.iter().map(|a| format!("{}", a)).collect::<Vec<_>>(),
                        "scores": log.scores,
                        "tag1s": log.tag1s,
                        "tag2s": log.tag2s,
                        "revokedStatuses": log.revoked,
                        "filters": filters,
                    }),
                    format!("Read {} feedback entries for agent {}", entry_count, agent_id),
                    None,
                )
            }
            Err(e) => tool_result(
                json!({
                    "agentId": agent_id,
                    "clientAddresses": [],
                    "scores": [],
                    "tag1s": [],
                    "tag2s": [],
                    "revokedStatuses": [],
                    "filters": filters,
                }),
                format!("Failed to read feedback entries for agent {}", agent_id),
                Some(e.to_string()),
            ),
        }
    }
}

/// `reputation_getResponseCount`
pub struct GetResponseCount;

#[derive(Deserialize)]
struct GetResponseCountInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    #[serde(rename = "clientAddress")]
    client_address: Option<AddressField>,
    #[serde(rename = "feedbackIndex")]
    feedback_index: Option<Uint>,
    responders: Option<Vec<AddressField>>,
}

#[async_trait]
impl AgentTool for GetResponseCount {
    fn name(&self) -> &'static str {
        "reputation_getResponseCount"
    }

    fn description(&self) -> &'static str {
        "Return how many responses exist for the given feedback filter set."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent the feedback targets"),
                "clientAddress": address_prop("Optional client address filter"),
                "feedbackIndex": uint_prop("Optional feedback index filter"),
                "responders": address_array_prop("Optional responder address filter"),
            }),
            &["agentId"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<GetResponseCountInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let parsed: Result<GetResponseCountInput, _> = schema::parse_input(&raw);
        let (input, index) = match parsed.and_then(|i| {
            let index = i.feedback_index.map(|x| x.as_u64()).transpose()?;
            Ok((i, index))
        }) {
            Ok(pair) => pair,
            Err(err) => {
                return tool_result(
                    json!({
                        "agentId": echo_str(&raw, "agentId"),
                        "count": NA,
                        "filters": Value::Null,
                    }),
                    "Failed to count feedback responses",
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        let responders: Vec<alloy::primitives::Address> = input
            .responders
            .as_deref()
            .unwrap_or(&[])
            .iter()
            .map(|a| a.0)
            .collect();
        let filters = json!({
            "clientAddress": input.client_address.as_ref().map(|a| format!("{}", a.0)),
            "feedbackIndex": index.map(|i| i.to_string()),
            "responders": input.responders.as_ref().map(|list| {
                list.iter().map(|a| format!("{}", a.0)).collect::<Vec<_>>()
            }),
        });

        match ctx
            .client
            .response_count(
                input.agent_id.value(),
                input.client_address.map(|a| a.0),
                index,
                &responders,
            )
            .await
        {
            Ok(count) => tool_result(
                json!({ "agentId": agent_id, "count": count.to_string(), "filters": filters }),
                format!("Response count for agent {} is {}", agent_id, count),
                None,
            ),
            Err(e) => tool_result(
                json!({ "agentId": agent_id, "count": NA, "filters": filters }),
                format!("Failed to count responses for agent {}", agent_id),
                Some(e.to_string()),
            ),
        }
    }
}

/// `reputation_getClients`
pub struct GetClients;

#[derive(Deserialize)]
struct GetClientsInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
}

#[async_trait]
impl AgentTool for GetClients {
    fn name(&self) -> &'static str {
        "reputation_getClients"
    }

    fn description(&self) -> &'static str {
        "List client addresses that have ever submitted feedback for the agent."
    }

    fn input_schema(&self) -> Value {
        object_schema(json!({ "agentId": uint_prop("Agent to look up") }), &["agentId"])
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<GetClientsInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: GetClientsInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tool_result(
                    json!({ "agentId": echo_str(&raw, "agentId"), "clients": [] }),
                    "Failed to list feedback clients",
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        match ctx.client.feedback_clients(input.agent_id.value()).await {
            Ok(clients) => {
                let list: Vec<String> = clients.iter().map(|a| format!("{}", a)).collect();
                tool_result(
                    json!({ "agentId": agent_id, "clients": list }),
                    format!("Found {} feedback clients for agent {}", clients.len(), agent_id),
                    None,
                )
            }
            Err(e) => tool_result(
                json!({ "agentId": agent_id, "clients": [] }),
                format!("Failed to list feedback clients for agent {}", agent_id),
                Some(e.to_string()),
            ),
        }
    }
}

/// `reputation_getLastIndex`
pub struct GetLastIndex;

#[derive(Deserialize)]
struct GetLastIndexInput {
    #[serde(rename = "agentId")]
    agent_id: Uint,
    #[serde(rename = "clientAddress")]
    client_address: AddressField,
}

#[async_trait]
impl AgentTool for GetLastIndex {
    fn name(&self) -> &'static str {
        "reputation_getLastIndex"
    }

    fn description(&self) -> &'static str {
        "Return the latest feedback index for a client/agent pair."
    }

    fn input_schema(&self) -> Value {
        object_schema(
            json!({
                "agentId": uint_prop("Agent to look up"),
                "clientAddress": address_prop("Client that submitted the feedback"),
            }),
            &["agentId", "clientAddress"],
        )
    }

    fn check_input(&self, raw: &Value) -> Result<(), InputError> {
        schema::check_input::<GetLastIndexInput>(raw)
    }

    async fn execute(&self, ctx: &AgentContext, raw: Value) -> ToolExecutionResult {
        let input: GetLastIndexInput = match schema::parse_input(&raw) {
            Ok(input) => input,
            Err(err) => {
                return tool_result(
                    json!({
                        "agentId": echo_str(&raw, "agentId"),
                        "clientAddress": echo_str(&raw, "clientAddress"),
                        "lastIndex": NA,
                    }),
                    "Failed to fetch last feedback index",
                    Some(err.to_string()),
                )
            }
        };

        let agent_id = input.agent_id.to_string();
        let client_address = format!("{}", input.client_address.0);
        match ctx
            .client
            .last_feedback_index(input.agent_id.value(), input.client_address.0)
            .await
        {
            Ok(last_index) => tool_result(
                json!({
                    "agentId": agent_id,
                    "clientAddress": client_address,
                    "lastIndex": last_index.to_string(),
                }),
                format!(
                    "Last feedback index for client {} is {}",
                    client_address, last_index
                ),
                None,
            ),
            Err(e) => tool_result(
                json!({
                    "agentId": agent_id,
                    "clientAddress": client_address,
                    "lastIndex": NA,
                }),
                format!("Failed to fetch last feedback index for agent {}", agent_id),
                Some(e.to_string()),
            ),
        }
    }
}

/// Reputation tools in declaration order.
pub(crate) static REPUTATION_TOOLS: LazyLock<Vec<Arc<dyn AgentTool>>> = LazyLock::new(|| {
    vec![
        Arc::new(CreateFeedbackAuth),
        Arc::new(SignFeedbackAuth),
        Arc::new(CreateAndSignFeedbackAuth),
        Arc::new(GiveFeedbackTool),
        Arc::new(RevokeFeedback),
        Arc::new(AppendResponse),
        Arc::new(GetIdentityRegistry),
        Arc::new(GetSummary),
        Arc::new(ReadFeedback),
        Arc::new(ReadAllFeedback),
        Arc::new(GetResponseCount),
        Arc::new(GetClients),
        Arc::new(GetLastIndex),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubRegistryClient;
    use crate::tools::context::{AgentContext, ContextOptions};
    use alloy::primitives::Address;

    async fn test_ctx(client: StubRegistryClient) -> (Arc<StubRegistryClient>, AgentContext) {
        let client = Arc::new(client);
        let ctx = AgentContext::resolve(
            Arc::clone(&client) as Arc<dyn crate::client::RegistryClient>,
            ContextOptions::default(),
        )
        .await
        .unwrap();
        (client, ctx)
    }

    const CLIENT_ADDR: &str = "0x2222222222222222222222222222222222222222";

    #[tokio::test]
    async fn test_give_feedback_rejects_out_of_range_score_before_call() {
        let (client, ctx) = test_ctx(StubRegistryClient::new()).await;

        for score in [-1, 101, 250] {
            let result = GiveFeedbackTool
                .execute(
                    &ctx,
                    json!({ "agentId": "1", "score": score, "feedbackAuth": "0xabcd" }),
                )
                .await;
            assert!(result.error_message.is_some(), "score {} accepted", score);
        }
        assert_eq!(client.invocation_count(), 0);
    }

    #[tokio::test]
    async fn test_give_feedback_forwards_auth_bytes_unchanged() {
        let (client, ctx) = test_ctx(StubRegistryClient::new()).await;

        let result = GiveFeedbackTool
            .execute(
                &ctx,
                json!({
                    "agentId": "9",
                    "score": 85,
                    "tag1": "quality",
                    "feedbackAuth": "0xdeadbeef",
                }),
            )
            .await;

        assert!(result.error_message.is_none());
        let forwarded = client.last_give_feedback().unwrap();
        assert_eq!(forwarded.feedback_auth, vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(forwarded.score, 85);
        assert!(result.summary.contains("agent 9 score 85"));
    }

    #[tokio::test]
    async fn test_create_feedback_auth_uses_context_defaults() {
        let signer = Address::repeat_byte(0x55);
        let (_, ctx) =
            test_ctx(StubRegistryClient::new().with_chain_id(84532).with_caller(signer)).await;

        let result = CreateFeedbackAuth
            .execute(
                &ctx,
                json!({
                    "agentId": "4",
                    "clientAddress": CLIENT_ADDR,
                    "indexLimit": "10",
                    "expiry": "1900000000",
                }),
            )
            .await;

        assert!(result.error_message.is_none());
        let auth = &result.data["feedbackAuth"];
        assert_eq!(auth["chainId"], "84532");
        assert_eq!(
            auth["signerAddress"].as_str().unwrap().to_lowercase(),
            format!("{}", signer).to_lowercase()
        );
        assert_eq!(auth["agentId"], "4");
    }

    #[tokio::test]
    async fn test_create_feedback_auth_fails_without_signer_source() {
        let (client, ctx) = test_ctx(StubRegistryClient::new()).await;

        let result = CreateFeedbackAuth
            .execute(
                &ctx,
                json!({
                    "agentId": "4",
                    "clientAddress": CLIENT_ADDR,
                    "indexLimit": "10",
                    "expiry": "1900000000",
                }),
            )
            .await;

        assert!(result
            .error_message
            .as_deref()
            .unwrap()
            .contains("signerAddress"));
        assert_eq!(client.invocation_count(), 0);
    }

    #[tokio::test]
    async fn test_auth_create_then_sign_roundtrip() {
        let signer = Address::repeat_byte(0x55);
        let (_, ctx) =
            test_ctx(StubRegistryClient::new().with_chain_id(84532).with_caller(signer)).await;

        let created = CreateFeedbackAuth
            .execute(
                &ctx,
                json!({
                    "agentId": "4",
                    "clientAddress": CLIENT_ADDR,
                    "indexLimit": "10",
                    "expiry": "1900000000",
                }),
            )
            .await;
        assert!(created.error_message.is_none());
        let auth_json = created.data["feedbackAuth"].clone();

        let signed = SignFeedbackAuth
            .execute(&ctx, json!({ "feedbackAuth": auth_json }))
            .await;

        assert!(signed.error_message.is_none());
        assert!(signed.data["signature"].as_str().unwrap().starts_with("0x"));
        // Re-derived tuple view matches the created one field by field.
        assert_eq!(signed.data["feedbackAuth"], created.data["feedbackAuth"]);
    }

    #[tokio::test]
    async fn test_create_and_sign_one_step() {
        let signer = Address::repeat_byte(0x55);
        let (_, ctx) =
            test_ctx(StubRegistryClient::new().with_chain_id(1).with_caller(signer)).await;

        let result = CreateAndSignFeedbackAuth
            .execute(
                &ctx,
                json!({
                    "agentId": "4",
                    "clientAddress": CLIENT_ADDR,
                    "indexLimit": "10",
                    "expiry": "1900000000",
                }),
            )
            .await;

        assert!(result.error_message.is_none());
        assert!(result.summary.contains("Signature: 0x"));
        assert_eq!(result.data["feedbackAuth"]["chainId"], "1");
    }

    #[tokio::test]
    async fn test_get_summary_failure_placeholders() {
        let (_, ctx) = test_ctx(StubRegistryClient::new().failing("revert")).await;

        let result = GetSummary.execute(&ctx, json!({ "agentId": "2" })).await;

        assert_eq!(result.data["count"], "N/A");
        assert_eq!(result.data["averageScore"], 0);
        assert!(result.error_message.as_deref().unwrap().contains("revert"));
    }

    #[tokio::test]
    async fn test_read_all_feedback_parallel_arrays() {
        let (_, ctx) = test_ctx(StubRegistryClient::new()).await;

        let result = ReadAllFeedback
            .execute(&ctx, json!({ "agentId": "2", "includeRevoked": true }))
            .await;

        assert!(result.error_message.is_none());
        assert_eq!(result.data["scores"], json!([90, 75]));
        assert_eq!(result.data["revokedStatuses"], json!([false, true]));
        assert_eq!(
            result.data["clientAddresses"].as_array().unwrap().len(),
            result.data["scores"].as_array().unwrap().len()
        );
        assert!(result.summary.contains("2 feedback entries"));
    }

    #[tokio::test]
    async fn test_get_response_count_filters_echoed() {
        let (_, ctx) = test_ctx(StubRegistryClient::new()).await;

        let result = GetResponseCount
            .execute(
                &ctx,
                json!({ "agentId": "2", "clientAddress": CLIENT_ADDR, "feedbackIndex": "5" }),
            )
            .await;

        assert!(result.error_message.is_none());
        assert_eq!(result.data["count"], "2");
        assert_eq!(result.data["filters"]["feedbackIndex"], "5");
    }

    #[tokio::test]
    async fn test_revoke_feedback_summary() {
        let (_, ctx) = test_ctx(StubRegistryClient::new()).await;

        let result = RevokeFeedback
            .execute(&ctx, json!({ "agentId": "3", "feedbackIndex": 1 }))
            .await;

        assert!(result.error_message.is_none());
        assert!(result.summary.contains("agent 3 index 1"));
        assert!(result.summary.contains("(tx 0x"));
    }

    #[test]
    fn test_reputation_tool_names_are_unique() {
        let mut names: Vec<&str> = REPUTATION_TOOLS.iter().map(|t| t.name()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 13);
    }
}
