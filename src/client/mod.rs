//! Registry client boundary.
//!
//! The tool catalog talks to the ERC-8004 registries exclusively through the
//! traits in this module. [`EthRegistryClient`] is the production alloy-backed
//! implementation; tests substitute a stub.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::errors::AgentryError;
use crate::registration::AgentRegistration;

mod eth;

pub use eth::EthRegistryClient;

/// Outcome of a registration write: the minted agent id plus the tx hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterReceipt {
    pub agent_id: U256,
    pub tx_hash: String,
}

/// Outcome of any other registry write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: String,
}

/// On-chain metadata key/value pair attached to an agent.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

/// Signable authorization permitting a client to submit feedback for an agent
/// up to `index_limit`, before `expiry` (unix seconds).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackAuth {
    pub agent_id: U256,
    pub client_address: Address,
    pub index_limit: u64,
    pub expiry: U256,
    pub chain_id: U256,
    pub identity_registry: Address,
    pub signer_address: Address,
}

/// Parameters for a feedback submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GiveFeedback {
    pub agent_id: U256,
    pub score: u8,
    pub tag1: Option<String>,
    pub tag2: Option<String>,
    pub file_uri: Option<String>,
    pub file_hash: Option<B256>,
    /// Signed authorization blob, forwarded to the contract unchanged.
    pub feedback_auth: Vec<u8>,
}

/// One feedback entry as stored on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEntry {
    pub score: u8,
    pub tag1: String,
    pub tag2: String,
    pub is_revoked: bool,
}

/// Aggregate feedback summary under the given filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackSummary {
    pub count: u64,
    pub average_score: u8,
}

/// Full feedback listing as parallel arrays, mirroring the contract return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackLog {
    pub clients: Vec<Address>,
    pub scores: Vec<u8>,
    pub tag1s: Vec<String>,
    pub tag2s: Vec<String>,
    pub revoked: Vec<bool>,
}

/// Identity registry operations.
#[async_trait]
pub trait IdentityRegistry: Send + Sync {
    async fn register(&self) -> Result<RegisterReceipt, AgentryError>;

    async fn register_with_uri(&self, token_uri: &str) -> Result<RegisterReceipt, AgentryError>;

    async fn register_with_metadata(
        &self,
        token_uri: &str,
        metadata: &[MetadataEntry],
    ) -> Result<RegisterReceipt, AgentryError>;

    async fn token_uri(&self, agent_id: U256) -> Result<String, AgentryError>;

    async fn set_agent_uri(&self, agent_id: U256, token_uri: &str)
        -> Result<TxReceipt, AgentryError>;

    async fn owner_of(&self, agent_id: U256) -> Result<Address, AgentryError>;

    async fn get_metadata(&self, agent_id: U256, key: &str) -> Result<String, AgentryError>;

    async fn set_metadata(
        &self,
        agent_id: U256,
        key: &str,
        value: &str,
    ) -> Result<TxReceipt, AgentryError>;

    /// Fetch and parse the registration document referenced by the agent's
    /// token URI.
    async fn registration_file(&self, agent_id: U256)
        -> Result<AgentRegistration, AgentryError>;
}

/// Reputation registry operations.
#[async_trait]
pub trait ReputationRegistry: Send + Sync {
    /// Build an unsigned feedback authorization, filling in the identity
    /// registry address this reputation registry references.
    fn create_feedback_auth(
        &self,
        agent_id: U256,
        client_address: Address,
        index_limit: u64,
        expiry: U256,
        chain_id: U256,
        signer_address: Address,
    ) -> Result<FeedbackAuth, AgentryError>;

    /// Sign the authorization tuple with the configured signer, returning the
    /// signature bytes.
    async fn sign_feedback_auth(&self, auth: &FeedbackAuth) -> Result<Vec<u8>, AgentryError>;

    async fn give_feedback(&self, params: GiveFeedback) -> Result<TxReceipt, AgentryError>;

    async fn revoke_feedback(
        &self,
        agent_id: U256,
        feedback_index: u64,
    ) -> Result<TxReceipt, AgentryError>;

    async fn append_response(
        &self,
        agent_id: U256,
        client_address: Address,
        feedback_index: u64,
        response_uri: &str,
        response_hash: Option<B256>,
    ) -> Result<TxReceipt, AgentryError>;

    async fn feedback_clients(&self, agent_id: U256) -> Result<Vec<Address>, AgentryError>;

    async fn last_feedback_index(
        &self,
        agent_id: U256,
        client_address: Address,
    ) -> Result<u64, AgentryError>;

    async fn response_count(
        &self,
        agent_id: U256,
        client_address: Option<Address>,
        feedback_index: Option<u64>,
        responders: &[Address],
    ) -> Result<u64, AgentryError>;

    async fn feedback_summary(
        &self,
        agent_id: U256,
        client_addresses: &[Address],
        tag1: Option<&str>,
        tag2: Option<&str>,
    ) -> Result<FeedbackSummary, AgentryError>;

    async fn read_feedback(
        &self,
        agent_id: U256,
        client_address: Address,
        index: u64,
    ) -> Result<FeedbackEntry, AgentryError>;

    async fn read_all_feedback(
        &self,
        agent_id: U256,
        client_addresses: &[Address],
        tag1: Option<&str>,
        tag2: Option<&str>,
        include_revoked: bool,
    ) -> Result<FeedbackLog, AgentryError>;

    async fn identity_registry(&self) -> Result<Address, AgentryError>;
}

/// Combined client handle for both registries, plus session identity.
#[async_trait]
pub trait RegistryClient: IdentityRegistry + ReputationRegistry {
    /// Chain id the client is connected to.
    async fn chain_id(&self) -> Result<u64, AgentryError>;

    /// Address of the configured signer, if any.
    async fn caller_address(&self) -> Result<Option<Address>, AgentryError>;
}
