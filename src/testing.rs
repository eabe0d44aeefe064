//! Test doubles shared across the crate's test modules.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;

use crate::client::{
    FeedbackAuth, FeedbackEntry, FeedbackLog, FeedbackSummary, GiveFeedback, IdentityRegistry,
    MetadataEntry, RegisterReceipt, RegistryClient, ReputationRegistry, TxReceipt,
};
use crate::errors::AgentryError;
use crate::registration::AgentRegistration;

/// Programmable in-memory registry client.
///
/// The invocation counter tracks registry operations only (not session
/// getters), so tests can assert that schema rejection happens before any
/// registry call is attempted.
pub struct StubRegistryClient {
    chain_id: Option<u64>,
    caller: Option<Address>,
    fail_message: Option<String>,
    owner: Address,
    token_uri: String,
    metadata_value: String,
    identity_registry: Address,
    calls: AtomicUsize,
    last_give_feedback: Mutex<Option<GiveFeedback>>,
}

impl StubRegistryClient {
    pub fn new() -> Self {
        Self {
            chain_id: Some(31337),
            caller: None,
            fail_message: None,
            owner: Address::repeat_byte(0xaa),
            token_uri: "ipfs://QmStub".to_string(),
            metadata_value: "stub-value".to_string(),
            identity_registry: Address::repeat_byte(0x1d),
            calls: AtomicUsize::new(0),
            last_give_feedback: Mutex::new(None),
        }
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    pub fn with_caller(mut self, caller: Address) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_owner(mut self, owner: Address) -> Self {
        self.owner = owner;
        self
    }

    pub fn with_metadata_value(mut self, value: &str) -> Self {
        self.metadata_value = value.to_string();
        self
    }

    /// Make every registry operation (and chain-id resolution) fail.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_message = Some(message.to_string());
        self
    }

    pub fn invocation_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_give_feedback(&self) -> Option<GiveFeedback> {
        self.last_give_feedback.lock().unwrap().clone()
    }

    fn operation<T>(&self, ok: T) -> Result<T, AgentryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_message {
            Some(message) => Err(AgentryError::Blockchain(message.clone())),
            None => Ok(ok),
        }
    }

    fn tx_hash() -> String {
        format!("0x{}", "ab".repeat(32))
    }
}

impl Default for StubRegistryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityRegistry for StubRegistryClient {
    async fn register(&self) -> Result<RegisterReceipt, AgentryError> {
        self.operation(RegisterReceipt {
            agent_id: U256::from(1),
            tx_hash: Self::tx_hash(),
        })
    }

    async fn register_with_uri(&self, _token_uri: &str) -> Result<RegisterReceipt, AgentryError> {
        self.operation(RegisterReceipt {
            agent_id: U256::from(1),
            tx_hash: Self::tx_hash(),
        })
    }

    async fn register_with_metadata(
        &self,
        _token_uri: &str,
        _metadata: &[MetadataEntry],
    ) -> Result<RegisterReceipt, AgentryError> {
        self.operation(RegisterReceipt {
            agent_id: U256::from(1),
            tx_hash: Self::tx_hash(),
        })
    }

    async fn token_uri(&self, _agent_id: U256) -> Result<String, AgentryError> {
        self.operation(self.token_uri.clone())
    }

    async fn set_agent_uri(
        &self,
        _agent_id: U256,
        _token_uri: &str,
    ) -> Result<TxReceipt, AgentryError> {
        self.operation(TxReceipt {
            tx_hash: Self::tx_hash(),
        })
    }

    async fn owner_of(&self, _agent_id: U256) -> Result<Address, AgentryError> {
        self.operation(self.owner)
    }

    async fn get_metadata(&self, _agent_id: U256, _key: &str) -> Result<String, AgentryError> {
        self.operation(self.metadata_value.clone())
    }

    async fn set_metadata(
        &self,
        _agent_id: U256,
        _key: &str,
        _value: &str,
    ) -> Result<TxReceipt, AgentryError> {
        self.operation(TxReceipt {
            tx_hash: Self::tx_hash(),
        })
    }

    async fn registration_file(
        &self,
        _agent_id: U256,
    ) -> Result<AgentRegistration, AgentryError> {
        self.operation(AgentRegistration {
            name: Some("Stub Agent".to_string()),
            ..Default::default()
        })
    }
}

#[async_trait]
impl ReputationRegistry for StubRegistryClient {
    fn create_feedback_auth(
        &self,
        agent_id: U256,
        client_address: Address,
        index_limit: u64,
        expiry: U256,
        chain_id: U256,
        signer_address: Address,
    ) -> Result<FeedbackAuth, AgentryError> {
        Ok(FeedbackAuth {
            agent_id,
            client_address,
            index_limit,
            expiry,
            chain_id,
            identity_registry: self.identity_registry,
            signer_address,
        })
    }

    async fn sign_feedback_auth(&self, _auth: &FeedbackAuth) -> Result<Vec<u8>, AgentryError> {
        self.operation(vec![0xab; 65])
    }

    async fn give_feedback(&self, params: GiveFeedback) -> Result<TxReceipt, AgentryError> {
        *self.last_give_feedback.lock().unwrap() = Some(params);
        self.operation(TxReceipt {
            tx_hash: Self::tx_hash(),
        })
    }

    async fn revoke_feedback(
        &self,
        _agent_id: U256,
        _feedback_index: u64,
    ) -> Result<TxReceipt, AgentryError> {
        self.operation(TxReceipt {
            tx_hash: Self::tx_hash(),
        })
    }

    async fn append_response(
        &self,
        _agent_id: U256,
        _client_address: Address,
        _feedback_index: u64,
        _response_uri: &str,
        _response_hash: Option<B256>,
    ) -> Result<TxReceipt, AgentryError> {
        self.operation(TxReceipt {
            tx_hash: Self::tx_hash(),
        })
    }

    async fn feedback_clients(&self, _agent_id: U256) -> Result<Vec<Address>, AgentryError> {
        self.operation(vec![Address::repeat_byte(0xc1), Address::repeat_byte(0xc2)])
    }

    async fn last_feedback_index(
        &self,
        _agent_id: U256,
        _client_address: Address,
    ) -> Result<u64, AgentryError> {
        self.operation(3)
    }

    async fn response_count(
        &self,
        _agent_id: U256,
        _client_address: Option<Address>,
        _feedback_index: Option<u64>,
        _responders: &[Address],
    ) -> Result<u64, AgentryError> {
        self.operation(2)
    }

    async fn feedback_summary(
        &self,
        _agent_id: U256,
        _client_addresses: &[Address],
        _tag1: Option<&str>,
        _tag2: Option<&str>,
    ) -> Result<FeedbackSummary, AgentryError> {
        self.operation(FeedbackSummary {
            count: 4,
            average_score: 88,
        })
    }

    async fn read_feedback(
        &self,
        _agent_id: U256,
        _client_address: Address,
        _index: u64,
    ) -> Result<FeedbackEntry, AgentryError> {
        self.operation(FeedbackEntry {
            score: 90,
            tag1: "quality".to_string(),
            tag2: "speed".to_string(),
            is_revoked: false,
        })
    }

    async fn read_all_feedback(
        &self,
        _agent_id: U256,
        _client_addresses: &[Address],
        _tag1: Option<&str>,
        _tag2: Option<&str>,
        _include_revoked: bool,
    ) -> Result<FeedbackLog, AgentryError> {
        self.operation(FeedbackLog {
            clients: vec![Address::repeat_byte(0xc1), Address::repeat_byte(0xc2)],
            scores: vec![90, 75],
            tag1s: vec!["quality".to_string(), "quality".to_string()],
            tag2s: vec!["speed".to_string(), String::new()],
            revoked: vec![false, true],
        })
    }

    async fn identity_registry(&self) -> Result<Address, AgentryError> {
        self.operation(self.identity_registry)
    }
}

#[async_trait]
impl RegistryClient for StubRegistryClient {
    async fn chain_id(&self) -> Result<u64, AgentryError> {
        match (&self.fail_message, self.chain_id) {
            (Some(message), _) => Err(AgentryError::Blockchain(message.clone())),
            (None, Some(id)) => Ok(id),
            (None, None) => Err(AgentryError::Blockchain(
                "chain id unavailable".to_string(),
            )),
        }
    }

    async fn caller_address(&self) -> Result<Option<Address>, AgentryError> {
        Ok(self.caller)
    }
}
