//! Alloy-backed registry client.
//!
//! Follows the one-provider-per-call pattern: reads go through a plain HTTP
//! provider, writes build a wallet-filled provider from the configured signer.

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, B256, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    signers::{local::PrivateKeySigner, Signer},
    sol_types::SolValue,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use std::str::FromStr;
use tracing::{debug, info};
use url::Url;

use crate::abi::{IIdentityRegistry, IReputationRegistry};
use crate::chains;
use crate::errors::AgentryError;
use crate::registration::{fetch_registration, AgentRegistration};

use super::{
    FeedbackAuth, FeedbackEntry, FeedbackLog, FeedbackSummary, GiveFeedback, IdentityRegistry,
    MetadataEntry, RegisterReceipt, RegistryClient, ReputationRegistry, TxReceipt,
};

type HttpProvider = RootProvider<Http<Client>, Ethereum>;

/// ERC-8004 registry client over an EVM JSON-RPC endpoint.
pub struct EthRegistryClient {
    rpc_url: Url,
    identity_address: Address,
    reputation_address: Address,
    signer: Option<PrivateKeySigner>,
    http_client: reqwest::Client,
}

impl EthRegistryClient {
    pub fn new(
        rpc_url: &str,
        identity_address: &str,
        reputation_address: &str,
        signer: Option<PrivateKeySigner>,
    ) -> Result<Self, AgentryError> {
        let url = Url::parse(rpc_url)
            .map_err(|e| AgentryError::Config(format!("Invalid RPC URL: {}", e)))?;

        let identity = Address::from_str(identity_address).map_err(|e| {
            AgentryError::InvalidAddress(format!("Invalid identity registry address: {}", e))
        })?;

        let reputation = Address::from_str(reputation_address).map_err(|e| {
            AgentryError::InvalidAddress(format!("Invalid reputation registry address: {}", e))
        })?;

        Ok(Self {
            rpc_url: url,
            identity_address: identity,
            reputation_address: reputation,
            signer,
            http_client: reqwest::Client::new(),
        })
    }

    /// Build a client for a chain with a known deployment (see `chains`).
    pub fn for_chain(
        chain_id: u64,
        signer: Option<PrivateKeySigner>,
    ) -> Result<Self, AgentryError> {
        let chain = chains::get_chain(chain_id).ok_or_else(|| {
            AgentryError::Config(format!("Unsupported chain id: {}", chain_id))
        })?;
        let rpc = chains::get_rpc_url(chain_id)
            .ok_or_else(|| AgentryError::Config(format!("No RPC URL for chain {}", chain_id)))?;
        let identity = chain.identity_registry.ok_or_else(|| {
            AgentryError::Config(format!("No identity registry deployed on {}", chain.name))
        })?;
        let reputation = chain.reputation_registry.ok_or_else(|| {
            AgentryError::Config(format!("No reputation registry deployed on {}", chain.name))
        })?;

        Self::new(&rpc, identity, reputation, signer)
    }

    pub fn identity_address(&self) -> Address {
        self.identity_address
    }

    pub fn reputation_address(&self) -> Address {
        self.reputation_address
    }

    pub fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Read-only provider instance
    fn provider(&self) -> HttpProvider {
        ProviderBuilder::new().on_http(self.rpc_url.clone())
    }

    fn require_signer(&self) -> Result<&PrivateKeySigner, AgentryError> {
        self.signer
            .as_ref()
            .ok_or_else(|| AgentryError::Signing("No signing key configured".to_string()))
    }

    /// Wallet-filled provider for write calls
    fn write_provider(&self) -> Result<impl Provider<Http<Client>, Ethereum>, AgentryError> {
        let signer = self.require_signer()?;
        let wallet = EthereumWallet::from(signer.clone());
        Ok(ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url.clone()))
    }
}

/// Extract the minted agent id from the Registered event (first indexed
/// topic after the event signature).
macro_rules! finish_registration {
    ($pending:expr) => {{
        let pending = $pending
            .map_err(|e| AgentryError::Blockchain(format!("Failed to register agent: {}", e)))?;

        let tx_hash = format!("0x{}", hex::encode(pending.tx_hash().as_slice()));
        info!("Registration transaction sent: {}", tx_hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("Failed to get receipt: {}", e)))?;

        if !receipt.status() {
            return Err(AgentryError::Blockchain(
                "Registration transaction reverted".to_string(),
            ));
        }

        let agent_id = receipt
            .inner
            .logs()
            .iter()
            .find_map(|log| {
                if log.topics().len() >= 2 {
                    Some(U256::from_be_bytes(log.topics()[1].0))
                } else {
                    None
                }
            })
            .ok_or_else(|| {
                AgentryError::Blockchain("Could not parse agent ID from event".to_string())
            })?;

        info!(
            "Agent registered: ID {} (tx: {}, block: {})",
            agent_id,
            tx_hash,
            receipt.block_number.unwrap_or_default()
        );

        RegisterReceipt { agent_id, tx_hash }
    }};
}

/// Encode a tag as the contract's bytes32 representation (UTF-8, zero-padded).
pub fn tag_to_bytes32(tag: &str) -> Result<B256, AgentryError> {
    let bytes = tag.as_bytes();
    if bytes.len() > 32 {
        return Err(AgentryError::InvalidInput(format!(
            "Tag exceeds 32 bytes: {}",
            tag
        )));
    }
    let mut buf = [0u8; 32];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(B256::from(buf))
}

/// Decode a bytes32 tag back to a string, trimming zero padding.
pub fn bytes32_to_tag(value: B256) -> String {
    let end = value.0.iter().position(|&b| b == 0).unwrap_or(32);
    String::from_utf8_lossy(&value.0[..end]).to_string()
}

fn optional_tag(tag: Option<&str>) -> Result<B256, AgentryError> {
    match tag {
        Some(t) => tag_to_bytes32(t),
        None => Ok(B256::ZERO),
    }
}

/// ABI-encode the authorization tuple in contract field order.
fn encode_feedback_auth(auth: &FeedbackAuth) -> Vec<u8> {
    (
        auth.agent_id,
        auth.client_address,
        auth.index_limit,
        auth.expiry,
        auth.chain_id,
        auth.identity_registry,
        auth.signer_address,
    )
        .abi_encode()
}

#[async_trait]
impl IdentityRegistry for EthRegistryClient {
    async fn register(&self) -> Result<RegisterReceipt, AgentryError> {
        info!("Registering new agent (no URI)");
        let provider = self.write_provider()?;
        let contract = IIdentityRegistry::new(self.identity_address, &provider);
        let call = contract.register_0();
        let receipt = finish_registration!(call.send().await);
        Ok(receipt)
    }

    async fn register_with_uri(&self, token_uri: &str) -> Result<RegisterReceipt, AgentryError> {
        info!("Registering new agent with URI ({} bytes)", token_uri.len());
        let provider = self.write_provider()?;
        let contract = IIdentityRegistry::new(self.identity_address, &provider);
        let call = contract.register_1(token_uri.to_string());
        let receipt = finish_registration!(call.send().await);
        Ok(receipt)
    }

    async fn register_with_metadata(
        &self,
        token_uri: &str,
        metadata: &[MetadataEntry],
    ) -> Result<RegisterReceipt, AgentryError> {
        info!(
            "Registering new agent with URI and {} metadata entries",
            metadata.len()
        );
        let provider = self.write_provider()?;
        let contract = IIdentityRegistry::new(self.identity_address, &provider);
        let entries: Vec<IIdentityRegistry::MetadataEntry> = metadata
            .iter()
            .map(|entry| IIdentityRegistry::MetadataEntry {
                key: entry.key.clone(),
                value: entry.value.clone(),
            })
            .collect();
        let call = contract.register_2(token_uri.to_string(), entries);
        let receipt = finish_registration!(call.send().await);
        Ok(receipt)
    }

    async fn token_uri(&self, agent_id: U256) -> Result<String, AgentryError> {
        debug!("Fetching tokenURI for agent {}", agent_id);
        let provider = self.provider();
        let contract = IIdentityRegistry::new(self.identity_address, provider);

        let ret = contract.tokenURI(agent_id).call().await.map_err(|e| {
            let err_str = e.to_string();
            if err_str.contains("NonexistentToken") || err_str.contains("nonexistent") {
                AgentryError::AgentNotFound(agent_id.to_string())
            } else {
                AgentryError::Blockchain(format!("tokenURI failed: {}", err_str))
            }
        })?;

        Ok(ret.uri)
    }

    async fn set_agent_uri(
        &self,
        agent_id: U256,
        token_uri: &str,
    ) -> Result<TxReceipt, AgentryError> {
        info!("Updating URI for agent {} ({} bytes)", agent_id, token_uri.len());
        let provider = self.write_provider()?;
        let contract = IIdentityRegistry::new(self.identity_address, &provider);

        let call = contract.setAgentURI(agent_id, token_uri.to_string());
        let pending = call
            .send()
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("NotAuthorized") || err_str.contains("not authorized") {
                    AgentryError::Blockchain(
                        "Not authorized to update this agent's URI".to_string(),
                    )
                } else {
                    AgentryError::Blockchain(format!("Failed to set agent URI: {}", err_str))
                }
            })?;

        let tx_hash = format!("0x{}", hex::encode(pending.tx_hash().as_slice()));
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("Failed to get receipt: {}", e)))?;

        if !receipt.status() {
            return Err(AgentryError::Blockchain(
                "setAgentURI transaction reverted".to_string(),
            ));
        }

        Ok(TxReceipt { tx_hash })
    }

    async fn owner_of(&self, agent_id: U256) -> Result<Address, AgentryError> {
        debug!("Fetching owner for agent {}", agent_id);
        let provider = self.provider();
        let contract = IIdentityRegistry::new(self.identity_address, provider);

        let ret = contract.ownerOf(agent_id).call().await.map_err(|e| {
            let err_str = e.to_string();
            if err_str.contains("NonexistentToken") || err_str.contains("nonexistent") {
                AgentryError::AgentNotFound(agent_id.to_string())
            } else {
                AgentryError::Blockchain(format!("ownerOf failed: {}", err_str))
            }
        })?;

        Ok(ret.owner)
    }

    async fn get_metadata(&self, agent_id: U256, key: &str) -> Result<String, AgentryError> {
        debug!("Fetching metadata '{}' for agent {}", key, agent_id);
        let provider = self.provider();
        let contract = IIdentityRegistry::new(self.identity_address, provider);

        let ret = contract
            .getMetadata(agent_id, key.to_string())
            .call()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("getMetadata failed: {}", e)))?;

        Ok(ret.value)
    }

    async fn set_metadata(
        &self,
        agent_id: U256,
        key: &str,
        value: &str,
    ) -> Result<TxReceipt, AgentryError> {
        info!("Setting metadata '{}' for agent {}", key, agent_id);
        let provider = self.write_provider()?;
        let contract = IIdentityRegistry::new(self.identity_address, &provider);

        let call = contract.setMetadata(agent_id, key.to_string(), value.to_string());
        let pending = call
            .send()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("setMetadata failed: {}", e)))?;

        let tx_hash = format!("0x{}", hex::encode(pending.tx_hash().as_slice()));
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("Failed to get receipt: {}", e)))?;

        if !receipt.status() {
            return Err(AgentryError::Blockchain(
                "setMetadata transaction reverted".to_string(),
            ));
        }

        Ok(TxReceipt { tx_hash })
    }

    async fn registration_file(
        &self,
        agent_id: U256,
    ) -> Result<AgentRegistration, AgentryError> {
        let uri = self.token_uri(agent_id).await?;
        if uri.is_empty() {
            return Err(AgentryError::RegistrationFetch(format!(
                "Agent {} has no token URI",
                agent_id
            )));
        }
        fetch_registration(&self.http_client, &uri).await
    }
}

#[async_trait]
impl ReputationRegistry for EthRegistryClient {
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
            identity_registry: self.identity_address,
            signer_address,
        })
    }

    async fn sign_feedback_auth(&self, auth: &FeedbackAuth) -> Result<Vec<u8>, AgentryError> {
        let signer = self.require_signer()?;
        let encoded = encode_feedback_auth(auth);
        let signature = signer
            .sign_message(&encoded)
            .await
            .map_err(|e| AgentryError::Signing(format!("Failed to sign feedback auth: {}", e)))?;
        Ok(signature.as_bytes().to_vec())
    }

    async fn give_feedback(&self, params: GiveFeedback) -> Result<TxReceipt, AgentryError> {
        info!(
            "Submitting feedback for agent {} (score: {})",
            params.agent_id, params.score
        );

        let tag1 = optional_tag(params.tag1.as_deref())?;
        let tag2 = optional_tag(params.tag2.as_deref())?;

        let provider = self.write_provider()?;
        let contract = IReputationRegistry::new(self.reputation_address, &provider);

        let call = contract.giveFeedback(
            params.agent_id,
            params.score,
            tag1,
            tag2,
            params.file_uri.unwrap_or_default(),
            params.file_hash.unwrap_or(B256::ZERO),
            Bytes::from(params.feedback_auth),
        );
        let pending = call
            .send()
            .await
            .map_err(|e| {
                let err_str = e.to_string();
                if err_str.contains("insufficient funds") {
                    AgentryError::Blockchain("Insufficient funds for transaction".to_string())
                } else {
                    AgentryError::Blockchain(format!("Failed to submit feedback: {}", err_str))
                }
            })?;

        let tx_hash = format!("0x{}", hex::encode(pending.tx_hash().as_slice()));
        info!("Feedback transaction sent: {}", tx_hash);

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("Failed to get receipt: {}", e)))?;

        if !receipt.status() {
            return Err(AgentryError::Blockchain(
                "Feedback transaction reverted".to_string(),
            ));
        }

        Ok(TxReceipt { tx_hash })
    }

    async fn revoke_feedback(
        &self,
        agent_id: U256,
        feedback_index: u64,
    ) -> Result<TxReceipt, AgentryError> {
        info!(
            "Revoking feedback index {} for agent {}",
            feedback_index, agent_id
        );
        let provider = self.write_provider()?;
        let contract = IReputationRegistry::new(self.reputation_address, &provider);

        let call = contract.revokeFeedback(agent_id, feedback_index);
        let pending = call
            .send()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("revokeFeedback failed: {}", e)))?;

        let tx_hash = format!("0x{}", hex::encode(pending.tx_hash().as_slice()));
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("Failed to get receipt: {}", e)))?;

        if !receipt.status() {
            return Err(AgentryError::Blockchain(
                "revokeFeedback transaction reverted".to_string(),
            ));
        }

        Ok(TxReceipt { tx_hash })
    }

    async fn append_response(
        &self,
        agent_id: U256,
        client_address: Address,
        feedback_index: u64,
        response_uri: &str,
        response_hash: Option<B256>,
    ) -> Result<TxReceipt, AgentryError> {
        info!(
            "Appending response to feedback index {} for agent {}",
            feedback_index, agent_id
        );
        let provider = self.write_provider()?;
        let contract = IReputationRegistry::new(self.reputation_address, &provider);

        let call = contract.appendResponse(
            agent_id,
            client_address,
            feedback_index,
            response_uri.to_string(),
            response_hash.unwrap_or(B256::ZERO),
        );
        let pending = call
            .send()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("appendResponse failed: {}", e)))?;

        let tx_hash = format!("0x{}", hex::encode(pending.tx_hash().as_slice()));
        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("Failed to get receipt: {}", e)))?;

        if !receipt.status() {
            return Err(AgentryError::Blockchain(
                "appendResponse transaction reverted".to_string(),
            ));
        }

        Ok(TxReceipt { tx_hash })
    }

    async fn feedback_clients(&self, agent_id: U256) -> Result<Vec<Address>, AgentryError> {
        debug!("Fetching feedback clients for agent {}", agent_id);
        let provider = self.provider();
        let contract = IReputationRegistry::new(self.reputation_address, provider);

        let ret = contract
            .getClients(agent_id)
            .call()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("getClients failed: {}", e)))?;

        Ok(ret.clients)
    }

    async fn last_feedback_index(
        &self,
        agent_id: U256,
        client_address: Address,
    ) -> Result<u64, AgentryError> {
        let provider = self.provider();
        let contract = IReputationRegistry::new(self.reputation_address, provider);

        let ret = contract
            .getLastIndex(agent_id, client_address)
            .call()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("getLastIndex failed: {}", e)))?;

        Ok(ret.lastIndex)
    }

    async fn response_count(
        &self,
        agent_id: U256,
        client_address: Option<Address>,
        feedback_index: Option<u64>,
        responders: &[Address],
    ) -> Result<u64, AgentryError> {
        let provider = self.provider();
        let contract = IReputationRegistry::new(self.reputation_address, provider);

        let ret = contract
            .getResponseCount(
                agent_id,
                client_address.unwrap_or(Address::ZERO),
                feedback_index.unwrap_or(0),
                responders.to_vec(),
            )
            .call()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("getResponseCount failed: {}", e)))?;

        Ok(ret.count)
    }

    async fn feedback_summary(
        &self,
        agent_id: U256,
        client_addresses: &[Address],
        tag1: Option<&str>,
        tag2: Option<&str>,
    ) -> Result<FeedbackSummary, AgentryError> {
        let provider = self.provider();
        let contract = IReputationRegistry::new(self.reputation_address, provider);

        let ret = contract
            .getSummary(
                agent_id,
                client_addresses.to_vec(),
                optional_tag(tag1)?,
                optional_tag(tag2)?,
            )
            .call()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("getSummary failed: {}", e)))?;

        Ok(FeedbackSummary {
            count: ret.count,
            average_score: ret.averageScore,
        })
    }

    async fn read_feedback(
        &self,
        agent_id: U256,
        client_address: Address,
        index: u64,
    ) -> Result<FeedbackEntry, AgentryError> {
        let provider = self.provider();
        let contract = IReputationRegistry::new(self.reputation_address, provider);

        let ret = contract
            .readFeedback(agent_id, client_address, index)
            .call()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("readFeedback failed: {}", e)))?;

        Ok(FeedbackEntry {
            score: ret.score,
            tag1: bytes32_to_tag(ret.tag1),
            tag2: bytes32_to_tag(ret.tag2),
            is_revoked: ret.isRevoked,
        })
    }

    async fn read_all_feedback(
        &self,
        agent_id: U256,
        client_addresses: &[Address],
        tag1: Option<&str>,
        tag2: Option<&str>,
        include_revoked: bool,
    ) -> Result<FeedbackLog, AgentryError> {
        let provider = self.provider();
        let contract = IReputationRegistry::new(self.reputation_address, provider);

        let ret = contract
            .readAllFeedback(
                agent_id,
                client_addresses.to_vec(),
                optional_tag(tag1)?,
                optional_tag(tag2)?,
                include_revoked,
            )
            .call()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("readAllFeedback failed: {}", e)))?;

        Ok(FeedbackLog {
            clients: ret.clients,
            scores: ret.scores,
            tag1s: ret.tag1s.into_iter().map(bytes32_to_tag).collect(),
            tag2s: ret.tag2s.into_iter().map(bytes32_to_tag).collect(),
            revoked: ret.revokedStatuses,
        })
    }

    async fn identity_registry(&self) -> Result<Address, AgentryError> {
        let provider = self.provider();
        let contract = IReputationRegistry::new(self.reputation_address, provider);

        let ret = contract
            .getIdentityRegistry()
            .call()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("getIdentityRegistry failed: {}", e)))?;

        Ok(ret.registry)
    }
}

#[async_trait]
impl RegistryClient for EthRegistryClient {
    async fn chain_id(&self) -> Result<u64, AgentryError> {
        let provider = self.provider();
        provider
            .get_chain_id()
            .await
            .map_err(|e| AgentryError::Blockchain(format!("get_chain_id failed: {}", e)))
    }

    async fn caller_address(&self) -> Result<Option<Address>, AgentryError> {
        Ok(self.signer.as_ref().map(|s| s.address()))
    }
}
