use anyhow::Result;
use std::env;

use crate::chains;
use crate::wallet::WalletConfig;

/// Application configuration
///
/// Chain-specific settings (RPC URLs, registry addresses) are stored in
/// chains.rs and looked up by chain_id at runtime; every value can be
/// overridden through the environment.
#[derive(Clone)]
pub struct Config {
    pub chain_id: u64,
    pub rpc_url: String,
    pub identity_registry: String,
    pub reputation_registry: String,
    /// Wallet configuration (supports both PRIVATE_KEY and MNEMONIC modes)
    pub wallet: WalletConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Initialize wallet from environment
        let wallet = WalletConfig::from_env()?;

        let chain_id: u64 = env::var("CHAIN_ID")
            .unwrap_or_else(|_| "8453".to_string()) // Base mainnet
            .parse()?;

        let chain = chains::get_chain(chain_id);

        let rpc_url = match env::var("RPC_URL") {
            Ok(url) => url,
            Err(_) => chains::get_rpc_url(chain_id)
                .ok_or_else(|| anyhow::anyhow!("No RPC URL known for chain {}", chain_id))?,
        };

        let identity_registry = match env::var("IDENTITY_REGISTRY_ADDRESS") {
            Ok(address) => address,
            Err(_) => chain
                .and_then(|c| c.identity_registry)
                .ok_or_else(|| {
                    anyhow::anyhow!("No identity registry known for chain {}", chain_id)
                })?
                .to_string(),
        };

        let reputation_registry = match env::var("REPUTATION_REGISTRY_ADDRESS") {
            Ok(address) => address,
            Err(_) => chain
                .and_then(|c| c.reputation_registry)
                .ok_or_else(|| {
                    anyhow::anyhow!("No reputation registry known for chain {}", chain_id)
                })?
                .to_string(),
        };

        Ok(Self {
            chain_id,
            rpc_url,
            identity_registry,
            reputation_registry,
            wallet,
        })
    }
}
