use std::collections::HashMap;
use std::sync::LazyLock;

/// Known deployment of the ERC-8004 registries on one chain.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub name: &'static str,
    pub identity_registry: Option<&'static str>,
    pub reputation_registry: Option<&'static str>,
    pub rpcs: Vec<&'static str>,
    pub block_explorer: &'static str,
}

impl ChainConfig {
    /// Get the first available RPC URL
    pub fn primary_rpc(&self) -> Option<&str> {
        self.rpcs.first().copied()
    }

    /// Check if this chain has a deployed identity registry
    pub fn has_identity_registry(&self) -> bool {
        self.identity_registry.is_some()
    }

    /// Check if this chain has a deployed reputation registry
    pub fn has_reputation_registry(&self) -> bool {
        self.reputation_registry.is_some()
    }
}

/// Static registry of chains with known ERC-8004 deployments
pub static CHAINS: LazyLock<HashMap<u64, ChainConfig>> = LazyLock::new(|| {
    let chains = vec![
        // ===== MAINNETS =====
        ChainConfig {
            chain_id: 8453,
            name: "base",
            identity_registry: Some("0x8004A169FB4a3325136EB29fA0ceB6D2e539a432"),
            reputation_registry: Some("0x8004BAa17C55a88189AE136b182e5fdA19dE9b63"),
            rpcs: vec![
                "https://mainnet.base.org",
                "https://base.llamarpc.com",
                "https://base.drpc.org",
                "https://base-mainnet.public.blastapi.io",
            ],
            block_explorer: "https://basescan.org",
        },
        ChainConfig {
            chain_id: 1,
            name: "ethereum",
            identity_registry: Some("0x8004A169FB4a3325136EB29fA0ceB6D2e539a432"),
            reputation_registry: Some("0x8004BAa17C55a88189AE136b182e5fdA19dE9b63"),
            rpcs: vec![
                "https://eth.llamarpc.com",
                "https://ethereum.publicnode.com",
                "https://rpc.ankr.com/eth",
                "https://eth.drpc.org",
            ],
            block_explorer: "https://etherscan.io",
        },
        // ===== TESTNETS =====
        ChainConfig {
            chain_id: 84532,
            name: "base-sepolia",
            identity_registry: Some("0x8004A818BFB912233c491871b3d84c89A494BD9e"),
            reputation_registry: Some("0x8004B663056A597Dffe9eCcC1965A193B7388713"),
            rpcs: vec![
                "https://sepolia.base.org",
                "https://base-sepolia.drpc.org",
                "https://base-sepolia.publicnode.com",
            ],
            block_explorer: "https://sepolia.basescan.org",
        },
        ChainConfig {
            chain_id: 11155111,
            name: "sepolia",
            identity_registry: Some("0x8004A818BFB912233c491871b3d84c89A494BD9e"),
            reputation_registry: Some("0x8004B663056A597Dffe9eCcC1965A193B7388713"),
            rpcs: vec![
                "https://sepolia.drpc.org",
                "https://ethereum-sepolia.publicnode.com",
                "https://rpc.ankr.com/eth_sepolia",
            ],
            block_explorer: "https://sepolia.etherscan.io",
        },
    ];

    chains.into_iter().map(|c| (c.chain_id, c)).collect()
});

/// Get chain config by chain ID
pub fn get_chain(chain_id: u64) -> Option<&'static ChainConfig> {
    CHAINS.get(&chain_id)
}

/// Get chain config by name
pub fn get_chain_by_name(name: &str) -> Option<&'static ChainConfig> {
    CHAINS.values().find(|c| c.name == name)
}

/// List all supported chain IDs
pub fn supported_chain_ids() -> Vec<u64> {
    CHAINS.keys().copied().collect()
}

/// List all chains with a deployed identity registry
pub fn chains_with_registry() -> Vec<&'static ChainConfig> {
    CHAINS
        .values()
        .filter(|c| c.has_identity_registry())
        .collect()
}

/// Get RPC URL for a chain, with optional env override
/// Checks for RPC_URL_{CHAIN_NAME} env var first
pub fn get_rpc_url(chain_id: u64) -> Option<String> {
    let chain = get_chain(chain_id)?;

    // Check for env override: RPC_URL_BASE, RPC_URL_ETHEREUM, etc.
    let env_key = format!("RPC_URL_{}", chain.name.to_uppercase().replace('-', "_"));
    if let Ok(url) = std::env::var(&env_key) {
        return Some(url);
    }

    // Fall back to first configured RPC
    chain.primary_rpc().map(|s| s.to_string())
}
