//! Wallet and key management module
//!
//! Supports two key modes:
//! - `private_key`: Direct private key from PRIVATE_KEY env var
//! - `mnemonic`: Derive from MNEMONIC env var (BIP-39)

use alloy::primitives::Address;
use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use std::env;
use tracing::info;

/// Key mode for wallet initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMode {
    /// Use PRIVATE_KEY env var directly
    PrivateKey,
    /// Derive from MNEMONIC env var
    Mnemonic,
    /// No key configured; read-only operation
    None,
}

impl KeyMode {
    /// Detect key mode from environment
    pub fn from_env() -> Self {
        // Check for explicit mode override
        if let Ok(mode) = env::var("KEY_MODE") {
            match mode.to_lowercase().as_str() {
                "mnemonic" => return KeyMode::Mnemonic,
                "private_key" | "privatekey" | "key" => return KeyMode::PrivateKey,
                _ => {} // Fall through to auto-detect
            }
        }

        // Auto-detect based on available env vars
        if env::var("MNEMONIC").is_ok() {
            KeyMode::Mnemonic
        } else if env::var("PRIVATE_KEY").is_ok() {
            KeyMode::PrivateKey
        } else {
            KeyMode::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyMode::PrivateKey => "private_key",
            KeyMode::Mnemonic => "mnemonic",
            KeyMode::None => "none",
        }
    }
}

/// Wallet configuration derived from environment
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub mode: KeyMode,
    signer: Option<PrivateKeySigner>,
}

impl WalletConfig {
    /// Initialize wallet config from environment variables
    ///
    /// Supported env vars:
    /// - `KEY_MODE`: Optional. "mnemonic" or "private_key". Auto-detects if not set.
    /// - `MNEMONIC`: BIP-39 mnemonic phrase (12/24 words). Used when mode=mnemonic.
    /// - `PRIVATE_KEY`: Hex-encoded private key. Used when mode=private_key.
    /// - `DERIVATION_INDEX`: Optional. HD wallet index for mnemonic mode. Default: 0.
    pub fn from_env() -> anyhow::Result<Self> {
        let mode = KeyMode::from_env();

        match mode {
            KeyMode::Mnemonic => {
                let mnemonic = env::var("MNEMONIC")
                    .map_err(|_| anyhow::anyhow!("MNEMONIC env var required for mnemonic mode"))?;

                let index: u32 = env::var("DERIVATION_INDEX")
                    .unwrap_or_else(|_| "0".to_string())
                    .parse()
                    .unwrap_or(0);

                let signer = signer_from_mnemonic(&mnemonic, index)?;

                info!(
                    "Wallet initialized from mnemonic (mode: {}, index: {}, address: {})",
                    mode.as_str(),
                    index,
                    signer.address()
                );

                Ok(Self {
                    mode,
                    signer: Some(signer),
                })
            }
            KeyMode::PrivateKey => {
                let private_key = env::var("PRIVATE_KEY").map_err(|_| {
                    anyhow::anyhow!("PRIVATE_KEY env var required for private_key mode")
                })?;

                let signer = signer_from_key(&private_key)?;

                info!(
                    "Wallet initialized from private key (mode: {}, address: {})",
                    mode.as_str(),
                    signer.address()
                );

                Ok(Self {
                    mode,
                    signer: Some(signer),
                })
            }
            KeyMode::None => {
                info!("No wallet configured (mode: none). Signing features disabled.");
                Ok(Self { mode, signer: None })
            }
        }
    }

    /// Check if signing is available
    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    /// Clone of the configured signer, if any
    pub fn signer(&self) -> Option<PrivateKeySigner> {
        self.signer.clone()
    }

    /// Signer address, if any
    pub fn address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address())
    }
}

/// Derive a signer from a BIP-39 mnemonic
///
/// Uses standard Ethereum derivation path: m/44'/60'/0'/0/{index}
fn signer_from_mnemonic(mnemonic: &str, index: u32) -> anyhow::Result<PrivateKeySigner> {
    MnemonicBuilder::<English>::default()
        .phrase(mnemonic)
        .index(index)
        .map_err(|e| anyhow::anyhow!("Invalid derivation index: {}", e))?
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to derive from mnemonic: {}", e))
}

/// Parse a signer from a hex private key
fn signer_from_key(private_key: &str) -> anyhow::Result<PrivateKeySigner> {
    let key = private_key.strip_prefix("0x").unwrap_or(private_key);
    key.parse()
        .map_err(|e| anyhow::anyhow!("Invalid private key: {}", e))
}
