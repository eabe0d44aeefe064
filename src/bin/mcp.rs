//! MCP stdio server exposing the agent tool catalog.
//!
//! stdout carries the protocol; logs go to stderr.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use agentry::adapters::mcp::McpServer;
use agentry::adapters::AdapterOptions;
use agentry::client::EthRegistryClient;
use agentry::config::Config;
use agentry::tools::{AgentContext, ContextOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing on stderr so stdout stays protocol-only
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agentry=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting agentry MCP server v{}", env!("CARGO_PKG_VERSION"));
    info!("Chain: {} ({})", config.chain_id, config.rpc_url);
    info!(
        "Wallet mode: {} (address: {})",
        config.wallet.mode.as_str(),
        config
            .wallet
            .address()
            .map(|a| a.to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    let client = EthRegistryClient::new(
        &config.rpc_url,
        &config.identity_registry,
        &config.reputation_registry,
        config.wallet.signer(),
    )?;

    let context = AgentContext::resolve(
        Arc::new(client),
        ContextOptions {
            chain_id: Some(config.chain_id),
            ..Default::default()
        },
    )
    .await?;

    let server = McpServer::with_agent_tools(Arc::new(context), AdapterOptions::default());
    info!("Serving tools: {:?}", server.tool_names());

    server.serve_stdio().await?;

    Ok(())
}
