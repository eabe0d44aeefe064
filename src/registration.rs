//! ERC-8004 registration documents.
//!
//! The registration file is the off-chain JSON referenced by an agent's token
//! URI. Supported URI schemes: `ipfs://` (resolved through a public gateway),
//! `ar://` (arweave.net), `data:` (inline JSON, optionally base64), and plain
//! `http(s)://`.

use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AgentryError;

pub const REGISTRATION_V1_TYPE: &str =
    "https://eips.ethereum.org/EIPS/eip-8004#registration-v1";

const IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";
const ARWEAVE_GATEWAY: &str = "https://arweave.net/";

/// ERC-8004 registration-v1 document (off-chain JSON).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRegistration {
    #[serde(rename = "type")]
    pub registration_type: Option<String>,

    pub name: Option<String>,

    pub description: Option<String>,

    pub image: Option<String>,

    #[serde(default)]
    pub services: Vec<RegistrationService>,

    #[serde(default)]
    pub registrations: Vec<RegistrationPointer>,

    #[serde(default, alias = "supportedTrust")]
    pub supported_trust: Vec<String>,

    pub active: Option<bool>,

    #[serde(alias = "updatedAt")]
    pub updated_at: Option<u64>,

    pub version: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// A service endpoint advertised by the agent (A2A, MCP, web, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationService {
    pub name: String,

    pub endpoint: Option<String>,

    pub version: Option<String>,

    #[serde(default, alias = "mcpTools")]
    pub mcp_tools: Vec<String>,

    #[serde(default, alias = "a2aSkills")]
    pub a2a_skills: Vec<String>,
}

/// Back-reference from the document to an on-chain registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationPointer {
    #[serde(alias = "agentId")]
    pub agent_id: Option<serde_json::Value>,

    #[serde(alias = "agentRegistry")]
    pub agent_registry: Option<String>,
}

/// Rewrite a token URI to a fetchable HTTP URL, or extract inline content.
enum ResolvedUri {
    Http(String),
    Inline(String),
}

fn resolve_uri(uri: &str) -> Result<ResolvedUri, AgentryError> {
    if let Some(cid) = uri.strip_prefix("ipfs://") {
        return Ok(ResolvedUri::Http(format!("{}{}", IPFS_GATEWAY, cid)));
    }
    if let Some(id) = uri.strip_prefix("ar://") {
        return Ok(ResolvedUri::Http(format!("{}{}", ARWEAVE_GATEWAY, id)));
    }
    if uri.starts_with("http://") || uri.starts_with("https://") {
        return Ok(ResolvedUri::Http(uri.to_string()));
    }
    if let Some(rest) = uri.strip_prefix("data:") {
        // data:[<mediatype>][;base64],<payload>
        let (meta, payload) = rest.split_once(',').ok_or_else(|| {
            AgentryError::RegistrationFetch("Malformed data: URI (missing comma)".to_string())
        })?;
        let content = if meta.ends_with(";base64") {
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| {
                    AgentryError::RegistrationFetch(format!("Invalid base64 payload: {}", e))
                })?;
            String::from_utf8(decoded).map_err(|e| {
                AgentryError::RegistrationFetch(format!("Payload is not UTF-8: {}", e))
            })?
        } else {
            payload.to_string()
        };
        return Ok(ResolvedUri::Inline(content));
    }

    Err(AgentryError::RegistrationFetch(format!(
        "Unsupported URI scheme: {}",
        uri
    )))
}

/// Fetch and parse the registration document behind a token URI.
pub async fn fetch_registration(
    http_client: &reqwest::Client,
    uri: &str,
) -> Result<AgentRegistration, AgentryError> {
    debug!("Fetching registration document from {}", uri);

    let body = match resolve_uri(uri)? {
        ResolvedUri::Inline(content) => content,
        ResolvedUri::Http(url) => {
            let response = http_client
                .get(&url)
                .send()
                .await
                .map_err(|e| AgentryError::RegistrationFetch(e.to_string()))?;

            if !response.status().is_success() {
                return Err(AgentryError::RegistrationFetch(format!(
                    "Fetch failed with status {} for {}",
                    response.status(),
                    url
                )));
            }

            response
                .text()
                .await
                .map_err(|e| AgentryError::RegistrationFetch(e.to_string()))?
        }
    };

    serde_json::from_str(&body).map_err(|e| {
        AgentryError::RegistrationFetch(format!("Invalid registration JSON: {}", e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_resolve_ipfs_uri() {
        match resolve_uri("ipfs://QmTest123").unwrap() {
            ResolvedUri::Http(url) => assert_eq!(url, "https://ipfs.io/ipfs/QmTest123"),
            _ => panic!("expected http resolution"),
        }
    }

    #[test]
    fn test_resolve_arweave_uri() {
        match resolve_uri("ar://abc").unwrap() {
            ResolvedUri::Http(url) => assert_eq!(url, "https://arweave.net/abc"),
            _ => panic!("expected http resolution"),
        }
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        assert!(resolve_uri("ftp://example.com/agent.json").is_err());
    }

    #[tokio::test]
    async fn test_fetch_inline_data_uri() {
        let http = reqwest::Client::new();
        let uri = r#"data:application/json,{"name":"TestAgent","description":"d"}"#;
        let registration = fetch_registration(&http, uri).await.unwrap();
        assert_eq!(registration.name.as_deref(), Some("TestAgent"));
    }

    #[tokio::test]
    async fn test_fetch_inline_base64_data_uri() {
        let http = reqwest::Client::new();
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(r#"{"name":"Base64Agent"}"#);
        let uri = format!("data:application/json;base64,{}", encoded);
        let registration = fetch_registration(&http, &uri).await.unwrap();
        assert_eq!(registration.name.as_deref(), Some("Base64Agent"));
    }

    #[tokio::test]
    async fn test_fetch_http_registration() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agent.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "type": REGISTRATION_V1_TYPE,
                "name": "HttpAgent",
                "services": [{"name": "mcp", "endpoint": "https://example.com/mcp"}]
            })))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let uri = format!("{}/agent.json", server.uri());
        let registration = fetch_registration(&http, &uri).await.unwrap();
        assert_eq!(registration.name.as_deref(), Some("HttpAgent"));
        assert_eq!(registration.services.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let uri = format!("{}/missing.json", server.uri());
        let err = fetch_registration(&http, &uri).await.unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
