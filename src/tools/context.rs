//! Call context threaded through every tool invocation.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;
use serde_json::Value;
use tracing::debug;

use crate::client::RegistryClient;
use crate::errors::AgentryError;

use super::schema::InputError;

/// How adapters shape tool output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Normal operation: adapters apply their hydrate-summary policy.
    #[default]
    Execute,
    /// Always return the structured payload, bypassing summary hydration.
    ReturnRaw,
}

/// Resolved session state for one agent: registry client, chain id, signer
/// address, output mode and free-form metadata. Immutable after resolution;
/// [`AgentContext::with_overrides`] derives a new context instead of mutating.
#[derive(Clone)]
pub struct AgentContext {
    pub client: Arc<dyn RegistryClient>,
    pub chain_id: u64,
    pub caller: Option<Address>,
    pub mode: ExecutionMode,
    pub metadata: HashMap<String, Value>,
}

impl std::fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentContext")
            .field("chain_id", &self.chain_id)
            .field("caller", &self.caller)
            .field("mode", &self.mode)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Options for [`AgentContext::resolve`].
#[derive(Default)]
pub struct ContextOptions {
    /// Explicit chain id; queried from the client when absent.
    pub chain_id: Option<u64>,
    pub mode: ExecutionMode,
    pub metadata: HashMap<String, Value>,
}

/// Field overrides for [`AgentContext::with_overrides`].
#[derive(Default)]
pub struct ContextOverrides {
    pub chain_id: Option<u64>,
    pub caller: Option<Address>,
    pub mode: Option<ExecutionMode>,
    pub metadata: HashMap<String, Value>,
}

impl AgentContext {
    /// Resolve a context against the client.
    ///
    /// Strict on the chain id: fails if neither the explicit option nor the
    /// client yields a positive value. Lenient on the caller address: a
    /// signerless client produces a context with `caller: None`, and tools
    /// that need a signer report it at execution time.
    pub async fn resolve(
        client: Arc<dyn RegistryClient>,
        options: ContextOptions,
    ) -> Result<Self, AgentryError> {
        let chain_id = match options.chain_id {
            Some(id) if id > 0 => id,
            Some(_) => {
                return Err(AgentryError::Config(
                    "Chain id must be a positive integer".to_string(),
                ))
            }
            None => {
                let id = client.chain_id().await.map_err(|e| {
                    AgentryError::Config(format!("Could not resolve chain id: {}", e))
                })?;
                if id == 0 {
                    return Err(AgentryError::Config(
                        "Client reported chain id 0".to_string(),
                    ));
                }
                id
            }
        };

        let caller = match client.caller_address().await {
            Ok(address) => address,
            Err(e) => {
                debug!("Could not resolve caller address, proceeding without: {}", e);
                None
            }
        };

        Ok(Self {
            client,
            chain_id,
            caller,
            mode: options.mode,
            metadata: options.metadata,
        })
    }

    /// Derive a new context, replacing the given top-level fields and
    /// deep-merging the metadata mapping. `self` is left untouched.
    pub fn with_overrides(&self, overrides: ContextOverrides) -> Self {
        let mut metadata = self.metadata.clone();
        for (key, value) in overrides.metadata {
            if value.is_object() {
                if let Some(existing) = metadata.get_mut(&key) {
                    if existing.is_object() {
                        merge_json(existing, value);
                        continue;
                    }
                }
            }
            metadata.insert(key, value);
        }

        Self {
            client: Arc::clone(&self.client),
            chain_id: overrides.chain_id.unwrap_or(self.chain_id),
            caller: overrides.caller.or(self.caller),
            mode: overrides.mode.unwrap_or(self.mode),
            metadata,
        }
    }
}

fn merge_json(base: &mut Value, incoming: Value) {
    match (base, incoming) {
        (Value::Object(base_map), Value::Object(incoming_map)) => {
            for (key, value) in incoming_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_json(existing, value);
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, incoming) => *base = incoming,
    }
}

/// Resolve a value from explicit input, falling back to the context, failing
/// with a descriptive error when neither supplies it.
pub fn resolve_field<T>(
    explicit: Option<T>,
    contextual: Option<T>,
    field: &str,
) -> Result<T, InputError> {
    explicit.or(contextual).ok_or_else(|| {
        InputError(format!(
            "{} is required (not supplied in input and not available from context)",
            field
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubRegistryClient;
    use serde_json::json;

    #[tokio::test]
    async fn test_resolve_queries_chain_id() {
        let client = Arc::new(StubRegistryClient::new().with_chain_id(84532));
        let ctx = AgentContext::resolve(client, ContextOptions::default())
            .await
            .unwrap();
        assert_eq!(ctx.chain_id, 84532);
        assert_eq!(ctx.mode, ExecutionMode::Execute);
    }

    #[tokio::test]
    async fn test_resolve_explicit_chain_id_skips_query() {
        let client = Arc::new(StubRegistryClient::new().failing("rpc down"));
        let ctx = AgentContext::resolve(
            Arc::clone(&client) as Arc<dyn RegistryClient>,
            ContextOptions {
                chain_id: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(ctx.chain_id, 1);
        assert_eq!(client.invocation_count(), 0);
    }

    #[tokio::test]
    async fn test_resolve_lenient_on_missing_address() {
        let client = Arc::new(StubRegistryClient::new().with_chain_id(1));
        let ctx = AgentContext::resolve(client, ContextOptions::default())
            .await
            .unwrap();
        assert!(ctx.caller.is_none());
    }

    #[tokio::test]
    async fn test_resolve_strict_on_chain_id_failure() {
        let client = Arc::new(StubRegistryClient::new().failing("rpc down"));
        let err = AgentContext::resolve(client, ContextOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("chain id"));
    }

    #[tokio::test]
    async fn test_with_overrides_deep_merges_metadata() {
        let client = Arc::new(StubRegistryClient::new().with_chain_id(1));
        let base = AgentContext::resolve(
            client,
            ContextOptions {
                metadata: HashMap::from([(
                    "session".to_string(),
                    json!({"user": "alice", "nested": {"keep": true}}),
                )]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let derived = base.with_overrides(ContextOverrides {
            mode: Some(ExecutionMode::ReturnRaw),
            metadata: HashMap::from([(
                "session".to_string(),
                json!({"nested": {"extra": 1}}),
            )]),
            ..Default::default()
        });

        assert_eq!(derived.mode, ExecutionMode::ReturnRaw);
        assert_eq!(
            derived.metadata["session"],
            json!({"user": "alice", "nested": {"keep": true, "extra": 1}})
        );
        // base untouched
        assert_eq!(base.mode, ExecutionMode::Execute);
        assert_eq!(
            base.metadata["session"],
            json!({"user": "alice", "nested": {"keep": true}})
        );
    }

    #[test]
    fn test_resolve_field_prefers_explicit() {
        assert_eq!(resolve_field(Some(5u64), Some(7u64), "chainId").unwrap(), 5);
        assert_eq!(resolve_field(None, Some(7u64), "chainId").unwrap(), 7);
        let err = resolve_field::<u64>(None, None, "signerAddress").unwrap_err();
        assert!(err.to_string().contains("signerAddress"));
    }
}
