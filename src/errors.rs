use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Blockchain error: {0}")]
    Blockchain(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Registration fetch failed: {0}")]
    RegistrationFetch(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AgentryError {
    fn from(err: reqwest::Error) -> Self {
        AgentryError::RegistrationFetch(err.to_string())
    }
}

impl From<serde_json::Error> for AgentryError {
    fn from(err: serde_json::Error) -> Self {
        AgentryError::InvalidInput(format!("JSON parse error: {}", err))
    }
}
