use alloy::transports::{RpcError, TransportError};
use thiserror::Error;

/// Why a single contract deployment failed.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Malformed RPC response: {0}")]
    InvalidResponse(String),

    #[error("Artifact error for {contract}: {reason}")]
    Artifact { contract: String, reason: String },

    #[error("Constructor encoding error: {0}")]
    Encoding(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Node reports chain id {actual}, expected {expected}")]
    ChainMismatch { expected: u64, actual: u64 },

    #[error("Node exposes no unlocked accounts and no sender was configured")]
    NoAccounts,

    #[error("Deployment transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("Receipt for {tx_hash} has no contract address")]
    MissingContractAddress { tx_hash: String },

    #[error("No receipt for {tx_hash} after {waited_secs}s")]
    ReceiptTimeout { tx_hash: String, waited_secs: u64 },
}

impl DeployError {
    pub(crate) fn artifact(contract: &str, reason: impl Into<String>) -> Self {
        Self::Artifact {
            contract: contract.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<TransportError> for DeployError {
    fn from(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => Self::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
            },
            RpcError::NullResp => Self::InvalidResponse("node returned null".into()),
            RpcError::DeserError { err, text } => {
                Self::InvalidResponse(format!("{err} in response {text}"))
            }
            other => Self::Transport(other.to_string()),
        }
    }
}

/// The single failure kind surfaced by a migration run.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Deployment of {contract} (step {step}) failed: {source}")]
    DeploymentFailed {
        /// 1-based index of the failing step.
        step: usize,
        contract: String,
        #[source]
        source: DeployError,
    },
}

impl MigrationError {
    /// The underlying deployment failure.
    pub fn cause(&self) -> &DeployError {
        match self {
            Self::DeploymentFailed { source, .. } => source,
        }
    }
}
