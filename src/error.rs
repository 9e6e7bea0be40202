use alloy::primitives::Address;
use thiserror::Error;

/// A single failed call against the chain node.
#[derive(Debug, Error)]
#[error("{method} failed: {message}")]
pub struct ChainError {
    pub method: &'static str,
    pub message: String,
}

impl ChainError {
    pub fn new(method: &'static str, err: impl std::fmt::Display) -> Self {
        Self {
            method,
            message: err.to_string(),
        }
    }
}

/// A Transfer log that could not be decoded. Reconnecting will not fix this:
/// it means the monitored contract does not speak the ERC-20 ABI.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("transfer log has {0} topics, expected 3")]
    MissingTopics(usize),

    #[error("malformed transfer payload: {0}")]
    Payload(#[from] alloy::sol_types::Error),
}

/// Why a funding attempt for one event was abandoned.
#[derive(Debug, Error)]
pub enum FundingError {
    #[error("unable to get balance of {address}: {source}")]
    Balance {
        address: Address,
        #[source]
        source: ChainError,
    },

    #[error("unable to get pending nonce of sender: {0}")]
    Nonce(#[source] ChainError),

    #[error("unable to get gas price: {0}")]
    GasPrice(#[source] ChainError),

    #[error("unable to get chain id: {0}")]
    ChainId(#[source] ChainError),

    #[error("unable to sign transaction: {0}")]
    Sign(#[from] alloy::signers::Error),

    #[error("unable to send transaction: {0}")]
    Broadcast(#[source] ChainError),
}
