//! The node capabilities the funder depends on. Production code talks to
//! alloy providers through these traits; tests swap in recording mocks.

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::ChainError;
use crate::watcher::types::LogRecord;

pub mod rpc;

#[cfg(test)]
pub mod mock;

/// Logs for one live subscription. The stream ends when the connection drops.
pub type LogStream = BoxStream<'static, LogRecord>;

#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn balance_at(&self, address: Address) -> Result<U256, ChainError>;

    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError>;

    async fn gas_price(&self) -> Result<u128, ChainError>;

    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Broadcast an EIP-2718 encoded signed transaction.
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, ChainError>;
}

#[async_trait]
pub trait LogSubscriber: Send + Sync {
    async fn subscribe_logs(&self, contract: Address) -> eyre::Result<LogStream>;
}
