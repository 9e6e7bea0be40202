use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use alloy::rpc::types::Filter;
use async_trait::async_trait;
use futures::{stream, StreamExt};

use crate::error::ChainError;
use crate::watcher::types::LogRecord;

use super::{ChainClient, LogStream, LogSubscriber};

/// [`ChainClient`] over any alloy provider (HTTP in production).
pub struct RpcChainClient<P> {
    provider: P,
}

impl<P: Provider> RpcChainClient<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<P: Provider> ChainClient for RpcChainClient<P> {
    async fn balance_at(&self, address: Address) -> Result<U256, ChainError> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| ChainError::new("eth_getBalance", e))
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| ChainError::new("eth_getTransactionCount", e))
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| ChainError::new("eth_gasPrice", e))
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| ChainError::new("eth_chainId", e))
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, ChainError> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(|e| ChainError::new("eth_sendRawTransaction", e))?;
        Ok(*pending.tx_hash())
    }
}

/// Opens a fresh WebSocket connection for every subscription so a restarted
/// node is picked up on the next attempt.
pub struct WsLogSubscriber {
    ws_url: String,
}

impl WsLogSubscriber {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
        }
    }
}

#[async_trait]
impl LogSubscriber for WsLogSubscriber {
    async fn subscribe_logs(&self, contract: Address) -> eyre::Result<LogStream> {
        let ws = WsConnect::new(self.ws_url.clone());
        let provider = ProviderBuilder::new().connect_ws(ws).await?;

        let filter = Filter::new().address(contract);
        let sub = provider.subscribe_logs(&filter).await?;
        let logs = sub.into_stream();

        // The provider owns the socket; carry it along with the stream.
        let stream = stream::unfold((provider, logs), |(provider, mut logs)| async move {
            let log = logs.next().await?;
            Some((LogRecord::from(log), (provider, logs)))
        });

        Ok(stream.boxed())
    }
}
