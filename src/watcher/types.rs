use alloy::primitives::{Address, Bytes, TxHash, B256, U256};
use alloy::rpc::types::Log;

/// A raw contract log as delivered by the subscription.
///
/// A record with no topics is the "connection live" marker the stream
/// manager emits after every successful subscribe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogRecord {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    pub tx_hash: TxHash,
    pub block_number: u64,
}

impl LogRecord {
    pub fn is_sentinel(&self) -> bool {
        self.topics.is_empty()
    }
}

impl From<Log> for LogRecord {
    fn from(log: Log) -> Self {
        let inner = log.inner;
        Self {
            address: inner.address,
            topics: inner.data.topics().to_vec(),
            data: inner.data.data,
            tx_hash: log.transaction_hash.unwrap_or_default(),
            block_number: log.block_number.unwrap_or(0),
        }
    }
}

/// A decoded ERC-20 Transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub value: U256,
}
