//! Recording test doubles for the chain capabilities and the notifier.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use alloy::primitives::{keccak256, Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use futures::{future, stream, StreamExt};
use tokio::time::Instant;

use crate::error::ChainError;
use crate::notify::Notifier;
use crate::watcher::types::LogRecord;

use super::{ChainClient, LogStream, LogSubscriber};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    BalanceAt(Address),
    PendingNonce(Address),
    GasPrice,
    ChainId,
    SendRaw(Bytes),
}

pub struct MockChainClient {
    pub balances: Mutex<HashMap<Address, U256>>,
    pub nonce: u64,
    pub gas_price: u128,
    pub chain_id: u64,
    pub fail_balance: bool,
    pub fail_nonce: bool,
    pub fail_broadcast: bool,
    pub calls: Mutex<Vec<Call>>,
}

impl Default for MockChainClient {
    fn default() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            nonce: 3,
            gas_price: 80_000_000_000,
            chain_id: 8,
            fail_balance: false,
            fail_nonce: false,
            fail_broadcast: false,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockChainClient {
    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        self.balances.lock().unwrap().insert(address, balance);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn broadcasts(&self) -> Vec<Bytes> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendRaw(raw) => Some(raw),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn balance_at(&self, address: Address) -> Result<U256, ChainError> {
        self.record(Call::BalanceAt(address));
        if self.fail_balance {
            return Err(ChainError::new("eth_getBalance", "connection refused"));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, ChainError> {
        self.record(Call::PendingNonce(address));
        if self.fail_nonce {
            return Err(ChainError::new("eth_getTransactionCount", "connection refused"));
        }
        let accepted = if self.fail_broadcast {
            0
        } else {
            self.broadcasts().len() as u64
        };
        Ok(self.nonce + accepted)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.record(Call::GasPrice);
        Ok(self.gas_price)
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.record(Call::ChainId);
        Ok(self.chain_id)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, ChainError> {
        self.record(Call::SendRaw(Bytes::copy_from_slice(raw)));
        if self.fail_broadcast {
            return Err(ChainError::new("eth_sendRawTransaction", "nonce too low"));
        }
        Ok(keccak256(raw))
    }
}

/// One scripted subscription attempt.
pub enum Session {
    Fail(String),
    /// Deliver these records, then drop the connection.
    Deliver(Vec<LogRecord>),
    /// Deliver these records, then stay connected forever.
    Hold(Vec<LogRecord>),
    /// Never finish subscribing.
    Hang,
}

#[derive(Default)]
pub struct MockSubscriber {
    sessions: Mutex<VecDeque<Session>>,
    started: Mutex<Vec<Instant>>,
}

impl MockSubscriber {
    pub fn new(sessions: Vec<Session>) -> Self {
        Self {
            sessions: Mutex::new(sessions.into()),
            started: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.started.lock().unwrap().len() as u32
    }

    /// When each subscribe call began, in order.
    pub fn started_at(&self) -> Vec<Instant> {
        self.started.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSubscriber for MockSubscriber {
    async fn subscribe_logs(&self, _contract: Address) -> eyre::Result<LogStream> {
        self.started.lock().unwrap().push(Instant::now());
        let session = self.sessions.lock().unwrap().pop_front();
        match session {
            Some(Session::Fail(reason)) => Err(eyre::eyre!(reason)),
            Some(Session::Deliver(records)) => Ok(stream::iter(records).boxed()),
            Some(Session::Hold(records)) => {
                Ok(stream::iter(records).chain(stream::pending()).boxed())
            }
            Some(Session::Hang) => future::pending().await,
            None => Ok(stream::pending().boxed()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub summary: String,
    pub block_number: u64,
    pub tx_id: TxHash,
}

#[derive(Default)]
pub struct MockNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

impl MockNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, summary: &str, block_number: u64, tx_id: TxHash) {
        self.sent.lock().unwrap().push(Notification {
            summary: summary.to_string(),
            block_number,
            tx_id,
        });
    }
}
