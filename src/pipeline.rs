use alloy::primitives::{Address, TxHash, U256};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::DecodeError;
use crate::funding::dispatcher::Dispatcher;
use crate::funding::engine::FundingEngine;
use crate::funding::types::FundingDecision;
use crate::notify::format::funding_summary;
use crate::notify::Notifier;
use crate::watcher::decoder::decode_transfer;
use crate::watcher::dedup::ProcessedTracker;
use crate::watcher::types::{LogRecord, TransferEvent};

/// How the pipeline dealt with one delivered log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Sentinel, other event, or a transfer not sent by the bridge handler.
    Ignored,
    Duplicate,
    Declined { balance: U256 },
    Funded { tx_hash: TxHash },
    /// A chain query or the broadcast failed; the event is not retried.
    Failed,
}

/// How the funded amount is rendered in reports.
#[derive(Debug, Clone)]
pub struct SummaryFormat {
    pub symbol: String,
    pub native_decimals: u8,
    pub places: usize,
}

/// Sequential consumer of the log channel:
/// 1. Decode Transfer
/// 2. Keep only transfers sent by the bridge handler
/// 3. Skip an immediate replay of the last handled transaction
/// 4. Check the recipient's balance against the limit
/// 5. Sign and broadcast the funding transfer
/// 6. Report it
pub struct FundingPipeline {
    handler: Address,
    tracker: ProcessedTracker,
    engine: FundingEngine,
    dispatcher: Dispatcher,
    notifier: Arc<dyn Notifier>,
    summary: SummaryFormat,
}

impl FundingPipeline {
    pub fn new(
        handler: Address,
        engine: FundingEngine,
        dispatcher: Dispatcher,
        notifier: Arc<dyn Notifier>,
        summary: SummaryFormat,
    ) -> Self {
        Self {
            handler,
            tracker: ProcessedTracker::new(),
            engine,
            dispatcher,
            notifier,
            summary,
        }
    }

    /// Consume records until the channel closes. A decode error ends the run:
    /// the contract or ABI is misconfigured and no amount of reconnecting
    /// will help.
    pub async fn run(mut self, mut receiver: mpsc::Receiver<LogRecord>) -> eyre::Result<()> {
        while let Some(record) = receiver.recv().await {
            let (contract, tx_hash) = (record.address, record.tx_hash);
            if let Err(e) = self.handle(record).await {
                tracing::error!(contract = %contract, tx = %tx_hash, error = %e, "Undecodable transfer log");
                return Err(eyre::eyre!(
                    "Fatal: cannot decode transfer log from {} in tx {}, check the contract address: {}",
                    contract,
                    tx_hash,
                    e
                ));
            }
        }

        tracing::info!("Log channel closed, funding pipeline stopped");
        Ok(())
    }

    pub async fn handle(&mut self, record: LogRecord) -> Result<Outcome, DecodeError> {
        if record.is_sentinel() {
            tracing::debug!("Subscription live");
            return Ok(Outcome::Ignored);
        }

        let Some(transfer) = decode_transfer(&record)? else {
            return Ok(Outcome::Ignored);
        };

        if transfer.from != self.handler {
            return Ok(Outcome::Ignored);
        }

        if self.tracker.was_processed(&record.tx_hash) {
            tracing::info!(tx = %record.tx_hash, "Duplicate TX");
            return Ok(Outcome::Duplicate);
        }

        let outcome = self.fund(&transfer, &record).await;
        self.tracker.mark_processed(record.tx_hash);
        Ok(outcome)
    }

    async fn fund(&self, transfer: &TransferEvent, record: &LogRecord) -> Outcome {
        let recipient = transfer.to;

        let decision = match self.engine.decide(recipient).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::error!(tx = %record.tx_hash, to = %recipient, error = %e, "Funding check failed");
                return Outcome::Failed;
            }
        };

        if let FundingDecision::Decline { balance, reason } = decision {
            tracing::info!(
                tx = %record.tx_hash,
                to = %recipient,
                balance = %balance,
                limit = %self.engine.limit(),
                "Not funding: {}",
                reason
            );
            return Outcome::Declined { balance };
        }

        let funding = match self.dispatcher.fund(recipient).await {
            Ok(funding) => funding,
            Err(e) => {
                tracing::error!(tx = %record.tx_hash, to = %recipient, error = %e, "Funding failed");
                return Outcome::Failed;
            }
        };

        let summary = funding_summary(
            recipient,
            funding.value,
            self.summary.native_decimals,
            self.summary.places,
            &self.summary.symbol,
        );
        tracing::debug!(
            block = record.block_number,
            tx = %funding.tx_hash,
            "{}",
            summary
        );

        self.notifier
            .notify(&summary, record.block_number, funding.tx_hash)
            .await;

        Outcome::Funded {
            tx_hash: funding.tx_hash,
        }
    }
}
