use alloy::primitives::TxHash;
use async_trait::async_trait;

pub mod format;
pub mod webhook;

/// Fire-and-forget sink for funding reports. Delivery problems are logged by
/// the implementation and never reach the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, summary: &str, block_number: u64, tx_id: TxHash);
}

/// Used when no webhook is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, summary: &str, block_number: u64, tx_id: TxHash) {
        tracing::info!(
            block = block_number,
            tx = %tx_id,
            "{}",
            summary
        );
    }
}
