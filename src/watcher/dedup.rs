use alloy::primitives::TxHash;

/// Remembers the transaction of the last handled transfer so a replay of the
/// same delivery (typically right after a reconnect) is not funded twice.
///
/// Only one slot is kept: a repeat separated by a different transaction is
/// processed again.
#[derive(Debug, Default)]
pub struct ProcessedTracker {
    last: Option<TxHash>,
}

impl ProcessedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn was_processed(&self, tx_hash: &TxHash) -> bool {
        self.last.as_ref() == Some(tx_hash)
    }

    pub fn mark_processed(&mut self, tx_hash: TxHash) {
        self.last = Some(tx_hash);
    }
}
