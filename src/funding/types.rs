use alloy::primitives::{Address, Bytes, Signature, TxHash, U256};

/// Reason given when a recipient is already funded well enough.
pub const BALANCE_ABOVE_THRESHOLD: &str = "balance above threshold";

/// Outcome of checking one recipient against the funding ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundingDecision {
    Proceed { balance: U256 },
    Decline { balance: U256, reason: &'static str },
}

impl FundingDecision {
    pub fn proceed(&self) -> bool {
        matches!(self, Self::Proceed { .. })
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Self::Proceed { .. } => None,
            Self::Decline { reason, .. } => Some(*reason),
        }
    }

    pub fn balance(&self) -> U256 {
        match self {
            Self::Proceed { balance } | Self::Decline { balance, .. } => *balance,
        }
    }
}

/// A signed, broadcast funding transfer.
#[derive(Debug, Clone)]
pub struct FundingTx {
    pub recipient: Address,
    pub value: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub chain_id: u64,
    pub signature: Signature,
    pub tx_hash: TxHash,
    pub raw: Bytes,
}
