use alloy::primitives::{Address, U256};
use std::sync::Arc;

use crate::chain::ChainClient;
use crate::error::FundingError;

use super::types::{FundingDecision, BALANCE_ABOVE_THRESHOLD};

/// Decides whether a recipient still needs gas. Stateless between calls: the
/// same address is funded again whenever its balance is back under the limit.
pub struct FundingEngine {
    client: Arc<dyn ChainClient>,
    limit: U256,
}

impl FundingEngine {
    pub fn new(client: Arc<dyn ChainClient>, limit: U256) -> Self {
        Self { client, limit }
    }

    pub fn limit(&self) -> U256 {
        self.limit
    }

    /// A balance equal to the limit still gets funded.
    pub async fn decide(&self, recipient: Address) -> Result<FundingDecision, FundingError> {
        let balance = self
            .client
            .balance_at(recipient)
            .await
            .map_err(|source| FundingError::Balance {
                address: recipient,
                source,
            })?;

        if balance > self.limit {
            return Ok(FundingDecision::Decline {
                balance,
                reason: BALANCE_ABOVE_THRESHOLD,
            });
        }

        Ok(FundingDecision::Proceed { balance })
    }
}
