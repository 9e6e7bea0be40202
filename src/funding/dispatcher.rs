use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy::signers::local::PrivateKeySigner;
use std::sync::Arc;

use crate::chain::ChainClient;
use crate::error::FundingError;

use super::types::FundingTx;

/// Gas for a plain value transfer to an account without code.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Builds, signs and broadcasts the gas-funding transfer. One attempt per
/// call: any failing step aborts without retrying.
pub struct Dispatcher {
    client: Arc<dyn ChainClient>,
    signer: PrivateKeySigner,
    amount: U256,
}

impl Dispatcher {
    pub fn new(client: Arc<dyn ChainClient>, signer: PrivateKeySigner, amount: U256) -> Self {
        Self {
            client,
            signer,
            amount,
        }
    }

    pub fn sender(&self) -> Address {
        self.signer.address()
    }

    pub async fn fund(&self, recipient: Address) -> Result<FundingTx, FundingError> {
        let sender = self.sender();

        let nonce = self
            .client
            .pending_nonce(sender)
            .await
            .map_err(FundingError::Nonce)?;
        let gas_price = self
            .client
            .gas_price()
            .await
            .map_err(FundingError::GasPrice)?;
        let chain_id = self
            .client
            .chain_id()
            .await
            .map_err(FundingError::ChainId)?;

        let funding = self.sign(recipient, nonce, gas_price, chain_id)?;

        self.client
            .send_raw_transaction(&funding.raw)
            .await
            .map_err(FundingError::Broadcast)?;

        tracing::debug!(
            tx = %funding.tx_hash,
            to = %recipient,
            nonce,
            gas_price,
            chain_id,
            "Funding transaction broadcast"
        );

        Ok(funding)
    }

    /// Sign a legacy value transfer bound to `chain_id` (EIP-155).
    pub fn sign(
        &self,
        recipient: Address,
        nonce: u64,
        gas_price: u128,
        chain_id: u64,
    ) -> Result<FundingTx, FundingError> {
        let mut tx = TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price,
            gas_limit: TRANSFER_GAS_LIMIT,
            to: TxKind::Call(recipient),
            value: self.amount,
            input: Bytes::new(),
        };

        let signature = self.signer.sign_transaction_sync(&mut tx)?;
        let signed = tx.into_signed(signature);
        let tx_hash = *signed.hash();
        let raw = Bytes::from(TxEnvelope::from(signed).encoded_2718());

        Ok(FundingTx {
            recipient,
            value: self.amount,
            nonce,
            gas_limit: TRANSFER_GAS_LIMIT,
            gas_price,
            chain_id,
            signature,
            tx_hash,
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::{Call, MockChainClient};
    use crate::config::parse_signer;
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::{address, keccak256};

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const RECIPIENT: Address = address!("0000000000000000000000000000000000000abc");

    fn dispatcher(client: Arc<MockChainClient>) -> Dispatcher {
        Dispatcher::new(client, parse_signer(KEY).unwrap(), U256::from(50u64))
    }

    #[tokio::test]
    async fn test_fund_broadcasts_signed_transfer() {
        let client = Arc::new(MockChainClient::default());
        let dispatcher = dispatcher(client.clone());
        let funding = dispatcher.fund(RECIPIENT).await.unwrap();

        assert_eq!(funding.recipient, RECIPIENT);
        assert_eq!(funding.value, U256::from(50u64));
        assert_eq!(funding.nonce, 3);
        assert_eq!(funding.gas_limit, 21_000);
        assert_eq!(funding.chain_id, 8);

        let broadcasts = client.broadcasts();
        assert_eq!(broadcasts.len(), 1);
        assert_eq!(broadcasts[0], funding.raw);
        assert_eq!(funding.tx_hash, keccak256(&funding.raw));

        let envelope = TxEnvelope::decode_2718(&mut &funding.raw[..]).unwrap();
        let legacy = envelope.as_legacy().unwrap();
        let tx = legacy.tx();
        assert_eq!(tx.to, TxKind::Call(RECIPIENT));
        assert_eq!(tx.value, U256::from(50u64));
        assert_eq!(tx.chain_id, Some(8));
        assert_eq!(tx.gas_price, 80_000_000_000);
        assert!(tx.input.is_empty());

        let signer = legacy
            .signature()
            .recover_address_from_prehash(&tx.signature_hash())
            .unwrap();
        assert_eq!(signer, dispatcher.sender());
    }

    #[tokio::test]
    async fn test_nonce_failure_aborts_before_broadcast() {
        let client = Arc::new(MockChainClient {
            fail_nonce: true,
            ..Default::default()
        });
        let err = dispatcher(client.clone()).fund(RECIPIENT).await.unwrap_err();
        assert!(matches!(err, FundingError::Nonce(_)));
        assert!(client.broadcasts().is_empty());
        assert!(!client.calls().contains(&Call::GasPrice));
    }

    #[tokio::test]
    async fn test_broadcast_failure_is_named() {
        let client = Arc::new(MockChainClient {
            fail_broadcast: true,
            ..Default::default()
        });
        let err = dispatcher(client.clone()).fund(RECIPIENT).await.unwrap_err();
        assert!(matches!(err, FundingError::Broadcast(_)));
        assert_eq!(client.broadcasts().len(), 1);
    }

    #[test]
    fn test_signature_is_chain_bound() {
        let client = Arc::new(MockChainClient::default());
        let dispatcher = dispatcher(client);
        let on_eight = dispatcher.sign(RECIPIENT, 0, 1, 8).unwrap();
        let on_one = dispatcher.sign(RECIPIENT, 0, 1, 1).unwrap();
        assert_ne!(on_eight.tx_hash, on_one.tx_hash);
        assert_ne!(on_eight.signature, on_one.signature);
    }
}
