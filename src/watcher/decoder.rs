use alloy::primitives::Address;
use alloy::sol;
use alloy::sol_types::SolEvent;

use crate::error::DecodeError;

use super::types::{LogRecord, TransferEvent};

// Generate the Transfer event ABI using alloy's sol! macro.
// This gives us Transfer::SIGNATURE_HASH and a typed data decoder.
sol! {
    event Transfer(address indexed from, address indexed to, uint256 value);
}

/// Attempt to decode a log as an ERC-20 Transfer event.
///
/// Returns `Ok(None)` for the connection sentinel (no topics) and for any
/// other event signature. A Transfer log whose payload or indexed topics are
/// malformed is an error: the watched contract is not what we think it is.
pub fn decode_transfer(record: &LogRecord) -> Result<Option<TransferEvent>, DecodeError> {
    let topics = &record.topics;
    if topics.is_empty() || topics[0] != Transfer::SIGNATURE_HASH {
        return Ok(None);
    }

    if topics.len() != 3 {
        return Err(DecodeError::MissingTopics(topics.len()));
    }

    // The data payload only carries the non-indexed value.
    let (value,) = Transfer::abi_decode_data(&record.data)?;

    // Indexed addresses live in the topics, never in the payload.
    let from = Address::from_word(topics[1]);
    let to = Address::from_word(topics[2]);

    Ok(Some(TransferEvent { from, to, value }))
}
