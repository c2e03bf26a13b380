//! Extraction of created contract addresses from receipt logs.

use std::fmt;

use alloy_primitives::{Address, Log};
use alloy_sol_types::{sol, SolEvent};

use crate::{errors::ChainReadError, traits::ChainReader};

sol! {
    /// Emitted by the list factories for every list they deploy.
    event NewGTCR(address indexed _address);
}

/// A factory event that announces a newly created contract.
pub trait CreationEvent: SolEvent {
    fn created_address(&self) -> Address;
}

impl CreationEvent for NewGTCR {
    fn created_address(&self) -> Address {
        self._address
    }
}

/// Decodes every log as `E`, skipping the ones that don't decode, and returns
/// the created address of the `select_index`-th match.
///
/// Batched deployments emit one event per contract, so the caller picks which
/// one it cares about.
pub fn decode_creation_address<E: CreationEvent>(
    logs: &[Log],
    select_index: usize,
) -> Option<Address> {
    logs.iter()
        .filter_map(|log| E::decode_log(log).ok())
        .map(|event| event.created_address())
        .nth(select_index)
}

/// Type-erased creation decoder carried by a deployment transaction.
#[derive(Clone, Copy)]
pub struct CreationDecoder {
    signature: &'static str,
    select_index: usize,
    decode: fn(&[Log], usize) -> Option<Address>,
}

impl CreationDecoder {
    /// Decoder for event `E` reporting the `select_index`-th match.
    pub fn new<E: CreationEvent>(select_index: usize) -> Self {
        Self {
            signature: E::SIGNATURE,
            select_index,
            decode: decode_creation_address::<E>,
        }
    }

    /// Decoder reporting the first match of `E`.
    pub fn first<E: CreationEvent>() -> Self {
        Self::new::<E>(0)
    }

    pub fn signature(&self) -> &'static str {
        self.signature
    }

    pub fn select_index(&self) -> usize {
        self.select_index
    }

    pub fn decode(&self, logs: &[Log]) -> Option<Address> {
        (self.decode)(logs, self.select_index)
    }
}

impl fmt::Debug for CreationDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreationDecoder")
            .field("signature", &self.signature)
            .field("select_index", &self.select_index)
            .finish()
    }
}

/// Predicts the address of a contract `deployer` will create `offset`
/// transactions from now.
///
/// Used by callers that chain deployments, e.g. wiring a list to a sibling
/// list that has not been deployed yet.
pub async fn predict_create_address(
    reader: &dyn ChainReader,
    deployer: Address,
    offset: u64,
) -> Result<Address, ChainReadError> {
    let nonce = reader.transaction_count(deployer).await?;
    let target = nonce
        .checked_add(offset)
        .ok_or(ChainReadError::NonceOverflow { nonce, offset })?;
    Ok(deployer.create(target))
}
