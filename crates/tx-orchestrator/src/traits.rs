//! Interfaces of the collaborators the orchestrator depends on.

use std::{fmt, time::Duration};

use alloy_primitives::{Address, Log, TxHash};
use alloy_rpc_types_eth::TransactionRequest;
use async_trait::async_trait;

use crate::errors::{ChainReadError, WalletError};

/// Signing capability of a connected wallet.
///
/// Only transaction payloads call into the signer; the orchestrator never
/// does.
#[async_trait]
pub trait TxSigner: Send + Sync + fmt::Debug {
    /// Account the signer signs for.
    fn address(&self) -> Address;

    /// Signs and broadcasts `tx`, returning its hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError>;
}

/// Wallet-connection collaborator.
///
/// Session snapshots are published separately on a watch channel handed to
/// the orchestrator builder.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Opens the wallet-selection prompt. The outcome arrives as a session
    /// update, either connected or carrying an error.
    fn request_connection(&self);

    /// Whether an injected provider is available for a silent reconnect.
    fn has_injected_provider(&self) -> bool;

    /// Attempts to reconnect without prompting.
    ///
    /// Returns `Ok(false)` when the provider has no previously authorized
    /// account.
    async fn auto_connect(&self) -> Result<bool, WalletError>;
}

/// Settled transaction as reported by the chain-read collaborator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// `false` if the transaction reverted.
    pub success: bool,
    pub logs: Vec<Log>,
}

/// Read-only chain access.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Waits until `hash` has `confirmations` confirmations, polling every
    /// `poll_interval`. There is no timeout.
    async fn wait_for_transaction(
        &self,
        hash: TxHash,
        confirmations: u64,
        poll_interval: Duration,
    ) -> Result<TxReceipt, ChainReadError>;

    /// Number of transactions sent from `address` so far (its next nonce).
    async fn transaction_count(&self, address: Address) -> Result<u64, ChainReadError>;
}
