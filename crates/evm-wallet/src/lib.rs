//! Alloy-backed wallet and chain-read collaborators for the transaction
//! orchestrator.
//!
//! [`LocalWallet`] plays the part of an injected browser wallet for headless
//! hosts: it signs with a local private key and publishes
//! [`Session`](curate_tx_orchestrator::Session) snapshots on a watch channel.

mod config;
mod reader;
mod signer;
mod wallet;

pub use config::{WalletConfig, WalletEnv, PRIVATE_KEY_ENV};
pub use reader::RpcChainReader;
pub use signer::AlloyTxSigner;
pub use wallet::LocalWallet;
