//! Wallet transaction orchestrator for Curate list management.
//!
//! Gates every chain write behind wallet authorization, services queued
//! writes one at a time against the active wallet session, tracks each
//! transaction through confirmation and reports progress to a notification
//! sink addressed by stable ids.

mod action;
mod builder;
mod chains;
mod config;
mod decode;
mod errors;
mod gate;
mod handle;
mod notify;
mod queue;
mod reactor;
mod service;
mod session;
mod status;
mod tracker;
mod traits;

#[cfg(test)]
mod test_utils;

pub use action::{
    ActionKind, AuthorizationFn, MinedResult, OnMined, SubmitFuture, SubmittedTx, TransactionFn,
};
pub use builder::OrchestratorBuilder;
pub use chains::{ChainConfig, ChainRegistry};
pub use config::OrchestratorConfig;
pub use decode::{
    decode_creation_address, predict_create_address, CreationDecoder, CreationEvent, NewGTCR,
};
pub use errors::{
    ChainReadError, ConfigError, OrchestratorError, SubmitError, TxError, WalletError,
};
pub use handle::OrchestratorHandle;
pub use notify::{
    Notification, NotificationId, NotificationLevel, NotificationPatch, NotificationSink,
    TracingNotificationSink,
};
pub use queue::DrainState;
pub use reactor::SessionEvent;
pub use session::{ChainId, Session};
pub use status::OrchestratorStatus;
pub use tracker::{TrackerPhase, TxRecord, TxStatus};
pub use traits::{ChainReader, TxReceipt, TxSigner, WalletConnector};

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
