//! Error types for the orchestrator and its collaborators.

use alloy_primitives::TxHash;
use thiserror::Error;

use crate::session::ChainId;

/// Errors raised by a wallet collaborator or a signer.
#[derive(Debug, Clone, Error)]
pub enum WalletError {
    /// The user dismissed the connect prompt or declined to sign.
    #[error("request rejected by user: {0}")]
    Rejected(String),

    #[error("wallet not connected")]
    NotConnected,

    /// No key or injected provider is configured.
    #[error("no wallet available: {0}")]
    Unavailable(String),

    #[error("wallet provider: {0}")]
    Provider(String),
}

impl WalletError {
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}

/// Error returned by a transaction payload before a hash exists.
#[derive(Debug, Clone, Error)]
pub enum SubmitError {
    #[error("{0}")]
    UserRejected(String),

    /// Gas estimation, RPC submission or any other pre-hash failure.
    #[error("{0}")]
    Failed(String),
}

impl SubmitError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

impl From<WalletError> for SubmitError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::Rejected(msg) => Self::UserRejected(msg),
            other => Self::Failed(other.to_string()),
        }
    }
}

/// Errors from the chain-read collaborator.
#[derive(Debug, Clone, Error)]
pub enum ChainReadError {
    #[error("rpc: {0}")]
    Rpc(String),

    /// A predicted nonce does not fit in a `u64`.
    #[error("nonce {nonce} plus offset {offset} overflows")]
    NonceOverflow { nonce: u64, offset: u64 },
}

impl ChainReadError {
    pub fn rpc(msg: impl Into<String>) -> Self {
        Self::Rpc(msg.into())
    }
}

/// Terminal failure of a single transaction action.
#[derive(Debug, Clone, Error)]
pub enum TxError {
    #[error("signature rejected: {0}")]
    UserRejected(String),

    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    #[error("transaction {hash} reverted")]
    Reverted { hash: TxHash },

    #[error("confirmation of {hash} failed: {source}")]
    ConfirmationFailed {
        hash: TxHash,
        #[source]
        source: ChainReadError,
    },
}

impl TxError {
    /// Hash of the transaction, if one was ever produced.
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::UserRejected(_) | Self::SubmissionFailed(_) => None,
            Self::Reverted { hash } | Self::ConfirmationFailed { hash, .. } => Some(*hash),
        }
    }
}

impl From<SubmitError> for TxError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::UserRejected(msg) => Self::UserRejected(msg),
            SubmitError::Failed(msg) => Self::SubmissionFailed(msg),
        }
    }
}

/// Invalid orchestrator configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("confirmations must be at least 1")]
    ZeroConfirmations,

    #[error("poll interval must be non-zero")]
    ZeroPollInterval,

    #[error("chain {0} configured more than once")]
    DuplicateChain(ChainId),

    #[error("chain {0} has an empty explorer url")]
    EmptyExplorerUrl(ChainId),
}

/// Errors surfaced by the orchestrator handle and builder.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("orchestrator worker exited")]
    WorkerExited,

    #[error("builder: missing {0}")]
    MissingComponent(&'static str),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
