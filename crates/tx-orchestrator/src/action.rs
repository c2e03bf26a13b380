//! Queued units of work.

use std::{fmt, future::Future};

use alloy_primitives::{Address, TxHash};
use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;

use crate::{decode::CreationDecoder, errors::SubmitError, session::Session};

/// Plain callback run once a session is available.
pub type AuthorizationFn = Box<dyn FnOnce() + Send>;

/// Future returned by a transaction payload.
pub type SubmitFuture = BoxFuture<'static, Result<SubmittedTx, SubmitError>>;

/// Payload of a transaction action: submits a write through the session's
/// signer.
pub type TransactionFn = Box<dyn FnOnce(Session) -> SubmitFuture + Send>;

/// Completion callback of a mined transaction.
pub type OnMined = Box<dyn FnOnce(MinedResult) + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    Authorization,
    Transaction,
}

/// Erases a transaction payload into a [`TransactionFn`].
pub(crate) fn transaction_fn<F, Fut>(f: F) -> TransactionFn
where
    F: FnOnce(Session) -> Fut + Send + 'static,
    Fut: Future<Output = Result<SubmittedTx, SubmitError>> + Send + 'static,
{
    Box::new(move |session| f(session).boxed())
}

pub(crate) enum QueuedAction {
    Authorization(AuthorizationFn),
    Transaction(TransactionFn),
}

impl QueuedAction {
    pub(crate) fn authorization(f: impl FnOnce() + Send + 'static) -> Self {
        Self::Authorization(Box::new(f))
    }

    pub(crate) fn transaction<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Session) -> Fut + Send + 'static,
        Fut: Future<Output = Result<SubmittedTx, SubmitError>> + Send + 'static,
    {
        Self::Transaction(transaction_fn(f))
    }

    pub(crate) fn kind(&self) -> ActionKind {
        match self {
            Self::Authorization(_) => ActionKind::Authorization,
            Self::Transaction(_) => ActionKind::Transaction,
        }
    }
}

impl fmt::Debug for QueuedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("QueuedAction").field(&self.kind()).finish()
    }
}

/// What a transaction payload hands back once the write has a hash.
pub struct SubmittedTx {
    tx_hash: TxHash,
    message: Option<String>,
    on_mined: Option<OnMined>,
    deployment: Option<CreationDecoder>,
}

impl SubmittedTx {
    pub fn new(tx_hash: TxHash) -> Self {
        Self {
            tx_hash,
            message: None,
            on_mined: None,
            deployment: None,
        }
    }

    /// Message shown while the transaction awaits confirmation.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Called once with the decoded result if the transaction is mined.
    pub fn on_mined(mut self, f: impl FnOnce(MinedResult) + Send + 'static) -> Self {
        self.on_mined = Some(Box::new(f));
        self
    }

    /// Marks the transaction as a deployment whose created address is decoded
    /// from its logs.
    pub fn with_deployment(mut self, decoder: CreationDecoder) -> Self {
        self.deployment = Some(decoder);
        self
    }

    pub fn tx_hash(&self) -> TxHash {
        self.tx_hash
    }

    pub fn is_deployment(&self) -> bool {
        self.deployment.is_some()
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        TxHash,
        Option<String>,
        Option<OnMined>,
        Option<CreationDecoder>,
    ) {
        (self.tx_hash, self.message, self.on_mined, self.deployment)
    }
}

impl fmt::Debug for SubmittedTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmittedTx")
            .field("tx_hash", &self.tx_hash)
            .field("message", &self.message)
            .field("has_on_mined", &self.on_mined.is_some())
            .field("deployment", &self.deployment)
            .finish()
    }
}

/// Result passed to [`SubmittedTx::on_mined`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MinedResult {
    pub tx_hash: TxHash,
    pub block_number: u64,
    /// Created contract, for deployments whose creation event was found.
    pub contract_address: Option<Address>,
}
