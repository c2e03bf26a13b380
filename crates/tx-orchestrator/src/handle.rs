use std::future::Future;

use tokio::sync::{broadcast, mpsc, watch};

use crate::{
    action::{transaction_fn, SubmittedTx},
    errors::{OrchestratorError, SubmitError},
    reactor::SessionEvent,
    service::OrchestratorCommand,
    session::Session,
    status::OrchestratorStatus,
    OrchestratorResult,
};

/// Cloneable handle to a running orchestrator.
///
/// Every operation is fire-and-forget: outcomes are reported through
/// notifications and `on_mined` callbacks. An error only means the worker is
/// gone.
#[derive(Clone, Debug)]
pub struct OrchestratorHandle {
    command_tx: mpsc::UnboundedSender<OrchestratorCommand>,
    status_rx: watch::Receiver<OrchestratorStatus>,
    events_tx: broadcast::Sender<SessionEvent>,
}

impl OrchestratorHandle {
    pub(crate) fn new(
        command_tx: mpsc::UnboundedSender<OrchestratorCommand>,
        status_rx: watch::Receiver<OrchestratorStatus>,
        events_tx: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            command_tx,
            status_rx,
            events_tx,
        }
    }

    fn send(&self, cmd: OrchestratorCommand) -> OrchestratorResult<()> {
        self.command_tx
            .send(cmd)
            .map_err(|_| OrchestratorError::WorkerExited)
    }

    /// Queues a chain write. `payload` is invoked with the session once a
    /// signer is available and no other transaction is in flight.
    pub fn enqueue_transaction<F, Fut>(&self, payload: F) -> OrchestratorResult<()>
    where
        F: FnOnce(Session) -> Fut + Send + 'static,
        Fut: Future<Output = Result<SubmittedTx, SubmitError>> + Send + 'static,
    {
        self.send(OrchestratorCommand::EnqueueTransaction(transaction_fn(
            payload,
        )))
    }

    /// Queues a callback to run once a session is available.
    pub fn enqueue_authorization(
        &self,
        callback: impl FnOnce() + Send + 'static,
    ) -> OrchestratorResult<()> {
        self.send(OrchestratorCommand::EnqueueAuthorization(Box::new(callback)))
    }

    /// Ensures a wallet is connected, prompting if there is none.
    pub fn request_auth(&self) -> OrchestratorResult<()> {
        self.send(OrchestratorCommand::RequestAuth(None))
    }

    /// Like [`Self::request_auth`], running `on_granted` once a session
    /// exists. Runs right away if one already does.
    pub fn request_auth_with(
        &self,
        on_granted: impl FnOnce() + Send + 'static,
    ) -> OrchestratorResult<()> {
        self.send(OrchestratorCommand::RequestAuth(Some(Box::new(on_granted))))
    }

    /// Drops every queued action and the pending connect prompt. The
    /// in-flight transaction, if any, runs to completion.
    pub fn cancel(&self) -> OrchestratorResult<()> {
        self.send(OrchestratorCommand::Cancel)
    }

    pub fn status(&self) -> OrchestratorStatus {
        self.status_rx.borrow().clone()
    }

    pub fn status_watcher(&self) -> watch::Receiver<OrchestratorStatus> {
        self.status_rx.clone()
    }

    /// Subscribes to session changes as seen by the orchestrator.
    pub fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }
}
