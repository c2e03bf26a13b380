//! Orchestrator worker task.
//!
//! A single task owns the queue, the gate and the session reactor. It fans in
//! handle commands, session updates and the settlement of the one in-flight
//! transaction, and re-drains the queue after every event.

use std::{fmt, future::Future, pin::Pin, sync::Arc, time::Duration};

use futures::future;
use tokio::{
    select,
    sync::{broadcast, mpsc, watch},
};
use tracing::*;

use crate::{
    action::{AuthorizationFn, QueuedAction, TransactionFn},
    errors::TxError,
    gate::AuthGate,
    notify::{Notification, NotificationId, NotificationSink},
    queue::{ActionQueue, DrainOutcome},
    reactor::{SessionEvent, SessionReactor},
    session::Session,
    status::OrchestratorStatus,
    tracker::{track_transaction, TrackerCtx, TrackerPhase, TxRecord},
    traits::WalletConnector,
};

const NETWORK_CHANGED_MESSAGE: &str = "Network Changed";

pub(crate) enum OrchestratorCommand {
    EnqueueTransaction(TransactionFn),
    EnqueueAuthorization(AuthorizationFn),
    RequestAuth(Option<AuthorizationFn>),
    Cancel,
}

impl fmt::Debug for OrchestratorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnqueueTransaction(_) => f.write_str("EnqueueTransaction"),
            Self::EnqueueAuthorization(_) => f.write_str("EnqueueAuthorization"),
            Self::RequestAuth(cb) => f
                .debug_struct("RequestAuth")
                .field("has_callback", &cb.is_some())
                .finish(),
            Self::Cancel => f.write_str("Cancel"),
        }
    }
}

type InFlight = Pin<Box<dyn Future<Output = Result<TxRecord, TxError>> + Send>>;

/// State owned by the worker task.
pub(crate) struct OrchestratorState {
    connector: Arc<dyn WalletConnector>,
    sink: Arc<dyn NotificationSink>,
    tracker: Arc<TrackerCtx>,
    queue: ActionQueue,
    gate: AuthGate,
    reactor: SessionReactor,
    in_flight: Option<InFlight>,
    status_tx: Arc<watch::Sender<OrchestratorStatus>>,
    events_tx: broadcast::Sender<SessionEvent>,
    network_notice_auto_close: Duration,
    success_auto_close: Duration,
}

impl fmt::Debug for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrchestratorState")
            .field("queue", &self.queue)
            .field("gate", &self.gate)
            .field("reactor", &self.reactor)
            .field("in_flight", &self.in_flight.is_some())
            .finish_non_exhaustive()
    }
}

impl OrchestratorState {
    pub(crate) fn new(
        connector: Arc<dyn WalletConnector>,
        sink: Arc<dyn NotificationSink>,
        tracker: Arc<TrackerCtx>,
        events_tx: broadcast::Sender<SessionEvent>,
        network_notice_auto_close: Duration,
    ) -> Self {
        Self {
            connector,
            sink,
            status_tx: tracker.status_tx.clone(),
            success_auto_close: tracker.success_auto_close,
            tracker,
            queue: ActionQueue::default(),
            gate: AuthGate::default(),
            reactor: SessionReactor::default(),
            in_flight: None,
            events_tx,
            network_notice_auto_close,
        }
    }

    /// Applies the initial session and tries one silent reconnect.
    async fn on_launch(&mut self, initial: Session) {
        let connected = initial.is_connected();
        self.handle_session(initial);

        if connected || !self.connector.has_injected_provider() {
            return;
        }

        match self.connector.auto_connect().await {
            Ok(true) => info!("wallet reconnected silently"),
            Ok(false) => debug!("injected provider has no authorized account"),
            Err(err) => warn!(%err, "silent wallet reconnect failed"),
        }
    }

    fn handle_session(&mut self, next: Session) {
        for event in self.reactor.observe(next) {
            // Nobody listening is fine.
            let _ = self.events_tx.send(event.clone());

            match event {
                SessionEvent::Errored(err) => {
                    if self.gate.on_session_error(&err, self.sink.as_ref()) {
                        let dropped = self.queue.clear();
                        warn!(%err, %dropped, "wallet authorization failed; queue cleared");
                        self.status_tx
                            .send_modify(|status| status.last_error = Some(err));
                    } else {
                        debug!(%err, "wallet reported an error");
                    }
                }

                SessionEvent::Disconnected => {
                    info!("wallet disconnected");
                    self.gate.on_disconnected();
                }

                SessionEvent::ChainChanged { from, to } => {
                    info!(%from, %to, "wallet switched network");
                    self.sink.show(
                        Notification::info(NotificationId::network(), NETWORK_CHANGED_MESSAGE)
                            .auto_closing(self.network_notice_auto_close),
                    );
                }

                SessionEvent::Connected { account } => {
                    info!(%account, queued = self.queue.len(), "wallet connected");
                    self.gate.on_connected(
                        !self.queue.is_empty(),
                        self.sink.as_ref(),
                        self.success_auto_close,
                    );
                }

                SessionEvent::AccountChanged { from, to } => {
                    info!(%from, %to, "wallet switched account");
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: OrchestratorCommand) {
        trace!(?cmd, "orchestrator command");
        match cmd {
            OrchestratorCommand::EnqueueTransaction(payload) => {
                self.queue.push(QueuedAction::Transaction(payload));
            }

            OrchestratorCommand::EnqueueAuthorization(callback) => {
                self.queue.push(QueuedAction::Authorization(callback));
            }

            OrchestratorCommand::RequestAuth(callback) => {
                if self.reactor.current().is_ready() {
                    if let Some(callback) = callback {
                        callback();
                    }
                    return;
                }

                self.prompt();
                if let Some(callback) = callback {
                    self.queue.push(QueuedAction::Authorization(callback));
                }
            }

            OrchestratorCommand::Cancel => {
                let dropped = self.queue.clear();
                self.gate.reset(self.sink.as_ref());
                info!(%dropped, in_flight = self.in_flight.is_some(), "queued actions cancelled");
            }
        }
    }

    /// Opens the connect prompt if none is outstanding. A fresh prompt
    /// makes any later wallet error count, even one repeating the last.
    fn prompt(&mut self) {
        if self
            .gate
            .ensure_prompt(self.connector.as_ref(), self.sink.as_ref())
        {
            self.reactor.forget_error();
        }
    }

    fn handle_settled(&mut self, result: Result<TxRecord, TxError>) {
        self.in_flight = None;
        self.queue.release();

        let last_error = match result {
            Ok(record) => {
                debug!(hash = %record.hash, "transaction settled");
                None
            }
            Err(err) => Some(err.to_string()),
        };

        self.status_tx.send_modify(|status| {
            status.phase = TrackerPhase::Idle;
            status.settled += 1;
            if last_error.is_some() {
                status.last_error = last_error;
            }
        });
    }

    fn drain(&mut self) {
        match self.queue.drain(self.reactor.current().is_ready()) {
            DrainOutcome::Drained | DrainOutcome::Busy => {}

            DrainOutcome::Blocked => self.prompt(),

            DrainOutcome::Dispatch(payload) => {
                let session = self.reactor.current().clone();
                let fut = track_transaction(self.tracker.clone(), session, payload);
                self.in_flight = Some(Box::pin(fut));
            }
        }
    }

    fn publish_status(&self) {
        let queued = self.queue.len();
        let drain_state = self.queue.state();
        let awaiting_connection = self.gate.is_waiting();
        self.status_tx.send_if_modified(|status| {
            let changed = status.queued != queued
                || status.drain_state != drain_state
                || status.awaiting_connection != awaiting_connection;
            status.queued = queued;
            status.drain_state = drain_state;
            status.awaiting_connection = awaiting_connection;
            changed
        });
    }

    fn is_done(&self, commands_open: bool, sessions_open: bool) -> bool {
        // Queued work can still run while sessions keep arriving.
        !commands_open && self.in_flight.is_none() && (self.queue.is_empty() || !sessions_open)
    }
}

/// Resolves with the in-flight transaction's outcome, or never if there is
/// none.
async fn poll_in_flight(in_flight: &mut Option<InFlight>) -> Result<TxRecord, TxError> {
    match in_flight {
        Some(fut) => fut.as_mut().await,
        None => future::pending().await,
    }
}

pub(crate) async fn orchestrator_task(
    mut state: OrchestratorState,
    mut session_rx: watch::Receiver<Session>,
    mut command_rx: mpsc::UnboundedReceiver<OrchestratorCommand>,
) {
    let initial = session_rx.borrow_and_update().clone();
    state.on_launch(initial).await;
    state.drain();
    state.publish_status();

    let mut commands_open = true;
    let mut sessions_open = true;

    while !state.is_done(commands_open, sessions_open) {
        select! {
            biased;

            result = poll_in_flight(&mut state.in_flight) => {
                state.handle_settled(result);
            }

            changed = session_rx.changed(), if sessions_open => {
                if changed.is_err() {
                    warn!("session channel closed; keeping last session");
                    sessions_open = false;
                } else {
                    let next = session_rx.borrow_and_update().clone();
                    state.handle_session(next);
                }
            }

            maybe_cmd = command_rx.recv(), if commands_open => {
                match maybe_cmd {
                    Some(cmd) => state.handle_command(cmd),
                    None => {
                        debug!("all handles dropped");
                        commands_open = false;
                    }
                }
            }
        }

        state.drain();
        state.publish_status();
    }

    info!("orchestrator worker exiting");
}
