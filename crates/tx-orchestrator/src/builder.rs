//! Orchestrator builder for initialization and launch.

use std::{fmt, future::Future, sync::Arc};

use tokio::sync::{broadcast, mpsc, watch};
use tracing::*;

use crate::{
    config::OrchestratorConfig,
    errors::OrchestratorError,
    handle::OrchestratorHandle,
    notify::{NotificationSink, TracingNotificationSink},
    service::{orchestrator_task, OrchestratorState},
    session::Session,
    status::OrchestratorStatus,
    tracker::TrackerCtx,
    traits::{ChainReader, WalletConnector},
    OrchestratorResult,
};

const SESSION_EVENTS_CAPACITY: usize = 64;

/// Wires the orchestrator's collaborators together and starts its worker.
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    connector: Option<Arc<dyn WalletConnector>>,
    reader: Option<Arc<dyn ChainReader>>,
    sink: Option<Arc<dyn NotificationSink>>,
    session_rx: Option<watch::Receiver<Session>>,
}

impl fmt::Debug for OrchestratorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrchestratorBuilder")
            .field("config", &self.config)
            .field("has_connector", &self.connector.is_some())
            .field("has_reader", &self.reader.is_some())
            .field("has_sink", &self.sink.is_some())
            .field("has_session", &self.session_rx.is_some())
            .finish()
    }
}

impl OrchestratorBuilder {
    pub fn new(config: OrchestratorConfig) -> Self {
        Self {
            config,
            connector: None,
            reader: None,
            sink: None,
            session_rx: None,
        }
    }

    pub fn with_connector(mut self, connector: Arc<dyn WalletConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn with_chain_reader(mut self, reader: Arc<dyn ChainReader>) -> Self {
        self.reader = Some(reader);
        self
    }

    /// Defaults to [`TracingNotificationSink`].
    pub fn with_notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Session snapshots published by the wallet collaborator.
    pub fn with_session(mut self, session_rx: watch::Receiver<Session>) -> Self {
        self.session_rx = Some(session_rx);
        self
    }

    /// Builds the handle and the worker future without spawning it.
    pub fn build(self) -> OrchestratorResult<(OrchestratorHandle, impl Future<Output = ()>)> {
        self.config.validate()?;

        let connector = self
            .connector
            .ok_or(OrchestratorError::MissingComponent("wallet connector"))?;
        let reader = self
            .reader
            .ok_or(OrchestratorError::MissingComponent("chain reader"))?;
        let session_rx = self
            .session_rx
            .ok_or(OrchestratorError::MissingComponent("session channel"))?;
        let sink = self
            .sink
            .unwrap_or_else(|| Arc::new(TracingNotificationSink));

        let (status_tx, status_rx) = watch::channel(OrchestratorStatus::default());
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (events_tx, _) = broadcast::channel(SESSION_EVENTS_CAPACITY);

        let tracker = TrackerCtx::new(&self.config, reader, sink.clone(), Arc::new(status_tx));
        let state = OrchestratorState::new(
            connector,
            sink,
            Arc::new(tracker),
            events_tx.clone(),
            self.config.network_notice_auto_close(),
        );

        let handle = OrchestratorHandle::new(command_tx, status_rx, events_tx);
        let task = orchestrator_task(state, session_rx, command_rx);
        Ok((handle, task))
    }

    /// Spawns the worker on the current tokio runtime.
    pub fn launch(self) -> OrchestratorResult<OrchestratorHandle> {
        let (handle, task) = self.build()?;
        tokio::spawn(task);
        debug!("orchestrator launched");
        Ok(handle)
    }
}
