//! Authorization gate: prompts for a wallet once per connectivity gap.

use std::time::Duration;

use tracing::*;

use crate::{
    notify::{Notification, NotificationId, NotificationPatch, NotificationSink},
    traits::WalletConnector,
};

const AWAITING_MESSAGE: &str = "Waiting for wallet authorization";
const ACQUIRED_MESSAGE: &str = "Authorization acquired";

/// Tracks the outstanding connect prompt and its notification.
#[derive(Debug, Default)]
pub(crate) struct AuthGate {
    /// Notification shown while the connect prompt is open.
    wait: Option<NotificationId>,

    /// Whether "Authorization acquired" was already shown for this
    /// connection.
    announced: bool,
}

impl AuthGate {
    pub(crate) fn is_waiting(&self) -> bool {
        self.wait.is_some()
    }

    /// Opens the connect prompt unless one is already outstanding.
    ///
    /// Returns `true` if a new prompt was opened.
    pub(crate) fn ensure_prompt(
        &mut self,
        connector: &dyn WalletConnector,
        sink: &dyn NotificationSink,
    ) -> bool {
        if self.wait.is_some() {
            return false;
        }

        let id = NotificationId::authorization();
        sink.show(Notification::info(id.clone(), AWAITING_MESSAGE));
        debug!(%id, "requesting wallet connection");
        connector.request_connection();
        self.wait = Some(id);
        true
    }

    /// Handles the session becoming ready.
    ///
    /// Announces the acquired authorization at most once per connection, and
    /// only if somebody was waiting for it.
    pub(crate) fn on_connected(
        &mut self,
        queue_pending: bool,
        sink: &dyn NotificationSink,
        auto_close: Duration,
    ) {
        let wait = self.wait.take();
        if self.announced || (wait.is_none() && !queue_pending) {
            return;
        }

        match wait {
            Some(id) => sink.update(
                &id,
                NotificationPatch::success(ACQUIRED_MESSAGE).auto_closing(auto_close),
            ),
            None => sink.show(
                Notification::success(NotificationId::authorization(), ACQUIRED_MESSAGE)
                    .auto_closing(auto_close),
            ),
        }
        self.announced = true;
    }

    pub(crate) fn on_disconnected(&mut self) {
        self.announced = false;
    }

    /// Handles a session error. If a prompt was outstanding, its notification
    /// turns into an error and `true` is returned so the caller clears the
    /// queue.
    pub(crate) fn on_session_error(&mut self, err: &str, sink: &dyn NotificationSink) -> bool {
        let Some(id) = self.wait.take() else {
            return false;
        };

        warn!(%id, %err, "wallet authorization failed");
        sink.update(&id, NotificationPatch::error(err));
        true
    }

    /// Drops the awaiting-connection state.
    pub(crate) fn reset(&mut self, sink: &dyn NotificationSink) {
        if let Some(id) = self.wait.take() {
            sink.dismiss(&id);
        }
    }
}
