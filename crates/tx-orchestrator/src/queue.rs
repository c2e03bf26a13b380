//! Pending action stack and its single-flight drain policy.

use serde::Serialize;
use tracing::*;

use crate::action::{ActionKind, QueuedAction, TransactionFn};

/// Whether a transaction is currently handed to the tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum DrainState {
    #[default]
    Idle,
    Servicing,
}

/// Result of a drain pass.
pub(crate) enum DrainOutcome {
    /// Nothing left that can run.
    Drained,

    /// A transaction is in flight; queued transactions wait for it.
    Busy,

    /// Work is queued but there is no ready session.
    Blocked,

    /// This transaction must be handed to the tracker now.
    Dispatch(TransactionFn),
}

/// LIFO stack of pending actions, owned by the orchestrator worker.
///
/// The most recently queued transaction is serviced first, so older
/// transactions can starve while newer ones keep arriving.
#[derive(Debug, Default)]
pub(crate) struct ActionQueue {
    stack: Vec<QueuedAction>,
    state: DrainState,
}

impl ActionQueue {
    pub(crate) fn push(&mut self, action: QueuedAction) {
        trace!(kind = ?action.kind(), depth = self.stack.len() + 1, "action queued");
        self.stack.push(action);
    }

    pub(crate) fn len(&self) -> usize {
        self.stack.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub(crate) fn state(&self) -> DrainState {
        self.state
    }

    /// Drops every queued action. An in-flight transaction is unaffected.
    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.stack.len();
        self.stack.clear();
        dropped
    }

    /// Marks the in-flight transaction as settled.
    pub(crate) fn release(&mut self) {
        self.state = DrainState::Idle;
    }

    /// Runs what can run and releases at most one transaction.
    ///
    /// With a ready session every queued authorization is invoked, most
    /// recent first, before any transaction is handed out, so callbacks
    /// queued ahead of a transaction always precede its submission.
    pub(crate) fn drain(&mut self, session_ready: bool) -> DrainOutcome {
        if self.stack.is_empty() {
            return self.idle_outcome();
        }

        if !session_ready {
            return DrainOutcome::Blocked;
        }

        self.run_authorizations();

        if self.state == DrainState::Servicing {
            return DrainOutcome::Busy;
        }

        match self.stack.pop() {
            Some(QueuedAction::Transaction(payload)) => {
                self.state = DrainState::Servicing;
                DrainOutcome::Dispatch(payload)
            }
            Some(QueuedAction::Authorization(callback)) => {
                // Unreachable after `run_authorizations`, run it anyway.
                callback();
                DrainOutcome::Drained
            }
            None => DrainOutcome::Drained,
        }
    }

    fn idle_outcome(&self) -> DrainOutcome {
        match self.state {
            DrainState::Idle => DrainOutcome::Drained,
            DrainState::Servicing => DrainOutcome::Busy,
        }
    }

    fn run_authorizations(&mut self) {
        let mut idx = self.stack.len();
        while idx > 0 {
            idx -= 1;
            if self.stack[idx].kind() != ActionKind::Authorization {
                continue;
            }
            if let QueuedAction::Authorization(callback) = self.stack.remove(idx) {
                callback();
            }
        }
    }
}
