//! Diffs successive session snapshots into discrete events.

use alloy_primitives::Address;
use serde::Serialize;

use crate::session::{ChainId, Session};

/// A change between two session snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SessionEvent {
    /// The wallet collaborator reported a new error.
    Errored(String),

    /// The session stopped being ready.
    Disconnected,

    /// The wallet switched networks. Never emitted for the first chain seen.
    ChainChanged { from: ChainId, to: ChainId },

    /// The session became ready.
    Connected { account: Address },

    /// The ready session switched accounts.
    AccountChanged { from: Address, to: Address },
}

/// Remembers the previous session so each update yields only what changed.
#[derive(Debug, Default)]
pub(crate) struct SessionReactor {
    prev: Session,
    chain: Option<ChainId>,
}

impl SessionReactor {
    pub(crate) fn current(&self) -> &Session {
        &self.prev
    }

    /// Forgets the last reported error, so the next snapshot carrying an
    /// error reports it even if the text is unchanged.
    ///
    /// Called when a new connect prompt opens: the collaborator may clear its
    /// error and fail again with the same text before the worker sees the
    /// cleared snapshot.
    pub(crate) fn forget_error(&mut self) {
        self.prev.clear_error();
    }

    /// Records `next` and returns the events it implies, in handling order.
    pub(crate) fn observe(&mut self, next: Session) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let prev = &self.prev;

        if let Some(err) = next.error() {
            if prev.error() != Some(err) {
                events.push(SessionEvent::Errored(err.to_owned()));
            }
        }

        if prev.is_ready() && !next.is_ready() {
            events.push(SessionEvent::Disconnected);
        }

        // A chain going away keeps the last one known, so reconnecting to
        // the same network is not reported as a switch.
        if let Some(to) = next.chain_id() {
            match self.chain.replace(to) {
                Some(from) if from != to => events.push(SessionEvent::ChainChanged { from, to }),
                _ => {}
            }
        }

        match (prev.is_ready(), next.is_ready(), prev.account(), next.account()) {
            (false, true, _, Some(account)) => events.push(SessionEvent::Connected { account }),
            (true, true, Some(from), Some(to)) if from != to => {
                events.push(SessionEvent::AccountChanged { from, to })
            }
            _ => {}
        }

        self.prev = next;
        events
    }
}
