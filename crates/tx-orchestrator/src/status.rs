use serde::Serialize;

use crate::{
    queue::DrainState,
    tracker::{TrackerPhase, TxRecord},
};

/// Snapshot of the orchestrator published on its status channel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrchestratorStatus {
    /// Actions waiting in the queue.
    pub queued: usize,
    pub drain_state: DrainState,
    pub phase: TrackerPhase,
    /// A connect prompt is outstanding.
    pub awaiting_connection: bool,
    /// Transaction being serviced, or the last one settled.
    pub current: Option<TxRecord>,
    /// Transactions that reached a terminal state, mined or failed.
    pub settled: u64,
    pub last_error: Option<String>,
}
