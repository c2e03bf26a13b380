//! Test fakes for the orchestrator's collaborators.

use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use alloy_primitives::{Address, Log, TxHash};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_sol_types::SolEvent;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::{
    decode::NewGTCR,
    errors::{ChainReadError, WalletError},
    notify::{Notification, NotificationId, NotificationPatch, NotificationSink},
    traits::{ChainReader, TxReceipt, TxSigner},
};

/// Call recorded by [`RecordingSink`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SinkEvent {
    Show(Notification),
    Update(NotificationId, NotificationPatch),
    Dismiss(NotificationId),
}

/// Sink that records every call in order.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub(crate) fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().clone()
    }

    /// Calls addressed to `id`.
    pub(crate) fn events_for(&self, id: &NotificationId) -> Vec<SinkEvent> {
        self.events()
            .into_iter()
            .filter(|event| match event {
                SinkEvent::Show(n) => &n.id == id,
                SinkEvent::Update(target, _) | SinkEvent::Dismiss(target) => target == id,
            })
            .collect()
    }

    /// Messages of every shown notification, in order.
    pub(crate) fn shown_messages(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Show(n) => Some(n.message),
                _ => None,
            })
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn show(&self, notification: Notification) {
        self.events.lock().push(SinkEvent::Show(notification));
    }

    fn update(&self, id: &NotificationId, patch: NotificationPatch) {
        self.events
            .lock()
            .push(SinkEvent::Update(id.clone(), patch));
    }

    fn dismiss(&self, id: &NotificationId) {
        self.events.lock().push(SinkEvent::Dismiss(id.clone()));
    }
}

/// Signer that hands out sequential hashes without touching a chain.
#[derive(Debug)]
pub(crate) struct FakeSigner {
    address: Address,
    sent: Mutex<Vec<TransactionRequest>>,
}

impl FakeSigner {
    pub(crate) fn arc(address: Address) -> Arc<Self> {
        Arc::new(Self {
            address,
            sent: Mutex::default(),
        })
    }

    pub(crate) fn sent(&self) -> Vec<TransactionRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl TxSigner for FakeSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError> {
        let mut sent = self.sent.lock();
        sent.push(tx);
        Ok(TxHash::with_last_byte(sent.len() as u8))
    }
}

enum Gate {
    Held(oneshot::Receiver<Result<TxReceipt, ChainReadError>>),
    Ready(Result<TxReceipt, ChainReadError>),
}

/// Chain reader whose confirmations are released by the test.
///
/// Hashes without a gate confirm immediately in block 1 with no logs.
#[derive(Default)]
pub(crate) struct GatedChainReader {
    gates: Mutex<HashMap<TxHash, Gate>>,
    waits: Mutex<Vec<(TxHash, u64, Duration)>>,
    nonce: u64,
}

impl GatedChainReader {
    pub(crate) fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    /// Holds confirmation of `hash` until the returned sender fires.
    pub(crate) fn hold(&self, hash: TxHash) -> oneshot::Sender<Result<TxReceipt, ChainReadError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(hash, Gate::Held(rx));
        tx
    }

    /// Answers confirmation of `hash` with `result` right away.
    pub(crate) fn respond(&self, hash: TxHash, result: Result<TxReceipt, ChainReadError>) {
        self.gates.lock().insert(hash, Gate::Ready(result));
    }

    /// Every wait as `(hash, confirmations, poll_interval)`.
    pub(crate) fn waits(&self) -> Vec<(TxHash, u64, Duration)> {
        self.waits.lock().clone()
    }
}

impl fmt::Debug for GatedChainReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatedChainReader")
            .field("gates", &self.gates.lock().len())
            .field("waits", &self.waits.lock().len())
            .field("nonce", &self.nonce)
            .finish()
    }
}

#[async_trait]
impl ChainReader for GatedChainReader {
    async fn wait_for_transaction(
        &self,
        hash: TxHash,
        confirmations: u64,
        poll_interval: Duration,
    ) -> Result<TxReceipt, ChainReadError> {
        self.waits.lock().push((hash, confirmations, poll_interval));
        let gate = self.gates.lock().remove(&hash);
        match gate {
            Some(Gate::Held(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ChainReadError::rpc("gate dropped"))),
            Some(Gate::Ready(result)) => result,
            None => Ok(receipt(hash, true, Vec::new())),
        }
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64, ChainReadError> {
        Ok(self.nonce)
    }
}

pub(crate) fn receipt(hash: TxHash, success: bool, logs: Vec<Log>) -> TxReceipt {
    TxReceipt {
        tx_hash: hash,
        block_number: 1,
        success,
        logs,
    }
}

/// Log announcing `created` as emitted by a list factory at `emitter`.
pub(crate) fn creation_log(emitter: Address, created: Address) -> Log {
    Log {
        address: emitter,
        data: NewGTCR { _address: created }.encode_log_data(),
    }
}
