//! Lifecycle of a single transaction, from signature request to settlement.

use std::{fmt, sync::Arc, time::Duration};

use alloy_primitives::{Address, TxHash};
use serde::Serialize;
use tokio::sync::watch;
use tracing::*;

use crate::{
    action::{MinedResult, TransactionFn},
    chains::ChainRegistry,
    config::OrchestratorConfig,
    errors::TxError,
    notify::{Notification, NotificationId, NotificationPatch, NotificationSink},
    session::Session,
    status::OrchestratorStatus,
    traits::ChainReader,
};

const REQUESTING_MESSAGE: &str = "Requesting Signature";
const SUBMITTED_MESSAGE: &str = "Transaction submitted";
const MINED_MESSAGE: &str = "Transaction mined";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum TrackerPhase {
    #[default]
    Idle,
    Submitting,
    AwaitingConfirmation,
    Mined,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TxStatus {
    Pending,
    Mined,
    Failed,
}

/// A submitted transaction as last observed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TxRecord {
    pub hash: TxHash,
    pub status: TxStatus,
    pub contract_address: Option<Address>,
}

impl TxRecord {
    fn new(hash: TxHash, status: TxStatus) -> Self {
        Self {
            hash,
            status,
            contract_address: None,
        }
    }
}

/// Everything the tracker needs besides the action itself.
pub(crate) struct TrackerCtx {
    pub(crate) reader: Arc<dyn ChainReader>,
    pub(crate) sink: Arc<dyn NotificationSink>,
    pub(crate) chains: ChainRegistry,
    pub(crate) confirmations: u64,
    pub(crate) default_poll_interval: Duration,
    pub(crate) success_auto_close: Duration,
    pub(crate) status_tx: Arc<watch::Sender<OrchestratorStatus>>,
}

impl TrackerCtx {
    pub(crate) fn new(
        config: &OrchestratorConfig,
        reader: Arc<dyn ChainReader>,
        sink: Arc<dyn NotificationSink>,
        status_tx: Arc<watch::Sender<OrchestratorStatus>>,
    ) -> Self {
        Self {
            reader,
            sink,
            chains: config.chain_registry(),
            confirmations: config.confirmations,
            default_poll_interval: config.default_poll_interval(),
            success_auto_close: config.success_auto_close(),
            status_tx,
        }
    }

    fn publish(&self, phase: TrackerPhase, current: Option<TxRecord>) {
        self.status_tx.send_modify(|status| {
            status.phase = phase;
            status.current = current;
        });
    }

    fn fail(
        &self,
        id: &NotificationId,
        err: TxError,
        link: Option<String>,
    ) -> Result<TxRecord, TxError> {
        warn!(%err, "transaction failed");
        self.sink
            .update(id, NotificationPatch::error(err.to_string()).with_link(link));
        let record = err.tx_hash().map(|hash| TxRecord::new(hash, TxStatus::Failed));
        self.publish(TrackerPhase::Failed, record);
        Err(err)
    }
}

impl fmt::Debug for TrackerCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerCtx")
            .field("chains", &self.chains)
            .field("confirmations", &self.confirmations)
            .field("default_poll_interval", &self.default_poll_interval)
            .field("success_auto_close", &self.success_auto_close)
            .finish_non_exhaustive()
    }
}

/// Drives one transaction to a terminal state, reporting every step under a
/// single notification id.
///
/// The payload is invoked exactly once. Confirmation goes through the chain
/// reader only, so it keeps going if the wallet disconnects meanwhile.
pub(crate) async fn track_transaction(
    ctx: Arc<TrackerCtx>,
    session: Session,
    payload: TransactionFn,
) -> Result<TxRecord, TxError> {
    let id = NotificationId::transaction();
    let span = info_span!("track_tx", %id, chain_id = ?session.chain_id());
    run_tracker(&ctx, &id, session, payload).instrument(span).await
}

async fn run_tracker(
    ctx: &TrackerCtx,
    id: &NotificationId,
    session: Session,
    payload: TransactionFn,
) -> Result<TxRecord, TxError> {
    let chain_id = session.chain_id();

    ctx.publish(TrackerPhase::Submitting, None);
    ctx.sink
        .show(Notification::info(id.clone(), REQUESTING_MESSAGE));

    let submitted = match payload(session).await {
        Ok(submitted) => submitted,
        Err(err) => return ctx.fail(id, err.into(), None),
    };

    let (hash, message, on_mined, deployment) = submitted.into_parts();
    let link = chain_id.and_then(|chain_id| ctx.chains.tx_url(chain_id, &hash));
    info!(%hash, is_deployment = deployment.is_some(), "transaction submitted");

    ctx.sink.update(
        id,
        NotificationPatch::info(message.unwrap_or_else(|| SUBMITTED_MESSAGE.to_owned()))
            .with_link(link.clone()),
    );
    ctx.publish(
        TrackerPhase::AwaitingConfirmation,
        Some(TxRecord::new(hash, TxStatus::Pending)),
    );

    let poll_interval = ctx.chains.poll_interval(chain_id, ctx.default_poll_interval);
    let receipt = match ctx
        .reader
        .wait_for_transaction(hash, ctx.confirmations, poll_interval)
        .await
    {
        Ok(receipt) if receipt.success => receipt,
        Ok(_) => return ctx.fail(id, TxError::Reverted { hash }, link),
        Err(source) => {
            return ctx.fail(id, TxError::ConfirmationFailed { hash, source }, link);
        }
    };

    let contract_address = deployment.and_then(|decoder| {
        let found = decoder.decode(&receipt.logs);
        if found.is_none() {
            warn!(
                %hash,
                event = decoder.signature(),
                select_index = decoder.select_index(),
                logs = receipt.logs.len(),
                "no creation event at the selected index"
            );
        }
        found
    });

    info!(%hash, block = receipt.block_number, ?contract_address, "transaction mined");
    ctx.sink.update(
        id,
        NotificationPatch::success(MINED_MESSAGE).auto_closing(ctx.success_auto_close),
    );

    let record = TxRecord {
        hash,
        status: TxStatus::Mined,
        contract_address,
    };
    ctx.publish(TrackerPhase::Mined, Some(record.clone()));

    if let Some(on_mined) = on_mined {
        on_mined(MinedResult {
            tx_hash: hash,
            block_number: receipt.block_number,
            contract_address,
        });
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use futures::future;
    use parking_lot::Mutex;

    use super::*;
    use crate::{
        action::{transaction_fn, SubmittedTx},
        chains::ChainConfig,
        decode::{CreationDecoder, NewGTCR},
        errors::{ChainReadError, SubmitError},
        notify::NotificationLevel,
        test_utils::{
            creation_log, receipt, FakeSigner, GatedChainReader, RecordingSink, SinkEvent,
        },
    };

    const FACTORY: Address = address!("fafafafafafafafafafafafafafafafafafafafa");

    struct Fixture {
        ctx: Arc<TrackerCtx>,
        sink: Arc<RecordingSink>,
        reader: Arc<GatedChainReader>,
        status_rx: watch::Receiver<OrchestratorStatus>,
    }

    fn fixture() -> Fixture {
        let sink = Arc::new(RecordingSink::default());
        let reader = Arc::new(GatedChainReader::default());
        let (status_tx, status_rx) = watch::channel(OrchestratorStatus::default());
        let ctx = TrackerCtx::new(
            &OrchestratorConfig::default(),
            reader.clone(),
            sink.clone(),
            Arc::new(status_tx),
        );
        Fixture {
            ctx: Arc::new(ctx),
            sink,
            reader,
            status_rx,
        }
    }

    fn session(chain_id: u64) -> Session {
        Session::connected(Some(chain_id), FakeSigner::arc(Address::repeat_byte(0xaa)))
    }

    fn submit_with(submitted: impl FnOnce() -> SubmittedTx + Send + 'static) -> TransactionFn {
        transaction_fn(move |_session| future::ready(Ok(submitted())))
    }

    type MinedLog = Arc<Mutex<Vec<MinedResult>>>;

    fn mined_log() -> MinedLog {
        Arc::default()
    }

    #[tokio::test]
    async fn test_mined_transaction_reuses_one_notification() {
        let fx = fixture();
        let hash = TxHash::repeat_byte(0x01);
        let mined = mined_log();
        let sink_mined = mined.clone();

        let payload = submit_with(move || {
            SubmittedTx::new(hash)
                .with_message("Submitting item")
                .on_mined(move |result| sink_mined.lock().push(result))
        });
        let record = track_transaction(fx.ctx.clone(), session(1), payload)
            .await
            .expect("transaction mined");

        assert_eq!(record.status, TxStatus::Mined);
        assert_eq!(record.contract_address, None);

        let events = fx.sink.events();
        assert_eq!(events.len(), 3);
        let SinkEvent::Show(first) = &events[0] else {
            panic!("expected show, got {:?}", events[0]);
        };
        assert_eq!(first.level, NotificationLevel::Info);
        assert_eq!(first.message, REQUESTING_MESSAGE);
        assert_eq!(first.auto_close, None);

        let SinkEvent::Update(id, submitted) = &events[1] else {
            panic!("expected update, got {:?}", events[1]);
        };
        assert_eq!(id, &first.id);
        assert_eq!(submitted.level, Some(NotificationLevel::Info));
        assert_eq!(submitted.message.as_deref(), Some("Submitting item"));
        assert_eq!(
            submitted.link,
            Some(format!("https://etherscan.io/tx/{hash}"))
        );
        assert_eq!(submitted.auto_close, None);

        let SinkEvent::Update(id, done) = &events[2] else {
            panic!("expected update, got {:?}", events[2]);
        };
        assert_eq!(id, &first.id);
        assert_eq!(done.level, Some(NotificationLevel::Success));
        assert_eq!(done.auto_close, Some(Duration::from_secs(5)));

        assert_eq!(
            *mined.lock(),
            vec![MinedResult {
                tx_hash: hash,
                block_number: 1,
                contract_address: None,
            }]
        );
        assert_eq!(fx.reader.waits(), vec![(hash, 1, Duration::from_secs(4))]);

        let status = fx.status_rx.borrow().clone();
        assert_eq!(status.phase, TrackerPhase::Mined);
        assert_eq!(status.current, Some(record));
    }

    #[tokio::test]
    async fn test_rejected_signature_fails_without_waiting() {
        let fx = fixture();
        let payload = transaction_fn(|_session| {
            future::ready(Err(SubmitError::UserRejected("user denied".to_owned())))
        });

        let err = track_transaction(fx.ctx.clone(), session(1), payload)
            .await
            .expect_err("rejected");

        assert!(matches!(err, TxError::UserRejected(_)));
        assert!(fx.reader.waits().is_empty());

        let events = fx.sink.events();
        assert_eq!(events.len(), 2);
        let SinkEvent::Update(_, patch) = &events[1] else {
            panic!("expected update, got {:?}", events[1]);
        };
        assert_eq!(patch.level, Some(NotificationLevel::Error));
        assert!(patch
            .message
            .as_deref()
            .is_some_and(|m| m.contains("user denied")));
        assert_eq!(patch.link, None);
        assert_eq!(fx.status_rx.borrow().phase, TrackerPhase::Failed);
    }

    #[tokio::test]
    async fn test_revert_fails_with_link_and_skips_on_mined() {
        let fx = fixture();
        let hash = TxHash::repeat_byte(0x02);
        fx.reader.respond(hash, Ok(receipt(hash, false, vec![])));
        let mined = mined_log();
        let sink_mined = mined.clone();

        let payload = submit_with(move || {
            SubmittedTx::new(hash).on_mined(move |result| sink_mined.lock().push(result))
        });
        let err = track_transaction(fx.ctx.clone(), session(1), payload)
            .await
            .expect_err("reverted");

        assert!(matches!(err, TxError::Reverted { hash: h } if h == hash));
        assert!(mined.lock().is_empty());

        let events = fx.sink.events();
        let SinkEvent::Update(_, patch) = events.last().expect("events") else {
            panic!("expected update");
        };
        assert_eq!(patch.level, Some(NotificationLevel::Error));
        assert_eq!(patch.link, Some(format!("https://etherscan.io/tx/{hash}")));

        let status = fx.status_rx.borrow().clone();
        assert_eq!(status.phase, TrackerPhase::Failed);
        assert_eq!(
            status.current.map(|r| r.status),
            Some(TxStatus::Failed)
        );
    }

    #[tokio::test]
    async fn test_provider_failure_is_confirmation_failed() {
        let fx = fixture();
        let hash = TxHash::repeat_byte(0x03);
        fx.reader
            .respond(hash, Err(ChainReadError::rpc("connection reset")));

        let err = track_transaction(fx.ctx.clone(), session(1), submit_with(move || {
            SubmittedTx::new(hash)
        }))
        .await
        .expect_err("provider failure");

        assert!(matches!(err, TxError::ConfirmationFailed { .. }));
        assert_eq!(err.tx_hash(), Some(hash));
    }

    #[tokio::test]
    async fn test_deployment_decodes_selected_index() {
        let fx = fixture();
        let hash = TxHash::repeat_byte(0x04);
        let arbitrator = Address::repeat_byte(0x10);
        let parent = Address::repeat_byte(0x20);
        fx.reader.respond(
            hash,
            Ok(receipt(
                hash,
                true,
                vec![creation_log(FACTORY, arbitrator), creation_log(FACTORY, parent)],
            )),
        );
        let mined = mined_log();
        let sink_mined = mined.clone();

        let payload = submit_with(move || {
            SubmittedTx::new(hash)
                .with_deployment(CreationDecoder::new::<NewGTCR>(1))
                .on_mined(move |result| sink_mined.lock().push(result))
        });
        let record = track_transaction(fx.ctx.clone(), session(1), payload)
            .await
            .expect("deployed");

        assert_eq!(record.contract_address, Some(parent));
        let mined = mined.lock();
        assert_eq!(mined.len(), 1);
        assert_eq!(mined[0].contract_address, Some(parent));
    }

    #[tokio::test]
    async fn test_deployment_without_event_still_calls_on_mined() {
        let fx = fixture();
        let hash = TxHash::repeat_byte(0x05);
        let mined = mined_log();
        let sink_mined = mined.clone();

        let payload = submit_with(move || {
            SubmittedTx::new(hash)
                .with_deployment(CreationDecoder::first::<NewGTCR>())
                .on_mined(move |result| sink_mined.lock().push(result))
        });
        let record = track_transaction(fx.ctx.clone(), session(1), payload)
            .await
            .expect("mined");

        assert_eq!(record.contract_address, None);
        let mined = mined.lock();
        assert_eq!(mined.len(), 1);
        assert_eq!(mined[0].contract_address, None);
    }

    #[tokio::test]
    async fn test_chain_poll_interval_and_unknown_chain_link() {
        let fx = fixture();
        let hash = TxHash::repeat_byte(0x06);

        track_transaction(
            fx.ctx.clone(),
            session(ChainConfig::gnosis().chain_id),
            submit_with(move || SubmittedTx::new(hash)),
        )
        .await
        .expect("mined");
        assert_eq!(fx.reader.waits()[0].2, Duration::from_millis(1_000));

        let other = TxHash::repeat_byte(0x07);
        track_transaction(fx.ctx.clone(), session(31_337), submit_with(move || {
            SubmittedTx::new(other)
        }))
        .await
        .expect("mined");

        let events = fx.sink.events();
        let SinkEvent::Update(_, patch) = &events[4] else {
            panic!("expected update, got {:?}", events[4]);
        };
        assert_eq!(patch.link, None);
        assert_eq!(fx.reader.waits()[1].2, Duration::from_secs(4));
    }
}
