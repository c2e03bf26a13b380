//! Wires the wallet, chain reader and orchestrator for a single cli run.

use std::{future::Future, sync::Arc};

use anyhow::{anyhow, bail};
use curate_evm_wallet::{LocalWallet, RpcChainReader, WalletEnv};
use curate_tx_orchestrator::{
    MinedResult, OrchestratorBuilder, OrchestratorHandle, OrchestratorStatus, Session,
    SubmitError, SubmittedTx,
};
use tokio::{signal, sync::oneshot};
use tracing::*;

use crate::config::Config;

#[derive(Debug)]
pub(crate) struct Host {
    wallet: LocalWallet,
    reader: Arc<RpcChainReader>,
    handle: OrchestratorHandle,
}

/// Whether the run is over: the transaction settled, or the connect prompt
/// failed and took the queue with it.
fn run_finished(status: &OrchestratorStatus) -> bool {
    status.settled > 0 || (status.queued == 0 && status.last_error.is_some())
}

impl Host {
    /// Must be called from within a tokio runtime.
    pub(crate) fn start(config: &Config, private_key: Option<String>) -> anyhow::Result<Self> {
        let env = WalletEnv::new(&config.wallet, private_key)?;
        let reader = Arc::new(RpcChainReader::new(env.read_provider()));
        let wallet = LocalWallet::new(env);

        let handle = OrchestratorBuilder::new(config.orchestrator.clone())
            .with_connector(Arc::new(wallet.clone()))
            .with_chain_reader(reader.clone())
            .with_session(wallet.subscribe())
            .launch()?;

        Ok(Self {
            wallet,
            reader,
            handle,
        })
    }

    pub(crate) fn reader(&self) -> &RpcChainReader {
        &self.reader
    }

    /// Queues `payload`, connects the wallet and waits for the transaction
    /// to be mined.
    ///
    /// `payload` gets a sender for the mined result, to hand to
    /// [`SubmittedTx::on_mined`].
    pub(crate) async fn run_transaction<F, Fut>(&self, payload: F) -> anyhow::Result<MinedResult>
    where
        F: FnOnce(Session, oneshot::Sender<MinedResult>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<SubmittedTx, SubmitError>> + Send + 'static,
    {
        let (mined_tx, mut mined_rx) = oneshot::channel();
        let mut status_rx = self.handle.status_watcher();

        self.handle
            .enqueue_transaction(move |session| payload(session, mined_tx))?;
        self.handle.request_auth()?;

        let status = tokio::select! {
            res = status_rx.wait_for(run_finished) => res?.clone(),
            _ = signal::ctrl_c() => {
                warn!("interrupted, dropping queued actions");
                self.handle.cancel()?;
                bail!("interrupted");
            }
        };

        // `on_mined` runs before the transaction counts as settled.
        match mined_rx.try_recv() {
            Ok(result) => {
                info!(hash = %result.tx_hash, block = result.block_number, "transaction mined");
                Ok(result)
            }
            Err(_) => Err(anyhow!(status
                .last_error
                .unwrap_or_else(|| "transaction failed".to_string()))),
        }
    }

    pub(crate) fn shutdown(self) {
        self.wallet.disconnect();
        debug!(status = ?self.handle.status(), "host shut down");
    }
}

#[cfg(test)]
mod tests {
    use curate_tx_orchestrator::{DrainState, TrackerPhase};

    use super::*;

    #[test]
    fn test_run_finished() {
        let mut status = OrchestratorStatus {
            queued: 1,
            ..Default::default()
        };
        assert!(!run_finished(&status));

        // Prompt rejected: queue cleared with an error.
        status.queued = 0;
        status.last_error = Some("no private key configured".to_string());
        assert!(run_finished(&status));

        let status = OrchestratorStatus {
            drain_state: DrainState::Idle,
            phase: TrackerPhase::Mined,
            settled: 1,
            ..Default::default()
        };
        assert!(run_finished(&status));
    }
}
