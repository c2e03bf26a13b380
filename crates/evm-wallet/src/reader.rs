use std::{fmt, time::Duration};

use alloy::{
    primitives::{Address, TxHash},
    providers::{DynProvider, Provider},
};
use async_trait::async_trait;
use curate_tx_orchestrator::{ChainReadError, ChainReader, TxReceipt};
use tokio::time::{interval, MissedTickBehavior};
use tracing::*;

/// [`ChainReader`] polling a JSON-RPC endpoint.
///
/// Needs no signer, so confirmations keep being tracked across wallet
/// disconnects.
#[derive(Clone)]
pub struct RpcChainReader {
    provider: DynProvider,
}

impl RpcChainReader {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }
}

impl fmt::Debug for RpcChainReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcChainReader").finish_non_exhaustive()
    }
}

fn rpc_err(err: impl fmt::Display) -> ChainReadError {
    ChainReadError::rpc(err.to_string())
}

/// Whether a transaction mined at `mined` has `confirmations` confirmations
/// with the chain at `tip`. The block it landed in counts as the first.
fn is_confirmed(tip: u64, mined: u64, confirmations: u64) -> bool {
    tip.saturating_add(1) >= mined.saturating_add(confirmations)
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn wait_for_transaction(
        &self,
        hash: TxHash,
        confirmations: u64,
        poll_interval: Duration,
    ) -> Result<TxReceipt, ChainReadError> {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let receipt = self
                .provider
                .get_transaction_receipt(hash)
                .await
                .map_err(rpc_err)?;
            let Some(receipt) = receipt else {
                trace!(%hash, "no receipt yet");
                continue;
            };
            let Some(mined) = receipt.block_number else {
                trace!(%hash, "receipt without block");
                continue;
            };

            if confirmations > 1 {
                let tip = self.provider.get_block_number().await.map_err(rpc_err)?;
                if !is_confirmed(tip, mined, confirmations) {
                    trace!(%hash, %mined, %tip, "awaiting confirmations");
                    continue;
                }
            }

            let success = receipt.status();
            debug!(%hash, block = mined, %success, "transaction confirmed");
            return Ok(TxReceipt {
                tx_hash: hash,
                block_number: mined,
                success,
                logs: receipt
                    .inner
                    .logs()
                    .iter()
                    .map(|log| log.inner.clone())
                    .collect(),
            });
        }
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ChainReadError> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(rpc_err)
    }
}
