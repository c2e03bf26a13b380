use std::fmt;

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, TxHash},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use curate_tx_orchestrator::{TxSigner, WalletError};
use reqwest::Url;
use tracing::*;

/// [`TxSigner`] over an alloy provider with a local wallet attached.
#[derive(Clone)]
pub struct AlloyTxSigner {
    address: Address,
    provider: DynProvider,
}

impl AlloyTxSigner {
    pub fn new(signer: PrivateKeySigner, rpc_url: Url) -> Self {
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url)
            .erased();
        Self { address, provider }
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

impl fmt::Debug for AlloyTxSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlloyTxSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TxSigner for AlloyTxSigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, WalletError> {
        let pending = self
            .provider
            .send_transaction(tx.with_from(self.address))
            .await
            .map_err(|e| WalletError::provider(e.to_string()))?;

        let hash = *pending.tx_hash();
        debug!(%hash, from = %self.address, "transaction broadcast");
        Ok(hash)
    }
}
