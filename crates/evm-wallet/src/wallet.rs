use std::sync::Arc;

use alloy::{providers::Provider, signers::local::PrivateKeySigner};
use async_trait::async_trait;
use curate_tx_orchestrator::{Session, WalletConnector, WalletError};
use tokio::sync::watch;
use tracing::*;

use crate::{config::WalletEnv, signer::AlloyTxSigner, PRIVATE_KEY_ENV};

/// Wallet collaborator signing with a local private key.
///
/// The key from the environment stands in for an already-authorized injected
/// provider; the key file stands in for the connect prompt.
#[derive(Clone, Debug)]
pub struct LocalWallet {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    env: WalletEnv,
    session_tx: watch::Sender<Session>,
}

impl LocalWallet {
    pub fn new(env: WalletEnv) -> Self {
        let (session_tx, _) = watch::channel(Session::disconnected());
        Self {
            inner: Arc::new(Inner { env, session_tx }),
        }
    }

    /// Session snapshots, starting with the current one.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.session_tx.subscribe()
    }

    pub fn session(&self) -> Session {
        self.inner.session_tx.borrow().clone()
    }

    /// Connects with `key` and publishes the resulting session.
    pub async fn connect_with_key(&self, key: &str) -> Result<Session, WalletError> {
        let signer: PrivateKeySigner = key
            .trim()
            .parse()
            .map_err(|e| WalletError::Unavailable(format!("invalid private key: {e}")))?;

        let signer = AlloyTxSigner::new(signer, self.inner.env.rpc_url().clone());
        let chain_id = signer
            .provider()
            .get_chain_id()
            .await
            .map_err(|e| WalletError::provider(e.to_string()))?;

        let session = Session::connected(Some(chain_id), Arc::new(signer));
        info!(account = ?session.account(), %chain_id, "wallet connected");
        self.inner.session_tx.send_replace(session.clone());
        Ok(session)
    }

    /// Drops the signer, keeping the last known chain.
    pub fn disconnect(&self) {
        self.inner.session_tx.send_modify(|session| {
            *session = Session::disconnected().with_chain_id(session.chain_id());
        });
    }

    async fn prompt_key(&self) -> Result<String, WalletError> {
        if let Some(key) = self.inner.env.injected_key() {
            return Ok(key.to_owned());
        }

        let Some(path) = self.inner.env.key_file() else {
            return Err(WalletError::Unavailable(format!(
                "no private key configured; set {PRIVATE_KEY_ENV} or wallet.key_file"
            )));
        };

        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| WalletError::Unavailable(format!("reading {}: {e}", path.display())))
    }

    async fn run_prompt(&self) -> Result<Session, WalletError> {
        let key = self.prompt_key().await?;
        self.connect_with_key(&key).await
    }

    /// Clears a stale error so a repeated failure is published as a change.
    fn clear_error(&self) {
        self.inner.session_tx.send_if_modified(|session| {
            if session.is_connected() || session.error().is_none() {
                return false;
            }
            *session = Session::disconnected().with_chain_id(session.chain_id());
            true
        });
    }

    fn publish_error(&self, err: &WalletError) {
        self.inner.session_tx.send_modify(|session| {
            *session = Session::disconnected()
                .with_chain_id(session.chain_id())
                .with_error(err.to_string());
        });
    }
}

#[async_trait]
impl WalletConnector for LocalWallet {
    fn request_connection(&self) {
        let wallet = self.clone();
        wallet.clear_error();
        tokio::spawn(async move {
            if let Err(err) = wallet.run_prompt().await {
                warn!(%err, "wallet connection failed");
                wallet.publish_error(&err);
            }
        });
    }

    fn has_injected_provider(&self) -> bool {
        self.inner.env.injected_key().is_some()
    }

    async fn auto_connect(&self) -> Result<bool, WalletError> {
        let Some(key) = self.inner.env.injected_key() else {
            return Ok(false);
        };
        self.connect_with_key(key).await?;
        Ok(true)
    }
}
