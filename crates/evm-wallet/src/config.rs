use std::{fmt, path::PathBuf};

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use curate_tx_orchestrator::WalletError;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Environment variable holding a private key for silent reconnects.
pub const PRIVATE_KEY_ENV: &str = "CURATE_PRIVATE_KEY";

/// `[wallet]` section of the host config.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct WalletConfig {
    /// JSON-RPC endpoint used for signing and chain reads.
    pub rpc_url: String,

    /// File holding a hex private key, read when a connection is requested.
    #[serde(default)]
    pub key_file: Option<PathBuf>,
}

/// Resolved wallet settings, built once at startup and shared by reference.
#[derive(Clone)]
pub struct WalletEnv {
    rpc_url: Url,
    key_file: Option<PathBuf>,
    injected_key: Option<String>,
}

impl WalletEnv {
    /// `injected_key` is the key available without prompting, usually from
    /// [`PRIVATE_KEY_ENV`].
    pub fn new(config: &WalletConfig, injected_key: Option<String>) -> Result<Self, WalletError> {
        let rpc_url = config
            .rpc_url
            .parse()
            .map_err(|e| WalletError::Unavailable(format!("invalid rpc url '{}': {e}", config.rpc_url)))?;

        Ok(Self {
            rpc_url,
            key_file: config.key_file.clone(),
            injected_key: injected_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn rpc_url(&self) -> &Url {
        &self.rpc_url
    }

    pub fn key_file(&self) -> Option<&PathBuf> {
        self.key_file.as_ref()
    }

    pub(crate) fn injected_key(&self) -> Option<&str> {
        self.injected_key.as_deref()
    }

    /// Provider without a wallet, for chain reads.
    pub fn read_provider(&self) -> DynProvider {
        ProviderBuilder::new()
            .connect_http(self.rpc_url.clone())
            .erased()
    }
}

impl fmt::Debug for WalletEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletEnv")
            .field("rpc_url", &self.rpc_url.as_str())
            .field("key_file", &self.key_file)
            .field("has_injected_key", &self.injected_key.is_some())
            .finish()
    }
}
