//! Per-chain settings: block explorers and confirmation polling.

use std::{collections::HashMap, time::Duration};

use alloy_primitives::{Address, TxHash};
use serde::{Deserialize, Serialize};

use crate::session::ChainId;

/// Settings for one supported chain.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainConfig {
    pub chain_id: ChainId,
    pub name: String,
    /// Base url of the block explorer, e.g. `https://etherscan.io`.
    pub explorer_url: String,
    /// Receipt poll interval in ms. Falls back to the orchestrator default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_ms: Option<u64>,
}

impl ChainConfig {
    pub fn new(chain_id: ChainId, name: impl Into<String>, explorer_url: impl Into<String>) -> Self {
        Self {
            chain_id,
            name: name.into(),
            explorer_url: explorer_url.into(),
            poll_interval_ms: None,
        }
    }

    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = Some(ms);
        self
    }

    pub fn mainnet() -> Self {
        Self::new(1, "Ethereum", "https://etherscan.io")
    }

    pub fn sepolia() -> Self {
        Self::new(11_155_111, "Sepolia", "https://sepolia.etherscan.io")
    }

    /// Gnosis has ~5s blocks, so receipts are polled more often.
    pub fn gnosis() -> Self {
        Self::new(100, "Gnosis", "https://gnosisscan.io").with_poll_interval_ms(1_000)
    }

    /// Chains known out of the box.
    pub fn builtin() -> Vec<Self> {
        vec![Self::mainnet(), Self::sepolia(), Self::gnosis()]
    }

    fn explorer_base(&self) -> &str {
        self.explorer_url.trim_end_matches('/')
    }
}

/// Lookup table over configured chains.
#[derive(Clone, Debug, Default)]
pub struct ChainRegistry {
    chains: HashMap<ChainId, ChainConfig>,
}

impl ChainRegistry {
    /// Builds the registry. Later entries win on duplicate ids.
    pub fn new(chains: impl IntoIterator<Item = ChainConfig>) -> Self {
        Self {
            chains: chains.into_iter().map(|c| (c.chain_id, c)).collect(),
        }
    }

    pub fn get(&self, chain_id: ChainId) -> Option<&ChainConfig> {
        self.chains.get(&chain_id)
    }

    /// Explorer page of a transaction.
    pub fn tx_url(&self, chain_id: ChainId, hash: &TxHash) -> Option<String> {
        self.get(chain_id)
            .map(|c| format!("{}/tx/{hash}", c.explorer_base()))
    }

    /// Explorer page of an address.
    pub fn address_url(&self, chain_id: ChainId, address: &Address) -> Option<String> {
        self.get(chain_id)
            .map(|c| format!("{}/address/{address}", c.explorer_base()))
    }

    /// Poll interval for `chain_id`, or `default` when the chain is unknown or
    /// has no override.
    pub fn poll_interval(&self, chain_id: Option<ChainId>, default: Duration) -> Duration {
        chain_id
            .and_then(|id| self.get(id))
            .and_then(|c| c.poll_interval_ms)
            .map(Duration::from_millis)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explorer_urls_use_chain_base() {
        let registry = ChainRegistry::new(ChainConfig::builtin());
        let hash = TxHash::repeat_byte(0x11);
        let addr = Address::repeat_byte(0x22);

        assert_eq!(
            registry.tx_url(1, &hash),
            Some(format!("https://etherscan.io/tx/{hash}"))
        );
        assert_eq!(
            registry.address_url(100, &addr),
            Some(format!("https://gnosisscan.io/address/{addr}"))
        );
        assert_eq!(registry.tx_url(42, &hash), None);
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let registry = ChainRegistry::new([ChainConfig::new(5, "Dev", "http://localhost:4000/")]);
        let hash = TxHash::ZERO;
        assert_eq!(
            registry.tx_url(5, &hash),
            Some(format!("http://localhost:4000/tx/{hash}"))
        );
    }

    #[test]
    fn test_poll_interval_falls_back_to_default() {
        let registry = ChainRegistry::new(ChainConfig::builtin());
        let default = Duration::from_secs(4);

        assert_eq!(registry.poll_interval(Some(100), default), Duration::from_secs(1));
        assert_eq!(registry.poll_interval(Some(1), default), default);
        assert_eq!(registry.poll_interval(Some(999), default), default);
        assert_eq!(registry.poll_interval(None, default), default);
    }
}
