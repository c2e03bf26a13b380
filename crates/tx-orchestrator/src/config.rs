//! Orchestrator configuration.

use std::{collections::HashSet, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    chains::{ChainConfig, ChainRegistry},
    errors::ConfigError,
};

const DEFAULT_CONFIRMATIONS: u64 = 1;
const DEFAULT_POLL_INTERVAL_MS: u64 = 4_000;
const DEFAULT_SUCCESS_AUTO_CLOSE_MS: u64 = 5_000;
const DEFAULT_NETWORK_NOTICE_AUTO_CLOSE_MS: u64 = 5_000;

/// Settings for the orchestrator, built once at startup and shared by
/// reference.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    /// Confirmations to wait for before a transaction counts as mined.
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,

    /// Receipt poll interval in ms for chains without an override.
    #[serde(default = "default_poll_interval_ms")]
    pub default_poll_interval_ms: u64,

    /// Delay before a success notification closes itself, in ms.
    #[serde(default = "default_success_auto_close_ms")]
    pub success_auto_close_ms: u64,

    /// Delay before a "Network Changed" notice closes itself, in ms.
    #[serde(default = "default_network_notice_auto_close_ms")]
    pub network_notice_auto_close_ms: u64,

    #[serde(default = "ChainConfig::builtin")]
    pub chains: Vec<ChainConfig>,
}

fn default_confirmations() -> u64 {
    DEFAULT_CONFIRMATIONS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_success_auto_close_ms() -> u64 {
    DEFAULT_SUCCESS_AUTO_CLOSE_MS
}

fn default_network_notice_auto_close_ms() -> u64 {
    DEFAULT_NETWORK_NOTICE_AUTO_CLOSE_MS
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            confirmations: DEFAULT_CONFIRMATIONS,
            default_poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            success_auto_close_ms: DEFAULT_SUCCESS_AUTO_CLOSE_MS,
            network_notice_auto_close_ms: DEFAULT_NETWORK_NOTICE_AUTO_CLOSE_MS,
            chains: ChainConfig::builtin(),
        }
    }
}

impl OrchestratorConfig {
    pub fn default_poll_interval(&self) -> Duration {
        Duration::from_millis(self.default_poll_interval_ms)
    }

    pub fn success_auto_close(&self) -> Duration {
        Duration::from_millis(self.success_auto_close_ms)
    }

    pub fn network_notice_auto_close(&self) -> Duration {
        Duration::from_millis(self.network_notice_auto_close_ms)
    }

    pub fn chain_registry(&self) -> ChainRegistry {
        ChainRegistry::new(self.chains.iter().cloned())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmations == 0 {
            return Err(ConfigError::ZeroConfirmations);
        }

        if self.default_poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }

        let mut seen = HashSet::new();
        for chain in &self.chains {
            if !seen.insert(chain.chain_id) {
                return Err(ConfigError::DuplicateChain(chain.chain_id));
            }
            if chain.explorer_url.trim().is_empty() {
                return Err(ConfigError::EmptyExplorerUrl(chain.chain_id));
            }
            if chain.poll_interval_ms == Some(0) {
                return Err(ConfigError::ZeroPollInterval);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: OrchestratorConfig = toml::from_str("").expect("parse empty config");
        assert_eq!(config, OrchestratorConfig::default());
        assert_eq!(config.success_auto_close(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_chains_override_builtin_list() {
        let raw = r#"
            confirmations = 2

            [[chains]]
            chain_id = 100
            name = "Gnosis"
            explorer_url = "https://gnosis.blockscout.com"
            poll_interval_ms = 500
        "#;
        let config: OrchestratorConfig = toml::from_str(raw).expect("parse config");

        assert_eq!(config.confirmations, 2);
        assert_eq!(config.chains.len(), 1);
        let registry = config.chain_registry();
        assert_eq!(
            registry.poll_interval(Some(100), config.default_poll_interval()),
            Duration::from_millis(500)
        );
        assert!(registry.get(1).is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = OrchestratorConfig {
            confirmations: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroConfirmations)
        ));

        config.confirmations = 1;
        config.chains.push(ChainConfig::mainnet());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateChain(1))
        ));

        config.chains = vec![ChainConfig::new(7, "Blank", " ")];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyExplorerUrl(7))
        ));
    }
}
