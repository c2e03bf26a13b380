use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use curate_evm_wallet::WalletConfig;
use curate_tx_orchestrator::OrchestratorConfig;
use serde::Deserialize;

use crate::args::EnvArgs;

/// Logging configuration for the cli.
#[derive(Debug, Clone, Deserialize, Default)]
pub(crate) struct LoggingConfig {
    /// Service label to append to the service name (e.g., "prod", "dev").
    pub service_label: Option<String>,

    /// Directory path for file-based logging.
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names (defaults to "curate-cli" if not set).
    pub log_file_prefix: Option<String>,

    /// Use JSON format for logs instead of compact format.
    pub json_format: Option<bool>,

    /// Extra filter directives, e.g. `curate_tx_orchestrator=debug`.
    #[serde(default)]
    pub directives: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Config {
    pub wallet: WalletConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Logging configuration (optional).
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub(crate) fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw).context("parsing config")?;
        config.orchestrator.validate()?;
        Ok(config)
    }

    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&raw)
    }

    /// Environment values win over the file.
    pub(crate) fn apply_env(&mut self, env: &EnvArgs) {
        if let Some(dir) = &env.log_dir {
            self.logging.log_dir = Some(dir.clone());
        }
        if let Some(label) = &env.service_label {
            self.logging.service_label = Some(label.clone());
        }
    }
}
