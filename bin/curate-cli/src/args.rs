use std::{env, fmt, path::PathBuf};

use argh::FromArgs;
use curate_evm_wallet::PRIVATE_KEY_ENV;

use crate::cmd::{deploy::DeployArgs, predict::PredictArgs, send::SendArgs};

/// Configs overridable by environment. Mostly for sensitive data.
#[derive(Clone)]
pub(crate) struct EnvArgs {
    /// Directory for file-based logging
    pub log_dir: Option<PathBuf>,
    /// Service label to include in service name
    pub service_label: Option<String>,
    /// Key used to connect without prompting
    pub private_key: Option<String>,
}

impl EnvArgs {
    pub(crate) fn from_env() -> Self {
        Self {
            log_dir: env::var_os("CURATE_LOG_DIR").map(PathBuf::from),
            service_label: env::var("CURATE_SVC_LABEL").ok(),
            private_key: env::var(PRIVATE_KEY_ENV).ok(),
        }
    }
}

impl fmt::Debug for EnvArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvArgs")
            .field("log_dir", &self.log_dir)
            .field("service_label", &self.service_label)
            .field("has_private_key", &self.private_key.is_some())
            .finish()
    }
}

/// Submits Curate list transactions from the command line.
#[derive(FromArgs, PartialEq, Debug)]
pub(crate) struct TopLevel {
    #[argh(
        option,
        short = 'c',
        default = "PathBuf::from(\"curate.toml\")",
        description = "path to the config file"
    )]
    pub config: PathBuf,

    #[argh(subcommand)]
    pub cmd: Commands,
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
pub(crate) enum Commands {
    Send(SendArgs),
    Deploy(DeployArgs),
    Predict(PredictArgs),
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, U256};

    use super::*;

    fn parse(args: &[&str]) -> Result<TopLevel, argh::EarlyExit> {
        TopLevel::from_args(&["curate-cli"], args)
    }

    #[test]
    fn test_parse_send() {
        let top = parse(&[
            "-c",
            "/etc/curate.toml",
            "send",
            "--to",
            "0x00000000000000000000000000000000000000aa",
            "--value",
            "1000",
        ])
        .expect("valid args");

        assert_eq!(top.config, PathBuf::from("/etc/curate.toml"));
        let Commands::Send(send) = top.cmd else {
            panic!("expected send");
        };
        assert_eq!(
            send.to,
            address!("00000000000000000000000000000000000000aa")
        );
        assert_eq!(send.value, U256::from(1000));
        assert!(send.data.is_none());
    }

    #[test]
    fn test_parse_deploy_defaults() {
        let top = parse(&[
            "deploy",
            "--factory",
            "0x00000000000000000000000000000000000000fa",
            "--data",
            "0x1234",
        ])
        .expect("valid args");

        assert_eq!(top.config, PathBuf::from("curate.toml"));
        let Commands::Deploy(deploy) = top.cmd else {
            panic!("expected deploy");
        };
        assert_eq!(deploy.select, 0);
        assert_eq!(deploy.data.as_ref(), &[0x12, 0x34]);
    }

    #[test]
    fn test_rejects_bad_address() {
        assert!(parse(&["predict", "--account", "nope"]).is_err());
    }
}
