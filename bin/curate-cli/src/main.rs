//! Curate cli
//!
//! Submits list transactions through the wallet orchestrator: connects a
//! local key, waits for each write to be mined and prints the result.

mod args;
mod cmd;
mod config;
mod host;

use args::{Commands, EnvArgs, TopLevel};
use cmd::{deploy::deploy, predict::predict, send::send};
use config::Config;
use curate_common::logging::{self, LoggingInitConfig};
use host::Host;
use tracing::*;

const SERVICE_NAME: &str = "curate-cli";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let top: TopLevel = argh::from_env();
    if let Err(e) = main_inner(top).await {
        eprintln!("FATAL ERROR: {e:#}");

        return Err(e);
    }

    Ok(())
}

async fn main_inner(top: TopLevel) -> anyhow::Result<()> {
    let TopLevel { config, cmd } = top;

    let env_args = EnvArgs::from_env();
    let mut config = Config::load(&config)?;
    config.apply_env(&env_args);

    // Init the logging before we do anything else.
    init_logging(&config)?;
    debug!(?env_args, "loaded environment");

    let host = Host::start(&config, env_args.private_key)?;
    let result = match cmd {
        Commands::Send(args) => send(args, &host).await,
        Commands::Deploy(args) => deploy(args, &host).await,
        Commands::Predict(args) => predict(args, &host).await,
    };
    host.shutdown();

    result
}

fn init_logging(config: &Config) -> anyhow::Result<()> {
    let logging = &config.logging;
    logging::init_logging_from_config(LoggingInitConfig {
        service_base_name: SERVICE_NAME,
        service_label: logging.service_label.as_deref(),
        log_dir: logging.log_dir.as_deref(),
        log_file_prefix: logging.log_file_prefix.as_deref(),
        json_format: logging.json_format,
        directives: &logging.directives,
    })?;
    Ok(())
}
