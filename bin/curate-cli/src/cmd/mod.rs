pub(crate) mod deploy;
pub(crate) mod predict;
pub(crate) mod send;

use std::sync::Arc;

use curate_tx_orchestrator::{Session, TxSigner, WalletError};
use serde::Serialize;

fn session_signer(session: &Session) -> Result<Arc<dyn TxSigner>, WalletError> {
    session.signer().cloned().ok_or(WalletError::NotConnected)
}

/// Prints `value` as pretty JSON on stdout.
fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
