use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes, U256},
    rpc::types::TransactionRequest,
};
use argh::FromArgs;
use curate_tx_orchestrator::{SubmitError, SubmittedTx};

use super::{print_json, session_signer};
use crate::host::Host;

/// Sends a plain transaction and waits for it to be mined
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "send")]
pub(crate) struct SendArgs {
    #[argh(option, description = "recipient address")]
    pub to: Address,

    #[argh(option, default = "U256::ZERO", description = "value in wei")]
    pub value: U256,

    #[argh(option, description = "hex calldata")]
    pub data: Option<Bytes>,
}

pub(crate) async fn send(args: SendArgs, host: &Host) -> anyhow::Result<()> {
    let SendArgs { to, value, data } = args;

    let result = host
        .run_transaction(move |session, mined_tx| async move {
            let signer = session_signer(&session)?;
            let mut tx = TransactionRequest::default().with_to(to).with_value(value);
            if let Some(data) = data {
                tx = tx.with_input(data);
            }

            let hash = signer.send_transaction(tx).await?;
            Ok::<_, SubmitError>(SubmittedTx::new(hash)
                .with_message("Transaction submitted")
                .on_mined(move |result| {
                    let _ = mined_tx.send(result);
                }))
        })
        .await?;

    print_json(&result)
}
