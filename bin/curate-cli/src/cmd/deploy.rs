use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    rpc::types::TransactionRequest,
};
use argh::FromArgs;
use curate_tx_orchestrator::{CreationDecoder, NewGTCR, SubmitError, SubmittedTx};
use tracing::*;

use super::{print_json, session_signer};
use crate::host::Host;

/// Calls a list factory and reports the address of the deployed list
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "deploy")]
pub(crate) struct DeployArgs {
    #[argh(option, description = "factory contract address")]
    pub factory: Address,

    #[argh(option, description = "hex calldata of the factory call")]
    pub data: Bytes,

    #[argh(
        option,
        default = "0",
        description = "which creation event to report, for batched deployments"
    )]
    pub select: usize,
}

pub(crate) async fn deploy(args: DeployArgs, host: &Host) -> anyhow::Result<()> {
    let DeployArgs {
        factory,
        data,
        select,
    } = args;

    let result = host
        .run_transaction(move |session, mined_tx| async move {
            let signer = session_signer(&session)?;
            let tx = TransactionRequest::default()
                .with_to(factory)
                .with_input(data);

            let hash = signer.send_transaction(tx).await?;
            Ok::<_, SubmitError>(SubmittedTx::new(hash)
                .with_message("Deploying list")
                .with_deployment(CreationDecoder::new::<NewGTCR>(select))
                .on_mined(move |result| {
                    let _ = mined_tx.send(result);
                }))
        })
        .await?;

    if result.contract_address.is_none() {
        warn!(hash = %result.tx_hash, %select, "no deployed list found in receipt");
    }
    print_json(&result)
}
