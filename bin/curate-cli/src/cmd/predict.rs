use alloy::primitives::Address;
use argh::FromArgs;
use curate_tx_orchestrator::predict_create_address;
use serde::Serialize;

use super::print_json;
use crate::host::Host;

/// Predicts the address of a contract an account will create
#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand, name = "predict")]
pub(crate) struct PredictArgs {
    #[argh(option, description = "deploying account")]
    pub account: Address,

    #[argh(
        option,
        default = "0",
        description = "transactions to skip past the next one"
    )]
    pub offset: u64,
}

#[derive(Debug, Serialize)]
struct Prediction {
    account: Address,
    offset: u64,
    address: Address,
}

pub(crate) async fn predict(args: PredictArgs, host: &Host) -> anyhow::Result<()> {
    let address = predict_create_address(host.reader(), args.account, args.offset).await?;
    print_json(&Prediction {
        account: args.account,
        offset: args.offset,
        address,
    })
}
