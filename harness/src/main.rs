use app_core::config::Config;
use app_core::types::HarnessResult;
use std::path::PathBuf;

use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

use crate::args::HarnessCommand;
use crate::flow::{Flow, Layer};

/// # Main Entry Point
///
/// Initializes logging, loads the configuration named by the invoked
/// command, and drives the requested part of the counter flow.
#[tokio::main(flavor = "current_thread")]
async fn main() -> HarnessResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cmd = HarnessCommand::from_args();
    match cmd {
        HarnessCommand::Run { config } => flow(config).await?.run().await?,
        HarnessCommand::Initialize { config } => flow(config).await?.initialize().await?,
        HarnessCommand::Increase {
            config,
            amount,
            ephemeral,
        } => {
            let layer = if ephemeral { Layer::Ephem } else { Layer::Chain };
            flow(config).await?.increase(layer, amount).await?
        }
        HarnessCommand::Delegate { config } => flow(config).await?.delegate().await?,
        HarnessCommand::Commit { config } => flow(config).await?.commit().await?,
        HarnessCommand::Undelegate { config } => flow(config).await?.undelegate().await?,
        HarnessCommand::Status { config } => flow(config).await?.status().await?,
    }
    Ok(())
}

async fn flow(config: PathBuf) -> HarnessResult<Flow> {
    Flow::new(Config::from_path(config)?).await
}

mod args;
mod blockhash;
mod client;
mod extractor;
mod flow;
mod http;
mod identity;
mod payload;
