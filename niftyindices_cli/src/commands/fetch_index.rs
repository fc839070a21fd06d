//! The `index` subcommand: fetch one index by name.

use anyhow::{bail, Result};
use clap::Args;
use niftyindices_lib::{FetchConfig, RunSummary, Shutdown};

/// Arguments for the `index` subcommand.
#[derive(Args)]
pub struct IndexArgs {
    /// Internal index name, as it appears in the index list
    pub name: String,
}

pub async fn run(args: &IndexArgs, config: &FetchConfig, shutdown: &Shutdown) -> Result<RunSummary> {
    let name = args.name.trim();
    if name.is_empty() {
        bail!("index name must not be blank");
    }
    super::run_batch(config, &[name.to_string()], shutdown).await
}
