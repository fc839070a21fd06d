//! The `all` subcommand: fetch every index in the index list.

use anyhow::Result;
use niftyindices_lib::{load_index_list, FetchConfig, RunSummary, Shutdown};

pub async fn run(config: &FetchConfig, shutdown: &Shutdown) -> Result<RunSummary> {
    let indices = load_index_list(&config.index_list_path)?;
    tracing::info!(
        "Loaded {} indices from {}",
        indices.len(),
        config.index_list_path.display()
    );
    super::run_batch(config, &indices, shutdown).await
}
