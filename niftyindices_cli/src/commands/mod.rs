//! CLI subcommand implementations.

pub mod fetch_all;
pub mod fetch_index;

use anyhow::Result;
use niftyindices_lib::{
    load_name_mapper, open_session, Batch, FetchConfig, RunSummary, Shutdown, Store,
};

/// Opens a session and runs one batch over `indices`.
///
/// Everything that can fail here is setup; per-index problems end up in the
/// returned summary instead.
pub async fn run_batch(
    config: &FetchConfig,
    indices: &[String],
    shutdown: &Shutdown,
) -> Result<RunSummary> {
    let mapper = load_name_mapper(&config.mapping_path)?;
    tracing::info!(
        "Loaded {} name mappings from {}",
        mapper.len(),
        config.mapping_path.display()
    );

    let client = open_session(config)?;
    let store = Store::new(&config.output_dir, config.separator);

    tracing::info!(
        "Fetching {} indices from {} to {}",
        indices.len(),
        config.start_date,
        config.resolved_end_date()
    );
    let batch = Batch::new(&client, &mapper, &store, config);
    Ok(batch.run(indices, shutdown).await)
}
