//! Library layer for the Nifty index fetcher: name mapping, retrying fetches,
//! per-index file storage, and batch orchestration.
//!
//! Wraps the `niftyindices_api` session with a retry policy that refreshes
//! cookies between attempts, then persists each series and reports how its
//! record count changed since the previous run.

pub mod batch;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod name_mapping;
pub mod retry;
pub mod shutdown;
pub mod store;
pub mod summary;

pub use niftyindices_api;
pub use niftyindices_api::{Client, FetchRequest, IndexHistory, RequestEnvelope};

pub use batch::Batch;
pub use config::FetchConfig;
pub use error::{ConfigError, FetchError, NiftyError, StoreError};
pub use fetcher::{open_session, IndexFetcher};
pub use name_mapping::{load_index_list, load_name_mapper, IndexDescriptor, NameMapper};
pub use retry::RetryPolicy;
pub use shutdown::Shutdown;
pub use store::{sanitize_file_name, ChangeRecord, Store};
pub use summary::{DeltaGroup, IndexFailure, RunOutcome, RunSummary, SummaryReport};
