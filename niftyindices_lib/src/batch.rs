//! Sequential fetch-and-store over a list of indices.

use std::time::Duration;

use chrono::NaiveDate;
use niftyindices_api::Client;

use crate::config::FetchConfig;
use crate::fetcher::IndexFetcher;
use crate::name_mapping::NameMapper;
use crate::shutdown::Shutdown;
use crate::store::Store;
use crate::summary::{IndexFailure, RunSummary};

/// One pass over an index list.
///
/// Indices are handled strictly one after another on a single session, with
/// a fixed pause between them. A failure is recorded against its index and
/// the run moves on; only cancellation stops it early.
pub struct Batch<'a> {
    client: &'a Client,
    fetcher: IndexFetcher<'a>,
    mapper: &'a NameMapper,
    store: &'a Store,
    start_date: NaiveDate,
    end_date: NaiveDate,
    throttle: Duration,
}

impl<'a> Batch<'a> {
    pub fn new(
        client: &'a Client,
        mapper: &'a NameMapper,
        store: &'a Store,
        config: &FetchConfig,
    ) -> Self {
        Self {
            client,
            fetcher: IndexFetcher::from_config(client, config),
            mapper,
            store,
            start_date: config.start_date,
            end_date: config.resolved_end_date(),
            throttle: config.throttle,
        }
    }

    /// Fetches and stores every index in `indices`, in order.
    ///
    /// If `shutdown` fires, the index in flight is abandoned, nothing further
    /// starts, and the returned summary is marked interrupted.
    pub async fn run(&self, indices: &[String], shutdown: &Shutdown) -> RunSummary {
        let total = indices.len();
        let mut summary = RunSummary::new(total);

        if !self.client.refresh_cookies().await {
            tracing::warn!("Could not obtain initial session cookies; continuing anyway");
        }

        for (pos, index_name) in indices.iter().enumerate() {
            if shutdown.is_cancelled() {
                summary.interrupted = true;
                break;
            }
            if pos > 0 && !self.throttle.is_zero() {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => {
                        summary.interrupted = true;
                        break;
                    }
                    _ = tokio::time::sleep(self.throttle) => {}
                }
            }

            tracing::info!("[{}/{}] Fetching: {}", pos + 1, total, index_name);
            let display_name = self.mapper.resolve(index_name);
            if display_name != index_name.as_str() {
                tracing::info!("  Using trading name: {}", display_name);
            }

            let fetched = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    summary.interrupted = true;
                    break;
                }
                result = self.fetcher.fetch_one(display_name, self.start_date, self.end_date) => result,
            };

            let failure = |reason: String, attempts: u32| IndexFailure {
                index_name: index_name.clone(),
                display_name: (display_name != index_name.as_str())
                    .then(|| display_name.to_string()),
                reason,
                attempts,
            };

            match fetched {
                Ok(history) => match self.store.save(index_name, &history) {
                    Ok(record) => summary.changes.push(record),
                    Err(e) => {
                        tracing::error!("  Failed to save {}: {}", index_name, e);
                        summary.failures.push(failure(e.to_string(), 0));
                    }
                },
                Err(e) => {
                    tracing::error!("  Failed to fetch {}: {}", index_name, e);
                    summary.failures.push(failure(e.to_string(), e.attempts()));
                }
            }
        }

        if summary.interrupted {
            tracing::warn!(
                "Processed {} of {} indices before interruption",
                summary.processed(),
                total
            );
        }
        summary
    }
}
