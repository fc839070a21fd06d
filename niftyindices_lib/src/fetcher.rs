//! Retrying history fetches for a single index.

use chrono::NaiveDate;
use niftyindices_api::{Client, FetchRequest, IndexHistory, RequestEnvelope};

use crate::config::FetchConfig;
use crate::error::{FetchError, NiftyError};
use crate::retry::RetryPolicy;

/// Opens a session against the configured base URL. Settings are validated
/// first so a bad configuration fails before any request is made.
pub fn open_session(config: &FetchConfig) -> Result<Client, NiftyError> {
    config.validate()?;
    Ok(Client::with_options(&config.base_url, config.request_timeout)?)
}

/// Fetches one index's history through a shared session.
///
/// An empty series is treated like an error: the session cookies are
/// refreshed and the request is retried under the [`RetryPolicy`].
pub struct IndexFetcher<'a> {
    client: &'a Client,
    policy: RetryPolicy,
    envelope: RequestEnvelope,
}

impl<'a> IndexFetcher<'a> {
    pub fn new(client: &'a Client, policy: RetryPolicy, envelope: RequestEnvelope) -> Self {
        Self {
            client,
            policy,
            envelope,
        }
    }

    pub fn from_config(client: &'a Client, config: &FetchConfig) -> Self {
        Self::new(client, config.retry_policy(), config.envelope)
    }

    /// One request, classified: transport and status failures, malformed
    /// bodies, and empty series all come back as `Err`.
    pub async fn fetch_once(&self, request: &FetchRequest) -> Result<IndexHistory, FetchError> {
        let history = self
            .client
            .get_index_history(request, self.envelope)
            .await?;
        if history.is_empty() {
            return Err(FetchError::SoftEmpty);
        }
        Ok(history)
    }

    /// Fetches `display_name` over `[start_date, end_date]`, retrying until
    /// a non-empty series arrives or the attempt budget runs out.
    pub async fn fetch_one(
        &self,
        display_name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<IndexHistory, FetchError> {
        let request = FetchRequest::new(display_name, start_date, end_date);
        let request = &request;
        let client = self.client;

        self.policy
            .run(
                display_name,
                move || self.fetch_once(request),
                move || async move {
                    if !client.refresh_cookies().await {
                        tracing::warn!("  Could not refresh session cookies");
                    }
                },
            )
            .await
    }
}
