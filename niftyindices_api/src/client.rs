//! HTTP session for the niftyindices.com backend.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, ORIGIN, REFERER};
use url::Url;

use crate::{
    types::{FetchRequest, IndexHistory, RequestEnvelope},
    user_agent::get_user_agent,
    Error,
};

/// Production site root.
pub const DEFAULT_BASE_URL: &str = "https://www.niftyindices.com";

/// Per-request timeout used unless the caller picks another.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Page visited to obtain the anti-bot cookies.
const BOOTSTRAP_PATH: &str = "/reports/historical-data";

/// ASP.NET page method returning total-return index history.
const HISTORY_PATH: &str = "/Backpage.aspx/getTotalReturnIndexString";

/// A browser-like session against the niftyindices.com backend.
///
/// One `reqwest::Client` with a cookie jar is kept for the lifetime of the
/// session. [`Client::refresh_cookies`] revisits the historical-data page so
/// the jar picks up fresh bot-protection cookies, which every later request
/// then carries automatically.
pub struct Client {
    /// Base URL for the site. Defaults to `https://www.niftyindices.com`.
    base_api_url: String,
    http: reqwest::Client,
}

impl Client {
    /// Creates a session pointing at the production site.
    pub fn new() -> Result<Self, Error> {
        Self::with_options(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Creates a session with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::with_options(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a session with a custom base URL and per-request timeout.
    pub fn with_options(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Network(e)
            })?;
        Ok(Self {
            base_api_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL this session talks to.
    pub fn base_url(&self) -> &str {
        &self.base_api_url
    }

    fn get_url(&self, path: &str) -> Result<Url, Error> {
        Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl(e.to_string())
        })
    }

    fn referer(&self) -> String {
        format!("{}{}", self.base_api_url, BOOTSTRAP_PATH)
    }

    /// Visits the bootstrap page so the cookie jar receives fresh cookies.
    ///
    /// Returns `false` on a non-success status or network error. A failed
    /// refresh is not fatal; the caller retries whatever it was doing.
    pub async fn refresh_cookies(&self) -> bool {
        let url = match self.get_url(BOOTSTRAP_PATH) {
            Ok(url) => url,
            Err(_) => return false,
        };
        tracing::debug!("Refreshing session cookies from {}", url);

        let resp = self
            .http
            .get(url)
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .header(ACCEPT_LANGUAGE, "en-GB,en-US;q=0.9,en;q=0.8")
            .header("upgrade-insecure-requests", "1")
            .header("cache-control", "no-cache")
            .header("pragma", "no-cache")
            .send()
            .await;

        match resp {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!("Session cookies refreshed");
                true
            }
            Ok(resp) => {
                tracing::warn!("Cookie refresh failed with status {}", resp.status());
                false
            }
            Err(e) => {
                tracing::warn!("Cookie refresh failed: {}", e);
                false
            }
        }
    }

    /// Fetches the total-return history for one index.
    ///
    /// A 2xx response with an empty series is returned as `Ok` with
    /// `record_count == 0`; deciding whether that is a failure is up to the caller.
    pub async fn get_index_history(
        &self,
        request: &FetchRequest,
        envelope: RequestEnvelope,
    ) -> Result<IndexHistory, Error> {
        let url = self.get_url(HISTORY_PATH)?;
        let payload = serde_json::to_vec(&request.to_body(envelope)?)?;

        let resp = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .header(ACCEPT, "application/json, text/javascript, */*; q=0.01")
            .header(ACCEPT_LANGUAGE, "en-GB,en-US;q=0.9,en;q=0.8")
            .header(ORIGIN, self.base_api_url.as_str())
            .header(REFERER, self.referer())
            .header("x-requested-with", "XMLHttpRequest")
            .header("sec-fetch-dest", "empty")
            .header("sec-fetch-mode", "cors")
            .header("sec-fetch-site", "same-origin")
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("Failed to fetch {}: {}", request.index_display_name, e);
                Error::Network(e)
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::debug!("Failed to read response body: {}", e);
            Error::Network(e)
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::debug!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        IndexHistory::from_body(body).map_err(|e| {
            tracing::debug!("Failed to parse history response: {}", e);
            Error::MalformedBody(e.to_string())
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "₹".repeat(1000);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert!(out.len() < body.len());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = Client::with_base_url("http://localhost:1234/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:1234");
        assert_eq!(
            client.get_url(HISTORY_PATH).unwrap().as_str(),
            "http://localhost:1234/Backpage.aspx/getTotalReturnIndexString"
        );
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let client = Client::with_base_url("not a url").unwrap();
        assert!(matches!(
            client.get_url(HISTORY_PATH),
            Err(Error::InvalidUrl(_))
        ));
    }
}
