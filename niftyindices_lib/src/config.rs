//! Run settings: built-in defaults, overridden by `NIFTYINDICES_*`
//! environment variables, then by command-line flags in the binary.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use niftyindices_api::{RequestEnvelope, DEFAULT_BASE_URL};

use crate::error::ConfigError;
use crate::retry::RetryPolicy;

pub const DEFAULT_INDEX_LIST: &str = "index list.json";
pub const DEFAULT_MAPPING: &str = "index mapping.json";
pub const DEFAULT_OUTPUT_DIR: &str = "index data";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_MS: u64 = 2000;
pub const DEFAULT_THROTTLE_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SEPARATOR: char = '-';

/// Earliest date the backend publishes total-return history for.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1995, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Everything a fetch run needs to know.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub base_url: String,
    pub index_list_path: PathBuf,
    pub mapping_path: PathBuf,
    pub output_dir: PathBuf,
    pub start_date: NaiveDate,
    /// `None` means "today", resolved when the run starts.
    pub end_date: Option<NaiveDate>,
    /// Total attempts per index, including the first.
    pub max_attempts: u32,
    /// Pause after a cookie refresh, before the next attempt.
    pub backoff: Duration,
    /// Pause between consecutive indices.
    pub throttle: Duration,
    pub request_timeout: Duration,
    /// Replaces `/` in index names when building file names.
    pub separator: char,
    pub envelope: RequestEnvelope,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            index_list_path: PathBuf::from(DEFAULT_INDEX_LIST),
            mapping_path: PathBuf::from(DEFAULT_MAPPING),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            start_date: default_start_date(),
            end_date: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_BACKOFF_MS),
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            separator: DEFAULT_SEPARATOR,
            envelope: RequestEnvelope::default(),
        }
    }
}

impl FetchConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// `NIFTYINDICES_*` key. Unparseable values fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            base_url: lookup("NIFTYINDICES_BASE_URL")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.base_url),
            output_dir: lookup("NIFTYINDICES_OUTPUT_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            max_attempts: parse_or(&lookup, "NIFTYINDICES_RETRY_MAX", DEFAULT_MAX_ATTEMPTS),
            backoff: Duration::from_millis(parse_or(
                &lookup,
                "NIFTYINDICES_RETRY_BACKOFF_MS",
                DEFAULT_BACKOFF_MS,
            )),
            throttle: Duration::from_millis(parse_or(
                &lookup,
                "NIFTYINDICES_THROTTLE_MS",
                DEFAULT_THROTTLE_MS,
            )),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "NIFTYINDICES_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            ..defaults
        }
    }

    /// Last day requested; today's local date unless pinned.
    pub fn resolved_end_date(&self) -> NaiveDate {
        self.end_date.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.backoff)
    }

    /// Rejects settings no run could succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "max attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if matches!(self.separator, '/' | '\\' | '\0') {
            return Err(ConfigError::Invalid {
                name: "separator",
                reason: format!("{:?} cannot appear in a file name", self.separator),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                name: "request timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        let end = self.resolved_end_date();
        if self.start_date > end {
            return Err(ConfigError::Invalid {
                name: "date range",
                reason: format!("start {} is after end {}", self.start_date, end),
            });
        }
        match url::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => {
                return Err(ConfigError::Invalid {
                    name: "base URL",
                    reason: format!("unsupported scheme '{}'", url.scheme()),
                })
            }
            Err(e) => {
                return Err(ConfigError::Invalid {
                    name: "base URL",
                    reason: format!("{}: {}", self.base_url, e),
                })
            }
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|val| val.trim().parse::<T>().ok())
        .unwrap_or(default)
}
