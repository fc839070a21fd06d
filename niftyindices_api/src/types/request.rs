use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

/// Date format the backend expects, e.g. `01-Jan-1995`.
pub const DATE_FORMAT: &str = "%d-%b-%Y";

/// Formats a date the way the backend expects it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses either the backend format (`01-Jan-1995`) or ISO (`1995-01-01`).
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .ok()
}

/// Shape of the POST body.
///
/// The history endpoint has been observed accepting the parameters either as
/// a flat object or JSON-encoded inside a `cinfo` string field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestEnvelope {
    /// `{"name": .., "startDate": .., "endDate": ..}`
    #[default]
    Plain,
    /// `{"cinfo": "{\"name\": .., \"startDate\": .., \"endDate\": .., \"indexName\": ..}"}`
    Cinfo,
}

impl fmt::Display for RequestEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Cinfo => write!(f, "cinfo"),
        }
    }
}

impl FromStr for RequestEnvelope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "cinfo" => Ok(Self::Cinfo),
            other => Err(format!(
                "unknown request envelope '{}' (expected 'plain' or 'cinfo')",
                other
            )),
        }
    }
}

/// A request for one index's history over a closed date range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchRequest {
    /// Trading name the backend knows the index by.
    pub index_display_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryParams<'a> {
    name: &'a str,
    start_date: String,
    end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_name: Option<&'a str>,
}

impl FetchRequest {
    pub fn new(
        index_display_name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            index_display_name: index_display_name.into(),
            start_date,
            end_date,
        }
    }

    /// Builds the JSON body for the given envelope.
    pub fn to_body(&self, envelope: RequestEnvelope) -> Result<Value, serde_json::Error> {
        let name = self.index_display_name.as_str();
        match envelope {
            RequestEnvelope::Plain => serde_json::to_value(HistoryParams {
                name,
                start_date: format_date(self.start_date),
                end_date: format_date(self.end_date),
                index_name: None,
            }),
            RequestEnvelope::Cinfo => {
                let inner = serde_json::to_string(&HistoryParams {
                    name,
                    start_date: format_date(self.start_date),
                    end_date: format_date(self.end_date),
                    index_name: Some(name),
                })?;
                Ok(serde_json::json!({ "cinfo": inner }))
            }
        }
    }
}
