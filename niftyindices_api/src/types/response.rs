use serde::Deserialize;
use serde_json::Value;

/// Envelope returned by the ASP.NET page method. `d` is usually a
/// JSON-encoded string holding the series array, and `"[]"` when the
/// session was not accepted.
#[derive(Deserialize, Debug, Default)]
pub struct HistoryResponse {
    #[serde(default)]
    pub d: Option<Value>,
}

impl HistoryResponse {
    /// Number of data points carried in `d`.
    pub fn record_count(&self) -> usize {
        self.d.as_ref().map(count_records).unwrap_or(0)
    }
}

/// Counts the data points in a `d` field.
///
/// An array counts its elements. A string is decoded as JSON: an array counts
/// its elements and any other JSON value counts zero. A non-empty string that
/// is not JSON at all still carries something, so it counts one.
pub fn count_records(d: &Value) -> usize {
    match d {
        Value::Array(items) => items.len(),
        Value::String(encoded) => {
            let encoded = encoded.trim();
            if encoded.is_empty() || encoded == "[]" {
                return 0;
            }
            match serde_json::from_str::<Value>(encoded) {
                Ok(Value::Array(items)) => items.len(),
                Ok(_) => 0,
                Err(_) => 1,
            }
        }
        _ => 0,
    }
}

/// A fetched history payload: the body exactly as received plus its record count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexHistory {
    pub record_count: usize,
    pub raw_payload: String,
}

impl IndexHistory {
    /// Parses a response body, keeping the original text for storage.
    pub fn from_body(body: String) -> Result<Self, serde_json::Error> {
        let parsed: HistoryResponse = serde_json::from_str(&body)?;
        Ok(Self {
            record_count: parsed.record_count(),
            raw_payload: body,
        })
    }

    /// True for the soft-empty case: a valid response without data points.
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
