mod client;
mod errors;
pub mod types;
pub mod user_agent;
pub use self::client::{Client, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use self::errors::Error;
pub use self::types::{
    count_records, format_date, parse_date, FetchRequest, HistoryResponse, IndexHistory,
    RequestEnvelope, DATE_FORMAT,
};
