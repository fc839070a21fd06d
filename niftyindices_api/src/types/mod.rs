mod request;
pub use self::request::{format_date, parse_date, FetchRequest, RequestEnvelope, DATE_FORMAT};

mod response;
pub use self::response::{count_records, HistoryResponse, IndexHistory};
