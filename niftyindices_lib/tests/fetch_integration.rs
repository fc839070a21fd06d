use std::time::Duration;

use chrono::NaiveDate;
use niftyindices_lib::{Client, FetchError, IndexFetcher, RequestEnvelope, RetryPolicy};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HISTORY_PATH: &str = "/Backpage.aspx/getTotalReturnIndexString";
const BOOTSTRAP_PATH: &str = "/reports/historical-data";

const ONE_RECORD: &str = r#"{"d":"[{\"INDEX_NAME\":\"NIFTY 50\",\"TotalReturnsIndex\":\"1000.00\",\"Date\":\"03 Nov 1995\"}]"}"#;
const EMPTY: &str = r#"{"d":"[]"}"#;

fn dates() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(1995, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
    )
}

async fn mount_bootstrap(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path(BOOTSTRAP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn always_empty_exhausts_after_ceiling() {
    let server = MockServer::start().await;
    mount_bootstrap(&server, 9).await;
    Mock::given(method("POST"))
        .and(path(HISTORY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY))
        .expect(10)
        .mount(&server)
        .await;

    let client = Client::with_base_url(&server.uri()).unwrap();
    let fetcher = IndexFetcher::new(
        &client,
        RetryPolicy::new(10, Duration::ZERO),
        RequestEnvelope::Plain,
    );
    let (start, end) = dates();

    let err = fetcher.fetch_one("NIFTY 50", start, end).await.unwrap_err();
    match err {
        FetchError::RetryExhausted {
            index,
            attempts,
            last,
        } => {
            assert_eq!(index, "NIFTY 50");
            assert_eq!(attempts, 10);
            assert!(matches!(*last, FetchError::SoftEmpty));
        }
        other => panic!("expected RetryExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_then_data_succeeds_on_second_attempt() {
    let server = MockServer::start().await;
    mount_bootstrap(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(HISTORY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(HISTORY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_RECORD))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::with_base_url(&server.uri()).unwrap();
    let fetcher = IndexFetcher::new(
        &client,
        RetryPolicy::new(3, Duration::ZERO),
        RequestEnvelope::Plain,
    );
    let (start, end) = dates();

    let history = fetcher.fetch_one("NIFTY 50", start, end).await.unwrap();
    assert_eq!(history.record_count, 1);
    assert_eq!(history.raw_payload, ONE_RECORD);
}

#[tokio::test]
async fn server_error_is_retried() {
    let server = MockServer::start().await;
    mount_bootstrap(&server, 1).await;
    Mock::given(method("POST"))
        .and(path(HISTORY_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(HISTORY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(ONE_RECORD))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::with_base_url(&server.uri()).unwrap();
    let fetcher = IndexFetcher::new(
        &client,
        RetryPolicy::new(3, Duration::ZERO),
        RequestEnvelope::Plain,
    );
    let (start, end) = dates();

    let history = fetcher.fetch_one("NIFTY 50", start, end).await.unwrap();
    assert_eq!(history.record_count, 1);
}

#[tokio::test]
async fn persistent_server_error_reports_last_status() {
    let server = MockServer::start().await;
    mount_bootstrap(&server, 2).await;
    Mock::given(method("POST"))
        .and(path(HISTORY_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = Client::with_base_url(&server.uri()).unwrap();
    let fetcher = IndexFetcher::new(
        &client,
        RetryPolicy::new(3, Duration::ZERO),
        RequestEnvelope::Plain,
    );
    let (start, end) = dates();

    let err = fetcher.fetch_one("NIFTY BANK", start, end).await.unwrap_err();
    match err {
        FetchError::RetryExhausted { last, .. } => match *last {
            FetchError::Upstream(msg) => assert!(msg.contains("503"), "{}", msg),
            other => panic!("expected Upstream, got {:?}", other),
        },
        other => panic!("expected RetryExhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn single_attempt_ceiling_never_refreshes() {
    let server = MockServer::start().await;
    mount_bootstrap(&server, 0).await;
    Mock::given(method("POST"))
        .and(path(HISTORY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::with_base_url(&server.uri()).unwrap();
    let fetcher = IndexFetcher::new(
        &client,
        RetryPolicy::new(1, Duration::ZERO),
        RequestEnvelope::Plain,
    );
    let (start, end) = dates();

    let err = fetcher.fetch_one("NIFTY 50", start, end).await.unwrap_err();
    assert!(matches!(
        err,
        FetchError::RetryExhausted { attempts: 1, .. }
    ));
}
