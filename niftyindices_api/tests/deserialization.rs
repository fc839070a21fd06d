use niftyindices_api::{HistoryResponse, IndexHistory};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_history_encoded_string() {
    let json = load_fixture("history.json");
    let resp: HistoryResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.record_count(), 3);

    let encoded = resp.d.as_ref().and_then(|d| d.as_str()).unwrap();
    let rows: Vec<serde_json::Value> = serde_json::from_str(encoded).unwrap();
    assert_eq!(rows[0]["INDEX_NAME"], "NIFTY 50");
    assert_eq!(rows[2]["TotalReturnsIndex"], "998.57");
}

#[test]
fn deserialize_history_empty_sentinel() {
    let json = load_fixture("history_empty.json");
    let history = IndexHistory::from_body(json).unwrap();
    assert_eq!(history.record_count, 0);
    assert!(history.is_empty());
}

#[test]
fn deserialize_history_literal_array() {
    let json = load_fixture("history_array.json");
    let history = IndexHistory::from_body(json.clone()).unwrap();
    assert_eq!(history.record_count, 2);
    assert_eq!(history.raw_payload, json);
}
