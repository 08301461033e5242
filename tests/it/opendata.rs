use chaban_sync::{error::AppError, models::fields, services::RecordSource};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

use crate::helper::{SEARCH_PATH, feed_client, record, search_page};

#[tokio::test]
async fn test_fetches_every_page_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("dataset", "previsions_pont_chaban"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
            3,
            vec![
                record("2024-03-05", "Totale", "BELEM", "08:00", "09:00"),
                record("2024-03-06", "Totale", "MAINTENANCE", "21:00", "06:00"),
            ],
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("start", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
            3,
            vec![record("2024-03-07", "Partielle", "BELEM", "12:00", "13:00")],
        )))
        .expect(1)
        .mount(&server)
        .await;

    let records = feed_client(&server, 2).fetch_records().await.unwrap();

    let dates: Vec<&str> = records
        .iter()
        .map(|r| r.fields[fields::DATE].as_str().unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-03-05", "2024-03-06", "2024-03-07"]);
}

#[tokio::test]
async fn test_short_page_ends_paging() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "records": [record("2024-03-05", "Totale", "BELEM", "08:00", "09:00")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = feed_client(&server, 1000).fetch_records().await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_error_status_is_a_feed_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = feed_client(&server, 1000).fetch_records().await.unwrap_err();
    assert!(matches!(err, AppError::Feed(_)));
}
