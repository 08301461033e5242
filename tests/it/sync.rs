use chaban_sync::{models::Config, pipeline::run_sync};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method, path, path_regex},
};

use crate::helper::{SEARCH_PATH, events_path, feed_client, google_calendar, record, search_page};

async fn mount_feed(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
            3,
            vec![
                record("2024-03-05", "Totale", "BELEM", "23:30", "00:15"),
                record("2024-03-06", "Totale", "MAINTENANCE", "21:00", "06:00"),
                record("2024-03-07", "Partielle", "BELEM", "12:00", "13:00"),
            ],
        )))
        .mount(server)
        .await;
}

async fn mount_existing(server: &MockServer, ids: &[&str]) {
    let items: Vec<_> = ids.iter().map(|id| json!({ "id": id })).collect();
    Mock::given(method("GET"))
        .and(path(events_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .mount(server)
        .await;
}

async fn mount_insert(server: &MockServer, summary: &str) {
    Mock::given(method("POST"))
        .and(path(events_path()))
        .and(body_partial_json(json!({ "summary": summary })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": summary })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_refresh_against_live_endpoints() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    mount_existing(&server, &["old-1", "old-2"]).await;

    Mock::given(method("DELETE"))
        .and(path_regex(r"/events/old-\d$"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    mount_insert(&server, "BELEM (ARRIVAL). Closure Totale").await;
    mount_insert(&server, "MAINTENANCE. Closure Totale").await;
    mount_insert(&server, "BELEM (DEPARTURE). Closure Partielle").await;

    let report = run_sync(
        &Config::default(),
        &feed_client(&server, 1000),
        &google_calendar(&server),
    )
    .await
    .unwrap();

    assert_eq!(report.records, 3);
    assert_eq!(report.deleted, 2);
    assert_eq!(report.published, 3);
    assert!(report.in_transit.is_empty());
}

#[tokio::test]
async fn test_buffered_refresh_publishes_after_clearing() {
    let server = MockServer::start().await;
    mount_feed(&server).await;
    mount_existing(&server, &[]).await;

    mount_insert(&server, "BELEM (ARRIVAL). Closure Totale").await;
    mount_insert(&server, "MAINTENANCE. Closure Totale").await;
    mount_insert(&server, "BELEM (DEPARTURE). Closure Partielle").await;

    let mut config = Config::default();
    config.sync.transform_before_clear = true;

    let report = run_sync(&config, &feed_client(&server, 1000), &google_calendar(&server))
        .await
        .unwrap();

    assert_eq!(report.deleted, 0);
    assert_eq!(report.published, 3);
}
