use chaban_sync::{
    error::AppError,
    models::{EventDateTime, EventDescriptor},
    services::CalendarBackend,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{bearer_token, body_json, method, path, query_param, query_param_is_missing},
};

use crate::helper::{TOKEN, events_path, google_calendar};

fn closure_event() -> EventDescriptor {
    EventDescriptor {
        summary: "BELEM (ARRIVAL). Closure Totale".to_string(),
        start: EventDateTime::local("2024-03-05", "23:30"),
        end: EventDateTime::local("2024-03-6", "00:15"),
    }
}

#[tokio::test]
async fn test_list_follows_page_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(events_path()))
        .and(bearer_token(TOKEN))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "a", "summary": "first" }],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(events_path()))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "b" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = google_calendar(&server).list_events().await.unwrap();

    let ids: Vec<&str> = events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(events[0].summary.as_deref(), Some("first"));
    assert_eq!(events[1].summary, None);
}

#[tokio::test]
async fn test_insert_posts_event_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(events_path()))
        .and(bearer_token(TOKEN))
        .and(body_json(json!({
            "summary": "BELEM (ARRIVAL). Closure Totale",
            "start": { "dateTime": "2024-03-05T23:30:00", "timeZone": "Europe/Paris" },
            "end": { "dateTime": "2024-03-6T00:15:00", "timeZone": "Europe/Paris" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "evt-1",
            "summary": "BELEM (ARRIVAL). Closure Totale",
            "status": "confirmed"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let published = google_calendar(&server)
        .insert_event(&closure_event())
        .await
        .unwrap();
    assert_eq!(published.id, "evt-1");
}

#[tokio::test]
async fn test_delete_of_missing_event_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/gone", events_path())))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("{}/live", events_path())))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let calendar = google_calendar(&server);
    calendar.delete_event("gone").await.unwrap();
    calendar.delete_event("live").await.unwrap();
}

#[tokio::test]
async fn test_rejected_insert_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(events_path()))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let err = google_calendar(&server)
        .insert_event(&closure_event())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Calendar { status: 403, .. }));
}
