use std::sync::Arc;

use chaban_sync::{
    models::{CalendarConfig, FeedConfig},
    services::{GoogleCalendar, OpenDataClient, StaticToken},
};
use reqwest::Client;
use serde_json::{Value, json};
use wiremock::MockServer;

pub const CALENDAR_ID: &str = "bridge@group.calendar.google.com";
pub const TOKEN: &str = "test-token";
pub const SEARCH_PATH: &str = "/api/records/1.0/search/";

pub fn events_path() -> String {
    format!("/calendars/{CALENDAR_ID}/events")
}

pub fn feed_client(server: &MockServer, rows: usize) -> OpenDataClient {
    let config = FeedConfig {
        url: format!("{}{}", server.uri(), SEARCH_PATH),
        rows,
        ..FeedConfig::default()
    };
    OpenDataClient::new(Client::new(), config)
}

pub fn calendar_config(server: &MockServer) -> CalendarConfig {
    CalendarConfig {
        api_base: server.uri(),
        calendar_id: CALENDAR_ID.to_string(),
        ..CalendarConfig::default()
    }
}

pub fn google_calendar(server: &MockServer) -> GoogleCalendar {
    GoogleCalendar::new(
        Client::new(),
        &calendar_config(server),
        Arc::new(StaticToken::new(TOKEN)),
    )
    .unwrap()
}

pub fn record(date: &str, kind: &str, reason: &str, start: &str, end: &str) -> Value {
    json!({
        "datasetid": "previsions_pont_chaban",
        "recordid": format!("{date}-{start}"),
        "fields": {
            "date_passage": date,
            "type_de_fermeture": kind,
            "bateau": reason,
            "fermeture_a_la_circulation": start,
            "re_ouverture_a_la_circulation": end,
        }
    })
}

pub fn search_page(nhits: usize, records: Vec<Value>) -> Value {
    json!({ "nhits": nhits, "records": records })
}
