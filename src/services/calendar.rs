//! Google Calendar API client.
//!
//! Only the three calls a full refresh needs: list, delete and insert on one
//! calendar.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CalendarConfig, EventDescriptor, PublishedEvent};
use crate::services::{CalendarBackend, TokenProvider};
use crate::utils::http::ensure_success;
use crate::utils::truncate;

/// Page size requested from `events.list`.
const LIST_PAGE_SIZE: &str = "250";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<PublishedEvent>,
    next_page_token: Option<String>,
}

/// Client bound to a single calendar.
pub struct GoogleCalendar {
    client: Client,
    api_base: Url,
    calendar_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl GoogleCalendar {
    pub fn new(
        client: Client,
        config: &CalendarConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        let api_base = Url::parse(&config.api_base)?;
        if api_base.cannot_be_a_base() {
            return Err(AppError::config(format!(
                "calendar.api_base cannot be used as a base URL: {}",
                config.api_base
            )));
        }

        Ok(Self {
            client,
            api_base,
            calendar_id: config.calendar_id.clone(),
            tokens,
        })
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// `{api_base}/calendars/{calendar_id}/events[/{event_id}]`
    fn events_url(&self, event_id: Option<&str>) -> Result<Url> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| AppError::config("calendar.api_base cannot be a base URL"))?;
            segments
                .pop_if_empty()
                .extend(["calendars", self.calendar_id.as_str(), "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response> {
        ensure_success(response)
            .await
            .map_err(|(status, body)| AppError::calendar(status.as_u16(), truncate(&body, 300)))
    }
}

#[async_trait]
impl CalendarBackend for GoogleCalendar {
    async fn list_events(&self) -> Result<Vec<PublishedEvent>> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.events_url(None)?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("maxResults", LIST_PAGE_SIZE);
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let access_token = self.tokens.access_token().await?;
            let response = self.client.get(url).bearer_auth(access_token).send().await?;
            let page: EventsPage = Self::check(response).await?.json().await?;
            events.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        log::debug!("Calendar {} holds {} event(s)", self.calendar_id, events.len());
        Ok(events)
    }

    async fn delete_event(&self, event_id: &str) -> Result<()> {
        let url = self.events_url(Some(event_id))?;
        let access_token = self.tokens.access_token().await?;
        let response = self
            .client
            .delete(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            log::warn!("Event {} was already deleted", event_id);
            return Ok(());
        }
        Self::check(response).await?;
        Ok(())
    }

    async fn insert_event(&self, event: &EventDescriptor) -> Result<PublishedEvent> {
        let url = self.events_url(None)?;
        let access_token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await?;

        let published: PublishedEvent = Self::check(response).await?.json().await?;
        log::info!("Published {} ({})", event.summary, published.id);
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StaticToken;

    fn calendar(api_base: &str, calendar_id: &str) -> GoogleCalendar {
        let config = CalendarConfig {
            api_base: api_base.to_string(),
            calendar_id: calendar_id.to_string(),
            ..CalendarConfig::default()
        };
        GoogleCalendar::new(Client::new(), &config, Arc::new(StaticToken::new("t"))).unwrap()
    }

    #[test]
    fn test_events_url_under_api_base() {
        let cal = calendar(
            "https://www.googleapis.com/calendar/v3",
            "bridge@group.calendar.google.com",
        );
        assert_eq!(
            cal.events_url(None).unwrap().as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/bridge@group.calendar.google.com/events"
        );
    }

    #[test]
    fn test_events_url_with_trailing_slash_and_event() {
        let cal = calendar("http://localhost:8080/", "primary");
        assert_eq!(
            cal.events_url(Some("evt 1")).unwrap().as_str(),
            "http://localhost:8080/calendars/primary/events/evt%201"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        let config = CalendarConfig {
            api_base: "mailto:someone@example.com".to_string(),
            ..CalendarConfig::default()
        };
        let tokens = Arc::new(StaticToken::new("t"));
        assert!(GoogleCalendar::new(Client::new(), &config, tokens).is_err());
    }

    #[test]
    fn test_events_page_parses_token() {
        let page: EventsPage =
            serde_json::from_str(r#"{"items": [{"id": "a"}], "nextPageToken": "p2"}"#).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("p2"));
    }
}
