// src/services/opendata.rs

//! Open-data search API client.
//!
//! Fetches the bridge closure dataset page by page and returns the records in
//! feed order.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{FeedConfig, RawRecord};
use crate::services::RecordSource;
use crate::utils::http::ensure_success;
use crate::utils::truncate;

/// One page of search results.
#[derive(Debug, Deserialize)]
pub struct SearchPage {
    /// Total number of matching records
    #[serde(default)]
    pub nhits: Option<usize>,

    pub records: Vec<RawRecord>,
}

/// Client for the records search endpoint.
pub struct OpenDataClient {
    client: Client,
    config: FeedConfig,
}

impl OpenDataClient {
    pub fn new(client: Client, config: FeedConfig) -> Self {
        Self { client, config }
    }

    /// Search URL for the page starting at `start`.
    pub fn page_url(&self, start: usize) -> Result<Url> {
        let mut url = Url::parse(&self.config.url)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("dataset", &self.config.dataset)
                .append_pair("rows", &self.config.rows.to_string())
                .append_pair("start", &start.to_string());
            if let Some(facet) = self.config.facet.as_deref().filter(|f| !f.is_empty()) {
                query.append_pair("facet", facet);
            }
        }
        Ok(url)
    }

    async fn fetch_page(&self, start: usize) -> Result<SearchPage> {
        let url = self.page_url(start)?;
        log::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await.map_err(|(status, body)| {
            AppError::feed(format!(
                "dataset {} answered {}: {}",
                self.config.dataset,
                status,
                truncate(&body, 200)
            ))
        })?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl RecordSource for OpenDataClient {
    async fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        let mut records = Vec::new();

        loop {
            let page = self.fetch_page(records.len()).await?;
            let count = page.records.len();
            records.extend(page.records);
            let total = page.nhits.unwrap_or(records.len());

            log::debug!("Fetched {} record(s), {}/{}", count, records.len(), total);

            if count == 0 || count < self.config.rows || records.len() >= total {
                break;
            }
        }

        log::info!(
            "Loaded {} closure record(s) from {}",
            records.len(),
            self.config.dataset
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(facet: Option<&str>) -> OpenDataClient {
        OpenDataClient::new(
            Client::new(),
            FeedConfig {
                facet: facet.map(str::to_string),
                ..FeedConfig::default()
            },
        )
    }

    #[test]
    fn test_page_url_carries_dataset_and_paging() {
        let url = client(Some("bateau")).page_url(1000).unwrap();
        assert_eq!(
            url.as_str(),
            "https://opendata.bordeaux-metropole.fr/api/records/1.0/search/\
             ?dataset=previsions_pont_chaban&rows=1000&start=1000&facet=bateau"
        );
    }

    #[test]
    fn test_page_url_without_facet() {
        let url = client(Some("")).page_url(0).unwrap();
        assert!(!url.as_str().contains("facet"));
    }

    #[test]
    fn test_search_page_requires_records() {
        assert!(serde_json::from_str::<SearchPage>(r#"{"nhits": 3}"#).is_err());
        let page: SearchPage = serde_json::from_str(r#"{"records": []}"#).unwrap();
        assert!(page.nhits.is_none());
    }
}
