use reqwest::blocking::Client;
use serde::Deserialize;
use url::Url;

use crate::config::PAGE_SIZE;
use crate::errors::{EventsError, EventsResult};
use crate::sources::record::ProviderEvent;
use crate::sources::traits::{ExternalPage, ExternalQuery, ExternalSource};

pub struct TicketmasterSource {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TicketmasterSource {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn build_url(&self, query: &ExternalQuery, page: u32) -> EventsResult<Url> {
        let mut url = Url::parse(&format!("{}/events.json", self.base_url))
            .map_err(|e| EventsError::Config(e.to_string()))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("apikey", &self.api_key);
            pairs.append_pair("size", &PAGE_SIZE.to_string());
            pairs.append_pair("page", &page.to_string());

            if let Some(keyword) = query.keyword.as_deref().filter(|k| !k.is_empty()) {
                pairs.append_pair("keyword", keyword);
            }
            if let Some(city) = query.location.as_deref().filter(|c| !c.is_empty()) {
                pairs.append_pair("city", city);
            }
            if let Some(id) = query.classification_id.as_deref().filter(|i| !i.is_empty()) {
                pairs.append_pair("classificationId", id);
            }
        }

        Ok(url)
    }
}

impl ExternalSource for TicketmasterSource {
    fn search(&self, query: &ExternalQuery, page: u32) -> EventsResult<ExternalPage> {
        let url = self.build_url(query, page)?;

        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(EventsError::Provider(format!(
                "search returned {}",
                response.status()
            )));
        }

        let body: SearchResponse = response.json()?;

        let records = body
            .embedded
            .and_then(|e| e.events)
            .unwrap_or_default();

        let (has_more, next_page) = match body.page {
            Some(meta) => {
                let number = meta.number.unwrap_or(page);
                let total = meta.total_pages.unwrap_or(0);
                (number + 1 < total, number + 1)
            }
            None => (false, page + 1),
        };

        Ok(ExternalPage {
            records,
            has_more,
            next_page,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchResponse {
    #[serde(rename = "_embedded")]
    embedded: Option<SearchEmbedded>,
    page: Option<PageMeta>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchEmbedded {
    events: Option<Vec<ProviderEvent>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageMeta {
    number: Option<u32>,
    #[serde(rename = "totalPages")]
    total_pages: Option<u32>,
}
