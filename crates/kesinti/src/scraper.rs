use crate::parser::parse_outage_table;
use crate::types::OutageTable;

use reqwest::Client;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub(crate) fn build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(format!(
            "{}/{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ))
        .build()
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    page_url: String,
}

impl WebScraper {
    pub fn new(page_url: impl Into<String>) -> Result<Self, ScraperError> {
        Ok(Self {
            client: build_client()?,
            page_url: page_url.into(),
        })
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub async fn fetch_outages(&self) -> Result<OutageTable, ScraperError> {
        log::info!("Fetching water interruptions from {}...", self.page_url);
        let html = self
            .client
            .get(&self.page_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let outages = parse_outage_table(&html);
        log::info!("Found interruptions for {} region(s)", outages.len());
        Ok(outages)
    }
}
