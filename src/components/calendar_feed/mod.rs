pub mod models;
pub mod parser;

pub use models::CalendarEvent;
pub use parser::parse_calendar;

use crate::error::{fetch_error, NotifierResult};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Timeout for the single feed download of a run
pub const FEED_TIMEOUT: Duration = Duration::from_secs(15);

/// Source of raw iCalendar text
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Download the feed body
    async fn fetch(&self) -> NotifierResult<String>;
}

/// Load and parse the feed in one step
pub async fn fetch_events(source: &dyn FeedSource) -> NotifierResult<Vec<CalendarEvent>> {
    let body = source.fetch().await?;
    parse_calendar(&body)
}

/// Feed served over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFeed {
    url: Url,
    client: Client,
}

impl HttpFeed {
    pub fn new(url: Url) -> NotifierResult<Self> {
        let client = Client::builder()
            .timeout(FEED_TIMEOUT)
            .build()
            .map_err(|e| fetch_error(&format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> NotifierResult<String> {
        debug!("Fetching calendar feed from {}", self.url.host_str().unwrap_or("<unknown host>"));

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| fetch_error(&format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(fetch_error(&format!("HTTP {} - {}", status, error_body)));
        }

        // Read raw bytes, feeds do not always declare a charset
        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error(&format!("Failed to read response body: {}", e)))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
