use crate::error::{delivery_error, NotifierResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Timeout for the webhook POST
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Destination for the notification message
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> NotifierResult<()>;
}

/// JSON body accepted by Mattermost/Slack style incoming webhooks
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Incoming-webhook notifier
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: Url,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: Url) -> NotifierResult<Self> {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| delivery_error(&format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, message: &str) -> NotifierResult<()> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&WebhookPayload { text: message })
            .send()
            .await
            .map_err(|e| delivery_error(&format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(delivery_error(&format!("HTTP {} - {}", status, error_body)));
        }

        Ok(())
    }
}
