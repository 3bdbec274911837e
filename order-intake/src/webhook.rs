//! Spreadsheet webhook client.
//!
//! Each stored order is forwarded once as `POST <url>` with a JSON body `{"data": <record>}`.
//! The response body is never read; only transport success and the status class matter.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::api::models::orders::StoredOrderRecord;
use crate::config::WebhookConfig;

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Spreadsheet webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Spreadsheet webhook at {url} returned HTTP {status}")]
    Status { status: u16, url: String },
}

/// Wire envelope expected by the spreadsheet endpoint.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub data: &'a StoredOrderRecord,
}

#[derive(Debug, Clone)]
pub struct SheetsWebhook {
    url: Url,
    http_client: reqwest::Client,
}

impl SheetsWebhook {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, NotificationError> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url, http_client })
    }

    /// Build the client if a webhook URL is configured.
    pub fn from_config(config: &WebhookConfig) -> Result<Option<Self>, NotificationError> {
        config
            .url
            .clone()
            .map(|url| Self::new(url, Duration::from_secs(config.timeout_secs)))
            .transpose()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send the record. Not retried.
    pub async fn notify(&self, record: &StoredOrderRecord) -> Result<(), NotificationError> {
        let response = self
            .http_client
            .post(self.url.clone())
            .json(&WebhookPayload { data: record })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotificationError::Status {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        tracing::debug!(status = status.as_u16(), file_name = %record.file_name, "Spreadsheet webhook accepted order");
        Ok(())
    }
}
