//! Shared helpers for handler tests.

use crate::config::{Config, WebhookConfig};
use crate::storage::{ObjectMetadata, ObjectStore, StorageError};
use crate::webhook::SheetsWebhook;
use crate::{AppState, Application, Clock};
use async_trait::async_trait;
use axum_test::TestServer;
use axum_test::multipart::{MultipartForm, Part};
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Store whose every write fails.
pub struct FailingStore;

#[async_trait]
impl ObjectStore for FailingStore {
    async fn put(&self, key: &str, _body: Bytes, _metadata: ObjectMetadata) -> Result<(), StorageError> {
        Err(StorageError::Backend {
            key: key.to_string(),
            message: "simulated outage".to_string(),
        })
    }

    fn kind(&self) -> &'static str {
        "failing"
    }
}

/// Clock pinned to 2026-10-16T09:30:12.345Z.
pub fn fixed_clock() -> Clock {
    Clock::new(|| Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 12).unwrap() + chrono::Duration::milliseconds(345))
}

pub fn create_test_config(webhook_url: Option<&str>) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        webhook: WebhookConfig {
            url: webhook_url.map(|u| u.parse().expect("valid webhook url")),
            timeout_secs: 5,
        },
        ..Default::default()
    }
}

pub fn create_test_server(store: Option<Arc<dyn ObjectStore>>, webhook_url: Option<&str>, clock: Clock) -> TestServer {
    crate::install_crypto_provider();

    let config = create_test_config(webhook_url);
    let webhook = webhook_url.map(|url| {
        SheetsWebhook::new(url.parse().expect("valid webhook url"), Duration::from_secs(config.webhook.timeout_secs))
            .expect("Failed to create webhook client")
    });

    let state = AppState::builder()
        .config(config)
        .maybe_store(store)
        .maybe_webhook(webhook)
        .clock(clock)
        .build();

    Application::from_state(state).into_test_server()
}

pub fn order_json() -> serde_json::Value {
    serde_json::json!({
        "size": "A3",
        "material": "canvas",
        "quantity": 2,
        "workOption": "frame",
        "color": "full",
        "contact": "010-1234-5678",
        "email": "buyer@example.com",
        "specialRequest": "rush please",
        "address": "Seoul",
        "totalPrice": 42000
    })
}

pub fn png_part() -> Part {
    Part::bytes(b"\x89PNG fake image".as_slice())
        .file_name("logo.png")
        .mime_type("image/png")
}

/// A complete, valid order form.
pub fn order_form() -> MultipartForm {
    MultipartForm::new()
        .add_part("file", png_part())
        .add_text("orderData", order_json().to_string())
}
