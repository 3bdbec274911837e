//! # order-intake: order upload endpoint
//!
//! `order-intake` is a small HTTP service behind a print/production order form. A customer
//! submits artwork together with the order details; the service writes the file to object
//! storage and appends the order to a spreadsheet through a webhook.
//!
//! ## Request Flow
//!
//! `POST /upload` takes `multipart/form-data` with two parts: `file` (the artwork) and
//! `orderData` (a JSON object with size, material, quantity, contact details and price). The
//! handler:
//!
//! 1. reads the multipart body and checks both parts are present (400 otherwise),
//! 2. parses `orderData` (500 if it is not a JSON object),
//! 3. writes the file to the configured [`storage::ObjectStore`] under
//!    `{timestamp}-{contact}-{file name}`,
//! 4. POSTs `{"data": <order row>}` to the spreadsheet webhook, if one is configured,
//! 5. returns `{"success": true, ...}`.
//!
//! Each step runs once, in order. There are no retries and nothing is rolled back: if the
//! webhook fails after the file was stored, the caller gets a 500 and the file stays.
//!
//! `GET /` returns a short plain-text notice and every other route is a plain-text 404.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use order_intake::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     order_intake::install_crypto_provider();
//!
//!     let args = order_intake::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     order_intake::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
pub mod storage;
pub mod telemetry;
pub mod webhook;

#[cfg(test)]
pub mod test_utils;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, header},
    routing::{get, post},
};
use bon::Builder;
use chrono::{DateTime, Utc};
pub use config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    set_header::SetResponseHeaderLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, warn};

use crate::api::handlers::{index, upload};
use crate::storage::ObjectStore;
use crate::webhook::SheetsWebhook;

/// Source of request timestamps.
#[derive(Clone, Copy)]
pub struct Clock(fn() -> DateTime<Utc>);

impl Clock {
    pub fn new(now: fn() -> DateTime<Utc>) -> Self {
        Self(now)
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.0)()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self(Utc::now)
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Clock")
    }
}

/// Application state shared across all request handlers.
///
/// - `config`: Application configuration loaded from environment/files
/// - `store`: Object store for uploaded files; `None` when storage is not configured
/// - `webhook`: Spreadsheet webhook client; `None` skips forwarding
/// - `clock`: Timestamp source, fixed in tests
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .store(store)
///     .maybe_webhook(webhook)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: Option<Arc<dyn ObjectStore>>,
    pub webhook: Option<SheetsWebhook>,
    #[builder(default)]
    pub clock: Clock,
}

/// Install the process-wide rustls crypto provider used by the webhook client.
///
/// Safe to call more than once.
pub fn install_crypto_provider() {
    // Err only means a provider is already installed
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Build the router: `GET /`, `POST /upload`, and a plain-text 404 for everything else.
pub fn build_router(state: AppState) -> Router {
    let max_upload_size = state.config.max_upload_size;

    let upload_route = post(upload::upload_order)
        .fallback(index::not_found)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ));

    Router::new()
        .route("/", get(index::index).head(index::not_found).fallback(index::not_found))
        .route("/upload", upload_route)
        .fallback(index::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .with_state(state)
}

pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance with storage and webhook clients initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting order intake with configuration: {:#?}", config);

        let store = match &config.storage {
            Some(storage_config) => Some(storage::from_config(storage_config).await?),
            None => {
                warn!("No object storage configured; uploads will fail until `storage` is set");
                None
            }
        };

        let webhook = SheetsWebhook::from_config(&config.webhook)?;
        match &webhook {
            Some(webhook) => info!(url = %webhook.url(), "Spreadsheet webhook configured"),
            None => info!("No spreadsheet webhook configured; orders will not be forwarded"),
        }

        let state = AppState::builder()
            .config(config)
            .maybe_store(store)
            .maybe_webhook(webhook)
            .build();

        Ok(Self::from_state(state))
    }

    /// Wrap pre-built state, e.g. with a custom store.
    pub fn from_state(state: AppState) -> Self {
        let config = state.config.clone();
        Self {
            router: build_router(state),
            config,
        }
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Order intake listening on http://{}", listener.local_addr()?);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}
