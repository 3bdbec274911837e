use axum::http::header;
use axum::response::IntoResponse;

use crate::errors::Error;

pub const INDEX_MESSAGE: &str = "Order intake service. Host the order form separately and submit orders with POST /upload.";

/// Static informational text for `GET /`.
pub async fn index() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], INDEX_MESSAGE)
}

/// Fallback for every unrouted method and path.
pub async fn not_found() -> Error {
    Error::RouteNotFound
}
