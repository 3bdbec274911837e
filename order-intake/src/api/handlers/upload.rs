use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use bytes::Bytes;
use serde::de::Error as _;
use serde_json::Value;
use tracing::instrument;

use crate::AppState;
use crate::api::models::orders::{OrderData, StorageKey, StoredOrderRecord, UploadResponse, order_timestamp};
use crate::errors::{Error, Result};
use crate::storage::ObjectMetadata;

/// File name used when the `file` part carries none, as browsers do for bare blobs.
const DEFAULT_FILE_NAME: &str = "blob";

pub const SUCCESS_MESSAGE: &str = "Order processed successfully.";

/// The uploaded file as read from the `file` part.
#[derive(Debug)]
struct UploadedFile {
    name: String,
    content_type: Option<String>,
    body: Bytes,
}

#[derive(Debug, Default)]
struct OrderForm {
    file: Option<UploadedFile>,
    order_data: Option<String>,
}

/// Accept an order: store the file, then forward the order row to the spreadsheet.
///
/// The steps run strictly in order and each external call happens at most once. A webhook
/// failure is reported as a 500 but the stored file is kept.
#[instrument(skip_all)]
pub async fn upload_order(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let form = read_order_form(multipart?).await?;

    let (file, raw_order) = match (form.file, form.order_data) {
        (Some(file), Some(raw_order)) => (file, raw_order),
        (None, _) => {
            return Err(Error::MissingField {
                message: "Missing required field: 'file'".to_string(),
            });
        }
        (_, None) => {
            return Err(Error::MissingField {
                message: "Missing required field: 'orderData'".to_string(),
            });
        }
    };

    let order = parse_order_data(&raw_order)?;

    let timestamp = order_timestamp(state.clock.now());
    let key = StorageKey::compose(&timestamp, &order.contact_label(), &file.name);

    let store = state.store.as_ref().ok_or(Error::StorageUnavailable)?;
    let size = file.body.len();
    let metadata = ObjectMetadata::new(file.content_type.as_deref());
    tracing::debug!(key = %key, bytes = size, content_type = %metadata.content_type, "Storing uploaded file");
    store.put(key.as_str(), file.body, metadata).await?;
    tracing::info!(key = %key, bytes = size, backend = store.kind(), "Stored order file");

    let record = StoredOrderRecord::new(timestamp, order, &key);

    match &state.webhook {
        Some(webhook) => {
            webhook.notify(&record).await?;
            tracing::info!(key = %key, "Forwarded order to spreadsheet");
        }
        None => tracing::debug!(key = %key, "No webhook configured, skipping order forwarding"),
    }

    Ok(Json(UploadResponse {
        success: true,
        message: SUCCESS_MESSAGE.to_string(),
    }))
}

/// Collect the `file` and `orderData` parts. Other parts are skipped; when a part is repeated
/// the first occurrence wins.
async fn read_order_form(mut multipart: Multipart) -> Result<OrderForm> {
    let mut form = OrderForm::default();

    while let Some(field) = multipart.next_field().await? {
        let part_name = field.name().map(str::to_string);
        match part_name.as_deref() {
            Some("file") if form.file.is_none() => {
                let name = field.file_name().unwrap_or(DEFAULT_FILE_NAME).to_string();
                let content_type = field.content_type().map(str::to_string);
                let body = field.bytes().await?;
                form.file = Some(UploadedFile {
                    name,
                    content_type,
                    body,
                });
            }
            Some("orderData") if form.order_data.is_none() => {
                form.order_data = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// Empty values (`null`, `false`, `0`, `""`) count as absent; any other non-object is malformed.
fn parse_order_data(raw: &str) -> Result<OrderData> {
    let value: Value = serde_json::from_str(raw)?;
    match value {
        v if is_empty_value(&v) => Err(Error::MissingField {
            message: "Missing required field: 'orderData'".to_string(),
        }),
        Value::Object(_) => Ok(serde_json::from_value(value)?),
        _ => Err(Error::MalformedPayload(serde_json::Error::custom("orderData must be a JSON object"))),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
