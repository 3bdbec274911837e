use crate::storage::StorageError;
use crate::webhook::NotificationError;
use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// A required multipart part was not sent
    #[error("{message}")]
    MissingField { message: String },

    /// Upload body exceeded the configured limit
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Request body could not be read as multipart form data
    #[error("{message}")]
    MalformedRequest { message: String },

    /// `orderData` was present but is not a JSON object
    #[error("Invalid orderData: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// No blob store is configured for this instance
    #[error("Object storage is not configured")]
    StorageUnavailable,

    /// Blob write did not complete
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Spreadsheet webhook call failed after the blob was stored
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// No route for this method and path
    #[error("Route not found")]
    RouteNotFound,
}

/// JSON body returned for every error on the upload route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MissingField { .. } => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::RouteNotFound => StatusCode::NOT_FOUND,
            Error::MalformedRequest { .. }
            | Error::MalformedPayload(_)
            | Error::StorageUnavailable
            | Error::Storage(_)
            | Error::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller.
    ///
    /// Server-side failures carry the raw error text; nothing is redacted.
    pub fn user_message(&self) -> String {
        match self {
            Error::MissingField { message } | Error::PayloadTooLarge { message } => message.clone(),
            Error::RouteNotFound => "The requested page could not be found.".to_string(),
            _ => format!("Internal server error: {self:#}"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Notification(_) => {
                tracing::error!("Order stored but spreadsheet notification failed: {:#}", self);
            }
            Error::MalformedRequest { .. }
            | Error::MalformedPayload(_)
            | Error::StorageUnavailable
            | Error::Storage(_) => {
                tracing::error!("Order processing error: {:#}", self);
            }
            Error::MissingField { .. } | Error::PayloadTooLarge { .. } | Error::RouteNotFound => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let message = self.user_message();

        match self {
            Error::RouteNotFound => (status, message).into_response(),
            _ => (status, Json(ErrorResponse { error: message })).into_response(),
        }
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        Error::MalformedRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for Error {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Error::PayloadTooLarge { message: err.body_text() }
        } else {
            Error::MalformedRequest { message: err.body_text() }
        }
    }
}

/// Type alias for handler results
pub type Result<T> = std::result::Result<T, Error>;
