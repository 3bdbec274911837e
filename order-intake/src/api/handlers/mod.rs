//! HTTP request handlers.
//!
//! - [`index`]: informational `GET /` and the plain-text 404 fallback
//! - [`upload`]: `POST /upload`, the order intake flow

pub mod index;
pub mod upload;
