//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Order payloads and response bodies
//!
//! # Routes
//!
//! | Method | Path      | Handler                          |
//! |--------|-----------|----------------------------------|
//! | GET    | `/`       | [`handlers::index::index`]       |
//! | POST   | `/upload` | [`handlers::upload::upload_order`] |
//! | *      | *         | [`handlers::index::not_found`]   |

pub mod handlers;
pub mod models;
