//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for the resource endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Companies** (`/companies`, `/companies/{code}`)
//! - **Invoices** (`/invoices`, `/invoices/{id}`)
//!
//! Both are mounted under the configured `api_prefix`. Endpoints are documented with
//! `utoipa`; the document is served at `/openapi.json` and rendered at `/docs`.

use crate::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub mod handlers;
pub mod models;

/// Resource routes, without state or middleware applied.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Companies
        .route("/companies", get(handlers::companies::list_companies))
        .route("/companies", post(handlers::companies::create_company))
        .route("/companies/{code}", get(handlers::companies::get_company))
        .route("/companies/{code}", put(handlers::companies::update_company))
        .route("/companies/{code}", delete(handlers::companies::delete_company))
        // Invoices
        .route("/invoices", get(handlers::invoices::list_invoices))
        .route("/invoices", post(handlers::invoices::create_invoice))
        .route("/invoices/{id}", get(handlers::invoices::get_invoice))
        .route("/invoices/{id}", put(handlers::invoices::update_invoice))
        .route("/invoices/{id}", delete(handlers::invoices::delete_invoice))
}
