//! OpenAPI documentation for the company and invoice endpoints.
//!
//! [`ApiDoc`] collects the `#[utoipa::path]` handlers and the API model schemas. The document is
//! served at `/openapi.json` and rendered with Scalar at `/docs`.

use serde::Serialize;
use utoipa::{OpenApi, ToSchema, openapi::Server};

use crate::api;

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Company 'apple' not found")]
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::companies::list_companies,
        api::handlers::companies::get_company,
        api::handlers::companies::create_company,
        api::handlers::companies::update_company,
        api::handlers::companies::delete_company,
        api::handlers::invoices::list_invoices,
        api::handlers::invoices::get_invoice,
        api::handlers::invoices::create_invoice,
        api::handlers::invoices::update_invoice,
        api::handlers::invoices::delete_invoice,
    ),
    components(
        schemas(
            ErrorBody,
            api::models::DeletedResponse,
            api::models::companies::CompanyCreate,
            api::models::companies::CompanyUpdate,
            api::models::companies::CompanyResponse,
            api::models::companies::CompanySummaryResponse,
            api::models::companies::CompanyListResponse,
            api::models::companies::CompanyEnvelope,
            api::models::invoices::InvoiceCreate,
            api::models::invoices::InvoiceUpdate,
            api::models::invoices::InvoiceResponse,
            api::models::invoices::InvoiceSummaryResponse,
            api::models::invoices::InvoiceDetailResponse,
            api::models::invoices::InvoiceListResponse,
            api::models::invoices::InvoiceEnvelope,
            api::models::invoices::InvoiceDetailEnvelope,
        )
    ),
    tags(
        (name = "companies", description = "Companies that can be billed. A company is addressed by its code."),
        (name = "invoices", description = "Invoices billed to companies.

New invoices start unpaid and are dated on the day they are created. Only the amount can be changed afterwards."),
    ),
    info(
        title = "biztime",
        version = "1.0.0",
        description = "Track companies and the invoices billed to them.

## Errors

Every error response carries a JSON body with a single `message` field:

```json
{\"message\": \"Company 'apple' not found\"}
```",
    ),
)]
pub struct ApiDoc;

/// The document for a router that mounts the resource routes under `api_prefix`.
pub fn api_doc(api_prefix: &str) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if !api_prefix.is_empty() {
        doc.servers = Some(vec![Server::new(api_prefix)]);
    }
    doc
}
