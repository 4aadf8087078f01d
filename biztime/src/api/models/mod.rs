//! API request and response data models.
//!
//! These structures define the public JSON contract and are kept apart from the database
//! records in [`crate::db::models`].
//!
//! - Request bodies keep every field optional so a missing field becomes a 400 with the
//!   field named, instead of a generic deserialization failure. `TryFrom` conversions into
//!   the database request types perform that check.
//! - Responses are wrapped in single-key envelopes (`{"company": ...}`,
//!   `{"invoices": [...]}`) to match the published API.
//!
//! - [`companies`]: Company bodies, responses and list projection
//! - [`invoices`]: Invoice bodies, responses and the nested invoice/company detail

use crate::errors::Error;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod companies;
pub mod invoices;

/// Acknowledgement returned by delete endpoints: `{"status": "deleted"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    #[schema(example = "deleted")]
    pub status: String,
}

impl DeletedResponse {
    pub fn deleted() -> Self {
        Self {
            status: "deleted".to_string(),
        }
    }
}

/// Build a `BadRequest` from `(field, is_missing)` pairs, keeping declaration order
fn missing_fields(fields: &[(&str, bool)]) -> Error {
    let missing: Vec<&str> = fields.iter().filter(|(_, is_missing)| *is_missing).map(|(name, _)| *name).collect();
    Error::missing_fields(&missing)
}
