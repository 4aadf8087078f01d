//! API request/response models for companies.

use super::missing_fields;
use crate::db::models::companies::{CompanyCreateDBRequest, CompanyDBResponse, CompanySummary, CompanyUpdateDBRequest};
use crate::errors::Error;
use crate::types::CompanyCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a company.
///
/// Every field must be present; an empty string counts as present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CompanyCreate {
    /// Unique company code, used in URLs
    #[schema(value_type = String, required = true, example = "apple")]
    pub code: Option<CompanyCode>,
    #[schema(value_type = String, required = true, example = "Apple")]
    pub name: Option<String>,
    #[schema(value_type = String, required = true, example = "Maker of iPhone")]
    pub description: Option<String>,
}

/// Request body for updating a company. The code comes from the path and cannot change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CompanyUpdate {
    #[schema(value_type = String, required = true, example = "Apple Inc.")]
    pub name: Option<String>,
    #[schema(value_type = String, required = true, example = "Maker of Mac")]
    pub description: Option<String>,
}

impl TryFrom<CompanyCreate> for CompanyCreateDBRequest {
    type Error = Error;

    fn try_from(create: CompanyCreate) -> Result<Self, Self::Error> {
        match (create.code, create.name, create.description) {
            (Some(code), Some(name), Some(description)) => Ok(Self { code, name, description }),
            (code, name, description) => Err(missing_fields(&[
                ("code", code.is_none()),
                ("name", name.is_none()),
                ("description", description.is_none()),
            ])),
        }
    }
}

impl TryFrom<CompanyUpdate> for CompanyUpdateDBRequest {
    type Error = Error;

    fn try_from(update: CompanyUpdate) -> Result<Self, Self::Error> {
        match (update.name, update.description) {
            (Some(name), Some(description)) => Ok(Self { name, description }),
            (name, description) => Err(missing_fields(&[("name", name.is_none()), ("description", description.is_none())])),
        }
    }
}

/// Full company details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompanyResponse {
    pub code: CompanyCode,
    pub name: String,
    pub description: String,
}

impl From<CompanyDBResponse> for CompanyResponse {
    fn from(db: CompanyDBResponse) -> Self {
        Self {
            code: db.code,
            name: db.name,
            description: db.description,
        }
    }
}

/// Company as shown in the list view (no description).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CompanySummaryResponse {
    pub code: CompanyCode,
    pub name: String,
}

impl From<CompanySummary> for CompanySummaryResponse {
    fn from(db: CompanySummary) -> Self {
        Self {
            code: db.code,
            name: db.name,
        }
    }
}

/// `{"companies": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyListResponse {
    pub companies: Vec<CompanySummaryResponse>,
}

/// `{"company": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyEnvelope {
    pub company: CompanyResponse,
}

impl From<CompanyDBResponse> for CompanyEnvelope {
    fn from(db: CompanyDBResponse) -> Self {
        Self { company: db.into() }
    }
}
