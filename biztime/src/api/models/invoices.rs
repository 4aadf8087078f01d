//! API request/response models for invoices.
//!
//! Amounts are `NUMERIC(12, 2)` in the database and plain JSON numbers on the wire. Request
//! amounts must be JSON numbers with at most two decimal places and fewer than ten integer digits.

use super::companies::CompanyResponse;
use super::missing_fields;
use crate::db::models::invoices::{
    InvoiceCreateDBRequest, InvoiceDBResponse, InvoiceSummary, InvoiceUpdateDBRequest, InvoiceWithCompanyDBResponse,
};
use crate::errors::Error;
use crate::types::{CompanyCode, InvoiceId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Largest number of decimal places an amount can carry
const AMOUNT_SCALE: u32 = 2;

/// Amounts must stay below 10^10 to fit `NUMERIC(12, 2)`
const AMOUNT_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Read an optional amount that must be a JSON number; strings are rejected.
///
/// The number is converted through its decimal text, so `12.345` stays `12.345` and can be
/// rejected instead of being rounded by the column.
fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("amount {text} is out of range")))
}

/// Reject amounts the `amt` column cannot store exactly.
fn validate_amount(amt: Decimal) -> Result<Decimal, Error> {
    if amt.normalize().scale() > AMOUNT_SCALE {
        return Err(Error::BadRequest {
            message: format!("amt must have at most {AMOUNT_SCALE} decimal places"),
        });
    }
    if amt.abs() >= AMOUNT_LIMIT {
        return Err(Error::BadRequest {
            message: "amt must be less than 10000000000 in magnitude".to_string(),
        });
    }
    Ok(amt)
}

/// Request body for creating an invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct InvoiceCreate {
    /// Code of the company being billed; it must already exist
    #[schema(value_type = String, required = true, example = "apple")]
    pub comp_code: Option<CompanyCode>,
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float_option::serialize",
        deserialize_with = "deserialize_amount"
    )]
    #[schema(value_type = f64, required = true, example = 100)]
    pub amt: Option<Decimal>,
}

/// Request body for updating an invoice. Only the amount can change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct InvoiceUpdate {
    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float_option::serialize",
        deserialize_with = "deserialize_amount"
    )]
    #[schema(value_type = f64, required = true, example = 200)]
    pub amt: Option<Decimal>,
}

impl TryFrom<InvoiceCreate> for InvoiceCreateDBRequest {
    type Error = Error;

    fn try_from(create: InvoiceCreate) -> Result<Self, Self::Error> {
        match (create.comp_code, create.amt) {
            (Some(comp_code), Some(amt)) => Ok(Self {
                comp_code,
                amt: validate_amount(amt)?,
            }),
            (comp_code, amt) => Err(missing_fields(&[("comp_code", comp_code.is_none()), ("amt", amt.is_none())])),
        }
    }
}

impl TryFrom<InvoiceUpdate> for InvoiceUpdateDBRequest {
    type Error = Error;

    fn try_from(update: InvoiceUpdate) -> Result<Self, Self::Error> {
        let amt = update.amt.ok_or_else(|| Error::missing_fields(&["amt"]))?;
        Ok(Self {
            amt: validate_amount(amt)?,
        })
    }
}

/// Invoice row as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceResponse {
    pub id: InvoiceId,
    pub comp_code: CompanyCode,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amt: Decimal,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
}

impl From<InvoiceDBResponse> for InvoiceResponse {
    fn from(db: InvoiceDBResponse) -> Self {
        Self {
            id: db.id,
            comp_code: db.comp_code,
            amt: db.amt,
            paid: db.paid,
            add_date: db.add_date,
            paid_date: db.paid_date,
        }
    }
}

/// Invoice as shown in the list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceSummaryResponse {
    pub id: InvoiceId,
    pub comp_code: CompanyCode,
}

impl From<InvoiceSummary> for InvoiceSummaryResponse {
    fn from(db: InvoiceSummary) -> Self {
        Self {
            id: db.id,
            comp_code: db.comp_code,
        }
    }
}

/// Invoice with its owning company nested under `company`.
///
/// There is no `comp_code` here: the company object replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvoiceDetailResponse {
    pub id: InvoiceId,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amt: Decimal,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub company: CompanyResponse,
}

/// Projects the flat joined row into the nested shape. The company columns move into
/// `company` and nowhere else.
impl From<InvoiceWithCompanyDBResponse> for InvoiceDetailResponse {
    fn from(row: InvoiceWithCompanyDBResponse) -> Self {
        Self {
            id: row.id,
            amt: row.amt,
            paid: row.paid,
            add_date: row.add_date,
            paid_date: row.paid_date,
            company: CompanyResponse {
                code: row.code,
                name: row.name,
                description: row.description,
            },
        }
    }
}

/// `{"invoices": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceListResponse {
    pub invoices: Vec<InvoiceSummaryResponse>,
}

/// `{"invoice": {...}}` for create and update
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceEnvelope {
    pub invoice: InvoiceResponse,
}

impl From<InvoiceDBResponse> for InvoiceEnvelope {
    fn from(db: InvoiceDBResponse) -> Self {
        Self { invoice: db.into() }
    }
}

/// `{"invoice": {..., "company": {...}}}` for the single-invoice read
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceDetailEnvelope {
    pub invoice: InvoiceDetailResponse,
}

impl From<InvoiceWithCompanyDBResponse> for InvoiceDetailEnvelope {
    fn from(row: InvoiceWithCompanyDBResponse) -> Self {
        Self { invoice: row.into() }
    }
}
