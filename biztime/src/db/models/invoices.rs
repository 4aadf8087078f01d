//! Database models for invoices.

use crate::types::{CompanyCode, InvoiceId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Database representation of an invoice row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invoice {
    pub id: InvoiceId,
    pub comp_code: CompanyCode,
    pub amt: Decimal,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
}

/// Thin projection used by the list query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvoiceSummary {
    pub id: InvoiceId,
    pub comp_code: CompanyCode,
}

/// Flat row produced by joining an invoice to its owning company.
///
/// Only the repository builds this; the API layer projects it into a nested response.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct InvoiceWithCompany {
    pub id: InvoiceId,
    pub amt: Decimal,
    pub paid: bool,
    pub add_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub code: CompanyCode,
    pub name: String,
    pub description: String,
}

/// Request to insert a new invoice. `paid`, `add_date` and `paid_date` use column defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCreateDBRequest {
    pub comp_code: CompanyCode,
    pub amt: Decimal,
}

/// Request to update an invoice. The amount is the only writable column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceUpdateDBRequest {
    pub amt: Decimal,
}

/// Response from database after creating, reading or updating an invoice
pub type InvoiceDBResponse = Invoice;
/// Joined invoice and company row
pub type InvoiceWithCompanyDBResponse = InvoiceWithCompany;
