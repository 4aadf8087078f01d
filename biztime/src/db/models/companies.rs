//! Database models for companies.

use crate::types::CompanyCode;
use serde::{Deserialize, Serialize};

/// Database representation of a company row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub code: CompanyCode,
    pub name: String,
    pub description: String,
}

/// Thin projection used by the list query (no description)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CompanySummary {
    pub code: CompanyCode,
    pub name: String,
}

/// Request to insert a new company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyCreateDBRequest {
    pub code: CompanyCode,
    pub name: String,
    pub description: String,
}

/// Request to update an existing company. The code is the lookup key and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyUpdateDBRequest {
    pub name: String,
    pub description: String,
}

/// Response from database after creating, reading or updating a company
pub type CompanyDBResponse = Company;
