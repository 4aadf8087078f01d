//! Common type definitions shared by the API and database layers.
//!
//! # ID Types
//!
//! - [`CompanyCode`]: Company identifier, chosen by the caller on creation
//! - [`InvoiceId`]: Invoice identifier, generated by the database (`SERIAL`)
//!
//! # Operations
//!
//! [`Operation`] names a write that a protection rule can refuse, and is carried
//! by [`crate::db::errors::DbError::ProtectedEntity`].

use std::fmt;

// Type aliases for IDs
pub type CompanyCode = String;
pub type InvoiceId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// Parse an invoice id taken from a request path.
///
/// Anything that is not a positive integer cannot name an invoice, so callers
/// treat `None` the same as a missing row.
pub fn parse_invoice_id(raw: &str) -> Option<InvoiceId> {
    raw.parse::<InvoiceId>().ok().filter(|id| *id > 0)
}
