//! Database record models matching table schemas.
//!
//! Each struct derives `sqlx::FromRow` and mirrors the columns a query selects.
//! API models live separately in [`crate::api::models`] and are built from these
//! with `From` conversions, so the storage shape and the wire shape can differ
//! (for example the flat invoice/company join row versus the nested response).
//!
//! - [`companies`]: Company rows and the list projection
//! - [`invoices`]: Invoice rows, the list projection and the joined row

pub mod companies;
pub mod invoices;
