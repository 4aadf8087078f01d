//! HTTP request handlers for the company and invoice resources.
//!
//! Each handler validates the request body, runs the work through a repository from
//! [`crate::db::handlers`], and serializes the result. Failures are returned as
//! [`crate::errors::Error`], which renders the status code and a `{"message": ...}` body.
//!
//! - [`companies`]: Company CRUD; deletion is refused while invoices exist
//! - [`invoices`]: Invoice CRUD; reads nest the owning company

pub mod companies;
pub mod invoices;
