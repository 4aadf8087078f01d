//! Repository implementations for database access.
//!
//! This module provides a repository struct for each table. Repositories follow a
//! consistent pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Binds every value as a positional parameter, never into the SQL text
//! - Returns records from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Companies`]: Companies and the delete restriction on companies with invoices
//! - [`Invoices`]: Invoices, including the invoice/company join
//!
//! # Common Pattern
//!
//! ```ignore
//! use biztime::db::handlers::{Companies, Repository};
//!
//! async fn example(pool: &sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!     let mut repo = Companies::new(&mut tx);
//!
//!     let companies = repo.list().await?;
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod companies;
pub mod invoices;
pub mod repository;

pub use companies::Companies;
pub use invoices::Invoices;
pub use repository::Repository;
