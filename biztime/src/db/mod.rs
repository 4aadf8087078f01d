//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Transactions
//!
//! Repositories borrow a `PgConnection`, so they work the same on a pooled connection or
//! inside a transaction. Multi-statement operations (invoice create, company delete) open a
//! transaction and build every repository they need from it:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let exists = Companies::new(&mut tx).lock_for_reference("apple").await?;
//! let invoice = Invoices::new(&mut tx).create(&request).await?;
//! tx.commit().await?;
//! ```
//!
//! # Migrations
//!
//! Migrations live in the `migrations/` directory and are applied by [`crate::migrator`].

pub mod errors;
pub mod handlers;
pub mod models;
