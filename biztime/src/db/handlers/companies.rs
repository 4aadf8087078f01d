//! Database repository for companies.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::companies::{CompanyCreateDBRequest, CompanyDBResponse, CompanySummary, CompanyUpdateDBRequest},
};
use crate::types::{CompanyCode, Operation};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Companies<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Companies<'c> {
    type CreateRequest = CompanyCreateDBRequest;
    type UpdateRequest = CompanyUpdateDBRequest;
    type Response = CompanyDBResponse;
    type Summary = CompanySummary;
    type Id = CompanyCode;

    #[instrument(skip(self, request), fields(code = %request.code), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let company = sqlx::query_as::<_, CompanyDBResponse>(
            r#"
            INSERT INTO companies (code, name, description)
            VALUES ($1, $2, $3)
            RETURNING code, name, description
            "#,
        )
        .bind(&request.code)
        .bind(&request.name)
        .bind(&request.description)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(company)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, code: Self::Id) -> Result<Option<Self::Response>> {
        let company = sqlx::query_as::<_, CompanyDBResponse>("SELECT code, name, description FROM companies WHERE code = $1")
            .bind(&code)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(company)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Summary>> {
        let companies = sqlx::query_as::<_, CompanySummary>("SELECT code, name FROM companies ORDER BY code")
            .fetch_all(&mut *self.db)
            .await?;

        tracing::debug!("Retrieved {} companies", companies.len());

        Ok(companies)
    }

    /// Delete a company.
    ///
    /// Companies that still own invoices are refused with `DbError::ProtectedEntity`. The
    /// count is checked first for a precise message; the `ON DELETE RESTRICT` foreign key
    /// catches an invoice inserted after the count.
    #[instrument(skip(self), err)]
    async fn delete(&mut self, code: Self::Id) -> Result<bool> {
        let invoice_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE comp_code = $1")
            .bind(&code)
            .fetch_one(&mut *self.db)
            .await?;

        if invoice_count > 0 {
            return Err(DbError::ProtectedEntity {
                operation: Operation::Delete,
                reason: format!("it still has {invoice_count} invoice(s)"),
                entity_type: "company".to_string(),
                entity_id: code,
            });
        }

        match sqlx::query("DELETE FROM companies WHERE code = $1")
            .bind(&code)
            .execute(&mut *self.db)
            .await
        {
            Ok(result) => Ok(result.rows_affected() > 0),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => Err(DbError::ProtectedEntity {
                operation: Operation::Delete,
                reason: "it still has invoices".to_string(),
                entity_type: "company".to_string(),
                entity_id: code,
            }),
            Err(e) => Err(DbError::from(e)),
        }
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, code: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let company = sqlx::query_as::<_, CompanyDBResponse>(
            r#"
            UPDATE companies SET
                name = $2,
                description = $3
            WHERE code = $1
            RETURNING code, name, description
            "#,
        )
        .bind(&code)
        .bind(&request.name)
        .bind(&request.description)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(company)
    }
}

impl<'c> Companies<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Check that a company exists and hold a key-share lock on its row.
    ///
    /// Inside a transaction the lock blocks a concurrent delete of the company until
    /// commit, so an invoice inserted afterwards cannot lose its owner.
    #[instrument(skip(self), err)]
    pub async fn lock_for_reference(&mut self, code: &str) -> Result<bool> {
        let found: Option<CompanyCode> = sqlx::query_scalar("SELECT code FROM companies WHERE code = $1 FOR KEY SHARE")
            .bind(code)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(found.is_some())
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies").fetch_one(&mut *self.db).await?;

        Ok(count)
    }
}
