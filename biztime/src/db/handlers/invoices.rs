//! Database repository for invoices.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::invoices::{
        InvoiceCreateDBRequest, InvoiceDBResponse, InvoiceSummary, InvoiceUpdateDBRequest, InvoiceWithCompanyDBResponse,
    },
};
use crate::types::InvoiceId;
use sqlx::PgConnection;
use tracing::instrument;

pub struct Invoices<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Invoices<'c> {
    type CreateRequest = InvoiceCreateDBRequest;
    type UpdateRequest = InvoiceUpdateDBRequest;
    type Response = InvoiceDBResponse;
    type Summary = InvoiceSummary;
    type Id = InvoiceId;

    /// Insert an invoice; `paid`, `add_date` and `paid_date` come from column defaults.
    ///
    /// Callers check the owning company first. If it disappears anyway the foreign key
    /// violation is reported as `DbError::NotFound`.
    #[instrument(skip(self, request), fields(comp_code = %request.comp_code), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        match sqlx::query_as::<_, InvoiceDBResponse>(
            r#"
            INSERT INTO invoices (comp_code, amt)
            VALUES ($1, $2)
            RETURNING id, comp_code, amt, paid, add_date, paid_date
            "#,
        )
        .bind(&request.comp_code)
        .bind(request.amt)
        .fetch_one(&mut *self.db)
        .await
        {
            Ok(invoice) => Ok(invoice),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => Err(DbError::NotFound),
            Err(e) => Err(DbError::from(e)),
        }
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let invoice = sqlx::query_as::<_, InvoiceDBResponse>(
            "SELECT id, comp_code, amt, paid, add_date, paid_date FROM invoices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(invoice)
    }

    #[instrument(skip(self), err)]
    async fn list(&mut self) -> Result<Vec<Self::Summary>> {
        let invoices = sqlx::query_as::<_, InvoiceSummary>("SELECT id, comp_code FROM invoices ORDER BY id")
            .fetch_all(&mut *self.db)
            .await?;

        tracing::debug!("Retrieved {} invoices", invoices.len());

        Ok(invoices)
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let invoice = sqlx::query_as::<_, InvoiceDBResponse>(
            r#"
            UPDATE invoices SET amt = $2
            WHERE id = $1
            RETURNING id, comp_code, amt, paid, add_date, paid_date
            "#,
        )
        .bind(id)
        .bind(request.amt)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(invoice)
    }
}

impl<'c> Invoices<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Fetch an invoice joined to its owning company in a single query
    #[instrument(skip(self), err)]
    pub async fn get_with_company(&mut self, id: InvoiceId) -> Result<Option<InvoiceWithCompanyDBResponse>> {
        let row = sqlx::query_as::<_, InvoiceWithCompanyDBResponse>(
            r#"
            SELECT i.id, i.amt, i.paid, i.add_date, i.paid_date, c.code, c.name, c.description
            FROM invoices AS i
            JOIN companies AS c ON i.comp_code = c.code
            WHERE i.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices").fetch_one(&mut *self.db).await?;

        Ok(count)
    }
}
