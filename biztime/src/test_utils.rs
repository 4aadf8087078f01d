//! Test utilities for integration testing (available with `test-utils` feature).

use crate::config::{Config, DatabaseConfig, PoolSettings};
use crate::db::handlers::{Companies, Invoices, Repository};
use crate::db::models::{
    companies::{CompanyCreateDBRequest, CompanyDBResponse},
    invoices::{InvoiceCreateDBRequest, InvoiceDBResponse},
};
use axum_test::TestServer;
use rust_decimal::Decimal;
use sqlx::PgPool;

/// Serve the full router over an already-migrated pool (as handed out by `#[sqlx::test]`).
pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();

    crate::Application::new_with_pool(config, pool)
        .expect("Failed to create application")
        .into_test_server()
}

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: DatabaseConfig {
            // Only read by `Application::new`; tests that call it overwrite this
            url: "postgresql://localhost/biztime_test".to_string(),
            pool: PoolSettings {
                max_connections: 2,
                min_connections: 0,
                ..Default::default()
            },
        },
        ..Default::default()
    }
}

pub async fn create_test_company(pool: &PgPool, code: &str, name: &str) -> CompanyDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Companies::new(&mut conn);

    repo.create(&CompanyCreateDBRequest {
        code: code.to_string(),
        name: name.to_string(),
        description: format!("{name} description"),
    })
    .await
    .expect("Failed to create test company")
}

pub async fn create_test_invoice(pool: &PgPool, comp_code: &str, amt: i64) -> InvoiceDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut repo = Invoices::new(&mut conn);

    repo.create(&InvoiceCreateDBRequest {
        comp_code: comp_code.to_string(),
        amt: Decimal::from(amt),
    })
    .await
    .expect("Failed to create test invoice")
}
