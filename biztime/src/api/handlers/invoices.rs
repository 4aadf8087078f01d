use crate::AppState;
use crate::api::models::{
    DeletedResponse,
    invoices::{InvoiceCreate, InvoiceDetailEnvelope, InvoiceEnvelope, InvoiceListResponse, InvoiceUpdate},
};
use crate::db::errors::DbError;
use crate::db::handlers::{Companies, Invoices, Repository};
use crate::db::models::invoices::{InvoiceCreateDBRequest, InvoiceUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{InvoiceId, parse_invoice_id};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

fn invoice_not_found(id: impl ToString) -> Error {
    Error::NotFound {
        resource: "Invoice".to_string(),
        id: id.to_string(),
    }
}

/// Ids that could never have been issued are reported the same way as ids with no row.
fn invoice_id_from_path(raw: &str) -> Result<InvoiceId> {
    parse_invoice_id(raw).ok_or_else(|| invoice_not_found(raw))
}

#[utoipa::path(
    get,
    path = "/invoices",
    tag = "invoices",
    summary = "List invoices",
    responses(
        (status = 200, description = "All invoices, id and company code only", body = InvoiceListResponse),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_invoices(State(state): State<AppState>) -> Result<Json<InvoiceListResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Invoices::new(&mut pool_conn);

    let invoices = repo.list().await?;
    Ok(Json(InvoiceListResponse {
        invoices: invoices.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/invoices/{id}",
    tag = "invoices",
    summary = "Get invoice",
    description = "Returns the invoice with its company nested under `company`.",
    responses(
        (status = 200, description = "Invoice details", body = InvoiceDetailEnvelope),
        (status = 404, description = "Invoice not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i32, Path, description = "Invoice ID")
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn get_invoice(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<InvoiceDetailEnvelope>> {
    let id = invoice_id_from_path(&id)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Invoices::new(&mut pool_conn);

    match repo.get_with_company(id).await? {
        Some(row) => Ok(Json(InvoiceDetailEnvelope::from(row))),
        None => Err(invoice_not_found(id)),
    }
}

#[utoipa::path(
    post,
    path = "/invoices",
    tag = "invoices",
    summary = "Create invoice",
    description = "Creates an unpaid invoice dated today for an existing company.",
    request_body = InvoiceCreate,
    responses(
        (status = 201, description = "Invoice created", body = InvoiceEnvelope),
        (status = 400, description = "A required field is missing or the body is not JSON"),
        (status = 404, description = "Company not found"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_invoice(
    State(state): State<AppState>,
    body: std::result::Result<Json<InvoiceCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<InvoiceEnvelope>)> {
    let Json(create) = body?;
    let request = InvoiceCreateDBRequest::try_from(create)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    // Hold the company row until commit so a concurrent delete cannot slip in between
    if !Companies::new(&mut tx).lock_for_reference(&request.comp_code).await? {
        return Err(Error::NotFound {
            resource: "Company".to_string(),
            id: request.comp_code,
        });
    }

    let created = Invoices::new(&mut tx).create(&request).await;
    let invoice = match created {
        Ok(invoice) => invoice,
        Err(DbError::NotFound) => {
            return Err(Error::NotFound {
                resource: "Company".to_string(),
                id: request.comp_code,
            });
        }
        Err(e) => return Err(e.into()),
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    tracing::info!(id = invoice.id, comp_code = %invoice.comp_code, "Created invoice");
    Ok((StatusCode::CREATED, Json(InvoiceEnvelope::from(invoice))))
}

#[utoipa::path(
    put,
    path = "/invoices/{id}",
    tag = "invoices",
    summary = "Update invoice",
    description = "Only the amount can change.",
    request_body = InvoiceUpdate,
    responses(
        (status = 200, description = "Invoice updated", body = InvoiceEnvelope),
        (status = 400, description = "The amount is missing or the body is not JSON"),
        (status = 404, description = "Invoice not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i32, Path, description = "Invoice ID")
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<InvoiceUpdate>, JsonRejection>,
) -> Result<Json<InvoiceEnvelope>> {
    let Json(update) = body?;
    let request = InvoiceUpdateDBRequest::try_from(update)?;
    let id = invoice_id_from_path(&id)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Invoices::new(&mut pool_conn);

    match repo.update(id, &request).await {
        Ok(invoice) => Ok(Json(InvoiceEnvelope::from(invoice))),
        Err(DbError::NotFound) => Err(invoice_not_found(id)),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    delete,
    path = "/invoices/{id}",
    tag = "invoices",
    summary = "Delete invoice",
    responses(
        (status = 200, description = "Invoice deleted", body = DeletedResponse),
        (status = 404, description = "Invoice not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = i32, Path, description = "Invoice ID")
    )
)]
#[tracing::instrument(skip_all, fields(id = %id))]
pub async fn delete_invoice(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<DeletedResponse>> {
    let id = invoice_id_from_path(&id)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Invoices::new(&mut pool_conn);

    if repo.delete(id).await? {
        tracing::info!("Deleted invoice");
        Ok(Json(DeletedResponse::deleted()))
    } else {
        Err(invoice_not_found(id))
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::{
        DeletedResponse,
        invoices::{InvoiceDetailEnvelope, InvoiceEnvelope, InvoiceListResponse, InvoiceSummaryResponse},
    };
    use crate::db::handlers::Invoices;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::PgPool;

    async fn invoice_count(pool: &PgPool) -> i64 {
        let mut conn = pool.acquire().await.unwrap();
        Invoices::new(&mut conn).count().await.unwrap()
    }

    async fn today(pool: &PgPool) -> chrono::NaiveDate {
        sqlx::query_scalar("SELECT CURRENT_DATE").fetch_one(pool).await.unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_invoice_uses_defaults(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;

        let response = app.post("/invoices").json(&json!({"comp_code": "apple", "amt": 100})).await;
        response.assert_status(StatusCode::CREATED);

        let created: InvoiceEnvelope = response.json();
        assert!(created.invoice.id > 0);
        assert_eq!(created.invoice.comp_code, "apple");
        assert_eq!(created.invoice.amt, Decimal::new(100, 0));
        assert!(!created.invoice.paid);
        assert_eq!(created.invoice.paid_date, None);
        assert_eq!(created.invoice.add_date, today(&pool).await);

        let raw: serde_json::Value = response.json();
        assert_eq!(raw["invoice"]["amt"], json!(100.0));
        assert_eq!(raw["invoice"]["paid_date"], json!(null));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_invoice_ignores_paid_fields(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;

        let response = app
            .post("/invoices")
            .json(&json!({"comp_code": "apple", "amt": 5, "paid": true, "paid_date": "2020-01-01"}))
            .await;
        response.assert_status(StatusCode::CREATED);

        let created: InvoiceEnvelope = response.json();
        assert!(!created.invoice.paid);
        assert_eq!(created.invoice.paid_date, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_invoice_for_unknown_company_is_not_found(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app.post("/invoices").json(&json!({"comp_code": "ghost", "amt": 10})).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(invoice_count(&pool).await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_invoice_missing_fields_is_bad_request(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;

        app.post("/invoices")
            .json(&json!({"comp_code": "apple"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        app.post("/invoices").json(&json!({"amt": 10})).await.assert_status(StatusCode::BAD_REQUEST);
        app.post("/invoices")
            .json(&json!({"comp_code": "apple", "amt": "ten"}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        // Missing fields win over an unknown company
        let response = app.post("/invoices").json(&json!({"comp_code": "ghost"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"message": "Missing required field(s): amt"}));

        assert_eq!(invoice_count(&pool).await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_invalid_amounts_are_bad_request(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;
        let invoice = create_test_invoice(&pool, "apple", 100).await;

        for amt in [json!(1e11), json!(12.345), json!(0.001), json!("100")] {
            let response = app.post("/invoices").json(&json!({"comp_code": "apple", "amt": amt})).await;
            response.assert_status(StatusCode::BAD_REQUEST);

            let response = app.put(&format!("/invoices/{}", invoice.id)).json(&json!({"amt": amt})).await;
            response.assert_status(StatusCode::BAD_REQUEST);
        }

        let response = app.post("/invoices").json(&json!({"comp_code": "apple", "amt": 12.345})).await;
        response.assert_json(&json!({"message": "amt must have at most 2 decimal places"}));

        assert_eq!(invoice_count(&pool).await, 1);
        let detail: InvoiceDetailEnvelope = app.get(&format!("/invoices/{}", invoice.id)).await.json();
        assert_eq!(detail.invoice.amt, Decimal::new(100, 0));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_amount_limits_are_stored_exactly(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;

        let response = app
            .post("/invoices")
            .json(&json!({"comp_code": "apple", "amt": 9999999999.99}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: InvoiceEnvelope = response.json();
        assert_eq!(created.invoice.amt, Decimal::new(999_999_999_999, 2));

        let response = app
            .put(&format!("/invoices/{}", created.invoice.id))
            .json(&json!({"amt": 0.01}))
            .await;
        response.assert_status_ok();
        let updated: InvoiceEnvelope = response.json();
        assert_eq!(updated.invoice.amt, Decimal::new(1, 2));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_invoices(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;
        create_test_company(&pool, "ibm", "IBM").await;
        let first = create_test_invoice(&pool, "apple", 100).await;
        let second = create_test_invoice(&pool, "ibm", 200).await;

        let response = app.get("/invoices").await;
        response.assert_status_ok();
        let list: InvoiceListResponse = response.json();
        assert_eq!(
            list.invoices,
            vec![
                InvoiceSummaryResponse {
                    id: first.id,
                    comp_code: "apple".to_string()
                },
                InvoiceSummaryResponse {
                    id: second.id,
                    comp_code: "ibm".to_string()
                },
            ]
        );

        let raw: serde_json::Value = response.json();
        let entry = raw["invoices"][0].as_object().unwrap();
        assert_eq!(entry.len(), 2);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_invoice_nests_company(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;
        let invoice = create_test_invoice(&pool, "apple", 100).await;

        let response = app.get(&format!("/invoices/{}", invoice.id)).await;
        response.assert_status_ok();

        let detail: InvoiceDetailEnvelope = response.json();
        assert_eq!(detail.invoice.id, invoice.id);
        assert_eq!(detail.invoice.company.code, "apple");
        assert_eq!(detail.invoice.company.name, "Apple");

        let raw: serde_json::Value = response.json();
        let object = raw["invoice"].as_object().unwrap();
        assert!(!object.contains_key("comp_code"));
        assert!(!object.contains_key("name"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_invalid_invoice_ids_are_not_found(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        for id in ["999999", "abc", "0", "-1"] {
            app.get(&format!("/invoices/{id}")).await.assert_status(StatusCode::NOT_FOUND);
            app.put(&format!("/invoices/{id}"))
                .json(&json!({"amt": 1}))
                .await
                .assert_status(StatusCode::NOT_FOUND);
            app.delete(&format!("/invoices/{id}")).await.assert_status(StatusCode::NOT_FOUND);
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_invoice_changes_only_amount(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;
        create_test_company(&pool, "ibm", "IBM").await;
        let invoice = create_test_invoice(&pool, "apple", 100).await;

        let response = app
            .put(&format!("/invoices/{}", invoice.id))
            .json(&json!({"amt": 250.75, "comp_code": "ibm", "paid": true}))
            .await;
        response.assert_status_ok();

        let updated: InvoiceEnvelope = response.json();
        assert_eq!(updated.invoice.id, invoice.id);
        assert_eq!(updated.invoice.amt, Decimal::new(25075, 2));
        assert_eq!(updated.invoice.comp_code, "apple");
        assert!(!updated.invoice.paid);
        assert_eq!(updated.invoice.add_date, invoice.add_date);
        assert_eq!(updated.invoice.paid_date, None);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_invoice_without_amount_is_bad_request(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;
        let invoice = create_test_invoice(&pool, "apple", 100).await;

        let response = app.put(&format!("/invoices/{}", invoice.id)).json(&json!({})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let detail: InvoiceDetailEnvelope = app.get(&format!("/invoices/{}", invoice.id)).await.json();
        assert_eq!(detail.invoice.amt, Decimal::new(100, 0));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_invoice(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;
        let invoice = create_test_invoice(&pool, "apple", 100).await;

        let response = app.delete(&format!("/invoices/{}", invoice.id)).await;
        response.assert_status_ok();
        let deleted: DeletedResponse = response.json();
        assert_eq!(deleted, DeletedResponse::deleted());

        app.get(&format!("/invoices/{}", invoice.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.delete(&format!("/invoices/{}", invoice.id))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        // The company is free to go once its invoices are gone
        app.delete("/companies/apple").await.assert_status_ok();
    }
}
