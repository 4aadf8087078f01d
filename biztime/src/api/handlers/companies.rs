use crate::AppState;
use crate::api::models::{
    DeletedResponse,
    companies::{CompanyCreate, CompanyEnvelope, CompanyListResponse, CompanyUpdate},
};
use crate::db::errors::DbError;
use crate::db::handlers::{Companies, Repository};
use crate::db::models::companies::{CompanyCreateDBRequest, CompanyUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::CompanyCode;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};

fn company_not_found(code: CompanyCode) -> Error {
    Error::NotFound {
        resource: "Company".to_string(),
        id: code,
    }
}

#[utoipa::path(
    get,
    path = "/companies",
    tag = "companies",
    summary = "List companies",
    responses(
        (status = 200, description = "All companies, code and name only", body = CompanyListResponse),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_companies(State(state): State<AppState>) -> Result<Json<CompanyListResponse>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Companies::new(&mut pool_conn);

    let companies = repo.list().await?;
    Ok(Json(CompanyListResponse {
        companies: companies.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/companies/{code}",
    tag = "companies",
    summary = "Get company",
    responses(
        (status = 200, description = "Company details", body = CompanyEnvelope),
        (status = 404, description = "Company not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("code" = String, Path, description = "Company code")
    )
)]
#[tracing::instrument(skip_all, fields(code = %code))]
pub async fn get_company(State(state): State<AppState>, Path(code): Path<CompanyCode>) -> Result<Json<CompanyEnvelope>> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Companies::new(&mut pool_conn);

    match repo.get_by_id(code.clone()).await? {
        Some(company) => Ok(Json(CompanyEnvelope::from(company))),
        None => Err(company_not_found(code)),
    }
}

#[utoipa::path(
    post,
    path = "/companies",
    tag = "companies",
    summary = "Create company",
    request_body = CompanyCreate,
    responses(
        (status = 201, description = "Company created", body = CompanyEnvelope),
        (status = 400, description = "A required field is missing or the body is not JSON"),
        (status = 409, description = "A company with this code already exists"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_company(
    State(state): State<AppState>,
    body: std::result::Result<Json<CompanyCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<CompanyEnvelope>)> {
    let Json(create) = body?;
    let request = CompanyCreateDBRequest::try_from(create)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Companies::new(&mut pool_conn);

    let company = repo.create(&request).await?;
    tracing::info!(code = %company.code, "Created company");
    Ok((StatusCode::CREATED, Json(CompanyEnvelope::from(company))))
}

#[utoipa::path(
    put,
    path = "/companies/{code}",
    tag = "companies",
    summary = "Update company",
    request_body = CompanyUpdate,
    responses(
        (status = 200, description = "Company updated", body = CompanyEnvelope),
        (status = 400, description = "A required field is missing or the body is not JSON"),
        (status = 404, description = "Company not found"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("code" = String, Path, description = "Company code")
    )
)]
#[tracing::instrument(skip_all, fields(code = %code))]
pub async fn update_company(
    State(state): State<AppState>,
    Path(code): Path<CompanyCode>,
    body: std::result::Result<Json<CompanyUpdate>, JsonRejection>,
) -> Result<Json<CompanyEnvelope>> {
    let Json(update) = body?;
    let request = CompanyUpdateDBRequest::try_from(update)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Companies::new(&mut pool_conn);

    match repo.update(code.clone(), &request).await {
        Ok(company) => Ok(Json(CompanyEnvelope::from(company))),
        Err(DbError::NotFound) => Err(company_not_found(code)),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    delete,
    path = "/companies/{code}",
    tag = "companies",
    summary = "Delete company",
    description = "Companies that still have invoices cannot be deleted.",
    responses(
        (status = 200, description = "Company deleted", body = DeletedResponse),
        (status = 404, description = "Company not found"),
        (status = 409, description = "Company still has invoices"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("code" = String, Path, description = "Company code")
    )
)]
#[tracing::instrument(skip_all, fields(code = %code))]
pub async fn delete_company(State(state): State<AppState>, Path(code): Path<CompanyCode>) -> Result<Json<DeletedResponse>> {
    // The invoice count and the delete must see the same snapshot
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let deleted = Companies::new(&mut tx).delete(code.clone()).await?;
    if !deleted {
        return Err(company_not_found(code));
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;
    tracing::info!("Deleted company");
    Ok(Json(DeletedResponse::deleted()))
}

#[cfg(test)]
mod tests {
    use crate::api::models::{
        DeletedResponse,
        companies::{CompanyEnvelope, CompanyListResponse, CompanyResponse},
    };
    use crate::db::handlers::Companies;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::PgPool;

    async fn company_count(pool: &PgPool) -> i64 {
        let mut conn = pool.acquire().await.unwrap();
        Companies::new(&mut conn).count().await.unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_get_delete_company_scenario(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let body = json!({"code": "apple", "name": "Apple", "description": "Maker of iPhone"});

        let response = app.post("/companies").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        response.assert_json(&json!({"company": body}));

        let response = app.get("/companies/apple").await;
        response.assert_status_ok();
        response.assert_json(&json!({"company": body}));

        let response = app.delete("/companies/apple").await;
        response.assert_status_ok();
        let deleted: DeletedResponse = response.json();
        assert_eq!(deleted, DeletedResponse::deleted());

        app.get("/companies/apple").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_companies_omits_description(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "ibm", "IBM").await;
        create_test_company(&pool, "apple", "Apple").await;

        let response = app.get("/companies").await;
        response.assert_status_ok();
        response.assert_json(&json!({
            "companies": [
                {"code": "apple", "name": "Apple"},
                {"code": "ibm", "name": "IBM"}
            ]
        }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_companies_empty(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app.get("/companies").await;
        response.assert_status_ok();
        let list: CompanyListResponse = response.json();
        assert!(list.companies.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_company_is_not_found(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        app.get("/companies/nope").await.assert_status(StatusCode::NOT_FOUND);
        app.put("/companies/nope")
            .json(&json!({"name": "Nope", "description": "Nothing"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.delete("/companies/nope").await.assert_status(StatusCode::NOT_FOUND);

        // Update is not an upsert
        assert_eq!(company_count(&pool).await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_company_missing_fields_is_bad_request(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        for body in [
            json!({"name": "Apple", "description": "Maker of iPhone"}),
            json!({"code": "apple", "description": "Maker of iPhone"}),
            json!({"code": "apple", "name": "Apple"}),
            json!({}),
        ] {
            let response = app.post("/companies").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
        }

        let response = app.post("/companies").json(&json!({"code": "apple"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({"message": "Missing required field(s): name, description"}));

        assert_eq!(company_count(&pool).await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_company_with_empty_strings(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app
            .post("/companies")
            .json(&json!({"code": "blank", "name": "", "description": ""}))
            .await;
        response.assert_status(StatusCode::CREATED);
        assert_eq!(company_count(&pool).await, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_company_rejects_non_json_body(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        app.post("/companies").text("code=apple").await.assert_status(StatusCode::BAD_REQUEST);
        app.post("/companies")
            .content_type("application/json")
            .bytes("{not json".into())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        app.post("/companies")
            .json(&json!({"code": 5, "name": "Five", "description": ""}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        assert_eq!(company_count(&pool).await, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_duplicate_company_is_conflict(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;

        let response = app
            .post("/companies")
            .json(&json!({"code": "apple", "name": "Other", "description": "Other"}))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(company_count(&pool).await, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_company_changes_only_name_and_description(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;

        let response = app
            .put("/companies/apple")
            .json(&json!({"code": "pear", "name": "Apple Inc.", "description": "Maker of Mac"}))
            .await;
        response.assert_status_ok();
        let updated: CompanyEnvelope = response.json();
        let expected = CompanyResponse {
            code: "apple".to_string(),
            name: "Apple Inc.".to_string(),
            description: "Maker of Mac".to_string(),
        };
        assert_eq!(updated.company, expected);

        let fetched: CompanyEnvelope = app.get("/companies/apple").await.json();
        assert_eq!(fetched.company, expected);
        app.get("/companies/pear").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_company_missing_fields_is_bad_request(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;

        let response = app.put("/companies/apple").json(&json!({"name": "Changed"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        // Validation runs before the lookup, so an unknown code is still a 400
        let response = app.put("/companies/nope").json(&json!({"description": "Changed"})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let fetched: CompanyEnvelope = app.get("/companies/apple").await.json();
        assert_eq!(fetched.company.name, "Apple");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_company_with_invoices_is_conflict(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        create_test_company(&pool, "apple", "Apple").await;
        let invoice = create_test_invoice(&pool, "apple", 100).await;

        let response = app.delete("/companies/apple").await;
        response.assert_status(StatusCode::CONFLICT);

        app.get("/companies/apple").await.assert_status_ok();
        app.get(&format!("/invoices/{}", invoice.id)).await.assert_status_ok();
    }
}
