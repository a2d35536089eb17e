//! # Product Catalog API
//!
//! Anyone authenticated can browse approved products and submit new
//! ones. Unapproved products are visible only to their creator and
//! admins, and only admins decide approval (see `routes::admin`).
//!
//! ## Endpoints
//!
//! - `GET /products` — approved products, newest first
//! - `POST /products` — submit a product (starts unapproved)
//! - `GET /products/mine` — the caller's submissions, any status
//! - `GET /products/:id` — product details (visibility-gated)
//! - `DELETE /products/:id` — creator or admin only

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use claimdesk_core::validate;

use crate::auth::AuthSubject;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, ProductRecord};

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to submit a new insurance product.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub title: String,
    pub description: String,
    pub coverage_amount: f64,
    pub premium: f64,
    /// Duration in months; 0 means lifetime coverage.
    pub duration_months: i32,
}

impl Validate for CreateProductRequest {
    fn validate(&self) -> Result<(), String> {
        validate::required("title", &self.title).map_err(|e| e.to_string())?;
        validate::required("description", &self.description).map_err(|e| e.to_string())?;
        validate::positive_amount("coverage_amount", self.coverage_amount)
            .map_err(|e| e.to_string())?;
        validate::positive_amount("premium", self.premium).map_err(|e| e.to_string())?;
        if self.duration_months < 0 {
            return Err("duration_months must not be negative".to_string());
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/mine", get(my_products))
        .route("/products/:id", get(get_product).delete(delete_product))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /products — List approved products, newest first.
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "Approved products", body = Vec<ProductRecord>),
    ),
    tag = "products"
)]
async fn list_products(State(state): State<AppState>) -> Json<Vec<ProductRecord>> {
    let mut products = state.products.filter(|p| p.is_approved);
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(products)
}

/// POST /products — Submit a new product.
#[utoipa::path(
    post,
    path = "/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product submitted", body = ProductRecord),
        (status = 400, description = "Missing or invalid fields", body = crate::error::ErrorBody),
    ),
    tag = "products"
)]
async fn create_product(
    State(state): State<AppState>,
    subject: AuthSubject,
    body: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProductRecord>), AppError> {
    let req = extract_validated_json(body)?;

    let record = ProductRecord {
        id: Uuid::new_v4(),
        title: req.title,
        description: req.description,
        coverage_amount: req.coverage_amount,
        premium: req.premium,
        duration_months: req.duration_months,
        is_approved: false,
        created_by: subject.id,
        created_at: Utc::now(),
    };
    state.products.insert(record.id, record.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::products::insert(pool, &record).await {
            state.products.remove(&record.id);
            return Err(err.into());
        }
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /products/mine — The caller's submissions, any approval status.
#[utoipa::path(
    get,
    path = "/products/mine",
    responses(
        (status = 200, description = "Your products", body = Vec<ProductRecord>),
    ),
    tag = "products"
)]
async fn my_products(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> Json<Vec<ProductRecord>> {
    let mut products = state.products.filter(|p| p.created_by == subject.id);
    products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(products)
}

/// GET /products/:id — Product details.
///
/// An unapproved product is visible only to its creator and admins.
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product", body = ProductRecord),
        (status = 403, description = "Unapproved and not yours", body = crate::error::ErrorBody),
        (status = 404, description = "Product not found", body = crate::error::ErrorBody),
    ),
    tag = "products"
)]
async fn get_product(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductRecord>, AppError> {
    let product = state
        .products
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if !product.is_approved && product.created_by != subject.id && !subject.is_admin() {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    Ok(Json(product))
}

/// DELETE /products/:id — Delete a product (creator or admin only).
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 403, description = "Not the creator", body = crate::error::ErrorBody),
        (status = 404, description = "Product not found", body = crate::error::ErrorBody),
    ),
    tag = "products"
)]
async fn delete_product(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let product = state
        .products
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if product.created_by != subject.id && !subject.is_admin() {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    state.products.remove(&id);

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::products::delete(pool, id).await {
            state.products.insert(product.id, product);
            return Err(err.into());
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
