//! # Policy API
//!
//! Two creation paths produce the same unified policy record: direct
//! attributes, or purchase of an approved product (coverage and premium
//! derived from the product, plus an appended transaction). Both start
//! `pending` and wait for an admin decision.
//!
//! ## Endpoints
//!
//! - `POST /policies` — create from attributes
//! - `POST /policies/purchase` — purchase an approved product
//! - `GET /policies` — the caller's policies (admin: all)
//! - `GET /policies/:id` — owner-scoped read
//! - `DELETE /policies/:id` — owner or admin

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use claimdesk_core::{validate, PolicyStatus};

use crate::auth::AuthSubject;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, PolicyRecord, TransactionRecord};

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to create a policy from direct attributes.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePolicyRequest {
    /// Kind of coverage, e.g. "health".
    pub policy_type: String,
    /// Coverage amount — the limit claims are validated against.
    pub amount: f64,
    /// ISO date, `YYYY-MM-DD`.
    pub start_date: String,
    /// ISO date, `YYYY-MM-DD`. Open-ended when absent.
    pub end_date: Option<String>,
    /// Create on behalf of another policyholder. Admin only.
    pub policyholder_id: Option<Uuid>,
}

impl Validate for CreatePolicyRequest {
    fn validate(&self) -> Result<(), String> {
        validate::required("policy_type", &self.policy_type).map_err(|e| e.to_string())?;
        validate::required("start_date", &self.start_date).map_err(|e| e.to_string())?;
        validate::positive_amount("amount", self.amount).map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Request to purchase an approved product.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchasePolicyRequest {
    pub product_id: Uuid,
    /// ISO date, `YYYY-MM-DD`.
    pub start_date: String,
    /// ISO date, `YYYY-MM-DD`.
    pub end_date: String,
}

impl Validate for PurchasePolicyRequest {
    fn validate(&self) -> Result<(), String> {
        validate::required("start_date", &self.start_date).map_err(|e| e.to_string())?;
        validate::required("end_date", &self.end_date).map_err(|e| e.to_string())?;
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the policies router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/policies", get(list_policies).post(create_policy))
        .route("/policies/purchase", post(purchase_policy))
        .route("/policies/:id", get(get_policy).delete(delete_policy))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /policies — Create a policy from direct attributes.
#[utoipa::path(
    post,
    path = "/policies",
    request_body = CreatePolicyRequest,
    responses(
        (status = 201, description = "Policy created, pending approval", body = PolicyRecord),
        (status = 400, description = "Missing fields or bad dates", body = crate::error::ErrorBody),
        (status = 403, description = "policyholder_id requires admin", body = crate::error::ErrorBody),
        (status = 404, description = "Policyholder not found", body = crate::error::ErrorBody),
    ),
    tag = "policies"
)]
async fn create_policy(
    State(state): State<AppState>,
    subject: AuthSubject,
    body: Result<Json<CreatePolicyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PolicyRecord>), AppError> {
    let req = extract_validated_json(body)?;

    let start_date = validate::parse_date("start_date", &req.start_date)?;
    let end_date = req
        .end_date
        .as_deref()
        .map(|raw| validate::parse_date("end_date", raw))
        .transpose()?;
    validate::date_range(start_date, end_date)?;

    // Creating coverage for someone else is an admin operation.
    let owner_id = match req.policyholder_id {
        Some(other) if other != subject.id => {
            if !subject.is_admin() {
                return Err(AppError::Forbidden(
                    "only admins may create policies for other policyholders".to_string(),
                ));
            }
            if !state.accounts.contains(&other) {
                return Err(AppError::NotFound("Policyholder not found".to_string()));
            }
            other
        }
        _ => subject.id,
    };

    let record = PolicyRecord {
        id: Uuid::new_v4(),
        policyholder_id: owner_id,
        product_id: None,
        policy_type: req.policy_type,
        amount: req.amount,
        start_date,
        end_date,
        status: PolicyStatus::Pending,
        approved_by: None,
        approved_at: None,
        created_at: Utc::now(),
    };
    state.policies.insert(record.id, record.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::policies::insert(pool, &record).await {
            state.policies.remove(&record.id);
            return Err(err.into());
        }
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /policies/purchase — Purchase an approved product.
///
/// Appends a `purchase` transaction as a side effect.
#[utoipa::path(
    post,
    path = "/policies/purchase",
    request_body = PurchasePolicyRequest,
    responses(
        (status = 201, description = "Policy created, pending approval", body = PolicyRecord),
        (status = 400, description = "Missing fields or bad dates", body = crate::error::ErrorBody),
        (status = 404, description = "Product not found or not approved", body = crate::error::ErrorBody),
    ),
    tag = "policies"
)]
async fn purchase_policy(
    State(state): State<AppState>,
    subject: AuthSubject,
    body: Result<Json<PurchasePolicyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PolicyRecord>), AppError> {
    let req = extract_validated_json(body)?;

    let start_date = validate::parse_date("start_date", &req.start_date)?;
    let end_date = validate::parse_date("end_date", &req.end_date)?;
    validate::date_range(start_date, Some(end_date))?;

    // Only approved products are purchasable; an unapproved product is
    // indistinguishable from an absent one.
    let product = state
        .products
        .get(&req.product_id)
        .filter(|p| p.is_approved)
        .ok_or_else(|| AppError::NotFound("Product not found or not approved".to_string()))?;

    let now = Utc::now();
    let record = PolicyRecord {
        id: Uuid::new_v4(),
        policyholder_id: subject.id,
        product_id: Some(product.id),
        policy_type: product.title.clone(),
        amount: product.coverage_amount,
        start_date,
        end_date: Some(end_date),
        status: PolicyStatus::Pending,
        approved_by: None,
        approved_at: None,
        created_at: now,
    };
    state.policies.insert(record.id, record.clone());

    let transaction = TransactionRecord {
        id: Uuid::new_v4(),
        account_id: subject.id,
        product_id: product.id,
        product_title: product.title.clone(),
        amount: product.premium,
        transaction_type: "purchase".to_string(),
        status: "completed".to_string(),
        created_at: now,
    };
    state.transactions.insert(transaction.id, transaction.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::policies::insert(pool, &record).await {
            state.policies.remove(&record.id);
            state.transactions.remove(&transaction.id);
            return Err(err.into());
        }
        if let Err(err) = crate::db::transactions::insert(pool, &transaction).await {
            // The policy itself committed; losing the audit row is
            // logged, not fatal to the purchase.
            tracing::error!(error = %err, policy_id = %record.id, "failed to persist purchase transaction");
        }
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /policies — The caller's policies (admin: all).
#[utoipa::path(
    get,
    path = "/policies",
    responses(
        (status = 200, description = "Policies", body = Vec<PolicyRecord>),
    ),
    tag = "policies"
)]
async fn list_policies(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> Json<Vec<PolicyRecord>> {
    let mut policies = if subject.is_admin() {
        state.policies.list()
    } else {
        state.policies.filter(|p| p.policyholder_id == subject.id)
    };
    policies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(policies)
}

/// GET /policies/:id — Owner-scoped read.
///
/// A policy owned by someone else is reported absent, never forbidden,
/// so existence does not leak to non-owners.
#[utoipa::path(
    get,
    path = "/policies/{id}",
    params(("id" = Uuid, Path, description = "Policy ID")),
    responses(
        (status = 200, description = "Policy", body = PolicyRecord),
        (status = 404, description = "Policy not found", body = crate::error::ErrorBody),
    ),
    tag = "policies"
)]
async fn get_policy(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<Uuid>,
) -> Result<Json<PolicyRecord>, AppError> {
    state
        .policies
        .get(&id)
        .filter(|p| p.policyholder_id == subject.id || subject.is_admin())
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Policy not found".to_string()))
}

/// DELETE /policies/:id — Delete a policy and its claims.
#[utoipa::path(
    delete,
    path = "/policies/{id}",
    params(("id" = Uuid, Path, description = "Policy ID")),
    responses(
        (status = 204, description = "Policy deleted"),
        (status = 403, description = "Not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "Policy not found", body = crate::error::ErrorBody),
    ),
    tag = "policies"
)]
async fn delete_policy(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let policy = state
        .policies
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Policy not found".to_string()))?;

    if policy.policyholder_id != subject.id && !subject.is_admin() {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    state.policies.remove(&id);
    // Claims are reachable only through their policy; removing the
    // policy removes them, mirroring the ON DELETE CASCADE in storage.
    for claim in state.claims.filter(|c| c.policy_id == id) {
        state.claims.remove(&claim.id);
    }

    if let Some(pool) = &state.db_pool {
        crate::db::policies::delete(pool, id).await?;
    }

    Ok(StatusCode::NO_CONTENT)
}
