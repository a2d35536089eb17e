//! # Claim API
//!
//! Claims attach to approved policies owned by the caller. Creation
//! enforces three invariants in one pass: the policy must be reachable
//! (exists, owned, approved), the amount must fit within coverage, and
//! at most one claim may exist per policy — the duplicate scan and the
//! insert run under a single write lock.
//!
//! ## Endpoints
//!
//! - `POST /claims` — file a claim
//! - `GET /claims` — claims on the caller's policies
//! - `GET /claims/:id` — owner-scoped read
//! - `PUT /claims/:id` — status transition per the lifecycle table
//! - `DELETE /claims/:id` — owner-scoped delete

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use claimdesk_core::{validate, ClaimStatus, PolicyStatus};

use crate::auth::AuthSubject;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, ClaimRecord};

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to file a claim against a policy.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClaimRequest {
    pub policy_id: Uuid,
    pub amount: f64,
    pub description: Option<String>,
}

impl Validate for CreateClaimRequest {
    fn validate(&self) -> Result<(), String> {
        validate::positive_amount("amount", self.amount).map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Request to move a claim along its lifecycle.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateClaimStatusRequest {
    /// Target status: one of `pending`, `approved`, `denied`, `paid`.
    pub status: String,
}

impl Validate for UpdateClaimStatusRequest {
    fn validate(&self) -> Result<(), String> {
        if self.status.trim().is_empty() {
            return Err("Missing required field: status".to_string());
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the claims router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/claims", get(list_claims).post(create_claim))
        .route(
            "/claims/:id",
            get(get_claim).put(update_claim_status).delete(delete_claim),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /claims — File a claim.
#[utoipa::path(
    post,
    path = "/claims",
    request_body = CreateClaimRequest,
    responses(
        (status = 201, description = "Claim filed, pending review", body = ClaimRecord),
        (status = 400, description = "Invalid amount or over coverage", body = crate::error::ErrorBody),
        (status = 404, description = "Policy not found or not approved", body = crate::error::ErrorBody),
        (status = 409, description = "A claim already exists for this policy", body = crate::error::ErrorBody),
    ),
    tag = "claims"
)]
async fn create_claim(
    State(state): State<AppState>,
    subject: AuthSubject,
    body: Result<Json<CreateClaimRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ClaimRecord>), AppError> {
    let req = extract_validated_json(body)?;

    // A policy that is absent, owned by someone else, or not yet
    // approved looks the same to the caller: not found.
    let policy = state
        .policies
        .get(&req.policy_id)
        .filter(|p| p.policyholder_id == subject.id || subject.is_admin())
        .filter(|p| p.status == PolicyStatus::Approved)
        .ok_or_else(|| AppError::NotFound("Policy not found or not approved".to_string()))?;

    validate::claim_within_coverage(req.amount, policy.amount)?;

    let record = ClaimRecord {
        id: Uuid::new_v4(),
        policy_id: policy.id,
        amount: req.amount,
        description: req.description,
        status: ClaimStatus::Pending,
        rejection_reason: None,
        approved_by: None,
        approved_at: None,
        created_at: Utc::now(),
    };

    // One claim per policy: the scan and insert share a write lock.
    let record = state
        .claims
        .try_insert(record.id, record, |c| c.policy_id == policy.id)
        .map_err(|_| {
            AppError::Conflict("A claim already exists for this policy".to_string())
        })?;

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::claims::insert(pool, &record).await {
            state.claims.remove(&record.id);
            return Err(err.into());
        }
    }

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /claims — Claims on the caller's policies (admin: all).
#[utoipa::path(
    get,
    path = "/claims",
    responses(
        (status = 200, description = "Claims", body = Vec<ClaimRecord>),
    ),
    tag = "claims"
)]
async fn list_claims(State(state): State<AppState>, subject: AuthSubject) -> Json<Vec<ClaimRecord>> {
    let mut claims = if subject.is_admin() {
        state.claims.list()
    } else {
        let owned: Vec<Uuid> = state
            .policies
            .filter(|p| p.policyholder_id == subject.id)
            .into_iter()
            .map(|p| p.id)
            .collect();
        state.claims.filter(|c| owned.contains(&c.policy_id))
    };
    claims.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(claims)
}

/// GET /claims/:id — Owner-scoped read.
#[utoipa::path(
    get,
    path = "/claims/{id}",
    params(("id" = Uuid, Path, description = "Claim ID")),
    responses(
        (status = 200, description = "Claim", body = ClaimRecord),
        (status = 404, description = "Claim not found", body = crate::error::ErrorBody),
    ),
    tag = "claims"
)]
async fn get_claim(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimRecord>, AppError> {
    state
        .claim_with_policy(&id)
        .filter(|(_, policy)| policy.policyholder_id == subject.id || subject.is_admin())
        .map(|(claim, _)| Json(claim))
        .ok_or_else(|| AppError::NotFound("Claim not found".to_string()))
}

/// PUT /claims/:id — Move a claim along its lifecycle.
///
/// The transition table is the single source of truth: anything not in
/// it is a 400, regardless of who asks.
#[utoipa::path(
    put,
    path = "/claims/{id}",
    params(("id" = Uuid, Path, description = "Claim ID")),
    request_body = UpdateClaimStatusRequest,
    responses(
        (status = 200, description = "Claim updated", body = ClaimRecord),
        (status = 400, description = "Illegal status transition", body = crate::error::ErrorBody),
        (status = 403, description = "Not the owner", body = crate::error::ErrorBody),
        (status = 404, description = "Claim not found", body = crate::error::ErrorBody),
    ),
    tag = "claims"
)]
async fn update_claim_status(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateClaimStatusRequest>, JsonRejection>,
) -> Result<Json<ClaimRecord>, AppError> {
    let req = extract_validated_json(body)?;

    let (_, policy) = state
        .claim_with_policy(&id)
        .ok_or_else(|| AppError::NotFound("Claim not found".to_string()))?;

    if policy.policyholder_id != subject.id && !subject.is_admin() {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let target = ClaimStatus::from_name(req.status.trim()).ok_or_else(|| {
        AppError::InvalidInput(format!("unknown claim status '{}'", req.status))
    })?;

    let previous = state
        .claims
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Claim not found".to_string()))?;

    // Validate-and-write under one lock so concurrent updates cannot
    // both observe the same starting status.
    let updated = state
        .claims
        .try_update(&id, |claim| {
            let next = claim.status.transition(target)?;
            claim.status = next;
            Ok::<_, claimdesk_core::LifecycleError>(claim.clone())
        })
        .ok_or_else(|| AppError::NotFound("Claim not found".to_string()))?
        .map_err(AppError::from)?;

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::claims::update_status(pool, &updated).await {
            state.claims.insert(previous.id, previous);
            return Err(err.into());
        }
    }

    Ok(Json(updated))
}

/// DELETE /claims/:id — Delete a claim.
#[utoipa::path(
    delete,
    path = "/claims/{id}",
    params(("id" = Uuid, Path, description = "Claim ID")),
    responses(
        (status = 204, description = "Claim deleted"),
        (status = 404, description = "Claim not found", body = crate::error::ErrorBody),
    ),
    tag = "claims"
)]
async fn delete_claim(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let claim = state
        .claim_with_policy(&id)
        .filter(|(_, policy)| policy.policyholder_id == subject.id || subject.is_admin())
        .map(|(claim, _)| claim)
        .ok_or_else(|| AppError::NotFound("Claim not found".to_string()))?;

    state.claims.remove(&id);

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::claims::delete(pool, id).await {
            state.claims.insert(claim.id, claim);
            return Err(err.into());
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
