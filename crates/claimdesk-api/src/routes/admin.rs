//! # Admin Console API
//!
//! Role-gated administration: account management, pending review
//! queues, and the approve/deny console for products, policies, and
//! claims. Every decision appends an [`ApprovalRecord`] to the audit
//! store, and policy/claim decisions dispatch a best-effort
//! notification to the owner after the state change commits.
//!
//! ## Endpoints
//!
//! - `GET /admin/users`
//! - `PUT /admin/users/:id` — change an account's role
//! - `GET /admin/pendingPolicies`
//! - `GET /admin/pendingClaims`
//! - `POST /admin/approveProduct/:id`
//! - `POST /admin/approvePolicy/:id`
//! - `POST /admin/approveClaim/:id`

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use claimdesk_core::{Decision, LifecycleError, Role};

use crate::auth::{require_role, AuthSubject};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::notify;
use crate::routes::auth::ProfileResponse;
use crate::state::{AppState, ApprovalRecord, ClaimRecord, PolicyRecord, ProductRecord};

// ── Request/Response DTOs ───────────────────────────────────────────

/// An approve/deny decision. `decision: true` approves.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DecisionRequest {
    pub decision: bool,
    /// Reason for the decision. Required when denying a claim.
    #[serde(default, alias = "rejection_reason")]
    pub reason: Option<String>,
}

/// Request to change an account's role.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    /// `standard` or `admin`.
    pub role: String,
}

impl Validate for UpdateRoleRequest {
    fn validate(&self) -> Result<(), String> {
        if self.role.trim().is_empty() {
            return Err("Missing required field: role".to_string());
        }
        Ok(())
    }
}

/// A pending claim joined with its owner and policy context for review.
#[derive(Debug, Serialize, ToSchema)]
pub struct PendingClaimReview {
    pub claim: ClaimRecord,
    pub policyholder_id: Uuid,
    pub policyholder_name: String,
    pub contact: String,
    pub policy_type: String,
    pub policy_amount: f64,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the admin router. Every handler checks the admin role itself,
/// so a standard caller gets a 403 rather than a 404.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", put(update_role))
        .route("/admin/pendingPolicies", get(pending_policies))
        .route("/admin/pendingClaims", get(pending_claims))
        .route("/admin/approveProduct/:id", post(approve_product))
        .route("/admin/approvePolicy/:id", post(approve_policy))
        .route("/admin/approveClaim/:id", post(approve_claim))
}

/// Append an approval audit record to the store and, best-effort, to
/// the database. Audit persistence failure is logged, not fatal — the
/// decision itself has already committed.
async fn record_approval(
    state: &AppState,
    resource_type: &str,
    resource_id: Uuid,
    admin_id: Uuid,
    decision: Decision,
    reason: Option<String>,
) {
    let record = ApprovalRecord {
        id: Uuid::new_v4(),
        resource_type: resource_type.to_string(),
        resource_id,
        admin_id,
        decision,
        reason,
        created_at: Utc::now(),
    };
    state.approvals.insert(record.id, record.clone());

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::approvals::append(pool, &record).await {
            tracing::error!(error = %err, resource_type, %resource_id, "failed to persist approval record");
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /admin/users — All accounts.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "Accounts", body = Vec<ProfileResponse>),
        (status = 403, description = "Admin privileges required", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
async fn list_users(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> Result<Json<Vec<ProfileResponse>>, AppError> {
    require_role(&subject, Role::Admin)?;

    let mut accounts = state.accounts.list();
    accounts.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(Json(accounts.iter().map(ProfileResponse::from).collect()))
}

/// PUT /admin/users/:id — Change an account's role.
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = ProfileResponse),
        (status = 400, description = "Unknown role", body = crate::error::ErrorBody),
        (status = 403, description = "Admin privileges required", body = crate::error::ErrorBody),
        (status = 404, description = "Account not found", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
async fn update_role(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateRoleRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, AppError> {
    require_role(&subject, Role::Admin)?;
    let req = extract_validated_json(body)?;

    let role = Role::from_name(req.role.trim())
        .ok_or_else(|| AppError::InvalidInput(format!("unknown role '{}'", req.role)))?;

    let previous = state
        .accounts
        .get(&id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let updated = state
        .accounts
        .update(&id, |a| a.role = role)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::accounts::update_role(pool, id, role).await {
            state.accounts.insert(previous.id, previous);
            return Err(err.into());
        }
    }

    Ok(Json(ProfileResponse::from(&updated)))
}

/// GET /admin/pendingPolicies — Policies awaiting a decision, oldest first.
#[utoipa::path(
    get,
    path = "/admin/pendingPolicies",
    responses(
        (status = 200, description = "Pending policies", body = Vec<PolicyRecord>),
        (status = 403, description = "Admin privileges required", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
async fn pending_policies(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> Result<Json<Vec<PolicyRecord>>, AppError> {
    require_role(&subject, Role::Admin)?;

    let mut policies = state
        .policies
        .filter(|p| p.status == claimdesk_core::PolicyStatus::Pending);
    policies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(Json(policies))
}

/// GET /admin/pendingClaims — Claims awaiting a decision, joined with
/// owner and policy context.
#[utoipa::path(
    get,
    path = "/admin/pendingClaims",
    responses(
        (status = 200, description = "Pending claims with context", body = Vec<PendingClaimReview>),
        (status = 403, description = "Admin privileges required", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
async fn pending_claims(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> Result<Json<Vec<PendingClaimReview>>, AppError> {
    require_role(&subject, Role::Admin)?;

    let mut pending = state
        .claims
        .filter(|c| c.status == claimdesk_core::ClaimStatus::Pending);
    pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let reviews = pending
        .into_iter()
        .filter_map(|claim| {
            let policy = state.policies.get(&claim.policy_id)?;
            let owner = state.accounts.get(&policy.policyholder_id)?;
            Some(PendingClaimReview {
                claim,
                policyholder_id: owner.id,
                policyholder_name: owner.name,
                contact: owner.contact,
                policy_type: policy.policy_type,
                policy_amount: policy.amount,
            })
        })
        .collect();

    Ok(Json(reviews))
}

/// POST /admin/approveProduct/:id — Decide a submitted product.
#[utoipa::path(
    post,
    path = "/admin/approveProduct/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Product decided", body = ProductRecord),
        (status = 403, description = "Admin privileges required", body = crate::error::ErrorBody),
        (status = 404, description = "Product not found", body = crate::error::ErrorBody),
        (status = 409, description = "Product already approved", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
async fn approve_product(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<Uuid>,
    body: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<ProductRecord>, AppError> {
    require_role(&subject, Role::Admin)?;
    let req = extract_json(body)?;
    let decision = Decision::from_bool(req.decision);

    let previous = state
        .products
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if previous.is_approved {
        return Err(AppError::Conflict("Product already approved".to_string()));
    }

    // A denied product keeps is_approved = false and may be re-decided
    // after revision; only approval is a one-way gate.
    let updated = if decision.is_approval() {
        let updated = state
            .products
            .update(&id, |p| p.is_approved = true)
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        if let Some(pool) = &state.db_pool {
            if let Err(err) = crate::db::products::set_approved(pool, id, true).await {
                state.products.insert(previous.id, previous);
                return Err(err.into());
            }
        }
        updated
    } else {
        previous
    };

    record_approval(&state, "product", id, subject.id, decision, req.reason).await;

    Ok(Json(updated))
}

/// POST /admin/approvePolicy/:id — Decide a pending policy.
///
/// Re-deciding an already-decided policy returns 409 rather than
/// silently overwriting the earlier decision.
#[utoipa::path(
    post,
    path = "/admin/approvePolicy/{id}",
    params(("id" = Uuid, Path, description = "Policy ID")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Policy decided", body = PolicyRecord),
        (status = 403, description = "Admin privileges required", body = crate::error::ErrorBody),
        (status = 404, description = "Policy not found", body = crate::error::ErrorBody),
        (status = 409, description = "Policy already decided", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
async fn approve_policy(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<Uuid>,
    body: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<PolicyRecord>, AppError> {
    require_role(&subject, Role::Admin)?;
    let req = extract_json(body)?;
    let decision = Decision::from_bool(req.decision);

    let previous = state
        .policies
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Policy not found".to_string()))?;

    // Decide-if-pending runs under one write lock.
    let updated = state
        .policies
        .try_update(&id, |policy| {
            let next = policy.status.decide(decision)?;
            policy.status = next;
            policy.approved_by = Some(subject.id);
            policy.approved_at = Some(Utc::now());
            Ok::<_, LifecycleError>(policy.clone())
        })
        .ok_or_else(|| AppError::NotFound("Policy not found".to_string()))?
        .map_err(AppError::from)?;

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::policies::update_decision(pool, &updated).await {
            state.policies.insert(previous.id, previous);
            return Err(err.into());
        }
    }

    record_approval(&state, "policy", id, subject.id, decision, req.reason).await;
    notify::policy_decided(&state, &updated, decision);

    Ok(Json(updated))
}

/// POST /admin/approveClaim/:id — Decide a pending claim.
///
/// Denial requires a rejection reason; approval ignores it.
#[utoipa::path(
    post,
    path = "/admin/approveClaim/{id}",
    params(("id" = Uuid, Path, description = "Claim ID")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Claim decided", body = ClaimRecord),
        (status = 400, description = "Denial without a reason", body = crate::error::ErrorBody),
        (status = 403, description = "Admin privileges required", body = crate::error::ErrorBody),
        (status = 404, description = "Claim not found", body = crate::error::ErrorBody),
        (status = 409, description = "Claim already decided", body = crate::error::ErrorBody),
    ),
    tag = "admin"
)]
async fn approve_claim(
    State(state): State<AppState>,
    subject: AuthSubject,
    Path(id): Path<Uuid>,
    body: Result<Json<DecisionRequest>, JsonRejection>,
) -> Result<Json<ClaimRecord>, AppError> {
    require_role(&subject, Role::Admin)?;
    let req = extract_json(body)?;
    let decision = Decision::from_bool(req.decision);

    let reason = req.reason.filter(|r| !r.trim().is_empty());
    if !decision.is_approval() && reason.is_none() {
        return Err(AppError::InvalidInput(
            "rejection_reason is required when denying a claim".to_string(),
        ));
    }

    let (previous, policy) = state
        .claim_with_policy(&id)
        .ok_or_else(|| AppError::NotFound("Claim not found".to_string()))?;

    let updated = state
        .claims
        .try_update(&id, |claim| {
            let next = claim.status.decide(decision)?;
            claim.status = next;
            claim.rejection_reason = if decision.is_approval() {
                None
            } else {
                reason.clone()
            };
            claim.approved_by = Some(subject.id);
            claim.approved_at = Some(Utc::now());
            Ok::<_, LifecycleError>(claim.clone())
        })
        .ok_or_else(|| AppError::NotFound("Claim not found".to_string()))?
        .map_err(AppError::from)?;

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::claims::update_status(pool, &updated).await {
            state.claims.insert(previous.id, previous);
            return Err(err.into());
        }
    }

    record_approval(
        &state,
        "claim",
        id,
        subject.id,
        decision,
        updated.rejection_reason.clone(),
    )
    .await;
    notify::claim_decided(&state, &updated, &policy, decision);

    Ok(Json(updated))
}
