//! # Authentication & Profile API
//!
//! Registration and login are the only unauthenticated write endpoints
//! on the surface. Everything else sits behind the bearer middleware.
//!
//! ## Endpoints
//!
//! - `POST /auth/register` — register a new policyholder
//! - `POST /auth/login` — exchange credentials for a bearer token
//! - `GET /auth/me` — the authenticated profile
//! - `PUT /auth/me` — update name/contact

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use claimdesk_core::Role;

use crate::auth::AuthSubject;
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AccountRecord, AppState};

// ── Request/Response DTOs ───────────────────────────────────────────

/// Request to register a new policyholder.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    /// Unique contact handle (email address or phone number).
    pub contact: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.contact.trim().is_empty() || self.password.is_empty()
        {
            return Err("Missing required fields".to_string());
        }
        Ok(())
    }
}

/// Login credentials.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub contact: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        if self.contact.trim().is_empty() || self.password.is_empty() {
            return Err("Missing credentials".to_string());
        }
        Ok(())
    }
}

/// Request to update the authenticated profile.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub contact: String,
}

impl Validate for UpdateProfileRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() || self.contact.trim().is_empty() {
            return Err("Name and contact are required".to_string());
        }
        Ok(())
    }
}

/// A bearer token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub name: String,
    pub contact: String,
    #[schema(value_type = String)]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&AccountRecord> for ProfileResponse {
    fn from(account: &AccountRecord) -> Self {
        Self {
            id: account.id,
            name: account.name.clone(),
            contact: account.contact.clone(),
            role: account.role,
            created_at: account.created_at,
        }
    }
}

// ── Routers ─────────────────────────────────────────────────────────

/// Routes mounted outside the auth middleware.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes mounted behind the auth middleware.
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/auth/me", get(me).put(update_profile))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /auth/register — Register a new policyholder.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Policyholder registered", body = ProfileResponse),
        (status = 400, description = "Missing required fields", body = crate::error::ErrorBody),
        (status = 409, description = "Contact already registered", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let req = extract_validated_json(body)?;

    // Registration always yields a standard account; only an admin can
    // escalate a role afterwards.
    let record = state.create_account(&req.name, &req.contact, &req.password, Role::Standard)?;

    if let Some(pool) = &state.db_pool {
        if let Err(err) = crate::db::accounts::insert(pool, &record).await {
            state.accounts.remove(&record.id);
            return Err(err.into());
        }
    }

    Ok((StatusCode::CREATED, Json(ProfileResponse::from(&record))))
}

/// POST /auth/login — Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = TokenResponse),
        (status = 400, description = "Missing credentials", body = crate::error::ErrorBody),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let req = extract_validated_json(body)?;

    // Unknown contact and wrong password produce the same message, so
    // login failures don't reveal which accounts exist.
    let account = state
        .account_by_contact(&req.contact)
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

    if !crate::auth::verify_password(&req.password, &account.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let token = state
        .jwt
        .issue_token(account.id, &account.name, account.role)?;
    Ok(Json(TokenResponse { token }))
}

/// GET /auth/me — The authenticated profile.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthenticated", body = crate::error::ErrorBody),
        (status = 404, description = "Account not found", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn me(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> Result<Json<ProfileResponse>, AppError> {
    state
        .accounts
        .get(&subject.id)
        .map(|a| Json(ProfileResponse::from(&a)))
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// PUT /auth/me — Update the authenticated profile.
#[utoipa::path(
    put,
    path = "/auth/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Missing fields", body = crate::error::ErrorBody),
        (status = 409, description = "Contact already in use", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn update_profile(
    State(state): State<AppState>,
    subject: AuthSubject,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ProfileResponse>, AppError> {
    let req = extract_validated_json(body)?;

    if state
        .accounts
        .find(|a| a.contact == req.contact && a.id != subject.id)
        .is_some()
    {
        return Err(AppError::Conflict("Contact already in use".to_string()));
    }

    let previous = state
        .accounts
        .get(&subject.id)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let updated = state
        .accounts
        .update(&subject.id, |a| {
            a.name = req.name.clone();
            a.contact = req.contact.clone();
        })
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(pool) = &state.db_pool {
        if let Err(err) =
            crate::db::accounts::update_profile(pool, subject.id, &updated.name, &updated.contact)
                .await
        {
            state.accounts.insert(previous.id, previous);
            return Err(err.into());
        }
    }

    Ok(Json(ProfileResponse::from(&updated)))
}
