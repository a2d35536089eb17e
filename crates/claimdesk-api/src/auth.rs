//! # Authentication & Authorization
//!
//! Bearer-token middleware with role-gated access control.
//!
//! ## Token Format
//!
//! Tokens are HS256 JWTs carrying the subject id, display name, role,
//! issued-at, and expiry. They are issued by `POST /auth/login` and
//! verified by [`auth_middleware`] on every authenticated route.
//!
//! ## AuthSubject
//!
//! Every authenticated request gets an [`AuthSubject`] injected into the
//! request extensions. Handlers extract it via the `FromRequestParts`
//! impl, giving every lifecycle operation a single normalized
//! `{id, role}` view of the caller.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use claimdesk_core::Role;

use crate::error::{AppError, ErrorBody};

// ── Claims ──────────────────────────────────────────────────────────

/// JWT claims carried by every issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account id.
    pub sub: Uuid,
    /// Display name, for client convenience.
    pub name: String,
    /// The subject's role at issue time.
    pub role: Role,
    /// Issued-at (Unix seconds).
    pub iat: i64,
    /// Expiry (Unix seconds).
    pub exp: i64,
}

// ── AuthSubject ─────────────────────────────────────────────────────

/// Identity of the authenticated caller, extracted from the verified
/// token and available to all route handlers via `FromRequestParts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSubject {
    /// The caller's account id.
    pub id: Uuid,
    /// The caller's role.
    pub role: Role,
}

impl AuthSubject {
    /// Whether the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role >= Role::Admin
    }
}

/// Extracts the identity that the auth middleware injected into
/// extensions. Returns 401 if no identity is present (middleware didn't
/// run or failed).
#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for AuthSubject {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthSubject>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no authenticated subject in request context".into()))
    }
}

/// Check that the caller has at least the required role.
/// Returns 403 Forbidden if the caller's role is insufficient.
pub fn require_role(subject: &AuthSubject, minimum: Role) -> Result<(), AppError> {
    if subject.role >= minimum {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role '{}' required, caller has '{}'",
            minimum.as_str(),
            subject.role.as_str()
        )))
    }
}

// ── Token Issuance & Verification ───────────────────────────────────

/// JWT signing/verification keys plus the configured token lifetime.
///
/// Custom `Debug` omits the key material to prevent credential leakage
/// in logs.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    /// Build keys from a shared secret and a token lifetime in seconds.
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issue a signed token for the given account.
    pub fn issue_token(&self, id: Uuid, name: &str, role: Role) -> Result<String, AppError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: id,
            name: name.to_string(),
            role,
            iat: now,
            exp: now + self.ttl_secs,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token encoding failed: {e}")))
    }

    /// Verify a token and return the authenticated subject.
    ///
    /// Expiry is surfaced with a distinct message so clients can prompt
    /// for re-login instead of treating the token as corrupt.
    pub fn verify_token(&self, token: &str) -> Result<AuthSubject, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 5;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("token expired".into())
                }
                _ => AppError::Unauthorized("invalid token".into()),
            }
        })?;

        Ok(AuthSubject {
            id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

// ── Password Hashing ────────────────────────────────────────────────

/// Hash a plain password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
    use argon2::Argon2;

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against an argon2id hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::password_hash::{PasswordHash, PasswordVerifier};
    use argon2::Argon2;

    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// ── Middleware ──────────────────────────────────────────────────────

/// Extract and verify the Bearer token from the Authorization header.
///
/// On success, injects the [`AuthSubject`] into request extensions for
/// downstream handlers. On failure, short-circuits with a 401 and the
/// standard error body.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let keys = match request.extensions().get::<JwtKeys>().cloned() {
        Some(keys) => keys,
        None => {
            tracing::error!("JwtKeys extension missing — auth middleware misconfigured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "An internal error occurred".to_string(),
                }),
            )
                .into_response();
        }
    };

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(header_value) if header_value.starts_with("Bearer ") => {
            match keys.verify_token(&header_value[7..]) {
                Ok(subject) => {
                    request.extensions_mut().insert(subject);
                    next.run(request).await
                }
                Err(err) => {
                    tracing::warn!(reason = %err, "authentication failed: token rejected");
                    unauthorized_response(&err.to_string())
                }
            }
        }
        Some(_) => {
            tracing::warn!("authentication failed: non-Bearer authorization scheme");
            unauthorized_response("authorization header must use Bearer scheme")
        }
        None => unauthorized_response("missing authorization header"),
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
