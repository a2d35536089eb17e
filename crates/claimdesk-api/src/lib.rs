//! # claimdesk-api — Axum REST API for the Claims-Management Platform
//!
//! Policyholders register, purchase insurance products, and file
//! claims; administrators approve or deny products, policies, and
//! claims. The approval state machines and ownership-authorization
//! rules live in `claimdesk-core`; this crate wires them to HTTP.
//!
//! ## API Surface
//!
//! | Prefix             | Module                   | Auth            |
//! |--------------------|--------------------------|-----------------|
//! | `/auth/*`          | [`routes::auth`]         | register/login public, rest bearer |
//! | `/products/*`      | [`routes::products`]     | bearer          |
//! | `/policies/*`      | [`routes::policies`]     | bearer          |
//! | `/claims/*`        | [`routes::claims`]       | bearer          |
//! | `/transactions`    | [`routes::transactions`] | bearer          |
//! | `/admin/*`         | [`routes::admin`]        | bearer + admin  |
//! | `/health/*`        | (this module)            | none            |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → AuthMiddleware → Handler
//! ```

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod notify;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes and the register/login endpoints are mounted outside
/// the auth middleware so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let jwt = state.jwt.clone();

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::auth::protected_router())
        .merge(routes::products::router())
        .merge(routes::policies::router())
        .merge(routes::claims::router())
        .merge(routes::transactions::router())
        .merge(routes::admin::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware));

    // Unauthenticated surface: health probes plus register/login.
    let public = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .merge(routes::auth::public_router());

    Router::new()
        .merge(public)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(jwt))
        .with_state(state)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
