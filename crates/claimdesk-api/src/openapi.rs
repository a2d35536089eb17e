//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "claimdesk API",
        version = "0.3.2",
        description = "Claims-management REST API: policyholder registration, product catalog, policy purchases, claim filing, and the admin approval console.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Auth
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::auth::update_profile,
        // Products
        crate::routes::products::list_products,
        crate::routes::products::create_product,
        crate::routes::products::my_products,
        crate::routes::products::get_product,
        crate::routes::products::delete_product,
        // Policies
        crate::routes::policies::create_policy,
        crate::routes::policies::purchase_policy,
        crate::routes::policies::list_policies,
        crate::routes::policies::get_policy,
        crate::routes::policies::delete_policy,
        // Claims
        crate::routes::claims::create_claim,
        crate::routes::claims::list_claims,
        crate::routes::claims::get_claim,
        crate::routes::claims::update_claim_status,
        crate::routes::claims::delete_claim,
        // Transactions
        crate::routes::transactions::list_transactions,
        // Admin
        crate::routes::admin::list_users,
        crate::routes::admin::update_role,
        crate::routes::admin::pending_policies,
        crate::routes::admin::pending_claims,
        crate::routes::admin::approve_product,
        crate::routes::admin::approve_policy,
        crate::routes::admin::approve_claim,
    ),
    components(schemas(
        // State record types
        crate::state::ProductRecord,
        crate::state::PolicyRecord,
        crate::state::ClaimRecord,
        crate::state::TransactionRecord,
        crate::state::ApprovalRecord,
        // Error type
        crate::error::ErrorBody,
        // Auth DTOs
        crate::routes::auth::RegisterRequest,
        crate::routes::auth::LoginRequest,
        crate::routes::auth::UpdateProfileRequest,
        crate::routes::auth::TokenResponse,
        crate::routes::auth::ProfileResponse,
        // Product DTOs
        crate::routes::products::CreateProductRequest,
        // Policy DTOs
        crate::routes::policies::CreatePolicyRequest,
        crate::routes::policies::PurchasePolicyRequest,
        // Claim DTOs
        crate::routes::claims::CreateClaimRequest,
        crate::routes::claims::UpdateClaimStatusRequest,
        // Admin DTOs
        crate::routes::admin::DecisionRequest,
        crate::routes::admin::UpdateRoleRequest,
        crate::routes::admin::PendingClaimReview,
    )),
    tags(
        (name = "auth", description = "Registration, login, and profile"),
        (name = "products", description = "Insurance product catalog"),
        (name = "policies", description = "Policy lifecycle"),
        (name = "claims", description = "Claim lifecycle"),
        (name = "transactions", description = "Purchase history"),
        (name = "admin", description = "Approval console and account administration"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
