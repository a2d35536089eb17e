//! # Integration Tests for claimdesk-api
//!
//! Drives the full router through `tower::ServiceExt::oneshot`:
//! registration/login flows, ownership scoping, the policy and claim
//! approval state machines, duplicate-claim prevention, amount-vs-limit
//! validation, and the admin console. No database or network required.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use claimdesk_api::state::{AppConfig, AppState};
use claimdesk_core::Role;

/// Helper: build the test app over a fresh in-memory state.
fn test_state() -> AppState {
    AppState::new()
}

fn test_app(state: &AppState) -> axum::Router {
    claimdesk_api::app(state.clone())
}

/// Helper: send a request and return (status, parsed JSON body).
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Helper: register a policyholder and log in. Returns (account id, token).
async fn register_and_login(app: &axum::Router, name: &str, contact: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "name": name, "contact": contact, "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "contact": contact, "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    (id, body["token"].as_str().unwrap().to_string())
}

/// Helper: seed an admin directly in state and log in.
async fn admin_token(state: &AppState, app: &axum::Router) -> String {
    state
        .create_account("Root Admin", "admin@claimdesk.example", "rootpw", Role::Admin)
        .unwrap();
    let (status, body) = send(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "contact": "admin@claimdesk.example", "password": "rootpw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// Helper: create a direct policy and have the admin approve it.
/// Returns the policy id.
async fn approved_policy(
    app: &axum::Router,
    user_token: &str,
    admin_token: &str,
    amount: f64,
) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/policies",
        Some(user_token),
        Some(json!({
            "policy_type": "health",
            "amount": amount,
            "start_date": "2024-01-01",
            "end_date": "2030-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "policy create failed: {body}");
    let policy_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        "POST",
        &format!("/admin/approvePolicy/{policy_id}"),
        Some(admin_token),
        Some(json!({ "decision": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "policy approval failed: {body}");
    assert_eq!(body["status"], "approved");

    policy_id
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_health_probes_are_public() {
    let state = test_state();
    let app = test_app(&state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health/liveness")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// -- Registration & Login -----------------------------------------------------

#[tokio::test]
async fn test_register_login_me_flow() {
    let state = test_state();
    let app = test_app(&state);

    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "name": "Jane", "contact": "555-0100", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Jane");
    assert_eq!(body["contact"], "555-0100");
    assert_eq!(body["role"], "standard");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "contact": "555-0100", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Jane");
}

#[tokio::test]
async fn test_register_duplicate_contact_conflicts() {
    let state = test_state();
    let app = test_app(&state);

    register_and_login(&app, "Jane", "555-0100").await;
    let (status, body) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "name": "Janet", "contact": "555-0100", "password": "pw456" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_register_missing_fields_rejected() {
    let state = test_state();
    let app = test_app(&state);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "name": "Jane", "contact": "", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let state = test_state();
    let app = test_app(&state);
    register_and_login(&app, "Jane", "555-0100").await;

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "contact": "555-0100", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "contact": "555-9999", "password": "pw123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_owner_scoped_endpoints_require_auth() {
    let state = test_state();
    let app = test_app(&state);

    for uri in ["/policies", "/claims", "/transactions", "/auth/me"] {
        let (status, _) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} must require auth");
    }
}

#[tokio::test]
async fn test_expired_token_rejected_distinctly() {
    let config = AppConfig {
        token_ttl_secs: -7200,
        ..AppConfig::default()
    };
    let state = AppState::with_config(config, None, None);
    let app = test_app(&state);

    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let (status, body) = send(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("expired"));
}

#[tokio::test]
async fn test_update_profile() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/auth/me",
        Some(&token),
        Some(json!({ "name": "Jane Doe", "contact": "555-0111" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Jane Doe");
    assert_eq!(body["contact"], "555-0111");
}

// -- Policy Lifecycle ---------------------------------------------------------

#[tokio::test]
async fn test_create_policy_round_trip() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;

    let (status, body) = send(
        &app,
        "POST",
        "/policies",
        Some(&token),
        Some(json!({
            "policy_type": "health",
            "amount": 5000.0,
            "start_date": "2024-01-01",
            "end_date": "2030-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    let id = body["id"].as_str().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/policies/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["amount"], 5000.0);
    assert_eq!(fetched["start_date"], "2024-01-01");
    assert_eq!(fetched["end_date"], "2030-01-01");
    assert_eq!(fetched["status"], "pending");
}

#[tokio::test]
async fn test_create_policy_rejects_bad_dates() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;

    let (status, body) = send(
        &app,
        "POST",
        "/policies",
        Some(&token),
        Some(json!({
            "policy_type": "health",
            "amount": 5000.0,
            "start_date": "not-a-date"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("start_date"));

    // End date preceding the start date is rejected.
    let (status, _) = send(
        &app,
        "POST",
        "/policies",
        Some(&token),
        Some(json!({
            "policy_type": "health",
            "amount": 5000.0,
            "start_date": "2024-06-01",
            "end_date": "2024-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_policy_rejects_missing_fields_and_bad_amount() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;

    let (status, _) = send(
        &app,
        "POST",
        "/policies",
        Some(&token),
        Some(json!({ "policy_type": "", "amount": 5000.0, "start_date": "2024-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/policies",
        Some(&token),
        Some(json!({ "policy_type": "health", "amount": -10.0, "start_date": "2024-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_policy_for_other_policyholder_requires_admin() {
    let state = test_state();
    let app = test_app(&state);
    let (jane_id, _) = register_and_login(&app, "Jane", "555-0100").await;
    let (_, bob_token) = register_and_login(&app, "Bob", "555-0200").await;
    let admin = admin_token(&state, &app).await;

    // A standard caller cannot create coverage owned by someone else.
    let (status, _) = send(
        &app,
        "POST",
        "/policies",
        Some(&bob_token),
        Some(json!({
            "policy_type": "health",
            "amount": 1000.0,
            "start_date": "2024-01-01",
            "policyholder_id": jane_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // An admin can, provided the policyholder exists.
    let (status, body) = send(
        &app,
        "POST",
        "/policies",
        Some(&admin),
        Some(json!({
            "policy_type": "health",
            "amount": 1000.0,
            "start_date": "2024-01-01",
            "policyholder_id": jane_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["policyholder_id"], jane_id.as_str());

    let (status, _) = send(
        &app,
        "POST",
        "/policies",
        Some(&admin),
        Some(json!({
            "policy_type": "health",
            "amount": 1000.0,
            "start_date": "2024-01-01",
            "policyholder_id": uuid::Uuid::new_v4()
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_policy_hidden_from_non_owners() {
    let state = test_state();
    let app = test_app(&state);
    let (_, jane_token) = register_and_login(&app, "Jane", "555-0100").await;
    let (_, bob_token) = register_and_login(&app, "Bob", "555-0200").await;

    let (_, body) = send(
        &app,
        "POST",
        "/policies",
        Some(&jane_token),
        Some(json!({ "policy_type": "health", "amount": 5000.0, "start_date": "2024-01-01" })),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();

    // Reads by a non-owner report absence, never 200 or 403.
    let (status, _) = send(&app, "GET", &format!("/policies/{id}"), Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deletes by a non-owner are forbidden.
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/policies/{id}"),
        Some(&bob_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Bob's listing stays empty.
    let (status, body) = send(&app, "GET", "/policies", Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_delete_policy_removes_dependent_claims() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;
    let policy_id = approved_policy(&app, &token, &admin, 5000.0).await;

    let (status, claim) = send(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "policy_id": policy_id, "amount": 500.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let claim_id = claim["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/policies/{policy_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/claims/{claim_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Policy Approval ----------------------------------------------------------

#[tokio::test]
async fn test_approve_policy_records_approver_and_notifies_no_one_fatally() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;

    let (_, body) = send(
        &app,
        "POST",
        "/policies",
        Some(&token),
        Some(json!({ "policy_type": "health", "amount": 5000.0, "start_date": "2024-01-01" })),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();

    // No notification gateway is configured; the decision must still
    // succeed.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/admin/approvePolicy/{id}"),
        Some(&admin),
        Some(json!({ "decision": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert!(body["approved_by"].is_string());
    assert!(body["approved_at"].is_string());

    // An approval audit record was appended.
    assert_eq!(state.approvals.len(), 1);
}

#[tokio::test]
async fn test_reapproving_decided_policy_conflicts() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;
    let id = approved_policy(&app, &token, &admin, 5000.0).await;

    // Repeating the decision — even flipped — is rejected, not overwritten.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/admin/approvePolicy/{id}"),
        Some(&admin),
        Some(json!({ "decision": false })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already decided"));

    // The original decision stands.
    let (_, body) = send(&app, "GET", &format!("/policies/{id}"), Some(&token), None).await;
    assert_eq!(body["status"], "approved");
}

#[tokio::test]
async fn test_policy_approval_requires_admin_role() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;

    let (_, body) = send(
        &app,
        "POST",
        "/policies",
        Some(&token),
        Some(json!({ "policy_type": "health", "amount": 5000.0, "start_date": "2024-01-01" })),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/admin/approvePolicy/{id}"),
        Some(&token),
        Some(json!({ "decision": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_approve_missing_policy_not_found() {
    let state = test_state();
    let app = test_app(&state);
    let admin = admin_token(&state, &app).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/admin/approvePolicy/{}", uuid::Uuid::new_v4()),
        Some(&admin),
        Some(json!({ "decision": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Claim Lifecycle ----------------------------------------------------------

#[tokio::test]
async fn test_claim_amount_must_fit_coverage() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;
    let policy_id = approved_policy(&app, &token, &admin, 5000.0).await;

    let (status, body) = send(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "policy_id": policy_id, "amount": 6000.0, "description": "Too much" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let msg = body["error"].as_str().unwrap();
    assert!(msg.contains("6000"), "message must name the claim: {msg}");
    assert!(msg.contains("5000"), "message must name the limit: {msg}");
}

#[tokio::test]
async fn test_claim_happy_path_and_duplicate_prevention() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;
    let policy_id = approved_policy(&app, &token, &admin, 5000.0).await;

    let (status, body) = send(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "policy_id": policy_id, "amount": 500.0, "description": "Medical expense" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");

    // At most one claim per policy.
    let (status, body) = send(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "policy_id": policy_id, "amount": 400.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_claim_requires_approved_policy() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;

    // Policy exists but is still pending.
    let (_, body) = send(
        &app,
        "POST",
        "/policies",
        Some(&token),
        Some(json!({ "policy_type": "health", "amount": 5000.0, "start_date": "2024-01-01" })),
    )
    .await;
    let policy_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "policy_id": policy_id, "amount": 500.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Absent policy looks the same.
    let (status, _) = send(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "policy_id": uuid::Uuid::new_v4(), "amount": 500.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_claim_invisible_across_accounts() {
    let state = test_state();
    let app = test_app(&state);
    let (_, jane_token) = register_and_login(&app, "Jane", "555-0100").await;
    let (_, bob_token) = register_and_login(&app, "Bob", "555-0200").await;
    let admin = admin_token(&state, &app).await;
    let policy_id = approved_policy(&app, &jane_token, &admin, 5000.0).await;

    let (_, claim) = send(
        &app,
        "POST",
        "/claims",
        Some(&jane_token),
        Some(json!({ "policy_id": policy_id, "amount": 500.0 })),
    )
    .await;
    let claim_id = claim["id"].as_str().unwrap().to_string();

    // Bob cannot see, update, or file against Jane's coverage.
    let (status, _) = send(&app, "GET", &format!("/claims/{claim_id}"), Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/claims/{claim_id}"),
        Some(&bob_token),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "POST",
        "/claims",
        Some(&bob_token),
        Some(json!({ "policy_id": policy_id, "amount": 100.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_claim_status_transition_table() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;
    let policy_id = approved_policy(&app, &token, &admin, 5000.0).await;

    let (_, claim) = send(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "policy_id": policy_id, "amount": 500.0 })),
    )
    .await;
    let claim_id = claim["id"].as_str().unwrap().to_string();

    // pending → paid directly is not in the table.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/claims/{claim_id}"),
        Some(&token),
        Some(json!({ "status": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("pending"));

    // The legal chain: pending → approved → paid.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/claims/{claim_id}"),
        Some(&token),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/claims/{claim_id}"),
        Some(&token),
        Some(json!({ "status": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paid");

    // paid is terminal.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/claims/{claim_id}"),
        Some(&token),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown status names are rejected before the table is consulted.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/claims/{claim_id}"),
        Some(&token),
        Some(json!({ "status": "settled" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_missing_claim_not_found() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/claims/{}", uuid::Uuid::new_v4()),
        Some(&token),
        Some(json!({ "status": "approved" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_claim() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;
    let policy_id = approved_policy(&app, &token, &admin, 5000.0).await;

    let (_, claim) = send(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "policy_id": policy_id, "amount": 500.0 })),
    )
    .await;
    let claim_id = claim["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "DELETE", &format!("/claims/{claim_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &format!("/claims/{claim_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Claim Approval (admin) ---------------------------------------------------

#[tokio::test]
async fn test_admin_claim_decision_flow() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;
    let policy_id = approved_policy(&app, &token, &admin, 5000.0).await;

    let (_, claim) = send(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "policy_id": policy_id, "amount": 500.0 })),
    )
    .await;
    let claim_id = claim["id"].as_str().unwrap().to_string();

    // A standard caller may not use the console.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/admin/approveClaim/{claim_id}"),
        Some(&token),
        Some(json!({ "decision": true })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/admin/approveClaim/{claim_id}"),
        Some(&admin),
        Some(json!({ "decision": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert!(body["approved_by"].is_string());

    // Second decision on an already-approved claim — even a denial —
    // conflicts instead of overwriting.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/admin/approveClaim/{claim_id}"),
        Some(&admin),
        Some(json!({ "decision": false, "rejection_reason": "changed my mind" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_claim_denial_requires_reason() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;
    let policy_id = approved_policy(&app, &token, &admin, 5000.0).await;

    let (_, claim) = send(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "policy_id": policy_id, "amount": 500.0 })),
    )
    .await;
    let claim_id = claim["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/admin/approveClaim/{claim_id}"),
        Some(&admin),
        Some(json!({ "decision": false })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("rejection_reason"));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/admin/approveClaim/{claim_id}"),
        Some(&admin),
        Some(json!({ "decision": false, "rejection_reason": "Incomplete documentation" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "denied");
    assert_eq!(body["rejection_reason"], "Incomplete documentation");
}

#[tokio::test]
async fn test_approve_missing_claim_not_found() {
    let state = test_state();
    let app = test_app(&state);
    let admin = admin_token(&state, &app).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/admin/approveClaim/{}", uuid::Uuid::new_v4()),
        Some(&admin),
        Some(json!({ "decision": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Products & Purchases -----------------------------------------------------

#[tokio::test]
async fn test_product_submission_approval_and_purchase() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;

    let (status, product) = send(
        &app,
        "POST",
        "/products",
        Some(&token),
        Some(json!({
            "title": "Test Insurance",
            "description": "Test Description",
            "coverage_amount": 100000.0,
            "premium": 1000.0,
            "duration_months": 12
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["is_approved"], false);
    let product_id = product["id"].as_str().unwrap().to_string();

    // Unapproved products cannot be purchased and don't appear in the
    // catalog.
    let (status, _) = send(
        &app,
        "POST",
        "/policies/purchase",
        Some(&token),
        Some(json!({
            "product_id": product_id,
            "start_date": "2024-01-01",
            "end_date": "2025-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, catalog) = send(&app, "GET", "/products", Some(&token), None).await;
    assert_eq!(catalog.as_array().unwrap().len(), 0);

    // Admin approves the product; it becomes purchasable.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/admin/approveProduct/{product_id}"),
        Some(&admin),
        Some(json!({ "decision": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, catalog) = send(&app, "GET", "/products", Some(&token), None).await;
    assert_eq!(catalog.as_array().unwrap().len(), 1);

    let (status, policy) = send(
        &app,
        "POST",
        "/policies/purchase",
        Some(&token),
        Some(json!({
            "product_id": product_id,
            "start_date": "2024-01-01",
            "end_date": "2025-01-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(policy["status"], "pending");
    assert_eq!(policy["amount"], 100000.0);
    assert_eq!(policy["product_id"], product_id.as_str());

    // The purchase appended a transaction.
    let (status, transactions) = send(&app, "GET", "/transactions", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let transactions = transactions.as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["transaction_type"], "purchase");
    assert_eq!(transactions[0]["amount"], 1000.0);
    assert_eq!(transactions[0]["product_title"], "Test Insurance");
}

#[tokio::test]
async fn test_unapproved_product_visibility() {
    let state = test_state();
    let app = test_app(&state);
    let (_, jane_token) = register_and_login(&app, "Jane", "555-0100").await;
    let (_, bob_token) = register_and_login(&app, "Bob", "555-0200").await;
    let admin = admin_token(&state, &app).await;

    let (_, product) = send(
        &app,
        "POST",
        "/products",
        Some(&jane_token),
        Some(json!({
            "title": "Draft Product",
            "description": "Unreviewed",
            "coverage_amount": 5000.0,
            "premium": 50.0,
            "duration_months": 6
        })),
    )
    .await;
    let product_id = product["id"].as_str().unwrap().to_string();

    // Creator and admin can see the draft; others cannot.
    let (status, _) = send(&app, "GET", &format!("/products/{product_id}"), Some(&jane_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &format!("/products/{product_id}"), Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", &format!("/products/{product_id}"), Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Only the creator (or an admin) may delete.
    let (status, _) = send(&app, "DELETE", &format!("/products/{product_id}"), Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "DELETE", &format!("/products/{product_id}"), Some(&jane_token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_reapproving_approved_product_conflicts() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;

    let (_, product) = send(
        &app,
        "POST",
        "/products",
        Some(&token),
        Some(json!({
            "title": "Once",
            "description": "Only once",
            "coverage_amount": 1000.0,
            "premium": 10.0,
            "duration_months": 12
        })),
    )
    .await;
    let product_id = product["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/admin/approveProduct/{product_id}"),
        Some(&admin),
        Some(json!({ "decision": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/admin/approveProduct/{product_id}"),
        Some(&admin),
        Some(json!({ "decision": false })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// -- Admin Console ------------------------------------------------------------

#[tokio::test]
async fn test_pending_queues() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;

    // One pending policy, plus one approved policy carrying a pending claim.
    send(
        &app,
        "POST",
        "/policies",
        Some(&token),
        Some(json!({ "policy_type": "auto", "amount": 3000.0, "start_date": "2024-01-01" })),
    )
    .await;
    let approved_id = approved_policy(&app, &token, &admin, 5000.0).await;
    send(
        &app,
        "POST",
        "/claims",
        Some(&token),
        Some(json!({ "policy_id": approved_id, "amount": 750.0 })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/admin/pendingPolicies", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["policy_type"], "auto");

    // The claims queue joins owner and policy context for review.
    let (status, body) = send(&app, "GET", "/admin/pendingClaims", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = body.as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["claim"]["amount"], 750.0);
    assert_eq!(reviews[0]["contact"], "555-0100");
    assert_eq!(reviews[0]["policy_amount"], 5000.0);

    // Standard callers are rejected from both queues.
    for uri in ["/admin/pendingPolicies", "/admin/pendingClaims"] {
        let (status, _) = send(&app, "GET", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_admin_user_management() {
    let state = test_state();
    let app = test_app(&state);
    let (jane_id, jane_token) = register_and_login(&app, "Jane", "555-0100").await;
    let admin = admin_token(&state, &app).await;

    // Listing is admin-only.
    let (status, _) = send(&app, "GET", "/admin/users", Some(&jane_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/admin/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    // Role escalation.
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/admin/users/{jane_id}"),
        Some(&admin),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    // Unknown role names are rejected.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/admin/users/{jane_id}"),
        Some(&admin),
        Some(json!({ "role": "superadmin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_spec_served() {
    let state = test_state();
    let app = test_app(&state);
    let (_, token) = register_and_login(&app, "Jane", "555-0100").await;

    let (status, body) = send(&app, "GET", "/openapi.json", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/claims").is_some());
    assert!(body["paths"].get("/admin/approveClaim/{id}").is_some());
}
