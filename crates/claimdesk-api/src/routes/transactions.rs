//! # Transaction History API
//!
//! Read-only view of the caller's purchase history. Transactions are
//! appended by the purchase flow and never mutated.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::AuthSubject;
use crate::state::{AppState, TransactionRecord};

/// Build the transactions router.
pub fn router() -> Router<AppState> {
    Router::new().route("/transactions", get(list_transactions))
}

/// GET /transactions — The caller's transactions, newest first.
#[utoipa::path(
    get,
    path = "/transactions",
    responses(
        (status = 200, description = "Transactions", body = Vec<TransactionRecord>),
    ),
    tag = "transactions"
)]
async fn list_transactions(
    State(state): State<AppState>,
    subject: AuthSubject,
) -> Json<Vec<TransactionRecord>> {
    let mut transactions = state.transactions.filter(|t| t.account_id == subject.id);
    transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Json(transactions)
}
