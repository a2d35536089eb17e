//! # Database Persistence
//!
//! Optional PostgreSQL persistence behind the in-memory stores. All
//! functions take a `&PgPool` and operate on one table each via
//! parameterized queries. Lifecycle constraints are enforced at the
//! application layer; the unique indexes declared here are the
//! storage-layer backstop for the uniqueness invariants (one account
//! per contact, one claim per policy).

pub mod accounts;
pub mod approvals;
pub mod claims;
pub mod policies;
pub mod products;
pub mod transactions;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Schema statements applied at startup. Idempotent.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        contact TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS products (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        coverage_amount DOUBLE PRECISION NOT NULL,
        premium DOUBLE PRECISION NOT NULL,
        duration_months INT NOT NULL,
        is_approved BOOLEAN NOT NULL,
        created_by UUID NOT NULL REFERENCES accounts(id),
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS policies (
        id UUID PRIMARY KEY,
        policyholder_id UUID NOT NULL REFERENCES accounts(id),
        product_id UUID REFERENCES products(id),
        policy_type TEXT NOT NULL,
        amount DOUBLE PRECISION NOT NULL,
        start_date DATE NOT NULL,
        end_date DATE,
        status TEXT NOT NULL,
        approved_by UUID,
        approved_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS claims (
        id UUID PRIMARY KEY,
        policy_id UUID NOT NULL UNIQUE REFERENCES policies(id) ON DELETE CASCADE,
        amount DOUBLE PRECISION NOT NULL,
        description TEXT,
        status TEXT NOT NULL,
        rejection_reason TEXT,
        approved_by UUID,
        approved_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS transactions (
        id UUID PRIMARY KEY,
        account_id UUID NOT NULL,
        product_id UUID NOT NULL,
        product_title TEXT NOT NULL,
        amount DOUBLE PRECISION NOT NULL,
        transaction_type TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS approvals (
        id UUID PRIMARY KEY,
        resource_type TEXT NOT NULL,
        resource_id UUID NOT NULL,
        admin_id UUID NOT NULL,
        decision TEXT NOT NULL,
        reason TEXT,
        created_at TIMESTAMPTZ NOT NULL
    )",
];

/// Initialize the connection pool from `DATABASE_URL` and apply the schema.
///
/// Returns `Ok(None)` when `DATABASE_URL` is unset — the API then runs
/// in in-memory-only mode.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::info!("DATABASE_URL not set — running with in-memory state only");
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new().max_connections(5).connect(&url).await?;

    for statement in SCHEMA {
        sqlx::query(statement).execute(&pool).await?;
    }

    tracing::info!("database pool initialized");
    Ok(Some(pool))
}

/// Whether a storage error is a unique-constraint violation
/// (PostgreSQL SQLSTATE 23505).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}
