//! Claim persistence operations.
//!
//! The `UNIQUE` constraint on `policy_id` is the storage-layer backstop
//! for the one-claim-per-policy invariant; callers map the violation to
//! a 409 via `db::is_unique_violation`.

use chrono::{DateTime, Utc};
use claimdesk_core::ClaimStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::ClaimRecord;

/// Insert a new claim.
pub async fn insert(pool: &PgPool, record: &ClaimRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO claims (id, policy_id, amount, description, status,
         rejection_reason, approved_by, approved_at, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(record.id)
    .bind(record.policy_id)
    .bind(record.amount)
    .bind(&record.description)
    .bind(record.status.as_str())
    .bind(&record.rejection_reason)
    .bind(record.approved_by)
    .bind(record.approved_at)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist a status change (owner transition or admin decision).
pub async fn update_status(pool: &PgPool, record: &ClaimRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE claims SET status = $1, rejection_reason = $2, approved_by = $3,
         approved_at = $4 WHERE id = $5",
    )
    .bind(record.status.as_str())
    .bind(&record.rejection_reason)
    .bind(record.approved_by)
    .bind(record.approved_at)
    .bind(record.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a claim.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM claims WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all claims into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ClaimRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ClaimRow>(
        "SELECT id, policy_id, amount, description, status, rejection_reason,
         approved_by, approved_at, created_at
         FROM claims ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ClaimRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ClaimRow {
    id: Uuid,
    policy_id: Uuid,
    amount: f64,
    description: Option<String>,
    status: String,
    rejection_reason: Option<String>,
    approved_by: Option<Uuid>,
    approved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ClaimRow {
    fn into_record(self) -> ClaimRecord {
        let status = ClaimStatus::from_name(&self.status).unwrap_or_else(|| {
            tracing::error!(
                id = %self.id,
                status = %self.status,
                "unknown claim status in database — defaulting to pending; \
                 investigate: this may indicate prior data corruption"
            );
            ClaimStatus::Pending
        });

        ClaimRecord {
            id: self.id,
            policy_id: self.policy_id,
            amount: self.amount,
            description: self.description,
            status,
            rejection_reason: self.rejection_reason,
            approved_by: self.approved_by,
            approved_at: self.approved_at,
            created_at: self.created_at,
        }
    }
}
