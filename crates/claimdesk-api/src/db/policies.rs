//! Policy persistence operations.
//!
//! The approval state machine is enforced at the application layer
//! (via `PolicyStatus::decide`), not in SQL.

use chrono::{DateTime, NaiveDate, Utc};
use claimdesk_core::PolicyStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::PolicyRecord;

/// Insert a new policy.
pub async fn insert(pool: &PgPool, record: &PolicyRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO policies (id, policyholder_id, product_id, policy_type, amount,
         start_date, end_date, status, approved_by, approved_at, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(record.id)
    .bind(record.policyholder_id)
    .bind(record.product_id)
    .bind(&record.policy_type)
    .bind(record.amount)
    .bind(record.start_date)
    .bind(record.end_date)
    .bind(record.status.as_str())
    .bind(record.approved_by)
    .bind(record.approved_at)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Persist the outcome of an approval decision.
pub async fn update_decision(pool: &PgPool, record: &PolicyRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE policies SET status = $1, approved_by = $2, approved_at = $3 WHERE id = $4",
    )
    .bind(record.status.as_str())
    .bind(record.approved_by)
    .bind(record.approved_at)
    .bind(record.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a policy. Claims cascade via the foreign key.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM policies WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all policies into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<PolicyRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PolicyRow>(
        "SELECT id, policyholder_id, product_id, policy_type, amount, start_date,
         end_date, status, approved_by, approved_at, created_at
         FROM policies ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(PolicyRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct PolicyRow {
    id: Uuid,
    policyholder_id: Uuid,
    product_id: Option<Uuid>,
    policy_type: String,
    amount: f64,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    status: String,
    approved_by: Option<Uuid>,
    approved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl PolicyRow {
    fn into_record(self) -> PolicyRecord {
        let status = PolicyStatus::from_name(&self.status).unwrap_or_else(|| {
            tracing::error!(
                id = %self.id,
                status = %self.status,
                "unknown policy status in database — defaulting to pending; \
                 investigate: this may indicate prior data corruption"
            );
            PolicyStatus::Pending
        });

        PolicyRecord {
            id: self.id,
            policyholder_id: self.policyholder_id,
            product_id: self.product_id,
            policy_type: self.policy_type,
            amount: self.amount,
            start_date: self.start_date,
            end_date: self.end_date,
            status,
            approved_by: self.approved_by,
            approved_at: self.approved_at,
            created_at: self.created_at,
        }
    }
}
