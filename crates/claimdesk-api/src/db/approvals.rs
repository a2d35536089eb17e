//! Approval audit persistence. Append-only: decisions are recorded,
//! never updated or deleted.

use chrono::{DateTime, Utc};
use claimdesk_core::Decision;
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::ApprovalRecord;

/// Append an approval audit record.
pub async fn append(pool: &PgPool, record: &ApprovalRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO approvals (id, resource_type, resource_id, admin_id, decision,
         reason, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(record.id)
    .bind(&record.resource_type)
    .bind(record.resource_id)
    .bind(record.admin_id)
    .bind(record.decision.as_str())
    .bind(&record.reason)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all approval records into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ApprovalRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ApprovalRow>(
        "SELECT id, resource_type, resource_id, admin_id, decision, reason, created_at
         FROM approvals ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ApprovalRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ApprovalRow {
    id: Uuid,
    resource_type: String,
    resource_id: Uuid,
    admin_id: Uuid,
    decision: String,
    reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl ApprovalRow {
    fn into_record(self) -> ApprovalRecord {
        let decision = if self.decision == "approved" {
            Decision::Approved
        } else {
            Decision::Denied
        };

        ApprovalRecord {
            id: self.id,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            admin_id: self.admin_id,
            decision,
            reason: self.reason,
            created_at: self.created_at,
        }
    }
}
