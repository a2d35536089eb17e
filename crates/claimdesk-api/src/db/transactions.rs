//! Transaction persistence operations. Append-only.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::TransactionRecord;

/// Append a transaction record.
pub async fn insert(pool: &PgPool, record: &TransactionRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transactions (id, account_id, product_id, product_title, amount,
         transaction_type, status, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(record.id)
    .bind(record.account_id)
    .bind(record.product_id)
    .bind(&record.product_title)
    .bind(record.amount)
    .bind(&record.transaction_type)
    .bind(&record.status)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all transactions into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<TransactionRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, account_id, product_id, product_title, amount, transaction_type,
         status, created_at
         FROM transactions ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(TransactionRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    account_id: Uuid,
    product_id: Uuid,
    product_title: String,
    amount: f64,
    transaction_type: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_record(self) -> TransactionRecord {
        TransactionRecord {
            id: self.id,
            account_id: self.account_id,
            product_id: self.product_id,
            product_title: self.product_title,
            amount: self.amount,
            transaction_type: self.transaction_type,
            status: self.status,
            created_at: self.created_at,
        }
    }
}
