//! Product persistence operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::ProductRecord;

/// Insert a new product.
pub async fn insert(pool: &PgPool, record: &ProductRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO products (id, title, description, coverage_amount, premium,
         duration_months, is_approved, created_by, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(record.id)
    .bind(&record.title)
    .bind(&record.description)
    .bind(record.coverage_amount)
    .bind(record.premium)
    .bind(record.duration_months)
    .bind(record.is_approved)
    .bind(record.created_by)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Set the approval flag on a product.
pub async fn set_approved(pool: &PgPool, id: Uuid, approved: bool) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE products SET is_approved = $1 WHERE id = $2")
        .bind(approved)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a product.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all products into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<ProductRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, title, description, coverage_amount, premium, duration_months,
         is_approved, created_by, created_at
         FROM products ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ProductRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    title: String,
    description: String,
    coverage_amount: f64,
    premium: f64,
    duration_months: i32,
    is_approved: bool,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_record(self) -> ProductRecord {
        ProductRecord {
            id: self.id,
            title: self.title,
            description: self.description,
            coverage_amount: self.coverage_amount,
            premium: self.premium,
            duration_months: self.duration_months,
            is_approved: self.is_approved,
            created_by: self.created_by,
            created_at: self.created_at,
        }
    }
}
