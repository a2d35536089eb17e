//! Account persistence operations.

use chrono::{DateTime, Utc};
use claimdesk_core::Role;
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::AccountRecord;

/// Insert a new account. The unique index on `contact` backstops the
/// application-level duplicate check.
pub async fn insert(pool: &PgPool, record: &AccountRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO accounts (id, name, contact, password_hash, role, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.contact)
    .bind(&record.password_hash)
    .bind(record.role.as_str())
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update an account's profile fields.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    contact: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE accounts SET name = $1, contact = $2 WHERE id = $3")
        .bind(name)
        .bind(contact)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Update an account's role.
pub async fn update_role(pool: &PgPool, id: Uuid, role: Role) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE accounts SET role = $1 WHERE id = $2")
        .bind(role.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all accounts into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<AccountRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AccountRow>(
        "SELECT id, name, contact, password_hash, role, created_at
         FROM accounts ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AccountRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    contact: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_record(self) -> AccountRecord {
        let role = Role::from_name(&self.role).unwrap_or_else(|| {
            tracing::error!(
                id = %self.id,
                role = %self.role,
                "unknown role in database — defaulting to standard"
            );
            Role::Standard
        });

        AccountRecord {
            id: self.id,
            name: self.name,
            contact: self.contact,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
        }
    }
}
