//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! Each entity lives in a thread-safe in-memory [`Store`], the hot path
//! for every read and the authority for check-then-write invariants
//! (duplicate-claim prevention, decide-if-pending). When a PostgreSQL
//! pool is configured, mutations write through to the database and the
//! stores are hydrated from it at startup; the unique indexes there are
//! the storage-layer backstop for the same invariants.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use claimdesk_core::{ClaimStatus, Decision, PolicyStatus, Role};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::JwtKeys;
use crate::error::AppError;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Return all records matching a predicate.
    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.data
            .read()
            .values()
            .filter(|v| pred(v))
            .cloned()
            .collect()
    }

    /// Return the first record matching a predicate.
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.data.read().values().find(|v| pred(v)).cloned()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure receives a `&mut T` and may inspect the current state,
    /// validate preconditions, mutate the record, and return `Ok(R)` or
    /// `Err(E)`. The entire operation runs under a single write lock,
    /// eliminating TOCTOU races between read and update.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Insert a record only if no existing record conflicts with it.
    ///
    /// The conflict scan and the insert run under a single write lock,
    /// so two concurrent inserts that both pass the scan are impossible.
    /// Returns the conflicting record on failure.
    pub fn try_insert(
        &self,
        id: Uuid,
        value: T,
        conflicts_with: impl Fn(&T) -> bool,
    ) -> Result<T, T> {
        let mut guard = self.data.write();
        if let Some(existing) = guard.values().find(|v| conflicts_with(v)) {
            return Err(existing.clone());
        }
        guard.insert(id, value.clone());
        Ok(value)
    }

    /// Remove a record by ID.
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Record Types -------------------------------------------------------------

/// A policyholder or administrator account.
///
/// Not serialized directly — API responses go through the profile DTOs,
/// which never carry the password hash.
#[derive(Debug, Clone)]
pub struct AccountRecord {
    pub id: Uuid,
    pub name: String,
    /// Unique contact handle (email address or phone number).
    pub contact: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// An insurance product offered for purchase.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub coverage_amount: f64,
    pub premium: f64,
    /// Duration in months; 0 means lifetime coverage.
    pub duration_months: i32,
    pub is_approved: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A coverage instance tying an account to coverage terms.
///
/// Unifies the direct-attribute and product-purchase creation paths:
/// `product_id` is set only for purchases.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PolicyRecord {
    pub id: Uuid,
    pub policyholder_id: Uuid,
    pub product_id: Option<Uuid>,
    pub policy_type: String,
    /// Coverage amount — the limit claims are validated against.
    pub amount: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[schema(value_type = String)]
    pub status: PolicyStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A payout request against an approved policy.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClaimRecord {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub amount: f64,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub status: ClaimStatus,
    /// Required iff the claim was denied.
    pub rejection_reason: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Append-only audit record created as a side effect of a purchase.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    pub product_id: Uuid,
    /// Product title snapshotted at purchase time, so the history
    /// survives product deletion.
    pub product_title: String,
    pub amount: f64,
    pub transaction_type: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only record of an admin decision.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApprovalRecord {
    pub id: Uuid,
    /// What was decided: `product`, `policy`, or `claim`.
    pub resource_type: String,
    pub resource_id: Uuid,
    pub admin_id: Uuid,
    #[schema(value_type = String)]
    pub decision: Decision,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

// -- Application State --------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the JWT secret to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared secret for signing bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub token_ttl_secs: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            jwt_secret: "insecure-dev-secret".to_string(),
            token_ttl_secs: 86_400,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each `Store`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub accounts: Store<AccountRecord>,
    pub products: Store<ProductRecord>,
    pub policies: Store<PolicyRecord>,
    pub claims: Store<ClaimRecord>,
    pub transactions: Store<TransactionRecord>,
    pub approvals: Store<ApprovalRecord>,

    /// PostgreSQL connection pool for durable persistence.
    /// When `None`, the API operates in in-memory-only mode.
    pub db_pool: Option<PgPool>,

    /// Notification gateway client. When `None`, decision notifications
    /// are skipped (delivery is best-effort either way).
    pub notifier: Option<claimdesk_notify::NotifyClient>,

    /// Token signing/verification keys derived from the configured secret.
    pub jwt: JwtKeys,

    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with default configuration,
    /// no notifier, and no database pool.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None, None)
    }

    /// Create a new application state with the given configuration and
    /// optional collaborators.
    pub fn with_config(
        config: AppConfig,
        notifier: Option<claimdesk_notify::NotifyClient>,
        db_pool: Option<PgPool>,
    ) -> Self {
        let jwt = JwtKeys::new(&config.jwt_secret, config.token_ttl_secs);
        Self {
            accounts: Store::new(),
            products: Store::new(),
            policies: Store::new(),
            claims: Store::new(),
            transactions: Store::new(),
            approvals: Store::new(),
            db_pool,
            notifier,
            jwt,
            config,
        }
    }

    /// Look up an account by its unique contact handle.
    pub fn account_by_contact(&self, contact: &str) -> Option<AccountRecord> {
        self.accounts.find(|a| a.contact == contact)
    }

    /// Create an account, enforcing contact uniqueness.
    ///
    /// The uniqueness scan and the insert run under one write lock;
    /// the database unique index on `accounts.contact` is the backstop.
    pub fn create_account(
        &self,
        name: &str,
        contact: &str,
        password: &str,
        role: Role,
    ) -> Result<AccountRecord, AppError> {
        let record = AccountRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            contact: contact.to_string(),
            password_hash: crate::auth::hash_password(password)?,
            role,
            created_at: Utc::now(),
        };
        self.accounts
            .try_insert(record.id, record, |a| a.contact == contact)
            .map_err(|_| AppError::Conflict("User already exists".to_string()))
    }

    /// Fetch a claim together with its underlying policy.
    ///
    /// Claims are only reachable through their policy, so a claim whose
    /// policy has vanished is treated as absent.
    pub fn claim_with_policy(&self, claim_id: &Uuid) -> Option<(ClaimRecord, PolicyRecord)> {
        let claim = self.claims.get(claim_id)?;
        let policy = self.policies.get(&claim.policy_id)?;
        Some((claim, policy))
    }

    /// Hydrate in-memory stores from the database.
    ///
    /// Called once on startup when a database pool is available, so that
    /// read operations remain fast and synchronous afterwards.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let accounts = crate::db::accounts::load_all(pool)
            .await
            .map_err(|e| format!("failed to load accounts: {e}"))?;
        let account_count = accounts.len();
        for record in accounts {
            self.accounts.insert(record.id, record);
        }

        let products = crate::db::products::load_all(pool)
            .await
            .map_err(|e| format!("failed to load products: {e}"))?;
        let product_count = products.len();
        for record in products {
            self.products.insert(record.id, record);
        }

        let policies = crate::db::policies::load_all(pool)
            .await
            .map_err(|e| format!("failed to load policies: {e}"))?;
        let policy_count = policies.len();
        for record in policies {
            self.policies.insert(record.id, record);
        }

        let claims = crate::db::claims::load_all(pool)
            .await
            .map_err(|e| format!("failed to load claims: {e}"))?;
        let claim_count = claims.len();
        for record in claims {
            self.claims.insert(record.id, record);
        }

        let transactions = crate::db::transactions::load_all(pool)
            .await
            .map_err(|e| format!("failed to load transactions: {e}"))?;
        for record in transactions {
            self.transactions.insert(record.id, record);
        }

        let approvals = crate::db::approvals::load_all(pool)
            .await
            .map_err(|e| format!("failed to load approvals: {e}"))?;
        for record in approvals {
            self.approvals.insert(record.id, record);
        }

        tracing::info!(
            accounts = account_count,
            products = product_count,
            policies = policy_count,
            claims = claim_count,
            "Hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
