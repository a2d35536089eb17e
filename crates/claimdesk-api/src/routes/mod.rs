//! # API Route Modules
//!
//! Route modules for the claimdesk API surface:
//!
//! - `auth` — registration, login, and the authenticated profile.
//! - `products` — the insurance product catalog: submission, visibility
//!   rules for unapproved products, deletion by creator/admin.
//! - `policies` — policy creation (direct attributes or product
//!   purchase), owner-scoped reads, deletion.
//! - `claims` — claim filing against approved policies, owner-scoped
//!   reads, the status transition table, deletion.
//! - `transactions` — the caller's purchase history.
//! - `admin` — account administration, pending queues, and the
//!   approve/deny console for products, policies, and claims.

pub mod admin;
pub mod auth;
pub mod claims;
pub mod policies;
pub mod products;
pub mod transactions;
