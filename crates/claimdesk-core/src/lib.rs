//! # claimdesk-core — Domain Types for the Claims-Management Platform
//!
//! Foundational, I/O-free domain logic shared by the claimdesk services:
//!
//! - [`Role`] — account roles with an ordering-based privilege gate.
//! - [`PolicyStatus`] / [`ClaimStatus`] — lifecycle state machines with
//!   explicit transition tables. Illegal transitions are values of
//!   [`LifecycleError`], never silent overwrites.
//! - [`Decision`] — an admin approval decision.
//! - [`validate`] — field-level validation for amounts and dates,
//!   producing [`ValidationError`] values the API layer maps to 400s.

pub mod role;
pub mod status;
pub mod validate;

pub use role::Role;
pub use status::{ClaimStatus, Decision, LifecycleError, PolicyStatus};
pub use validate::ValidationError;
