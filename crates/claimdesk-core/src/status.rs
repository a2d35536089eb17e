//! # Policy & Claim Lifecycle State Machines
//!
//! Both lifecycles are small, explicit transition tables:
//!
//! ```text
//! Policy:  pending ──▶ approved | denied          (both terminal)
//!
//! Claim:   pending ──▶ approved ──▶ paid
//!              │
//!              └─────▶ denied
//!          denied, paid: terminal
//! ```
//!
//! Every transition goes through [`ClaimStatus::transition`] or the
//! `decide` constructors, which return [`LifecycleError`] for anything
//! not in the table. Callers never assign status fields directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised by an illegal lifecycle operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The requested status transition is not in the transition table.
    #[error("invalid status transition from '{from}' to '{to}'")]
    InvalidTransition { from: &'static str, to: &'static str },

    /// An approve/deny decision was requested on a record that has
    /// already been decided.
    #[error("already decided: status is '{status}'")]
    AlreadyDecided { status: &'static str },
}

/// An admin approval decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Denied,
}

impl Decision {
    /// Build a decision from the boolean the API surface accepts
    /// (`true` approves, `false` denies).
    pub fn from_bool(approve: bool) -> Self {
        if approve {
            Self::Approved
        } else {
            Self::Denied
        }
    }

    /// Return the string representation of this decision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    /// Whether this decision is an approval.
    pub fn is_approval(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Policy ──────────────────────────────────────────────────────────

/// Lifecycle status of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    /// Awaiting an admin decision.
    Pending,
    /// Approved — coverage is in force and claims may be filed.
    Approved,
    /// Denied. Terminal.
    Denied,
}

impl PolicyStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    /// Parse a canonical status name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            _ => None,
        }
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Apply an admin decision to a pending policy.
    ///
    /// Re-deciding an already-decided policy is rejected rather than
    /// overwritten, so an approval cannot be silently flipped.
    pub fn decide(self, decision: Decision) -> Result<Self, LifecycleError> {
        match self {
            Self::Pending => Ok(match decision {
                Decision::Approved => Self::Approved,
                Decision::Denied => Self::Denied,
            }),
            decided => Err(LifecycleError::AlreadyDecided {
                status: decided.as_str(),
            }),
        }
    }
}

impl std::fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Claim ───────────────────────────────────────────────────────────

/// Lifecycle status of a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Filed, awaiting an admin decision.
    Pending,
    /// Approved for payout.
    Approved,
    /// Denied. Terminal.
    Denied,
    /// Payout executed. Terminal.
    Paid,
}

impl ClaimStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
            Self::Paid => "paid",
        }
    }

    /// Parse a canonical status name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "denied" => Some(Self::Denied),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }

    /// Whether this status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Return the set of valid target statuses from this status.
    pub fn valid_transitions(&self) -> &'static [ClaimStatus] {
        match self {
            Self::Pending => &[Self::Approved, Self::Denied],
            Self::Approved => &[Self::Paid],
            Self::Denied => &[],
            Self::Paid => &[],
        }
    }

    /// Transition to `to`, or fail if `(self, to)` is not in the table.
    pub fn transition(self, to: ClaimStatus) -> Result<Self, LifecycleError> {
        if self.valid_transitions().contains(&to) {
            Ok(to)
        } else {
            Err(LifecycleError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }

    /// Apply an admin decision to a pending claim.
    pub fn decide(self, decision: Decision) -> Result<Self, LifecycleError> {
        match self {
            Self::Pending => Ok(match decision {
                Decision::Approved => Self::Approved,
                Decision::Denied => Self::Denied,
            }),
            decided => Err(LifecycleError::AlreadyDecided {
                status: decided.as_str(),
            }),
        }
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
