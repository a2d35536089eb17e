//! Account roles.

use serde::{Deserialize, Serialize};

/// Roles in the claims platform, ordered by privilege level.
///
/// The `Ord` derivation respects variant declaration order:
/// `Standard < Admin`. This enables `>=` comparison for role-based
/// access checks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A policyholder: owns and manages only their own policies,
    /// claims, and product submissions.
    Standard,
    /// Full access: approves products, policies, and claims, and can
    /// view all pending items and accounts.
    Admin,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Admin => "admin",
        }
    }

    /// Parse a role name. Returns `None` for any unknown name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Self::Standard),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering_is_correct() {
        assert!(Role::Standard < Role::Admin);
    }

    #[test]
    fn role_as_str_round_trips() {
        for role in [Role::Standard, Role::Admin] {
            assert_eq!(Role::from_name(role.as_str()), Some(role));
        }
    }

    #[test]
    fn unknown_role_name_rejected() {
        assert_eq!(Role::from_name("superadmin"), None);
        assert_eq!(Role::from_name(""), None);
    }
}
