//! Message templates.
//!
//! Each template key maps to a subject line and a plain-text body with
//! `{{placeholder}}` markers. Rendering substitutes every occurrence of
//! each provided key; unknown markers are left in place rather than
//! failing the send.

use std::collections::HashMap;

/// The notification templates the platform can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    PolicyApproved,
    PolicyRejected,
    ClaimApproved,
    ClaimRejected,
}

impl TemplateKey {
    /// The wire name of this template.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PolicyApproved => "policy_approved",
            Self::PolicyRejected => "policy_rejected",
            Self::ClaimApproved => "claim_approved",
            Self::ClaimRejected => "claim_rejected",
        }
    }

    /// Subject line for this template.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::PolicyApproved => "Policy Approved",
            Self::PolicyRejected => "Policy Rejected",
            Self::ClaimApproved => "Claim Approved",
            Self::ClaimRejected => "Claim Rejected",
        }
    }

    /// Body template for this template key.
    pub fn body(&self) -> &'static str {
        match self {
            Self::PolicyApproved => {
                "Good news! Your policy {{policy_id}} was approved on {{decision_date}}. \
                 Your coverage is now in force."
            }
            Self::PolicyRejected => {
                "Your policy {{policy_id}} was reviewed on {{decision_date}} and could not \
                 be approved. Please contact support for details."
            }
            Self::ClaimApproved => {
                "Your claim {{claim_id}} has been approved and will be scheduled for payout."
            }
            Self::ClaimRejected => {
                "Your claim {{claim_id}} has been denied. Reason: {{rejection_reason}}"
            }
        }
    }
}

impl std::fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render a template body, substituting `{{key}}` markers.
pub fn render(template: &str, substitutions: &HashMap<&str, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in substitutions {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_all_occurrences() {
        let mut subs = HashMap::new();
        subs.insert("name", "Jane".to_string());
        let out = render("Hello {{name}}, goodbye {{name}}", &subs);
        assert_eq!(out, "Hello Jane, goodbye Jane");
    }

    #[test]
    fn render_leaves_unknown_markers() {
        let subs = HashMap::new();
        let out = render("Hello {{name}}", &subs);
        assert_eq!(out, "Hello {{name}}");
    }

    #[test]
    fn claim_rejected_carries_reason() {
        let mut subs = HashMap::new();
        subs.insert("claim_id", "abc-123".to_string());
        subs.insert("rejection_reason", "Incomplete documentation".to_string());
        let out = render(TemplateKey::ClaimRejected.body(), &subs);
        assert!(out.contains("abc-123"));
        assert!(out.contains("Incomplete documentation"));
        assert!(!out.contains("{{"));
    }

    #[test]
    fn template_names_are_stable() {
        assert_eq!(TemplateKey::PolicyApproved.as_str(), "policy_approved");
        assert_eq!(TemplateKey::ClaimRejected.as_str(), "claim_rejected");
        assert_eq!(TemplateKey::PolicyRejected.subject(), "Policy Rejected");
    }
}
