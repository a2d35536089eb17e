//! # Decision Notifications
//!
//! Best-effort notifications to policyholders after an admin decision.
//! Dispatch happens strictly after the state change has committed, on a
//! detached task the handler never awaits. Delivery failures are logged
//! and swallowed — they must not fail or roll back the decision.

use std::collections::HashMap;

use claimdesk_core::Decision;
use claimdesk_notify::TemplateKey;

use crate::state::{AppState, ClaimRecord, PolicyRecord};

/// Notify a policy's owner about an approval decision.
pub fn policy_decided(state: &AppState, policy: &PolicyRecord, decision: Decision) {
    let Some(client) = state.notifier.clone() else {
        tracing::debug!(policy_id = %policy.id, "notification gateway not configured — skipping");
        return;
    };
    let Some(owner) = state.accounts.get(&policy.policyholder_id) else {
        tracing::warn!(policy_id = %policy.id, "policy owner not found — skipping notification");
        return;
    };

    let template = if decision.is_approval() {
        TemplateKey::PolicyApproved
    } else {
        TemplateKey::PolicyRejected
    };

    let mut substitutions = HashMap::new();
    substitutions.insert("policy_id", policy.id.to_string());
    substitutions.insert(
        "decision_date",
        chrono::Utc::now().format("%Y-%m-%d").to_string(),
    );

    dispatch(client, owner.contact, template, substitutions);
}

/// Notify a claim's owner (through the owning policy) about a decision.
pub fn claim_decided(
    state: &AppState,
    claim: &ClaimRecord,
    policy: &PolicyRecord,
    decision: Decision,
) {
    let Some(client) = state.notifier.clone() else {
        tracing::debug!(claim_id = %claim.id, "notification gateway not configured — skipping");
        return;
    };
    let Some(owner) = state.accounts.get(&policy.policyholder_id) else {
        tracing::warn!(claim_id = %claim.id, "claim owner not found — skipping notification");
        return;
    };

    let template = if decision.is_approval() {
        TemplateKey::ClaimApproved
    } else {
        TemplateKey::ClaimRejected
    };

    let mut substitutions = HashMap::new();
    substitutions.insert("claim_id", claim.id.to_string());
    substitutions.insert(
        "rejection_reason",
        claim.rejection_reason.clone().unwrap_or_else(|| "N/A".to_string()),
    );

    dispatch(client, owner.contact, template, substitutions);
}

/// Fire-and-forget delivery on a detached task.
fn dispatch(
    client: claimdesk_notify::NotifyClient,
    to: String,
    template: TemplateKey,
    substitutions: HashMap<&'static str, String>,
) {
    tokio::spawn(async move {
        if let Err(err) = client.send(&to, template, &substitutions).await {
            tracing::warn!(error = %err, template = %template, "notification delivery failed");
        }
    });
}
