//! Human-readable rendering of decisions and decay results.

use dabac_engine::AccessDecision;
use dabac_policy::{PolicyDecision, ReasonCode};

/// One-word verdict used in every rendered line.
pub fn verdict(decision: &PolicyDecision) -> &'static str {
    match decision.reason {
        ReasonCode::Permit => "PERMIT",
        ReasonCode::Deny => "DENY",
        ReasonCode::Lockdown => "LOCKDOWN",
    }
}

/// Explanation of why the verdict was reached.
pub fn explain(decision: &PolicyDecision) -> String {
    let i = &decision.inputs;
    match decision.reason {
        ReasonCode::Permit => format!(
            "trust {:.4} >= threshold {:.4}",
            i.trust, decision.threshold
        ),
        ReasonCode::Deny => format!(
            "trust {:.4} < threshold {:.4} (short by {:.4})",
            i.trust,
            decision.threshold,
            -decision.margin()
        ),
        ReasonCode::Lockdown => format!(
            "threshold {:.4} exceeds 1.0, no trust level can satisfy it",
            decision.threshold
        ),
    }
}

pub fn decision_line(decision: &PolicyDecision) -> String {
    let i = &decision.inputs;
    format!(
        "{:<8} base={:.2} risk={:.2} alpha={:.2} | {}",
        verdict(decision),
        i.base_requirement,
        i.risk,
        i.alpha,
        explain(decision)
    )
}

pub fn access_line(label: &str, access: &AccessDecision) -> String {
    format!(
        "{label:<24} {} -> {} | {}",
        access.subject,
        access.object,
        decision_line(&access.decision)
    )
}
