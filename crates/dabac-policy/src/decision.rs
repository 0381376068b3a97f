//! Structured access decisions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome class of a policy evaluation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Trust meets the risk-adjusted threshold.
    Permit,
    /// Trust is below a satisfiable threshold.
    Deny,
    /// Threshold above 1.0: unsatisfiable, denied regardless of trust.
    Lockdown,
}

impl ReasonCode {
    /// Stable machine-readable code, suitable for audit fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permit => "permit",
            Self::Deny => "deny",
            Self::Lockdown => "lockdown",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The numeric inputs that produced a decision.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct DecisionInputs {
    /// Effective (decayed) trust of the subject.
    pub trust: f64,
    /// Object's intrinsic requirement `T_base`.
    pub base_requirement: f64,
    /// Environmental risk `R_env`.
    pub risk: f64,
    /// Risk sensitivity coefficient.
    pub alpha: f64,
}

/// Immutable result of one evaluation. Produced fresh on every call.
///
/// # Invariants
///
/// * `lockdown == (threshold > 1.0)`
/// * `lockdown` implies `!granted`
/// * `reason` agrees with `granted` and `lockdown`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PolicyDecision {
    pub granted: bool,
    /// Required trust. May exceed 1.0.
    pub threshold: f64,
    pub lockdown: bool,
    pub reason: ReasonCode,
    pub inputs: DecisionInputs,
}

impl PolicyDecision {
    /// `trust - threshold`. Non-negative exactly when the inequality holds.
    pub fn margin(&self) -> f64 {
        self.inputs.trust - self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_are_stable() {
        assert_eq!(ReasonCode::Permit.as_str(), "permit");
        assert_eq!(ReasonCode::Deny.to_string(), "deny");
        assert_eq!(
            serde_json::to_string(&ReasonCode::Lockdown).unwrap(),
            "\"lockdown\""
        );
    }

    #[test]
    fn margin_is_trust_minus_threshold() {
        let d = PolicyDecision {
            granted: false,
            threshold: 0.87,
            lockdown: false,
            reason: ReasonCode::Deny,
            inputs: DecisionInputs {
                trust: 0.75,
                base_requirement: 0.6,
                risk: 0.9,
                alpha: 0.5,
            },
        };
        assert!((d.margin() + 0.12).abs() < 1e-12);
    }
}
