//! Linear risk-adaptive policy (LRAP).
//!
//! ```text
//! threshold = base * (1 + alpha * risk)
//! grant     = threshold <= 1.0 && trust >= threshold
//! ```

use dabac_core::constants::{DEFAULT_ALPHA, MAX_TRUST};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decision::{DecisionInputs, PolicyDecision, ReasonCode};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("invalid risk sensitivity alpha: {0}")]
    InvalidAlpha(f64),
}

/// Required trust for an object of requirement `base` under `risk`.
///
/// Non-decreasing in `risk` and in `alpha` for non-negative inputs. The
/// result may exceed 1.0.
///
/// # Examples
///
/// ```
/// use dabac_policy::threshold;
///
/// assert!((threshold(0.6, 0.1, 0.5) - 0.63).abs() < 1e-12);
/// assert!((threshold(0.8, 0.9, 1.0) - 1.52).abs() < 1e-12);
/// ```
pub fn threshold(base_requirement: f64, risk: f64, alpha: f64) -> f64 {
    base_requirement * (1.0 + alpha * risk)
}

/// Evaluate the LRAP inequality.
///
/// A threshold above [`MAX_TRUST`] yields a lockdown whatever the trust.
/// Otherwise the comparison is boundary-inclusive (`trust >= threshold`).
///
/// # Examples
///
/// ```
/// use dabac_policy::{evaluate, ReasonCode};
///
/// let d = evaluate(0.75, 0.60, 0.1, 0.5);
/// assert!(d.granted);
///
/// let d = evaluate(1.0, 0.80, 0.9, 1.0);
/// assert!(d.lockdown && !d.granted);
/// assert_eq!(d.reason, ReasonCode::Lockdown);
/// ```
pub fn evaluate(trust: f64, base_requirement: f64, risk: f64, alpha: f64) -> PolicyDecision {
    let threshold = threshold(base_requirement, risk, alpha);
    let inputs = DecisionInputs {
        trust,
        base_requirement,
        risk,
        alpha,
    };

    if threshold > MAX_TRUST {
        return PolicyDecision {
            granted: false,
            threshold,
            lockdown: true,
            reason: ReasonCode::Lockdown,
            inputs,
        };
    }

    let granted = trust >= threshold;
    PolicyDecision {
        granted,
        threshold,
        lockdown: false,
        reason: if granted {
            ReasonCode::Permit
        } else {
            ReasonCode::Deny
        },
        inputs,
    }
}

/// LRAP rule with a fixed, validated risk sensitivity.
///
/// Deserialization goes through [`LrapPolicy::new`], so a decoded policy
/// carries the same alpha guarantee as a constructed one.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(try_from = "RawLrapPolicy")]
pub struct LrapPolicy {
    alpha: f64,
}

#[derive(Deserialize)]
struct RawLrapPolicy {
    alpha: f64,
}

impl TryFrom<RawLrapPolicy> for LrapPolicy {
    type Error = PolicyError;

    fn try_from(raw: RawLrapPolicy) -> Result<Self, Self::Error> {
        Self::new(raw.alpha)
    }
}

impl LrapPolicy {
    /// # Errors
    ///
    /// [`PolicyError::InvalidAlpha`] if `alpha` is negative or not finite; a
    /// negative alpha would lower the bar as risk rises.
    pub fn new(alpha: f64) -> Result<Self, PolicyError> {
        if !(alpha.is_finite() && alpha >= 0.0) {
            return Err(PolicyError::InvalidAlpha(alpha));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn threshold(&self, base_requirement: f64, risk: f64) -> f64 {
        threshold(base_requirement, risk, self.alpha)
    }

    pub fn evaluate(&self, trust: f64, base_requirement: f64, risk: f64) -> PolicyDecision {
        evaluate(trust, base_requirement, risk, self.alpha)
    }
}

impl Default for LrapPolicy {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}
