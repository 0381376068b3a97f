//! Core value types: beliefs, timestamps, trust records, evidence.
//!
//! [`Belief`] is the only way a probability enters the trust model. Its
//! constructor enforces `[0, 1]` up to [`EPSILON`] and clamps rounding noise;
//! structurally out-of-range values are rejected.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SWITCH_THRESHOLD, EPSILON, NEUTRAL_BELIEF};
use crate::error::{BeliefError, EvidenceError};

/// Identifier of a subject (user, device, workload) whose trust is tracked.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Posterior probability that a subject is in the honest hidden state.
///
/// # Invariants
///
/// * `0.0 <= value <= 1.0`
/// * never NaN
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct Belief(f64);

impl Belief {
    /// Certainly compromised.
    pub const ZERO: Self = Self(0.0);
    /// Certainly honest.
    pub const ONE: Self = Self(1.0);
    /// Equal odds.
    pub const NEUTRAL: Self = Self(NEUTRAL_BELIEF);

    /// Validate and construct a belief.
    ///
    /// Values in `[-EPSILON, 1 + EPSILON]` are clamped into `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dabac_core::types::Belief;
    ///
    /// assert_eq!(Belief::new(0.75).unwrap().value(), 0.75);
    /// assert_eq!(Belief::new(1.0 + 1e-12).unwrap().value(), 1.0);
    /// assert!(Belief::new(1.1).is_err());
    /// assert!(Belief::new(f64::NAN).is_err());
    /// ```
    pub fn new(value: f64) -> Result<Self, BeliefError> {
        if !value.is_finite() {
            return Err(BeliefError::NotFinite(value));
        }
        if !(-EPSILON..=1.0 + EPSILON).contains(&value) {
            return Err(BeliefError::OutOfBounds(value));
        }
        Ok(Self(value.clamp(0.0, 1.0)))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Probability of the complementary (compromised) state.
    pub fn complement(self) -> f64 {
        1.0 - self.0
    }

    /// Multiply by a retention factor. The factor is clamped into `[0, 1]`
    /// (NaN counts as 0), so the result is never above `self`.
    pub fn scale(self, retention: f64) -> Self {
        let retention = if retention.is_nan() {
            0.0
        } else {
            retention.clamp(0.0, 1.0)
        };
        Self(self.0 * retention)
    }
}

impl TryFrom<f64> for Belief {
    type Error = BeliefError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Belief> for f64 {
    fn from(belief: Belief) -> Self {
        belief.0
    }
}

impl fmt::Display for Belief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.0)
    }
}

/// Point in time, in seconds since an arbitrary epoch fixed by the [`Clock`].
///
/// [`Clock`]: crate::traits::Clock
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, PartialOrd, Default)]
#[serde(transparent)]
pub struct Timestamp(f64);

impl Timestamp {
    pub const EPOCH: Self = Self(0.0);

    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }

    /// Signed seconds from `earlier` to `self`. Negative when `earlier` is in
    /// the future.
    pub fn secs_since(self, earlier: Timestamp) -> f64 {
        self.0 - earlier.0
    }

    pub fn plus_secs(self, secs: f64) -> Self {
        Self(self.0 + secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// Stored trust state of one subject.
///
/// Mutated only by the engine's write path. `last_update` never decreases
/// across commits for the same subject.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct TrustRecord {
    /// Belief as of `last_update`, before any decay since then.
    pub belief: Belief,
    /// Time of the last committed evidence or seed.
    pub last_update: Timestamp,
}

impl TrustRecord {
    pub fn new(belief: Belief, last_update: Timestamp) -> Self {
        Self { belief, last_update }
    }
}

/// A [`TrustRecord`] together with its commit counter.
///
/// Versions start at 1 for the first commit and increase by exactly one per
/// successful compare-and-swap.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct VersionedRecord {
    pub record: TrustRecord,
    pub version: u64,
}

/// One piece of behavioural evidence: `P(E | honest)` and `P(E | compromised)`.
///
/// Likelihoods are non-negative reals and need not be probabilities (a
/// likelihood ratio such as 999.0 is a valid `likelihood_honest`).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct EvidenceObservation {
    pub likelihood_honest: f64,
    pub likelihood_compromised: f64,
}

impl EvidenceObservation {
    /// Validate and construct an observation.
    ///
    /// # Examples
    ///
    /// ```
    /// use dabac_core::types::EvidenceObservation;
    ///
    /// assert!(EvidenceObservation::new(999.0, 0.001).is_ok());
    /// assert!(EvidenceObservation::new(-1.0, 0.5).is_err());
    /// assert!(EvidenceObservation::new(0.5, f64::NAN).is_err());
    /// ```
    pub fn new(likelihood_honest: f64, likelihood_compromised: f64) -> Result<Self, EvidenceError> {
        check_likelihood("honest", likelihood_honest)?;
        check_likelihood("compromised", likelihood_compromised)?;
        Ok(Self {
            likelihood_honest,
            likelihood_compromised,
        })
    }

    /// Log-likelihood ratio of this observation.
    pub fn strength(&self) -> f64 {
        crate::bayes::evidence_strength(self.likelihood_honest, self.likelihood_compromised)
    }
}

fn check_likelihood(which: &'static str, value: f64) -> Result<(), EvidenceError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(EvidenceError::InvalidLikelihood { which, value })
    }
}

/// Which decay formula a read path uses.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecayMode {
    /// `belief * exp(-rate * dt)`.
    #[default]
    Exact,
    /// `belief * (1 - rate * dt)`, floored at zero.
    Taylor,
    /// Taylor while `rate * dt < switch_threshold`, exact otherwise.
    Hybrid { switch_threshold: f64 },
}

impl DecayMode {
    /// Hybrid mode with [`DEFAULT_SWITCH_THRESHOLD`].
    pub fn hybrid() -> Self {
        Self::Hybrid {
            switch_threshold: DEFAULT_SWITCH_THRESHOLD,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Taylor => "taylor",
            Self::Hybrid { .. } => "hybrid",
        }
    }
}

/// Raw environmental attributes of an access request (location, network, ...).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct RequestContext {
    attributes: BTreeMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute insertion.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Static attributes of a protected object.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ObjectMetadata {
    /// Intrinsic sensitivity `T_base` in `[0, 1]`.
    pub base_trust_requirement: f64,
    /// Free-form classification label, if known.
    pub classification: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- Belief ---

    #[test]
    fn belief_accepts_bounds() {
        assert_eq!(Belief::new(0.0).unwrap(), Belief::ZERO);
        assert_eq!(Belief::new(1.0).unwrap(), Belief::ONE);
    }

    #[test]
    fn belief_clamps_within_tolerance() {
        assert_eq!(Belief::new(-EPSILON).unwrap().value(), 0.0);
        assert_eq!(Belief::new(1.0 + EPSILON).unwrap().value(), 1.0);
    }

    #[test]
    fn belief_rejects_structural_violation() {
        assert_eq!(Belief::new(-0.01), Err(BeliefError::OutOfBounds(-0.01)));
        assert_eq!(Belief::new(1.5), Err(BeliefError::OutOfBounds(1.5)));
        assert!(matches!(Belief::new(f64::INFINITY), Err(BeliefError::NotFinite(_))));
    }

    #[test]
    fn belief_complement() {
        let b = Belief::new(0.25).unwrap();
        assert!((b.complement() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn belief_scale_never_increases() {
        let b = Belief::new(0.8).unwrap();
        assert_eq!(b.scale(0.5).value(), 0.4);
        assert_eq!(b.scale(1.7), b);
        assert_eq!(b.scale(-0.2), Belief::ZERO);
        assert_eq!(b.scale(f64::NAN), Belief::ZERO);
    }

    #[test]
    fn belief_serde_validates() {
        let ok: Belief = serde_json::from_str("0.9").unwrap();
        assert_eq!(ok.value(), 0.9);
        assert!(serde_json::from_str::<Belief>("1.2").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "0.9");
    }

    // --- Timestamp ---

    #[test]
    fn timestamp_arithmetic() {
        let t0 = Timestamp::from_secs(10.0);
        let t1 = t0.plus_secs(30.0);
        assert_eq!(t1.secs_since(t0), 30.0);
        assert_eq!(t0.secs_since(t1), -30.0);
    }

    // --- EvidenceObservation ---

    #[test]
    fn evidence_accepts_zero_and_ratios() {
        assert!(EvidenceObservation::new(0.0, 0.0).is_ok());
        assert!(EvidenceObservation::new(999.0, 0.001).is_ok());
    }

    #[test]
    fn evidence_rejects_negative() {
        let err = EvidenceObservation::new(0.5, -0.1).unwrap_err();
        assert_eq!(
            err,
            EvidenceError::InvalidLikelihood {
                which: "compromised",
                value: -0.1
            }
        );
    }

    // --- DecayMode ---

    #[test]
    fn decay_mode_default_is_exact() {
        assert_eq!(DecayMode::default(), DecayMode::Exact);
        assert_eq!(DecayMode::hybrid().name(), "hybrid");
    }

    #[test]
    fn decay_mode_serde_tagged() {
        let mode: DecayMode =
            serde_json::from_str(r#"{"kind":"hybrid","switch_threshold":0.05}"#).unwrap();
        assert_eq!(
            mode,
            DecayMode::Hybrid {
                switch_threshold: 0.05
            }
        );
        let exact: DecayMode = serde_json::from_str(r#"{"kind":"exact"}"#).unwrap();
        assert_eq!(exact, DecayMode::Exact);
    }

    // --- RequestContext ---

    #[test]
    fn request_context_builder() {
        let ctx = RequestContext::new()
            .with("location", "cafe")
            .with("network_security", "open");
        assert_eq!(ctx.get("location"), Some("cafe"));
        assert_eq!(ctx.get("missing"), None);
    }
}
