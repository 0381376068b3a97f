//! Trait interfaces for dabac.
//!
//! These traits define the contracts between crates:
//! - [`DecayCalculator`]: decay math (dabac-decay implements)
//! - [`TrustStore`]: per-subject versioned record storage (dabac-engine implements)
//! - [`Clock`]: time source for the trust engine (dabac-engine implements)
//! - [`CompromiseModel`]: attacker-model assumption for single-likelihood evidence
//! - [`RiskProvider`] / [`ObjectMetadataProvider`]: external attribute collaborators

use crate::error::{DecayError, StoreError};
use crate::types::{
    Belief, DecayMode, ObjectMetadata, RequestContext, SubjectId, Timestamp, TrustRecord,
    VersionedRecord,
};

/// Pure time-decay of a belief.
///
/// `elapsed` is measured in decay time units and `rate` is lambda per unit.
/// Every method rejects a negative `elapsed` with
/// [`DecayError::CausalityViolation`] and a negative rate with
/// [`DecayError::InvalidRate`]. Implementations must be reentrant.
pub trait DecayCalculator: Send + Sync {
    /// `belief * exp(-rate * elapsed)`.
    fn decay_exact(&self, belief: Belief, elapsed: f64, rate: f64) -> Result<Belief, DecayError>;

    /// `belief * (1 - rate * elapsed)`, or zero once `rate * elapsed >= 1`.
    fn decay_taylor(&self, belief: Belief, elapsed: f64, rate: f64) -> Result<Belief, DecayError>;

    /// Taylor path while `rate * elapsed < switch_threshold`, exact otherwise.
    fn decay_hybrid(
        &self,
        belief: Belief,
        elapsed: f64,
        rate: f64,
        switch_threshold: f64,
    ) -> Result<Belief, DecayError>;

    /// Decay with the formula selected by `mode`.
    ///
    /// Default implementation dispatches to the three methods above.
    fn decay(
        &self,
        mode: DecayMode,
        belief: Belief,
        elapsed: f64,
        rate: f64,
    ) -> Result<Belief, DecayError> {
        match mode {
            DecayMode::Exact => self.decay_exact(belief, elapsed, rate),
            DecayMode::Taylor => self.decay_taylor(belief, elapsed, rate),
            DecayMode::Hybrid { switch_threshold } => {
                self.decay_hybrid(belief, elapsed, rate, switch_threshold)
            }
        }
    }
}

/// Result of a [`TrustStore::compare_and_swap`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CasOutcome {
    /// The record was written; carries the new version.
    Committed(VersionedRecord),
    /// Another writer got there first; carries the current state.
    Conflict(Option<VersionedRecord>),
}

impl CasOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Keyed storage of per-subject trust records.
///
/// Implementations must read `(record, version)` as one unit and make
/// [`compare_and_swap`](TrustStore::compare_and_swap) atomic per subject.
/// Exclusion across different subjects is not required.
pub trait TrustStore: Send + Sync {
    /// Snapshot of a subject's record. Never mutates the store.
    fn load(&self, subject: &SubjectId) -> Result<Option<VersionedRecord>, StoreError>;

    /// Write `record` if the stored version equals `expected_version`
    /// (`None` meaning "no record yet").
    ///
    /// # Errors
    ///
    /// [`StoreError::TimestampRegression`] if `record.last_update` is earlier
    /// than the stored one.
    fn compare_and_swap(
        &self,
        subject: &SubjectId,
        expected_version: Option<u64>,
        record: TrustRecord,
    ) -> Result<CasOutcome, StoreError>;

    /// Ids of all subjects with a record.
    fn subjects(&self) -> Result<Vec<SubjectId>, StoreError>;

    /// Number of stored records.
    fn len(&self) -> usize;

    /// Whether no records are stored.
    ///
    /// Default implementation: `len() == 0`.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Source of the current time for decay computation.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Derives `P(E | compromised)` from a single observed likelihood.
///
/// This encodes an assumption about attacker behaviour, so it is injected
/// rather than fixed in the update path.
pub trait CompromiseModel: Send + Sync {
    fn likelihood_compromised(&self, observed_likelihood: f64) -> f64;
}

/// Environmental risk classifier.
pub trait RiskProvider: Send + Sync {
    /// Aggregate risk of the request context in `[0, 1]`.
    fn environmental_risk(&self, context: &RequestContext) -> f64;
}

/// Object attribute lookup.
pub trait ObjectMetadataProvider: Send + Sync {
    /// Metadata for `object_id`. Unknown objects must get a fail-safe
    /// (maximum) base requirement rather than an error.
    fn object_metadata(&self, object_id: &str) -> ObjectMetadata;
}
