//! Just-in-time trust engine.
//!
//! Reads compute decay on the fly from the stored `(belief, last_update)`
//! snapshot and never write. Evidence is applied as predict, update, commit:
//! decay the stored belief to now, run the Bayesian posterior against the
//! decayed prior, then compare-and-swap `(posterior, now)` into the store.
//! A lost race reloads and recomputes from a fresh snapshot and a fresh clock
//! reading, so concurrent evidence on one subject serializes without a
//! lock held across the computation.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use dabac_core::bayes;
use dabac_core::error::TrustError;
use dabac_core::traits::{CasOutcome, Clock, CompromiseModel, DecayCalculator, TrustStore};
use dabac_core::types::{
    Belief, DecayMode, EvidenceObservation, SubjectId, Timestamp, TrustRecord, VersionedRecord,
};
use dabac_decay::{elapsed_units, DecayEngine};

use crate::config::{EngineConfig, UnknownSubjectPolicy};

/// What one committed evidence update did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvidenceOutcome {
    /// Stored belief the update started from (bootstrap value for a new record).
    pub prior: Belief,
    /// `prior` decayed to the commit time.
    pub decayed: Belief,
    /// Committed belief.
    pub posterior: Belief,
    /// Decay time units between the previous update and this one.
    pub elapsed: f64,
    /// The committed record and its new version.
    pub committed: VersionedRecord,
    /// Compare-and-swap attempts used, at least 1.
    pub attempts: u32,
    /// Whether this update created the record.
    pub bootstrapped: bool,
}

/// Orchestrates store, clock, decay and belief update.
pub struct TrustEngine {
    store: Arc<dyn TrustStore>,
    clock: Arc<dyn Clock>,
    decay: Arc<dyn DecayCalculator>,
    compromise: Arc<dyn CompromiseModel>,
    config: EngineConfig,
}

impl fmt::Debug for TrustEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TrustEngine {
    /// Engine over `store` and `clock` with the default [`DecayEngine`] and
    /// the compromise model selected by `config.compromise`.
    ///
    /// `max_write_retries` is raised to 1 if zero, so every write makes at
    /// least one compare-and-swap attempt.
    pub fn new(
        store: Arc<dyn TrustStore>,
        clock: Arc<dyn Clock>,
        mut config: EngineConfig,
    ) -> Self {
        config.max_write_retries = config.max_write_retries.max(1);
        let compromise = config.compromise.model();
        Self {
            store,
            clock,
            decay: Arc::new(DecayEngine::new()),
            compromise,
            config,
        }
    }

    /// Replace the decay implementation.
    pub fn with_decay(mut self, decay: Arc<dyn DecayCalculator>) -> Self {
        self.decay = decay;
        self
    }

    /// Replace the compromise-likelihood strategy.
    pub fn with_compromise_model(mut self, compromise: Arc<dyn CompromiseModel>) -> Self {
        self.compromise = compromise;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Effective trust of `subject` now, decayed with the configured read mode.
    ///
    /// Never writes to the store. A subject with no record gets
    /// [`UnknownSubjectPolicy::read_value`].
    ///
    /// # Errors
    ///
    /// [`TrustError::Decay`] if the clock reads earlier than the record's
    /// `last_update`.
    pub fn effective_trust(&self, subject: &SubjectId) -> Result<f64, TrustError> {
        self.effective_trust_with(subject, self.config.read_mode)
    }

    /// [`effective_trust`](Self::effective_trust) with an explicit decay mode.
    pub fn effective_trust_with(
        &self,
        subject: &SubjectId,
        mode: DecayMode,
    ) -> Result<f64, TrustError> {
        let Some(current) = self.store.load(subject)? else {
            let value = self.config.unknown_subject.read_value();
            debug!(subject = %subject, value, "no record for subject");
            return Ok(value);
        };

        let now = self.clock.now();
        let elapsed = elapsed_units(now, current.record.last_update, self.config.time_unit_secs)?;
        let trust = self
            .decay
            .decay(mode, current.record.belief, elapsed, self.config.decay_rate)?;

        trace!(
            subject = %subject,
            stored = current.record.belief.value(),
            elapsed,
            mode = mode.name(),
            trust = trust.value(),
            "effective trust"
        );
        Ok(trust.value())
    }

    /// Apply one piece of evidence to `subject`.
    ///
    /// # Errors
    ///
    /// - [`TrustError::Evidence`] for a negative or non-finite likelihood
    /// - [`TrustError::UnknownSubject`] under
    ///   [`UnknownSubjectPolicy::RequireEnrollment`] when `subject` has no record
    /// - [`TrustError::Decay`] on clock regression
    /// - [`TrustError::WriteContention`] once `max_write_retries` attempts
    ///   have all lost their compare-and-swap
    pub fn process_evidence(
        &self,
        subject: &SubjectId,
        likelihood_honest: f64,
        likelihood_compromised: f64,
    ) -> Result<EvidenceOutcome, TrustError> {
        let evidence = EvidenceObservation::new(likelihood_honest, likelihood_compromised)?;
        self.apply(subject, &evidence)
    }

    /// Apply evidence given only `P(E | honest)`; the compromised likelihood
    /// comes from the engine's [`CompromiseModel`].
    pub fn process_observation(
        &self,
        subject: &SubjectId,
        observed_likelihood: f64,
    ) -> Result<EvidenceOutcome, TrustError> {
        let likelihood_compromised = self.compromise.likelihood_compromised(observed_likelihood);
        self.process_evidence(subject, observed_likelihood, likelihood_compromised)
    }

    /// Enrol `subject` at `belief` as of now, overwriting any existing record.
    pub fn seed(&self, subject: &SubjectId, belief: Belief) -> Result<VersionedRecord, TrustError> {
        let max = self.config.max_write_retries;
        for attempt in 1..=max {
            let expected = self.store.load(subject)?.map(|v| v.version);
            let now = self.clock.now();
            match self
                .store
                .compare_and_swap(subject, expected, TrustRecord::new(belief, now))?
            {
                CasOutcome::Committed(committed) => {
                    debug!(
                        subject = %subject,
                        belief = belief.value(),
                        version = committed.version,
                        "seeded subject"
                    );
                    return Ok(committed);
                }
                CasOutcome::Conflict(_) => {
                    trace!(subject = %subject, attempt, "seed lost compare-and-swap");
                }
            }
        }
        Err(self.contention(subject))
    }

    /// Stored record of `subject`, undecayed.
    pub fn snapshot(&self, subject: &SubjectId) -> Result<Option<VersionedRecord>, TrustError> {
        Ok(self.store.load(subject)?)
    }

    pub fn subjects(&self) -> Result<Vec<SubjectId>, TrustError> {
        Ok(self.store.subjects()?)
    }

    fn apply(
        &self,
        subject: &SubjectId,
        evidence: &EvidenceObservation,
    ) -> Result<EvidenceOutcome, TrustError> {
        let max = self.config.max_write_retries;
        for attempt in 1..=max {
            let current = self.store.load(subject)?;
            let now = self.clock.now();

            let (prior, last_update, expected, bootstrapped) = match current {
                Some(v) => (v.record.belief, v.record.last_update, Some(v.version), false),
                None => match self.config.unknown_subject {
                    UnknownSubjectPolicy::RequireEnrollment { .. } => {
                        debug!(subject = %subject, "evidence for unenrolled subject rejected");
                        return Err(TrustError::UnknownSubject(subject.clone()));
                    }
                    UnknownSubjectPolicy::Bootstrap { belief } => {
                        (Belief::new(belief)?, now, None, true)
                    }
                },
            };

            // predict
            let elapsed = elapsed_units(now, last_update, self.config.time_unit_secs)?;
            let decayed = self
                .decay
                .decay_exact(prior, elapsed, self.config.decay_rate)?;
            // update
            let posterior = bayes::update(decayed, evidence)?;
            // commit
            match self
                .store
                .compare_and_swap(subject, expected, TrustRecord::new(posterior, now))?
            {
                CasOutcome::Committed(committed) => {
                    debug!(
                        subject = %subject,
                        prior = prior.value(),
                        decayed = decayed.value(),
                        posterior = posterior.value(),
                        strength = evidence.strength(),
                        version = committed.version,
                        attempt,
                        "evidence committed"
                    );
                    return Ok(EvidenceOutcome {
                        prior,
                        decayed,
                        posterior,
                        elapsed,
                        committed,
                        attempts: attempt,
                        bootstrapped,
                    });
                }
                CasOutcome::Conflict(_) => {
                    trace!(subject = %subject, attempt, "evidence lost compare-and-swap");
                }
            }
        }
        Err(self.contention(subject))
    }

    fn contention(&self, subject: &SubjectId) -> TrustError {
        let attempts = self.config.max_write_retries;
        warn!(subject = %subject, attempts, "write contention, giving up");
        TrustError::WriteContention {
            subject: subject.clone(),
            attempts,
        }
    }
}
