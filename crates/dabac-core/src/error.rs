//! Error types for dabac.
use thiserror::Error;

use crate::types::SubjectId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BeliefError {
    #[error("belief is not a finite number: {0}")] NotFinite(f64),
    #[error("belief {0} is outside the probability bounds [0, 1]")] OutOfBounds(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecayError {
    #[error("negative elapsed time {elapsed}: causality violation")] CausalityViolation { elapsed: f64 },
    #[error("elapsed time is not finite")] NonFiniteElapsed,
    #[error("invalid decay rate: {0}")] InvalidRate(f64),
    #[error("invalid switch threshold: {0}")] InvalidSwitchThreshold(f64),
    #[error("invalid time unit: {0}")] InvalidTimeUnit(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvidenceError {
    #[error("invalid {which} likelihood: {value}")] InvalidLikelihood { which: &'static str, value: f64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("timestamp regression for {subject}: stored {stored}, proposed {proposed}")] TimestampRegression { subject: SubjectId, stored: f64, proposed: f64 },
    #[error("backend: {0}")] Backend(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrustError {
    #[error(transparent)] Belief(#[from] BeliefError),
    #[error(transparent)] Decay(#[from] DecayError),
    #[error(transparent)] Evidence(#[from] EvidenceError),
    #[error(transparent)] Store(#[from] StoreError),
    #[error("unknown subject: {0}")] UnknownSubject(SubjectId),
    #[error("write contention on {subject} after {attempts} attempts")] WriteContention { subject: SubjectId, attempts: u32 },
}

#[derive(Error, Debug)]
pub enum DabacError {
    #[error(transparent)] Belief(#[from] BeliefError),
    #[error(transparent)] Decay(#[from] DecayError),
    #[error(transparent)] Evidence(#[from] EvidenceError),
    #[error(transparent)] Store(#[from] StoreError),
    #[error(transparent)] Trust(#[from] TrustError),
    #[error("config: {0}")] Config(String),
}
