//! # dabac-engine
//!
//! Composes the pure dabac crates into a running trust service:
//!
//! - [`store::MemoryTrustStore`]: versioned per-subject records with
//!   compare-and-swap commits over a sharded concurrent map.
//! - [`engine::TrustEngine`]: just-in-time effective trust on read,
//!   predict-update-commit on evidence.
//! - [`pdp::DecisionPoint`]: risk and object lookup, trust fetch and LRAP
//!   evaluation, with an audit event per decision.
//! - [`config::DabacConfig`]: layered TOML and environment configuration.

pub mod attributes;
pub mod clock;
pub mod compromise;
pub mod config;
pub mod engine;
pub mod pdp;
pub mod store;

pub use attributes::StaticAttributeProvider;
pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use compromise::{FixedCompromiseModel, PivotCompromiseModel};
pub use config::{CompromisePolicy, DabacConfig, EngineConfig, PolicyConfig, UnknownSubjectPolicy};
pub use engine::{EvidenceOutcome, TrustEngine};
pub use pdp::{AccessDecision, DecisionPoint};
pub use store::MemoryTrustStore;
