//! Shared fixtures for the integration tests.

use std::sync::Arc;

use dabac_core::traits::TrustStore;
use dabac_core::types::{Belief, RequestContext, SubjectId, VersionedRecord};
use dabac_engine::attributes::{LOCATION_KEY, NETWORK_SECURITY_KEY};
use dabac_engine::{
    DecisionPoint, EngineConfig, ManualClock, MemoryTrustStore, StaticAttributeProvider,
    TrustEngine,
};
use dabac_policy::LrapPolicy;

/// Engine, store and clock wired together over a manual clock at zero.
pub struct Fixture {
    pub engine: Arc<TrustEngine>,
    pub store: Arc<MemoryTrustStore>,
    pub clock: Arc<ManualClock>,
}

impl Fixture {
    pub fn new(config: EngineConfig) -> Self {
        let store = Arc::new(MemoryTrustStore::new());
        let clock = Arc::new(ManualClock::default());
        let engine = Arc::new(TrustEngine::new(store.clone(), clock.clone(), config));
        Self {
            engine,
            store,
            clock,
        }
    }

    /// Decision point over this fixture's engine and the demonstration
    /// attribute table.
    pub fn decision_point(&self, alpha: f64) -> DecisionPoint {
        let attrs = Arc::new(StaticAttributeProvider::default());
        let policy = LrapPolicy::new(alpha).unwrap();
        DecisionPoint::new(self.engine.clone(), attrs.clone(), attrs, policy)
    }

    /// Seed `id` at `belief` at the current clock time.
    pub fn seed(&self, id: &str, belief: f64) -> SubjectId {
        let subject = SubjectId::from(id);
        self.engine
            .seed(&subject, Belief::new(belief).unwrap())
            .unwrap();
        subject
    }

    /// Stored record of `subject`, read straight from the store.
    pub fn record(&self, subject: &SubjectId) -> Option<VersionedRecord> {
        self.store.load(subject).unwrap()
    }

    /// Stored version of `subject`, 0 if it has no record.
    pub fn store_version(&self, subject: &SubjectId) -> u64 {
        self.record(subject).map_or(0, |v| v.version)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

pub fn hospital() -> RequestContext {
    RequestContext::new()
        .with(LOCATION_KEY, "hospital")
        .with(NETWORK_SECURITY_KEY, "wpa3_enterprise")
}

pub fn cafe() -> RequestContext {
    RequestContext::new()
        .with(LOCATION_KEY, "cafe")
        .with(NETWORK_SECURITY_KEY, "open")
}

/// Sequential posterior, for comparing against concurrent runs.
pub fn sequential_posterior(prior: f64, updates: &[(f64, f64)]) -> f64 {
    updates.iter().fold(prior, |p, &(lh, lc)| {
        let num = lh * p;
        let den = num + lc * (1.0 - p);
        if den < dabac_core::constants::EPSILON {
            p
        } else {
            num / den
        }
    })
}
