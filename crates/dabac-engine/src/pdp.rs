//! Decision point: gathers attributes, fetches JIT trust, evaluates LRAP.
//!
//! Every decision emits one event on the `dabac::audit` target carrying the
//! reason code and the numeric inputs. Lockdowns are logged at `warn` and
//! ordinary outcomes at `info`, so auditors can filter the circuit breaker
//! apart from routine denials.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use dabac_core::error::TrustError;
use dabac_core::traits::{ObjectMetadataProvider, RiskProvider};
use dabac_core::types::{RequestContext, SubjectId};
use dabac_policy::{LrapPolicy, PolicyDecision};

use crate::engine::TrustEngine;

pub const AUDIT_TARGET: &str = "dabac::audit";

/// One access decision with the attributes that fed it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AccessDecision {
    pub subject: SubjectId,
    pub object: String,
    /// Effective trust at decision time.
    pub trust: f64,
    /// Environmental risk of the request context.
    pub risk: f64,
    pub decision: PolicyDecision,
}

impl AccessDecision {
    pub fn granted(&self) -> bool {
        self.decision.granted
    }
}

pub struct DecisionPoint {
    engine: Arc<TrustEngine>,
    risk: Arc<dyn RiskProvider>,
    objects: Arc<dyn ObjectMetadataProvider>,
    policy: LrapPolicy,
}

impl fmt::Debug for DecisionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecisionPoint")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl DecisionPoint {
    pub fn new(
        engine: Arc<TrustEngine>,
        risk: Arc<dyn RiskProvider>,
        objects: Arc<dyn ObjectMetadataProvider>,
        policy: LrapPolicy,
    ) -> Self {
        Self {
            engine,
            risk,
            objects,
            policy,
        }
    }

    pub fn engine(&self) -> &TrustEngine {
        &self.engine
    }

    pub fn policy(&self) -> LrapPolicy {
        self.policy
    }

    /// Decide whether `subject` may access `object` under `context`.
    ///
    /// # Errors
    ///
    /// Propagates [`TrustError`] from the trust read (e.g. a clock
    /// regression). No decision is produced in that case.
    pub fn decide(
        &self,
        subject: &SubjectId,
        object: &str,
        context: &RequestContext,
    ) -> Result<AccessDecision, TrustError> {
        let risk = self.risk.environmental_risk(context);
        let base_requirement = self.objects.object_metadata(object).base_trust_requirement;
        let trust = self.engine.effective_trust(subject)?;

        let decision = self.policy.evaluate(trust, base_requirement, risk);
        audit(subject, object, &decision);

        Ok(AccessDecision {
            subject: subject.clone(),
            object: object.to_string(),
            trust,
            risk,
            decision,
        })
    }
}

fn audit(subject: &SubjectId, object: &str, d: &PolicyDecision) {
    if d.lockdown {
        warn!(
            target: AUDIT_TARGET,
            subject = %subject,
            object,
            reason = d.reason.as_str(),
            granted = d.granted,
            trust = d.inputs.trust,
            threshold = d.threshold,
            base = d.inputs.base_requirement,
            risk = d.inputs.risk,
            alpha = d.inputs.alpha,
            "access decision"
        );
    } else {
        info!(
            target: AUDIT_TARGET,
            subject = %subject,
            object,
            reason = d.reason.as_str(),
            granted = d.granted,
            trust = d.inputs.trust,
            threshold = d.threshold,
            base = d.inputs.base_requirement,
            risk = d.inputs.risk,
            alpha = d.inputs.alpha,
            "access decision"
        );
    }
}
