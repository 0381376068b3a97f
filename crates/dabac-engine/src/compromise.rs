//! Strategies deriving `P(E | compromised)` from one observed likelihood.

use serde::{Deserialize, Serialize};

use dabac_core::constants::{
    DEFAULT_FAVORABLE_COMPROMISED, DEFAULT_LIKELIHOOD_COMPROMISED, DEFAULT_LIKELIHOOD_PIVOT,
    DEFAULT_UNFAVORABLE_COMPROMISED,
};
use dabac_core::traits::CompromiseModel;

/// Two-level step model.
///
/// An observed likelihood above `pivot` is read as favouring "honest" and is
/// paired with the small `favorable` compromised-likelihood; anything else is
/// paired with the large `unfavorable` one.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PivotCompromiseModel {
    pub pivot: f64,
    pub favorable: f64,
    pub unfavorable: f64,
}

impl Default for PivotCompromiseModel {
    fn default() -> Self {
        Self {
            pivot: DEFAULT_LIKELIHOOD_PIVOT,
            favorable: DEFAULT_FAVORABLE_COMPROMISED,
            unfavorable: DEFAULT_UNFAVORABLE_COMPROMISED,
        }
    }
}

impl CompromiseModel for PivotCompromiseModel {
    fn likelihood_compromised(&self, observed_likelihood: f64) -> f64 {
        if observed_likelihood > self.pivot {
            self.favorable
        } else {
            self.unfavorable
        }
    }
}

/// Constant compromised-likelihood, independent of the observation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct FixedCompromiseModel(pub f64);

impl Default for FixedCompromiseModel {
    fn default() -> Self {
        Self(DEFAULT_LIKELIHOOD_COMPROMISED)
    }
}

impl CompromiseModel for FixedCompromiseModel {
    fn likelihood_compromised(&self, _observed_likelihood: f64) -> f64 {
        self.0
    }
}
