//! Bayesian belief update over the two-state (honest / compromised) model.
//!
//! Pure computation, no storage, no IO. Reentrant and safe to call from any
//! number of threads.
//!
//! ```text
//! posterior = L_h * prior / (L_h * prior + L_c * (1 - prior))
//! ```

use crate::constants::{DEFAULT_LIKELIHOOD_COMPROMISED, EPSILON};
use crate::error::BeliefError;
use crate::types::{Belief, EvidenceObservation};

/// Posterior belief after observing evidence with the given likelihoods.
///
/// When the marginal likelihood `L_h * prior + L_c * (1 - prior)` is below
/// [`EPSILON`] the evidence is impossible under the model and `prior` is
/// returned unchanged.
///
/// # Errors
///
/// [`BeliefError`] if the raw posterior falls outside `[-EPSILON, 1 + EPSILON]`
/// or is not finite, which only happens for malformed (e.g. negative)
/// likelihoods.
///
/// # Examples
///
/// ```
/// use dabac_core::bayes::posterior;
/// use dabac_core::types::Belief;
///
/// let prior = Belief::new(0.5).unwrap();
/// let post = posterior(prior, 0.9, 0.1).unwrap();
/// assert!((post.value() - 0.9).abs() < 1e-12);
/// ```
pub fn posterior(
    prior: Belief,
    likelihood_honest: f64,
    likelihood_compromised: f64,
) -> Result<Belief, BeliefError> {
    let numerator = likelihood_honest * prior.value();
    let denominator = numerator + likelihood_compromised * prior.complement();

    if denominator < EPSILON {
        return Ok(prior);
    }

    Belief::new(numerator / denominator)
}

/// [`posterior`] with `P(E | compromised)` at the maximum-entropy default.
pub fn posterior_uninformed(prior: Belief, likelihood_honest: f64) -> Result<Belief, BeliefError> {
    posterior(prior, likelihood_honest, DEFAULT_LIKELIHOOD_COMPROMISED)
}

/// [`posterior`] for an already-validated observation.
pub fn update(prior: Belief, evidence: &EvidenceObservation) -> Result<Belief, BeliefError> {
    posterior(
        prior,
        evidence.likelihood_honest,
        evidence.likelihood_compromised,
    )
}

/// Log-likelihood ratio `ln(L_h / L_c)`.
///
/// * `L_c == 0`, `L_h > 0`: `+inf`
/// * `L_h == 0`, `L_c > 0`: `-inf`
/// * both zero: `0.0`. No evidence either way, consistent with [`posterior`]
///   leaving the prior unchanged when the marginal likelihood vanishes.
///
/// # Examples
///
/// ```
/// use dabac_core::bayes::evidence_strength;
///
/// assert_eq!(evidence_strength(1.0, 1.0), 0.0);
/// assert_eq!(evidence_strength(1.0, 0.0), f64::INFINITY);
/// assert_eq!(evidence_strength(0.0, 1.0), f64::NEG_INFINITY);
/// assert_eq!(evidence_strength(0.0, 0.0), 0.0);
/// ```
pub fn evidence_strength(likelihood_honest: f64, likelihood_compromised: f64) -> f64 {
    match (likelihood_honest == 0.0, likelihood_compromised == 0.0) {
        (true, true) => 0.0,
        (false, true) => f64::INFINITY,
        (true, false) => f64::NEG_INFINITY,
        (false, false) => (likelihood_honest / likelihood_compromised).ln(),
    }
}
