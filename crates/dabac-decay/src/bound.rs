//! Error bounds for the first-order Taylor decay.
//!
//! For `x = rate * dt >= 0`, `e^-x = 1 - x + R(x)` with Lagrange remainder
//! `0 <= R(x) <= x^2 / 2`. The absolute error of the Taylor decay on a belief
//! `b` is therefore at most `b * x^2 / 2`.

use dabac_core::error::DecayError;
use dabac_core::traits::DecayCalculator;
use dabac_core::types::Belief;

use crate::engine::DecayEngine;

/// Lagrange remainder bound `x^2 / 2` on `|e^-x - (1 - x)|`.
///
/// # Examples
///
/// ```
/// use dabac_decay::lagrange_bound;
///
/// assert!((lagrange_bound(0.1) - 0.005).abs() < 1e-15);
/// ```
pub fn lagrange_bound(x: f64) -> f64 {
    x * x / 2.0
}

/// Largest hybrid switch threshold whose Lagrange bound stays within
/// `budget`, the tolerated error relative to the undecayed belief.
///
/// # Examples
///
/// ```
/// use dabac_decay::switch_threshold_for_budget;
///
/// // 0.1% budget allows Taylor up to x ~ 0.0447.
/// let t = switch_threshold_for_budget(0.001).unwrap();
/// assert!((t - 0.044721).abs() < 1e-6);
/// ```
///
/// # Errors
///
/// [`DecayError::InvalidSwitchThreshold`] if `budget` is negative or not finite.
pub fn switch_threshold_for_budget(budget: f64) -> Result<f64, DecayError> {
    if !(budget.is_finite() && budget >= 0.0) {
        return Err(DecayError::InvalidSwitchThreshold(budget));
    }
    Ok((2.0 * budget).sqrt())
}

/// Observed `|exact - taylor|` for one decay step.
pub fn approximation_error(belief: Belief, elapsed: f64, rate: f64) -> Result<f64, DecayError> {
    let engine = DecayEngine::new();
    let exact = engine.decay_exact(belief, elapsed, rate)?;
    let taylor = engine.decay_taylor(belief, elapsed, rate)?;
    Ok((exact.value() - taylor.value()).abs())
}
