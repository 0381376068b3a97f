//! # dabac-decay: time decay of trust beliefs.
//!
//! Decay models the probability of staying in the honest state over an
//! elapsed interval:
//! - **Exact**: `belief * exp(-lambda * dt)`, one transcendental call.
//! - **Taylor**: `belief * (1 - lambda * dt)`, O(1) arithmetic, floored at zero.
//! - **Hybrid**: Taylor while `lambda * dt` is below a switch threshold, exact
//!   otherwise. The Taylor truncation error is bounded by the Lagrange
//!   remainder `x^2 / 2` (see [`bound`]), so a high-volume decision path can
//!   cap its per-request CPU cost with a quantified error.

pub mod bound;
pub mod engine;

pub use bound::{approximation_error, lagrange_bound, switch_threshold_for_budget};
pub use engine::{elapsed_units, DecayEngine};
