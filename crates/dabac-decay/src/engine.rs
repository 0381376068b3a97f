//! Decay engine implementing the [`DecayCalculator`] trait.
//!
//! All functions are pure and deterministic. The exact path makes one call
//! to `exp`; the Taylor path is a multiply-subtract. Inputs are validated on
//! every path: a negative elapsed time is a causality violation (clock skew)
//! and is surfaced, never clamped.

use dabac_core::error::DecayError;
use dabac_core::traits::DecayCalculator;
use dabac_core::types::{Belief, Timestamp};
use tracing::trace;

/// The production decay calculator.
///
/// Implements [`DecayCalculator`] with:
/// - exact exponential decay
/// - first-order Taylor decay floored at zero
/// - hybrid selection on the magnitude of `rate * elapsed`
#[derive(Debug, Clone, Default)]
pub struct DecayEngine;

impl DecayEngine {
    /// Create a new DecayEngine.
    pub fn new() -> Self {
        Self
    }
}

/// Elapsed decay time units between `last_update` and `now`.
///
/// # Errors
///
/// - [`DecayError::InvalidTimeUnit`] if `time_unit_secs` is not a positive finite number
/// - [`DecayError::CausalityViolation`] if `now` is earlier than `last_update`
/// - [`DecayError::NonFiniteElapsed`] if either timestamp is not finite
pub fn elapsed_units(
    now: Timestamp,
    last_update: Timestamp,
    time_unit_secs: f64,
) -> Result<f64, DecayError> {
    if !(time_unit_secs.is_finite() && time_unit_secs > 0.0) {
        return Err(DecayError::InvalidTimeUnit(time_unit_secs));
    }
    let elapsed = now.secs_since(last_update) / time_unit_secs;
    if !elapsed.is_finite() {
        return Err(DecayError::NonFiniteElapsed);
    }
    if elapsed < 0.0 {
        return Err(DecayError::CausalityViolation { elapsed });
    }
    Ok(elapsed)
}

fn check_inputs(elapsed: f64, rate: f64) -> Result<(), DecayError> {
    if elapsed < 0.0 {
        return Err(DecayError::CausalityViolation { elapsed });
    }
    if !elapsed.is_finite() {
        return Err(DecayError::NonFiniteElapsed);
    }
    if !(rate.is_finite() && rate >= 0.0) {
        return Err(DecayError::InvalidRate(rate));
    }
    Ok(())
}

impl DecayCalculator for DecayEngine {
    fn decay_exact(&self, belief: Belief, elapsed: f64, rate: f64) -> Result<Belief, DecayError> {
        check_inputs(elapsed, rate)?;
        if elapsed == 0.0 {
            return Ok(belief);
        }
        Ok(belief.scale((-rate * elapsed).exp()))
    }

    fn decay_taylor(&self, belief: Belief, elapsed: f64, rate: f64) -> Result<Belief, DecayError> {
        check_inputs(elapsed, rate)?;
        if elapsed == 0.0 {
            return Ok(belief);
        }
        let x = rate * elapsed;
        // 1 - x would leave the probability bounds.
        if x >= 1.0 {
            return Ok(Belief::ZERO);
        }
        Ok(belief.scale(1.0 - x))
    }

    fn decay_hybrid(
        &self,
        belief: Belief,
        elapsed: f64,
        rate: f64,
        switch_threshold: f64,
    ) -> Result<Belief, DecayError> {
        check_inputs(elapsed, rate)?;
        if !(switch_threshold.is_finite() && switch_threshold >= 0.0) {
            return Err(DecayError::InvalidSwitchThreshold(switch_threshold));
        }
        let x = rate * elapsed;
        if x < switch_threshold {
            trace!(x, switch_threshold, "decay: hybrid fast path");
            self.decay_taylor(belief, elapsed, rate)
        } else {
            trace!(x, switch_threshold, "decay: hybrid exact path");
            self.decay_exact(belief, elapsed, rate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dabac_core::constants::{DEFAULT_DECAY_RATE, DEFAULT_SWITCH_THRESHOLD};
    use dabac_core::types::DecayMode;
    use proptest::prelude::*;

    fn engine() -> DecayEngine {
        DecayEngine::new()
    }

    fn b(v: f64) -> Belief {
        Belief::new(v).unwrap()
    }

    // --- elapsed_units ---

    #[test]
    fn elapsed_in_units() {
        let t0 = Timestamp::from_secs(100.0);
        let t1 = Timestamp::from_secs(160.0);
        assert_eq!(elapsed_units(t1, t0, 1.0).unwrap(), 60.0);
        assert_eq!(elapsed_units(t1, t0, 60.0).unwrap(), 1.0);
        assert_eq!(elapsed_units(t0, t0, 1.0).unwrap(), 0.0);
    }

    #[test]
    fn elapsed_negative_is_causality_violation() {
        let t0 = Timestamp::from_secs(100.0);
        let t1 = Timestamp::from_secs(90.0);
        assert_eq!(
            elapsed_units(t1, t0, 1.0),
            Err(DecayError::CausalityViolation { elapsed: -10.0 })
        );
    }

    #[test]
    fn elapsed_rejects_bad_time_unit() {
        let t = Timestamp::EPOCH;
        assert_eq!(elapsed_units(t, t, 0.0), Err(DecayError::InvalidTimeUnit(0.0)));
        assert!(elapsed_units(t, t, f64::NAN).is_err());
    }

    // --- decay_exact ---

    #[test]
    fn exact_zero_elapsed_is_identity() {
        assert_eq!(engine().decay_exact(b(0.7), 0.0, 5.0).unwrap(), b(0.7));
    }

    #[test]
    fn exact_stale_session() {
        // 0.9 * e^-1.5
        let decayed = engine().decay_exact(b(0.9), 30.0, 0.05).unwrap();
        assert!((decayed.value() - 0.9 * (-1.5f64).exp()).abs() < 1e-12);
        assert!((decayed.value() - 0.2008).abs() < 1e-4, "got {decayed}");
    }

    #[test]
    fn exact_negative_elapsed_fails() {
        assert_eq!(
            engine().decay_exact(b(0.5), -1.0, 0.05),
            Err(DecayError::CausalityViolation { elapsed: -1.0 })
        );
    }

    #[test]
    fn exact_rejects_negative_rate() {
        assert_eq!(
            engine().decay_exact(b(0.5), 1.0, -0.05),
            Err(DecayError::InvalidRate(-0.05))
        );
    }

    #[test]
    fn exact_zero_rate_keeps_belief() {
        assert_eq!(engine().decay_exact(b(0.5), 1_000.0, 0.0).unwrap(), b(0.5));
    }

    // --- decay_taylor ---

    #[test]
    fn taylor_zero_elapsed_is_identity() {
        assert_eq!(engine().decay_taylor(b(0.7), 0.0, 5.0).unwrap(), b(0.7));
    }

    #[test]
    fn taylor_linear_factor() {
        let decayed = engine().decay_taylor(b(0.8), 2.0, 0.1).unwrap();
        assert!((decayed.value() - 0.8 * 0.8).abs() < 1e-12);
    }

    #[test]
    fn taylor_floors_at_zero() {
        assert_eq!(engine().decay_taylor(b(0.9), 20.0, 0.05).unwrap(), Belief::ZERO);
        assert_eq!(engine().decay_taylor(b(0.9), 100.0, 0.05).unwrap(), Belief::ZERO);
    }

    #[test]
    fn taylor_negative_elapsed_fails() {
        assert!(matches!(
            engine().decay_taylor(b(0.5), -0.5, 0.05),
            Err(DecayError::CausalityViolation { .. })
        ));
    }

    // --- decay_hybrid ---

    #[test]
    fn hybrid_small_step_uses_taylor() {
        let e = engine();
        let h = e.decay_hybrid(b(0.95), 0.1, 0.05, DEFAULT_SWITCH_THRESHOLD).unwrap();
        let t = e.decay_taylor(b(0.95), 0.1, 0.05).unwrap();
        assert_eq!(h, t);
    }

    #[test]
    fn hybrid_large_step_uses_exact() {
        let e = engine();
        let h = e.decay_hybrid(b(0.95), 30.0, 0.05, DEFAULT_SWITCH_THRESHOLD).unwrap();
        let x = e.decay_exact(b(0.95), 30.0, 0.05).unwrap();
        assert_eq!(h, x);
    }

    #[test]
    fn hybrid_switch_is_exclusive() {
        // x == switch_threshold takes the exact path.
        let e = engine();
        let h = e.decay_hybrid(b(0.5), 2.0, 0.05, 0.1).unwrap();
        assert_eq!(h, e.decay_exact(b(0.5), 2.0, 0.05).unwrap());
    }

    #[test]
    fn hybrid_rejects_bad_switch_threshold() {
        assert_eq!(
            engine().decay_hybrid(b(0.5), 1.0, 0.05, -0.1),
            Err(DecayError::InvalidSwitchThreshold(-0.1))
        );
    }

    #[test]
    fn mode_dispatch() {
        let e = engine();
        let belief = b(0.9);
        assert_eq!(
            e.decay(DecayMode::Exact, belief, 3.0, DEFAULT_DECAY_RATE).unwrap(),
            e.decay_exact(belief, 3.0, DEFAULT_DECAY_RATE).unwrap()
        );
        assert_eq!(
            e.decay(DecayMode::Taylor, belief, 3.0, DEFAULT_DECAY_RATE).unwrap(),
            e.decay_taylor(belief, 3.0, DEFAULT_DECAY_RATE).unwrap()
        );
    }

    #[test]
    fn lagrange_bound_holds_for_benchmark_vector() {
        let e = engine();
        let (belief, dt, rate) = (b(0.95), 0.1, 0.05);
        let exact = e.decay_exact(belief, dt, rate).unwrap().value();
        let taylor = e.decay_taylor(belief, dt, rate).unwrap().value();
        let x: f64 = rate * dt;
        assert!((exact - taylor).abs() <= x * x / 2.0 * belief.value());
    }

    // --- dyn compatibility ---

    #[test]
    fn engine_is_object_safe() {
        let e = engine();
        let dyn_e: &dyn DecayCalculator = &e;
        assert_eq!(dyn_e.decay_exact(b(0.3), 0.0, 1.0).unwrap(), b(0.3));
    }

    // --- proptest ---

    proptest! {
        #[test]
        fn exact_bounded_by_belief(
            belief in 0.0f64..=1.0,
            dt in 0.0f64..10_000.0,
            rate in 0.0f64..10.0,
        ) {
            let d = engine().decay_exact(b(belief), dt, rate).unwrap().value();
            prop_assert!(d >= 0.0 && d <= belief, "{} not in [0, {}]", d, belief);
        }

        #[test]
        fn exact_non_increasing_in_time(
            belief in 0.0f64..=1.0,
            dt1 in 0.0f64..1_000.0,
            extra in 0.0f64..1_000.0,
            rate in 0.0f64..1.0,
        ) {
            let e = engine();
            let d1 = e.decay_exact(b(belief), dt1, rate).unwrap();
            let d2 = e.decay_exact(b(belief), dt1 + extra, rate).unwrap();
            prop_assert!(d2.value() <= d1.value());
        }

        #[test]
        fn taylor_zero_past_unit_step(
            belief in 0.0f64..=1.0,
            rate in 0.001f64..1.0,
            over in 1.001f64..100.0,
        ) {
            let dt = over / rate;
            prop_assert_eq!(engine().decay_taylor(b(belief), dt, rate).unwrap(), Belief::ZERO);
        }

        #[test]
        fn taylor_within_lagrange_bound(
            belief in 0.0f64..=1.0,
            dt in 0.0f64..2.0,
            rate in 0.0f64..0.05,
        ) {
            let e = engine();
            let exact = e.decay_exact(b(belief), dt, rate).unwrap().value();
            let taylor = e.decay_taylor(b(belief), dt, rate).unwrap().value();
            let x = rate * dt;
            prop_assert!((exact - taylor).abs() <= x * x / 2.0 * belief + 1e-15);
        }

        #[test]
        fn hybrid_never_exceeds_belief(
            belief in 0.0f64..=1.0,
            dt in 0.0f64..1_000.0,
            rate in 0.0f64..1.0,
            switch in 0.0f64..2.0,
        ) {
            let d = engine().decay_hybrid(b(belief), dt, rate, switch).unwrap().value();
            prop_assert!(d >= 0.0 && d <= belief);
        }
    }
}
