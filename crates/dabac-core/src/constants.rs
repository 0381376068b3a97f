//! Model constants. Probabilities are plain `f64` in `[0, 1]`.

/// Tolerance applied to probability bounds and degenerate denominators.
///
/// A belief within `EPSILON` outside `[0, 1]` is floating-point noise and is
/// clamped; anything further out is an invariant violation.
pub const EPSILON: f64 = 1e-9;

/// Default decay rate (lambda): state-flip probability per time unit.
pub const DEFAULT_DECAY_RATE: f64 = 0.05;

/// Default risk sensitivity coefficient (alpha) of the LRAP rule.
///
/// With `alpha = 0.5` a maximum-risk environment raises the requirement by 50%.
pub const DEFAULT_ALPHA: f64 = 0.5;

/// Default value of `rate * dt` below which the hybrid decay takes the
/// first-order Taylor path.
///
/// At `x = 0.1` the Lagrange remainder `x^2 / 2` is `0.005`.
pub const DEFAULT_SWITCH_THRESHOLD: f64 = 0.1;

/// Seconds represented by one decay time unit.
pub const DEFAULT_TIME_UNIT_SECS: f64 = 1.0;

/// Neutral belief: equal odds of the honest and compromised states.
pub const NEUTRAL_BELIEF: f64 = 0.5;

/// Effective trust reported for a subject with no record (fail-closed).
pub const UNKNOWN_SUBJECT_FLOOR: f64 = 0.0;

/// Default `P(E | compromised)` when nothing is known about the attacker
/// (maximum entropy).
pub const DEFAULT_LIKELIHOOD_COMPROMISED: f64 = 0.5;

/// Observed likelihood above which evidence is read as favouring "honest".
pub const DEFAULT_LIKELIHOOD_PIVOT: f64 = 1.0;

/// `P(E | compromised)` assumed for evidence favouring "honest".
pub const DEFAULT_FAVORABLE_COMPROMISED: f64 = 0.001;

/// `P(E | compromised)` assumed for evidence not favouring "honest".
pub const DEFAULT_UNFAVORABLE_COMPROMISED: f64 = 0.999;

/// Base requirement for objects the attribute provider does not know.
///
/// Unknown objects require maximum trust.
pub const UNKNOWN_OBJECT_REQUIREMENT: f64 = 1.0;

/// Environmental risk for contexts the risk provider cannot classify.
pub const DEFAULT_ENVIRONMENTAL_RISK: f64 = 0.5;

/// Highest value a belief can take. A threshold above it is unsatisfiable.
pub const MAX_TRUST: f64 = 1.0;

/// Optimistic write attempts before the engine reports contention.
pub const DEFAULT_MAX_WRITE_RETRIES: u32 = 1024;
