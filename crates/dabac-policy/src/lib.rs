//! # dabac-policy: linear risk-adaptive access policy.
//!
//! Access is granted iff `trust >= base * (1 + alpha * risk)`. When the
//! threshold exceeds 1.0 no belief can satisfy it and the evaluation returns
//! a lockdown, a first-class outcome distinct from an ordinary deny.
//!
//! Evaluation is pure: decisions carry structured reason codes and the
//! numeric inputs that produced them. Rendering text is left to callers.

pub mod decision;
pub mod lrap;

pub use decision::{DecisionInputs, PolicyDecision, ReasonCode};
pub use lrap::{evaluate, threshold, LrapPolicy, PolicyError};
