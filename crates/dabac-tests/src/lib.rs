//! Integration and adversarial test suite for dabac.
//!
//! The tests in `tests/` drive the public APIs of all crates together:
//! the concrete access scenarios, concurrent evidence on one subject, and the
//! read-only just-in-time trust property under randomized clocks.

pub mod helpers;
