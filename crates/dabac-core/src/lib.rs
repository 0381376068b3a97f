//! # dabac-core
//! Foundation types, seam traits and the Bayesian belief update for dabac.

pub mod bayes;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
