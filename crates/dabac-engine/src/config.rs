//! Configuration for the dabac trust service.
//!
//! [`DabacConfig`] is layered from three sources, later ones winning:
//!
//! 1. built-in defaults (the calibrated constants in `dabac_core::constants`)
//! 2. an optional TOML file (default `<config_dir>/dabac/dabac.toml`)
//! 3. environment variables prefixed `DABAC_`, nested with `__`
//!    (e.g. `DABAC_ENGINE__DECAY_RATE=0.1`)

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use dabac_core::constants::{
    DEFAULT_ALPHA, DEFAULT_DECAY_RATE, DEFAULT_MAX_WRITE_RETRIES, DEFAULT_TIME_UNIT_SECS,
    UNKNOWN_SUBJECT_FLOOR,
};
use dabac_core::error::DabacError;
use dabac_core::traits::CompromiseModel;
use dabac_core::types::DecayMode;
use dabac_policy::{LrapPolicy, PolicyError};

use crate::compromise::{FixedCompromiseModel, PivotCompromiseModel};

const ENV_PREFIX: &str = "DABAC";

/// How the engine treats a subject with no stored record.
///
/// One policy governs both the read path and the write path so the two can
/// never disagree.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnknownSubjectPolicy {
    /// Reads return `floor`; evidence for the subject is rejected until it is
    /// enrolled with an explicit seed.
    RequireEnrollment { floor: f64 },
    /// Reads return `belief`; the first evidence bootstraps a record at
    /// `belief` before the update.
    Bootstrap { belief: f64 },
}

impl UnknownSubjectPolicy {
    /// Effective trust reported for a subject with no record.
    pub fn read_value(&self) -> f64 {
        match *self {
            Self::RequireEnrollment { floor } => floor,
            Self::Bootstrap { belief } => belief,
        }
    }

    fn value_in_unit_interval(&self) -> bool {
        (0.0..=1.0).contains(&self.read_value())
    }
}

impl Default for UnknownSubjectPolicy {
    fn default() -> Self {
        Self::RequireEnrollment {
            floor: UNKNOWN_SUBJECT_FLOOR,
        }
    }
}

/// Which [`CompromiseModel`] single-likelihood evidence goes through.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompromisePolicy {
    Pivot {
        pivot: f64,
        favorable: f64,
        unfavorable: f64,
    },
    Fixed {
        likelihood: f64,
    },
}

impl CompromisePolicy {
    pub fn model(&self) -> Arc<dyn CompromiseModel> {
        match *self {
            Self::Pivot {
                pivot,
                favorable,
                unfavorable,
            } => Arc::new(PivotCompromiseModel {
                pivot,
                favorable,
                unfavorable,
            }),
            Self::Fixed { likelihood } => Arc::new(FixedCompromiseModel(likelihood)),
        }
    }

    fn likelihoods(&self) -> Vec<f64> {
        match *self {
            Self::Pivot {
                favorable,
                unfavorable,
                ..
            } => vec![favorable, unfavorable],
            Self::Fixed { likelihood } => vec![likelihood],
        }
    }
}

impl Default for CompromisePolicy {
    fn default() -> Self {
        let m = PivotCompromiseModel::default();
        Self::Pivot {
            pivot: m.pivot,
            favorable: m.favorable,
            unfavorable: m.unfavorable,
        }
    }
}

/// Trust engine settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Decay rate lambda per time unit.
    pub decay_rate: f64,
    /// Length of one decay time unit in seconds.
    pub time_unit_secs: f64,
    /// Decay formula used by `effective_trust`.
    pub read_mode: DecayMode,
    pub unknown_subject: UnknownSubjectPolicy,
    pub compromise: CompromisePolicy,
    /// Compare-and-swap attempts before a write gives up.
    pub max_write_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay_rate: DEFAULT_DECAY_RATE,
            time_unit_secs: DEFAULT_TIME_UNIT_SECS,
            read_mode: DecayMode::Exact,
            unknown_subject: UnknownSubjectPolicy::default(),
            compromise: CompromisePolicy::default(),
            max_write_retries: DEFAULT_MAX_WRITE_RETRIES,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<(), String> {
        if !(self.decay_rate.is_finite() && self.decay_rate >= 0.0) {
            return Err(format!("engine.decay_rate must be >= 0, got {}", self.decay_rate));
        }
        if !(self.time_unit_secs.is_finite() && self.time_unit_secs > 0.0) {
            return Err(format!(
                "engine.time_unit_secs must be > 0, got {}",
                self.time_unit_secs
            ));
        }
        if let DecayMode::Hybrid { switch_threshold } = self.read_mode {
            if !(switch_threshold.is_finite() && switch_threshold >= 0.0) {
                return Err(format!(
                    "engine.read_mode.switch_threshold must be >= 0, got {switch_threshold}"
                ));
            }
        }
        if !self.unknown_subject.value_in_unit_interval() {
            return Err(format!(
                "engine.unknown_subject value must lie in [0, 1], got {}",
                self.unknown_subject.read_value()
            ));
        }
        if let Some(bad) = self
            .compromise
            .likelihoods()
            .into_iter()
            .find(|l| !(l.is_finite() && *l >= 0.0))
        {
            return Err(format!("engine.compromise likelihood must be >= 0, got {bad}"));
        }
        if self.max_write_retries == 0 {
            return Err("engine.max_write_retries must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Access policy settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PolicyConfig {
    /// Risk sensitivity coefficient.
    pub alpha: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
        }
    }
}

impl PolicyConfig {
    pub fn policy(&self) -> Result<LrapPolicy, PolicyError> {
        LrapPolicy::new(self.alpha)
    }
}

/// Top-level configuration.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DabacConfig {
    pub engine: EngineConfig,
    pub policy: PolicyConfig,
    /// Log filter string (e.g. "info", "dabac_engine=debug").
    pub log_level: String,
}

impl Default for DabacConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            policy: PolicyConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl DabacConfig {
    /// Load defaults, then `path` (or the default file if it exists), then
    /// `DABAC_*` environment variables, and validate the result.
    ///
    /// # Errors
    ///
    /// [`DabacError::Config`] if an explicit `path` is missing or malformed,
    /// a value has the wrong type, or [`validate`](Self::validate) fails.
    pub fn load(path: Option<&Path>) -> Result<Self, DabacError> {
        let defaults = config::Config::try_from(&Self::default()).map_err(config_err)?;
        let mut builder = config::Config::builder().add_source(defaults);

        match path {
            Some(p) => {
                builder = builder.add_source(
                    config::File::from(p.to_path_buf())
                        .required(true)
                        .format(config::FileFormat::Toml),
                );
            }
            None => {
                if let Some(default_path) = default_config_path() {
                    builder = builder.add_source(
                        config::File::from(default_path)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let cfg: Self = builder
            .build()
            .map_err(config_err)?
            .try_deserialize()
            .map_err(config_err)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every numeric setting against its domain.
    pub fn validate(&self) -> Result<(), DabacError> {
        self.engine.validate().map_err(DabacError::Config)?;
        self.policy
            .policy()
            .map_err(|e| DabacError::Config(format!("policy.alpha: {e}")))?;
        Ok(())
    }
}

/// `<config_dir>/dabac/dabac.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("dabac").join("dabac.toml"))
}

fn config_err(e: config::ConfigError) -> DabacError {
    DabacError::Config(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dabac.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    // --- defaults ---

    #[test]
    fn defaults_carry_calibrated_constants() {
        let cfg = DabacConfig::default();
        assert_eq!(cfg.engine.decay_rate, 0.05);
        assert_eq!(cfg.engine.time_unit_secs, 1.0);
        assert_eq!(cfg.engine.read_mode, DecayMode::Exact);
        assert_eq!(
            cfg.engine.unknown_subject,
            UnknownSubjectPolicy::RequireEnrollment { floor: 0.0 }
        );
        assert_eq!(cfg.engine.max_write_retries, 1024);
        assert_eq!(cfg.policy.alpha, 0.5);
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn default_path_ends_with_dabac_toml() {
        if let Some(p) = default_config_path() {
            assert!(p.ends_with("dabac/dabac.toml"), "{p:?}");
        }
    }

    #[test]
    fn unknown_subject_read_values() {
        assert_eq!(UnknownSubjectPolicy::default().read_value(), 0.0);
        assert_eq!(UnknownSubjectPolicy::Bootstrap { belief: 0.5 }.read_value(), 0.5);
    }

    #[test]
    fn compromise_policy_builds_model() {
        let m = CompromisePolicy::default().model();
        assert_eq!(m.likelihood_compromised(999.0), 0.001);
        let m = CompromisePolicy::Fixed { likelihood: 0.5 }.model();
        assert_eq!(m.likelihood_compromised(999.0), 0.5);
    }

    // --- validate ---

    #[test]
    fn rejects_negative_rate() {
        let mut cfg = DabacConfig::default();
        cfg.engine.decay_rate = -0.1;
        assert!(matches!(cfg.validate(), Err(DabacError::Config(_))));
    }

    #[test]
    fn rejects_zero_time_unit() {
        let mut cfg = DabacConfig::default();
        cfg.engine.time_unit_secs = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_negative_alpha() {
        let mut cfg = DabacConfig::default();
        cfg.policy.alpha = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_bootstrap() {
        let mut cfg = DabacConfig::default();
        cfg.engine.unknown_subject = UnknownSubjectPolicy::Bootstrap { belief: 1.5 };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_retries() {
        let mut cfg = DabacConfig::default();
        cfg.engine.max_write_retries = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_negative_compromise_likelihood() {
        let mut cfg = DabacConfig::default();
        cfg.engine.compromise = CompromisePolicy::Fixed { likelihood: -0.5 };
        assert!(cfg.validate().is_err());
    }

    // --- load ---

    #[test]
    fn load_file_overrides_defaults() {
        let (_dir, path) = write_config(
            r#"
log_level = "debug"

[engine]
decay_rate = 0.1
time_unit_secs = 60.0
max_write_retries = 16

[engine.read_mode]
kind = "hybrid"
switch_threshold = 0.05

[engine.unknown_subject]
kind = "bootstrap"
belief = 0.5

[policy]
alpha = 1.0
"#,
        );
        let cfg = DabacConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.engine.decay_rate, 0.1);
        assert_eq!(cfg.engine.time_unit_secs, 60.0);
        assert_eq!(cfg.engine.max_write_retries, 16);
        assert_eq!(
            cfg.engine.read_mode,
            DecayMode::Hybrid {
                switch_threshold: 0.05
            }
        );
        assert_eq!(
            cfg.engine.unknown_subject,
            UnknownSubjectPolicy::Bootstrap { belief: 0.5 }
        );
        assert_eq!(cfg.policy.alpha, 1.0);
    }

    #[test]
    fn load_partial_file_keeps_other_defaults() {
        let (_dir, path) = write_config("[policy]\nalpha = 0.8\n");
        let cfg = DabacConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.policy.alpha, 0.8);
        assert_eq!(cfg.engine, EngineConfig::default());
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            DabacConfig::load(Some(&missing)),
            Err(DabacError::Config(_))
        ));
    }

    #[test]
    fn load_rejects_invalid_values() {
        let (_dir, path) = write_config("[engine]\ndecay_rate = -1.0\n");
        assert!(DabacConfig::load(Some(&path)).is_err());
    }
}
