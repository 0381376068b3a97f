//! dabac: demonstration harness for the just-in-time trust engine.
//!
//! One-shot decay and policy calculations, plus three canned runs: the
//! roaming-clinician scenario, the stale-trust comparison and a decay-cost
//! benchmark.

mod demo;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use dabac_core::constants::DEFAULT_SWITCH_THRESHOLD;
use dabac_core::traits::DecayCalculator;
use dabac_core::types::{Belief, DecayMode};
use dabac_decay::{lagrange_bound, DecayEngine};
use dabac_engine::DabacConfig;
use dabac_policy::LrapPolicy;

#[derive(Parser)]
#[command(name = "dabac")]
#[command(version, about = "Time-decaying Bayesian trust with risk-adaptive access thresholds")]
struct Cli {
    /// Config file (default: <config_dir>/dabac/dabac.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter; overrides the config file.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json").
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decay one belief over an elapsed interval.
    Decay(DecayArgs),
    /// Evaluate the access inequality for explicit inputs.
    Evaluate(EvaluateArgs),
    /// Walk a clinician from hospital to cafe and through MFA remediation.
    Scenario,
    /// Compare a stale stored trust against the JIT-decayed one.
    Stale(StaleArgs),
    /// Time exact, Taylor and hybrid decay and check the Taylor error bound.
    Bench(BenchArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Exact,
    Taylor,
    Hybrid,
}

#[derive(Args)]
struct DecayArgs {
    /// Belief at the last update, in [0, 1].
    #[arg(short, long)]
    belief: f64,

    /// Elapsed decay time units.
    #[arg(short, long)]
    elapsed: f64,

    /// Decay rate lambda; defaults to the configured rate.
    #[arg(short, long)]
    rate: Option<f64>,

    #[arg(short, long, value_enum, default_value = "exact")]
    mode: ModeArg,

    /// Hybrid switch threshold on rate * elapsed.
    #[arg(long, default_value_t = DEFAULT_SWITCH_THRESHOLD)]
    switch_threshold: f64,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Effective trust of the subject.
    #[arg(short, long)]
    trust: f64,

    /// Object base requirement.
    #[arg(short, long)]
    base: f64,

    /// Environmental risk in [0, 1].
    #[arg(short, long)]
    risk: f64,

    /// Risk sensitivity; defaults to the configured alpha.
    #[arg(short, long)]
    alpha: Option<f64>,
}

#[derive(Args)]
pub(crate) struct StaleArgs {
    /// Trust stored at the last write.
    #[arg(long, default_value_t = 0.90)]
    pub belief: f64,

    /// Decay time units since that write.
    #[arg(long, default_value_t = 30.0)]
    pub elapsed: f64,

    /// Object base requirement.
    #[arg(long, default_value_t = 0.60)]
    pub base: f64,

    /// Environmental risk at decision time.
    #[arg(long, default_value_t = 0.80)]
    pub risk: f64,
}

#[derive(Args)]
pub(crate) struct BenchArgs {
    /// Decay calls per method.
    #[arg(short = 'n', long, default_value_t = 1_000_000)]
    pub iterations: u64,

    /// Elapsed time units per call.
    #[arg(long, default_value_t = 0.1)]
    pub elapsed: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = DabacConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_logging(&level, &cli.log_format);
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Decay(args) => run_decay(args, &config, cli.json),
        Commands::Evaluate(args) => run_evaluate(args, &config, cli.json),
        Commands::Scenario => demo::scenario(&config, cli.json),
        Commands::Stale(args) => demo::stale(args, &config, cli.json),
        Commands::Bench(args) => demo::bench(args, &config),
    }
}

fn run_decay(args: DecayArgs, config: &DabacConfig, json: bool) -> Result<()> {
    let belief = Belief::new(args.belief).context("Invalid belief")?;
    let rate = args.rate.unwrap_or(config.engine.decay_rate);
    let mode = match args.mode {
        ModeArg::Exact => DecayMode::Exact,
        ModeArg::Taylor => DecayMode::Taylor,
        ModeArg::Hybrid => DecayMode::Hybrid {
            switch_threshold: args.switch_threshold,
        },
    };

    let decayed = DecayEngine::new()
        .decay(mode, belief, args.elapsed, rate)
        .context("Decay failed")?;
    let x = rate * args.elapsed;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "belief": belief.value(),
                "elapsed": args.elapsed,
                "rate": rate,
                "mode": mode,
                "decayed": decayed.value(),
                "lagrange_bound": lagrange_bound(x) * belief.value(),
            })
        );
    } else {
        println!(
            "{} decay: {:.4} -> {:.4} (rate {rate}, elapsed {}, x = {x:.4})",
            mode.name(),
            belief.value(),
            decayed.value(),
            args.elapsed
        );
        println!(
            "Taylor error bound at this step: {:.3e}",
            lagrange_bound(x) * belief.value()
        );
    }
    Ok(())
}

fn run_evaluate(args: EvaluateArgs, config: &DabacConfig, json: bool) -> Result<()> {
    let policy = match args.alpha {
        Some(alpha) => LrapPolicy::new(alpha).context("Invalid alpha")?,
        None => config.policy.policy().context("Invalid configured alpha")?,
    };
    let decision = policy.evaluate(args.trust, args.base, args.risk);

    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        println!("{}", render::decision_line(&decision));
    }
    Ok(())
}

/// Initialize tracing with the given level and output format.
///
/// `RUST_LOG` wins over `level_str` when set. `format = "json"` emits
/// structured JSON lines; anything else is human-readable text.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
