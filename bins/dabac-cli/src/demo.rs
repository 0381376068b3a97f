//! Canned demonstration runs.

use std::hint::black_box;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use dabac_core::constants::DEFAULT_SWITCH_THRESHOLD;
use dabac_core::traits::DecayCalculator;
use dabac_core::types::{Belief, RequestContext, SubjectId, Timestamp};
use dabac_decay::{lagrange_bound, DecayEngine};
use dabac_engine::attributes::{LOCATION_KEY, NETWORK_SECURITY_KEY};
use dabac_engine::{
    DabacConfig, DecisionPoint, ManualClock, MemoryTrustStore, StaticAttributeProvider,
    TrustEngine,
};

use crate::render;
use crate::{BenchArgs, StaleArgs};

const SUBJECT: &str = "alice";
const OBJECT: &str = "record_8842";
const INITIAL_TRUST: f64 = 0.75;
const MFA_LIKELIHOOD: f64 = 999.0;

/// Hospital access, roaming to a cafe, then MFA remediation, on a simulated
/// clock (one second per decay unit with the default config).
pub fn scenario(config: &DabacConfig, json: bool) -> Result<()> {
    let clock = Arc::new(ManualClock::new(Timestamp::EPOCH));
    let engine = Arc::new(TrustEngine::new(
        Arc::new(MemoryTrustStore::new()),
        clock.clone(),
        config.engine.clone(),
    ));
    let attrs = Arc::new(StaticAttributeProvider::default());
    let policy = config.policy.policy().context("Invalid configured alpha")?;
    let pdp = DecisionPoint::new(engine.clone(), attrs.clone(), attrs, policy);

    let subject = SubjectId::from(SUBJECT);
    let hospital = RequestContext::new()
        .with(LOCATION_KEY, "hospital")
        .with(NETWORK_SECURITY_KEY, "wpa3_enterprise");
    let cafe = RequestContext::new()
        .with(LOCATION_KEY, "cafe")
        .with(NETWORK_SECURITY_KEY, "open");

    let initial = Belief::new(INITIAL_TRUST).context("Invalid initial trust")?;
    engine.seed(&subject, initial).context("Failed to seed subject")?;

    let mut decisions = Vec::new();

    let d = pdp.decide(&subject, OBJECT, &hospital)?;
    if !json {
        println!("T=0   {}", render::access_line("hospital", &d));
    }
    decisions.push(("hospital", d));

    clock.advance(10.0 * config.engine.time_unit_secs);
    let d = pdp.decide(&subject, OBJECT, &cafe)?;
    if !json {
        println!("T=10  {}", render::access_line("cafe", &d));
    }
    decisions.push(("cafe", d));

    clock.advance(config.engine.time_unit_secs);
    let outcome = engine
        .process_observation(&subject, MFA_LIKELIHOOD)
        .context("MFA evidence rejected")?;
    if !json {
        println!(
            "T=11  MFA evidence L={MFA_LIKELIHOOD}: trust {:.4} -> {:.4} (decayed prior {:.4})",
            outcome.prior.value(),
            outcome.posterior.value(),
            outcome.decayed.value()
        );
    }

    let d = pdp.decide(&subject, OBJECT, &cafe)?;
    if !json {
        println!("T=11  {}", render::access_line("cafe after MFA", &d));
    }
    decisions.push(("cafe_after_mfa", d));

    if json {
        let steps: Vec<_> = decisions
            .iter()
            .map(|(step, d)| serde_json::json!({ "step": step, "decision": d }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&steps)?);
    }
    Ok(())
}

/// Decide once with the stored (stale) trust and once with the decayed one.
pub fn stale(args: StaleArgs, config: &DabacConfig, json: bool) -> Result<()> {
    let policy = config.policy.policy().context("Invalid configured alpha")?;
    let stored = Belief::new(args.belief).context("Invalid stored belief")?;
    let decayed = DecayEngine::new()
        .decay_exact(stored, args.elapsed, config.engine.decay_rate)
        .context("Decay failed")?;

    let stale = policy.evaluate(stored.value(), args.base, args.risk);
    let fresh = policy.evaluate(decayed.value(), args.base, args.risk);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "stale": stale,
                "jit": fresh,
            }))?
        );
        return Ok(());
    }

    println!(
        "stored {:.4}, {} units idle, rate {} -> effective {:.4}",
        stored.value(),
        args.elapsed,
        config.engine.decay_rate,
        decayed.value()
    );
    println!("stale: {}", render::decision_line(&stale));
    println!("jit:   {}", render::decision_line(&fresh));
    if stale.granted && !fresh.granted {
        println!("stale trust would have granted access the decayed trust denies");
    }
    Ok(())
}

/// Time each decay method over `iterations` calls.
pub fn bench(args: BenchArgs, config: &DabacConfig) -> Result<()> {
    let engine = DecayEngine::new();
    let belief = Belief::new(0.95).context("Invalid belief")?;
    let rate = config.engine.decay_rate;
    let x = rate * args.elapsed;

    let exact = time(args.iterations, || engine.decay_exact(belief, args.elapsed, rate))?;
    let taylor = time(args.iterations, || engine.decay_taylor(belief, args.elapsed, rate))?;
    let hybrid = time(args.iterations, || {
        engine.decay_hybrid(belief, args.elapsed, rate, DEFAULT_SWITCH_THRESHOLD)
    })?;

    println!("{} iterations, x = {x:.4}", args.iterations);
    println!("exact   {:>12?}", exact);
    println!("taylor  {:>12?}", taylor);
    println!("hybrid  {:>12?}", hybrid);

    let e = engine.decay_exact(belief, args.elapsed, rate)?.value();
    let t = engine.decay_taylor(belief, args.elapsed, rate)?.value();
    let bound = lagrange_bound(x) * belief.value();
    println!(
        "|exact - taylor| = {:.3e}, Lagrange bound = {:.3e} ({})",
        (e - t).abs(),
        bound,
        if (e - t).abs() <= bound { "within" } else { "exceeded" }
    );
    Ok(())
}

fn time<T, E>(iterations: u64, mut f: impl FnMut() -> Result<T, E>) -> Result<Duration>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let start = Instant::now();
    for _ in 0..iterations {
        black_box(f()?);
    }
    Ok(start.elapsed())
}
