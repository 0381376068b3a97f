//! Concurrent evidence processing.
//!
//! The posterior update multiplies the odds by `L_h / L_c`, so every
//! sequential order of a set of updates ends at the same belief (up to
//! rounding). With the clock held still, a concurrent run must land on that
//! belief and on exactly one version per update; a lost update shows up as
//! both a wrong belief and a short version count.

use std::sync::{Arc, Barrier};
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use dabac_core::types::SubjectId;
use dabac_engine::EngineConfig;
use dabac_tests::helpers::{sequential_posterior, Fixture};

const THREADS: usize = 8;
const UPDATES_PER_THREAD: usize = 200;

fn contended_config() -> EngineConfig {
    EngineConfig {
        max_write_retries: 1_000_000,
        ..EngineConfig::default()
    }
}

fn random_updates(seed: u64, n: usize) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (rng.gen_range(0.4..0.6), rng.gen_range(0.4..0.6)))
        .collect()
}

#[test]
fn no_lost_updates_on_one_subject() {
    let fx = Fixture::new(contended_config());
    let alice = fx.seed("alice", 0.5);

    let batches: Vec<Vec<(f64, f64)>> = (0..THREADS)
        .map(|t| random_updates(t as u64, UPDATES_PER_THREAD))
        .collect();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = batches
        .iter()
        .cloned()
        .map(|batch| {
            let engine = fx.engine.clone();
            let barrier = barrier.clone();
            let alice = alice.clone();
            thread::spawn(move || {
                barrier.wait();
                for (lh, lc) in batch {
                    engine.process_evidence(&alice, lh, lc).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let all: Vec<(f64, f64)> = batches.into_iter().flatten().collect();
    let expected = sequential_posterior(0.5, &all);

    let stored = fx.record(&alice).unwrap();
    assert_eq!(stored.version, 1 + (THREADS * UPDATES_PER_THREAD) as u64);
    assert!(
        (stored.record.belief.value() - expected).abs() < 1e-9,
        "concurrent {} vs sequential {expected}",
        stored.record.belief.value()
    );
}

#[test]
fn subjects_do_not_interfere() {
    let fx = Fixture::new(contended_config());
    let subjects: Vec<SubjectId> = (0..THREADS)
        .map(|i| fx.seed(&format!("subject-{i}"), 0.5))
        .collect();

    let handles: Vec<_> = subjects
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, subject)| {
            let engine = fx.engine.clone();
            thread::spawn(move || {
                for (lh, lc) in random_updates(100 + i as u64, UPDATES_PER_THREAD) {
                    engine.process_evidence(&subject, lh, lc).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for (i, subject) in subjects.iter().enumerate() {
        let stored = fx.record(subject).unwrap();
        let expected =
            sequential_posterior(0.5, &random_updates(100 + i as u64, UPDATES_PER_THREAD));
        assert_eq!(stored.version, 1 + UPDATES_PER_THREAD as u64);
        assert!((stored.record.belief.value() - expected).abs() < 1e-12);
    }
}

#[test]
fn readers_run_alongside_writers() {
    let fx = Fixture::new(contended_config());
    let alice = fx.seed("alice", 0.5);

    let writer = {
        let engine = fx.engine.clone();
        let alice = alice.clone();
        thread::spawn(move || {
            for _ in 0..500 {
                engine.process_evidence(&alice, 0.6, 0.4).unwrap();
            }
        })
    };
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = fx.engine.clone();
            let alice = alice.clone();
            thread::spawn(move || {
                let mut last = 0.0;
                for _ in 0..500 {
                    let t = engine.effective_trust(&alice).unwrap();
                    assert!((0.0..=1.0).contains(&t));
                    // positive evidence only, clock still: trust never drops
                    assert!(t >= last);
                    last = t;
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(fx.record(&alice).unwrap().version, 501);
}
