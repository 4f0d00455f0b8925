//! dp-trial: run a diagnostic pathway trial from the command line.
//!
//! ```text
//! dp-trial [CONFIG.json]
//! ```
//!
//! Without an argument the default service model is used.  A JSON file only
//! needs the fields it overrides, e.g.
//! `{"triage": {"weekly_capacity": 40}, "simulation": {"number_of_runs": 5}}`.
//! Set `RUST_LOG=dp=debug` for per-week snapshots.

use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dp_core::{PathwayConfig, QueueMap, QueueStage, RunId};
use dp_sim::{RunObserver, Trial, WeekRow};

// ── Observer ──────────────────────────────────────────────────────────────────

/// Counts target-wait breaches per run.
#[derive(Default)]
struct BreachCounter {
    breaches: Vec<QueueMap<u32>>,
}

impl RunObserver for BreachCounter {
    fn on_week_start(&mut self, run: RunId, week: u32) {
        if week == 0 {
            debug_assert_eq!(run.index(), self.breaches.len());
            self.breaches.push(QueueMap::default());
        }
    }

    fn on_snapshot(&mut self, row: &WeekRow) {
        if let Some(counts) = self.breaches.last_mut() {
            for q in QueueStage::ALL {
                counts[q] += row.queues[q].breaches;
            }
        }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn load_config() -> Result<PathwayConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(PathwayConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    info!(%path, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("dp=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_config()?;
    let sim = &config.simulation;
    println!("=== dp-trial: diagnostic pathway simulation ===");
    println!(
        "Runs: {}  |  Weeks: {}  |  Seed: {}  |  Referrals/week: {}",
        sim.number_of_runs, sim.horizon_weeks, sim.seed, config.referral.arrival_rate
    );
    println!(
        "Weekly capacity  triage: {}  mdt: {}  assessment: {}",
        config.triage.weekly_capacity, config.mdt.weekly_capacity, config.assessment.weekly_capacity
    );
    println!();

    let trial = Trial::from_config(config);
    let mut breaches = BreachCounter::default();
    let t0 = Instant::now();
    let results = trial.run_trial_with(&mut breaches)?;
    println!("Trial complete in {:.3} s", t0.elapsed().as_secs_f64());
    println!();

    // Per-run summary.
    println!(
        "{:<5} {:>8} {:>8} {:>8} {:>9} {:>9} {:>9} {:>8} {:>8} {:>8} {:>10}",
        "Run", "Arrived", "Accept", "Reject", "TriWait", "MdtWait", "AsstWait", "TriMax", "AsstMax", "Breach",
        "StaffHrs",
    );
    println!("{}", "-".repeat(103));
    for (summary, counts) in results.summaries.iter().zip(&breaches.breaches) {
        let wait = |q: QueueStage| summary.mean_wait[q].map_or("-".to_string(), |w| format!("{w:.2}"));
        let staff_hours =
            results.run_weekly(summary.run).map(WeekRow::staff_minutes).sum::<f64>() / 60.0;
        println!(
            "{:<5} {:>8} {:>8} {:>8} {:>9} {:>9} {:>9} {:>8} {:>8} {:>8} {:>10.1}",
            summary.run.0,
            summary.arrivals,
            summary.accepted,
            summary.total_rejected(),
            wait(QueueStage::Triage),
            wait(QueueStage::Mdt),
            wait(QueueStage::Assessment),
            summary.max_waiting[QueueStage::Triage],
            summary.max_waiting[QueueStage::Assessment],
            counts.iter().map(|(_, n)| n).sum::<u32>(),
            staff_hours,
        );
    }
    println!();

    // Average waiting lists across runs, every fourth week plus the last.
    println!("{:<6} {:>10} {:>10} {:>10} {:>10}", "Week", "Referrals", "TriageWL", "MdtWL", "AsstWL");
    println!("{}", "-".repeat(50));
    let means = results.weekly_means();
    let last = means.len().saturating_sub(1);
    for (i, mean) in means.iter().enumerate() {
        if i % 4 != 0 && i != last {
            continue;
        }
        println!(
            "{:<6} {:>10.1} {:>10.1} {:>10.1} {:>10.1}",
            mean.week,
            mean.referrals,
            mean.waiting[QueueStage::Triage],
            mean.waiting[QueueStage::Mdt],
            mean.waiting[QueueStage::Assessment],
        );
    }

    Ok(())
}
