//! Integration tests for dp-sim.

use dp_core::{PathwayConfig, QueueStage, RunId, Stage};
use dp_schedule::{FixedReferrals, ReferralSource};

use crate::{NoopObserver, Run, RunBuilder, RunObserver, RunSummary, WeekRow};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(horizon_weeks: u32) -> PathwayConfig {
    let mut c = PathwayConfig::default();
    c.simulation.horizon_weeks = horizon_weeks;
    c.simulation.number_of_runs = 1;
    c
}

fn no_rejections(horizon_weeks: u32) -> PathwayConfig {
    let mut c = test_config(horizon_weeks);
    c.referral.rejection_rate = 0.0;
    c.triage.rejection_rate = 0.0;
    c.pack.rejection_rate = 0.0;
    c.observations.rejection_rate = 0.0;
    c.mdt.rejection_rate = 0.0;
    c.assessment.rejection_rate = 0.0;
    c
}

fn fixed_run<R: ReferralSource>(config: PathwayConfig, referrals: R) -> Run<dp_pathway::DiagnosticPathway, R> {
    RunBuilder::new(config, RunId(0), 7).referrals(referrals).build().unwrap()
}

#[derive(Default)]
struct CountingObserver {
    week_starts: usize,
    snapshots:   usize,
    done:        usize,
    run_ends:    usize,
    last_row:    Option<u32>,
}

impl RunObserver for CountingObserver {
    fn on_week_start(&mut self, _run: RunId, _week: u32) {
        self.week_starts += 1;
    }
    fn on_snapshot(&mut self, row: &WeekRow) {
        self.snapshots += 1;
        self.last_row = Some(row.week);
    }
    fn on_patient_done(&mut self, _patient: &dp_patient::Patient) {
        self.done += 1;
    }
    fn on_run_end(&mut self, _summary: &RunSummary) {
        self.run_ends += 1;
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use dp_core::DpError;

    use super::*;
    use crate::SimError;

    #[test]
    fn builds_with_full_pools() {
        let config = test_config(4);
        let run = RunBuilder::new(config.clone(), RunId(3), 1).build().unwrap();
        assert_eq!(run.id, RunId(3));
        assert_eq!(run.next_week(), 0);
        for q in QueueStage::ALL {
            assert_eq!(run.pool(q).level(), config.capacity(q));
            assert_eq!(run.waiting(q), 0);
        }
        assert!(run.patients.is_empty());
    }

    #[test]
    fn reachable_zero_capacity_is_rejected() {
        let mut config = test_config(4);
        config.triage.weekly_capacity = 0;
        let result = RunBuilder::new(config, RunId(0), 1).build();
        assert!(matches!(result, Err(SimError::Core(DpError::Config(_)))));
    }

    #[test]
    fn custom_source_into_zero_capacity_is_rejected() {
        let mut config = test_config(4);
        config.referral.arrival_rate = 0.0;
        config.triage.weekly_capacity = 0;
        let result = RunBuilder::new(config.clone(), RunId(0), 1)
            .referrals(FixedReferrals::constant(3))
            .build();
        assert!(matches!(result, Err(SimError::Core(DpError::Config(_)))));

        // A source that never refers leaves triage unreachable.
        RunBuilder::new(config, RunId(0), 1).referrals(FixedReferrals::none()).build().unwrap();
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let result = RunBuilder::new(test_config(0), RunId(0), 1).build();
        assert!(result.is_err());
    }
}

// ── Week loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod week_loop {
    use super::*;
    use crate::SimError;

    #[test]
    fn records_horizon_plus_one_rows() {
        let mut run = RunBuilder::new(test_config(6), RunId(0), 11).build().unwrap();
        let out = run.run(&mut NoopObserver).unwrap();
        assert_eq!(out.weekly.len(), 7);
        let weeks: Vec<u32> = out.weekly.iter().map(|r| r.week).collect();
        assert_eq!(weeks, (0..=6).collect::<Vec<_>>());
        assert!(run.is_complete());
    }

    #[test]
    fn closing_week_spawns_nothing() {
        let mut run = fixed_run(test_config(3), FixedReferrals::constant(2));
        let out = run.run(&mut NoopObserver).unwrap();
        let referrals: Vec<u32> = out.weekly.iter().map(|r| r.referrals).collect();
        assert_eq!(referrals, vec![2, 2, 2, 0]);
        assert_eq!(out.patients.len(), 6);
        assert_eq!(out.summary.arrivals, 6);
    }

    #[test]
    fn step_past_horizon_errors() {
        let mut run = fixed_run(test_config(2), FixedReferrals::none());
        run.run(&mut NoopObserver).unwrap();
        assert!(matches!(run.step_week(&mut NoopObserver), Err(SimError::HorizonReached(2))));
    }

    #[test]
    fn run_weeks_advances_incrementally() {
        let mut run = fixed_run(test_config(5), FixedReferrals::constant(1));
        run.run_weeks(2, &mut NoopObserver).unwrap();
        assert_eq!(run.next_week(), 2);
        assert_eq!(run.weekly.len(), 2);
        assert_eq!(run.patients.len(), 2);
        assert!(!run.is_complete());
    }

    #[test]
    fn referrals_see_replenished_pools() {
        let mut config = no_rejections(2);
        config.triage.weekly_capacity = 1;
        let mut run = fixed_run(config, FixedReferrals::new(vec![2]));
        run.run_weeks(1, &mut NoopObserver).unwrap();
        // Both referrals spawned at t = 0; nothing has run yet.
        assert_eq!(run.pool(QueueStage::Triage).level(), 1);
        run.run_weeks(1, &mut NoopObserver).unwrap();
        // One took the unit, the other queues; the week-1 top-up admits it.
        let row = &run.weekly[1];
        assert_eq!(row.queues[QueueStage::Triage].admitted, 1);
        assert_eq!(row.queues[QueueStage::Triage].waiting, 1);
        assert_eq!(row.pools[QueueStage::Triage], 0);
        assert_eq!(run.pool(QueueStage::Triage).waiting(), 0);
    }

    #[test]
    fn queued_patient_waits_one_week() {
        let mut config = no_rejections(3);
        config.triage.weekly_capacity = 1;
        let mut run = fixed_run(config, FixedReferrals::new(vec![2]));
        let out = run.run(&mut NoopObserver).unwrap();
        let mut waits: Vec<f64> = out.patients.iter().map(|p| p.triage.queue.queue_wait).collect();
        waits.sort_by(f64::total_cmp);
        assert_eq!(waits[0], 0.0);
        // Joined just after screening at t = 0, admitted by the week-1 top-up.
        assert!(waits[1] > 0.99 && waits[1] < 1.0, "second patient waited {}", waits[1]);
        assert!(out.patients.iter().all(|p| p.accepted()));
    }

    #[test]
    fn finish_zeroes_waiting_lists() {
        let mut config = test_config(3);
        config.triage.weekly_capacity = 1;
        let mut run = fixed_run(config, FixedReferrals::constant(5));
        let out = run.run(&mut NoopObserver).unwrap();
        assert!(out.summary.final_waiting[QueueStage::Triage] > 0);
        for q in QueueStage::ALL {
            assert_eq!(run.waiting(q), 0);
        }
        assert!(run.weekly.is_empty());
        assert!(run.patients.is_empty());
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenarios {
    use dp_patient::Origin;

    use super::*;

    #[test]
    fn certain_referral_rejection_rejects_everyone() {
        let mut config = test_config(4);
        config.referral.rejection_rate = 1.0;
        let mut run = fixed_run(config, FixedReferrals::constant(3));
        let out = run.run(&mut NoopObserver).unwrap();

        assert_eq!(out.patients.len(), 12);
        assert!(out.patients.iter().all(|p| p.rejected_at(Stage::Referral) && p.is_complete()));
        for row in &out.weekly {
            for q in QueueStage::ALL {
                assert_eq!(row.queues[q].waiting, 0);
                assert_eq!(row.queues[q].max_waiting, 0);
                assert_eq!(row.queues[q].admitted, 0);
            }
        }
        assert_eq!(out.summary.rejected[Stage::Referral], 12);
        assert_eq!(out.summary.incomplete, 0);
    }

    #[test]
    fn zero_capacity_without_referrals_completes() {
        let mut config = test_config(5);
        config.triage.weekly_capacity = 0;
        config.referral.arrival_rate = 0.0;
        let mut run = RunBuilder::new(config, RunId(0), 3).build().unwrap();
        let out = run.run(&mut NoopObserver).unwrap();
        assert_eq!(out.weekly.len(), 6);
        assert!(out.patients.is_empty());
        assert!(out.weekly.iter().all(|r| r.referrals == 0));
    }

    #[test]
    fn single_referral_reaches_diagnosis_within_its_week() {
        let mut run = fixed_run(no_rejections(1), FixedReferrals::new(vec![1]));
        let out = run.run(&mut NoopObserver).unwrap();

        assert_eq!(out.patients.len(), 1);
        let p = &out.patients[0];
        assert!(p.accepted());
        assert!(p.is_complete());
        for stage in Stage::ALL {
            assert!(!p.rejected_at(stage));
        }
        for q in QueueStage::ALL {
            assert_eq!(p.queue(q).queue_wait, 0.0);
            assert_eq!(p.queue(q).wl_position, 1);
        }
        assert_eq!(out.weekly[0].referrals, 1);
        assert_eq!(out.weekly[1].accepted, 1);
        assert_eq!(out.summary.accepted, 1);
        assert_eq!(out.summary.incomplete, 0);
    }

    #[test]
    fn triage_backlog_is_oversized_by_capacity() {
        let mut config = test_config(4);
        config.simulation.triage_waiting_list = 5;
        config.triage.weekly_capacity = 10;
        let mut run = fixed_run(config, FixedReferrals::none());

        let created = run.prefill(&mut NoopObserver).unwrap();
        assert_eq!(created, 15);
        assert_eq!(run.patients.count_origin(Origin::TriageBacklog), 15);
        assert_eq!(run.patients.len(), 15);
        assert_eq!(run.pool(QueueStage::Triage).level(), 0);
        assert_eq!(run.pool(QueueStage::Triage).waiting(), 5);
        assert_eq!(run.waiting(QueueStage::Triage), 5);

        run.run_weeks(1, &mut NoopObserver).unwrap();
        let row = &run.weekly[0];
        assert_eq!(row.referrals, 0);
        assert_eq!(row.pools[QueueStage::Triage], 0);
        assert_eq!(row.queues[QueueStage::Triage].waiting, 5);
        assert_eq!(row.queues[QueueStage::Triage].admitted, 10);
        assert_eq!(row.queues[QueueStage::Triage].max_waiting, 5);
    }
}

// ── Prefill ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod prefill {
    use dp_core::PatientId;
    use dp_patient::Origin;

    use super::*;
    use crate::{SimError, prefill_size};

    #[test]
    fn size_is_zero_without_backlog() {
        let config = test_config(4);
        for q in QueueStage::ALL {
            assert_eq!(prefill_size(&config, q), 0);
        }
    }

    #[test]
    fn assessment_backlog_created_first() {
        let mut config = test_config(4);
        config.simulation.assessment_waiting_list = 3;
        config.simulation.triage_waiting_list = 2;
        let mut run = fixed_run(config.clone(), FixedReferrals::none());
        let created = run.prefill(&mut NoopObserver).unwrap();

        let assessment = 3 + config.assessment.weekly_capacity;
        let triage = 2 + config.triage.weekly_capacity;
        assert_eq!(created, assessment + triage);
        let origin = |i: u32| run.patients.get(PatientId(i)).unwrap().origin;
        assert_eq!(origin(0), Origin::AssessmentBacklog);
        assert_eq!(origin(assessment - 1), Origin::AssessmentBacklog);
        assert_eq!(origin(assessment), Origin::TriageBacklog);
        assert!(run.patients.iter().all(|p| p.week_added == 0));
        assert_eq!(run.waiting(QueueStage::Assessment), 3);
        assert_eq!(run.waiting(QueueStage::Triage), 2);
    }

    #[test]
    fn backlog_offset_applies_to_backlog_origin_only() {
        let mut config = no_rejections(4);
        config.simulation.assessment_waiting_list = 1;
        config.assessment.backlog_wait_offset = 2.0;
        let mut run = fixed_run(config, FixedReferrals::none());
        run.prefill(&mut NoopObserver).unwrap();
        let first = run.patients.get(PatientId(0)).unwrap();
        assert_eq!(first.assessment.queue.queue_wait, 2.0);
        assert_eq!(first.triage.queue.queue_wait, 0.0);
    }

    #[test]
    fn run_prefills_automatically() {
        let mut config = test_config(2);
        config.simulation.triage_waiting_list = 4;
        let capacity = config.triage.weekly_capacity;
        let mut run = fixed_run(config, FixedReferrals::none());
        let out = run.run(&mut NoopObserver).unwrap();
        let backlog = out.patients.iter().filter(|p| p.origin == Origin::TriageBacklog).count();
        assert_eq!(backlog as u32, 4 + capacity);
        assert!(run.is_prefilled());
    }

    #[test]
    fn second_prefill_errors() {
        let mut config = test_config(2);
        config.simulation.triage_waiting_list = 1;
        let mut run = fixed_run(config, FixedReferrals::none());
        run.prefill(&mut NoopObserver).unwrap();
        assert!(matches!(run.prefill(&mut NoopObserver), Err(SimError::AlreadyPrefilled)));
    }

    #[test]
    fn prefill_after_start_errors() {
        let mut run = fixed_run(test_config(2), FixedReferrals::none());
        run.step_week(&mut NoopObserver).unwrap();
        assert!(matches!(run.prefill(&mut NoopObserver), Err(SimError::PrefillAfterStart(1))));
    }

    #[test]
    fn first_step_prefills_backlog() {
        let mut config = test_config(3);
        config.simulation.triage_waiting_list = 5;
        let capacity = config.triage.weekly_capacity;
        let mut run = fixed_run(config, FixedReferrals::none());
        run.step_week(&mut NoopObserver).unwrap();
        assert!(run.is_prefilled());
        assert!(matches!(run.prefill(&mut NoopObserver), Err(SimError::AlreadyPrefilled)));

        let out = run.run(&mut NoopObserver).unwrap();
        let backlog = out.patients.iter().filter(|p| p.origin == Origin::TriageBacklog).count();
        assert_eq!(backlog as u32, 5 + capacity);
        assert_eq!(out.weekly[0].queues[QueueStage::Triage].waiting, 5);
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod results {
    use super::*;

    #[test]
    fn same_seed_reproduces_run() {
        let run = |seed| {
            RunBuilder::new(test_config(8), RunId(0), seed)
                .build()
                .unwrap()
                .run(&mut NoopObserver)
                .unwrap()
        };
        assert_eq!(run(5), run(5));
        let a: Vec<u32> = run(5).weekly.iter().map(|r| r.referrals).collect();
        let b: Vec<u32> = run(6).weekly.iter().map(|r| r.referrals).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn weekly_tallies_match_patient_rows() {
        let mut run = RunBuilder::new(test_config(10), RunId(0), 21).build().unwrap();
        let out = run.run(&mut NoopObserver).unwrap();

        for stage in Stage::ALL {
            let rows = out.patients.iter().filter(|p| p.rejected_at(stage)).count() as u32;
            let weekly: u32 = out.weekly.iter().map(|r| r.stages[stage].rejected).sum();
            assert_eq!(rows, out.summary.rejected[stage], "{stage}");
            assert_eq!(weekly, rows, "{stage}");
        }
        let accepted = out.patients.iter().filter(|p| p.accepted()).count() as u32;
        let weekly: u32 = out.weekly.iter().map(|r| r.accepted).sum();
        assert_eq!(accepted, out.summary.accepted);
        assert_eq!(weekly, accepted);

        let incomplete = out.patients.iter().filter(|p| !p.is_complete()).count() as u32;
        assert_eq!(incomplete, out.summary.incomplete);
        assert_eq!(out.summary.arrivals as usize, out.patients.len());
    }

    #[test]
    fn each_patient_has_at_most_one_outcome() {
        let mut run = RunBuilder::new(test_config(6), RunId(0), 9).build().unwrap();
        let out = run.run(&mut NoopObserver).unwrap();
        for p in &out.patients {
            let flags = Stage::ALL.iter().filter(|&&s| p.rejected_at(s)).count()
                + usize::from(p.accepted());
            assert!(flags <= 1);
            if p.is_complete() {
                assert_eq!(flags, 1);
            }
        }
    }

    #[test]
    fn observer_sees_every_boundary() {
        let mut run = fixed_run(test_config(5), FixedReferrals::constant(4));
        let mut obs = CountingObserver::default();
        let out = run.run(&mut obs).unwrap();
        assert_eq!(obs.week_starts, 6);
        assert_eq!(obs.snapshots, 6);
        assert_eq!(obs.run_ends, 1);
        assert_eq!(obs.last_row, Some(5));
        assert_eq!(obs.done as u32, out.summary.arrivals - out.summary.incomplete);
    }
}

// ── Trial ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod trial {
    use super::*;
    use crate::Trial;

    fn trial_config() -> PathwayConfig {
        let mut c = test_config(4);
        c.simulation.number_of_runs = 3;
        c
    }

    #[test]
    fn concatenates_weekly_rows() {
        let results = Trial::new(trial_config(), 42).run_trial().unwrap();
        assert_eq!(results.runs(), 3);
        assert_eq!(results.weekly.len(), 3 * 5);
        for r in 0..3 {
            let weeks: Vec<u32> = results.run_weekly(RunId(r)).map(|row| row.week).collect();
            assert_eq!(weeks, vec![0, 1, 2, 3, 4]);
            assert_eq!(results.summaries[r as usize].run, RunId(r));
            assert_eq!(
                results.run_patients(RunId(r)).count(),
                results.summaries[r as usize].arrivals as usize
            );
        }
    }

    #[test]
    fn same_seed_reproduces_trial() {
        let a = Trial::new(trial_config(), 8).run_trial().unwrap();
        let b = Trial::new(trial_config(), 8).run_trial().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn runs_use_independent_streams() {
        let results = Trial::new(trial_config(), 8).run_trial().unwrap();
        let referrals = |r: u32| -> Vec<u32> {
            results.run_weekly(RunId(r)).map(|row| row.referrals).collect()
        };
        assert_ne!(referrals(0), referrals(1));
    }

    #[test]
    fn weekly_means_average_across_runs() {
        let mut config = trial_config();
        config.triage.weekly_capacity = 1;
        let results = Trial::new(config, 1)
            .run_trial_using(|_| FixedReferrals::constant(2), &mut NoopObserver)
            .unwrap();
        let means = results.weekly_means();
        assert_eq!(means.len(), 5);
        assert!(means.iter().all(|m| m.runs == 3));
        assert!(means[..4].iter().all(|m| m.referrals == 2.0));
        assert_eq!(means[4].referrals, 0.0);
        for m in &means {
            let total: u32 = results
                .weekly
                .iter()
                .filter(|r| r.week == m.week)
                .map(|r| r.queues[QueueStage::Triage].waiting)
                .sum();
            assert!((m.waiting[QueueStage::Triage] - f64::from(total) / 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let mut config = trial_config();
        config.simulation.number_of_runs = 0;
        assert!(Trial::new(config, 1).run_trial().is_err());
    }

    #[test]
    fn from_config_uses_configured_seed() {
        let mut config = trial_config();
        config.simulation.seed = 99;
        let trial = Trial::from_config(config.clone());
        assert_eq!(trial.seed(), 99);
        assert_eq!(trial.run_trial().unwrap(), Trial::new(config, 99).run_trial().unwrap());
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::{any, prop_assert, prop_assert_eq, proptest};

    use super::*;

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_run_invariants_hold(
            seed in any::<u64>(),
            horizon in 1u32..8,
            arrival_rate in 0u32..80,
            triage_cap in 1u32..60,
            mdt_cap in 1u32..40,
            assessment_cap in 1u32..70,
            rejection_bp in 0u32..3000,
        ) {
            let mut config = test_config(horizon);
            config.referral.arrival_rate = f64::from(arrival_rate);
            config.triage.weekly_capacity = triage_cap;
            config.mdt.weekly_capacity = mdt_cap;
            config.assessment.weekly_capacity = assessment_cap;
            config.triage.rejection_rate = f64::from(rejection_bp) / 10_000.0;

            let mut run = RunBuilder::new(config.clone(), RunId(0), seed).build().unwrap();
            while !run.is_complete() {
                let week = run.step_week(&mut NoopObserver).unwrap();
                if week == horizon {
                    break;
                }
                // The top-up hands new units to the waiters counted in the snapshot.
                let row = &run.weekly[week as usize];
                for q in QueueStage::ALL {
                    let waiting = row.queues[q].waiting;
                    let admitted = waiting.min(config.capacity(q));
                    prop_assert_eq!(run.pool(q).level(), config.capacity(q) - admitted);
                    prop_assert_eq!(run.pool(q).waiting() as u32, waiting - admitted);
                }
            }
            let out = run.finish(&mut NoopObserver);

            prop_assert_eq!(out.weekly.len() as u32, horizon + 1);
            for row in &out.weekly {
                for q in QueueStage::ALL {
                    let queue = &row.queues[q];
                    prop_assert!(queue.waiting <= queue.max_waiting);
                    prop_assert!(row.pools[q] <= config.capacity(q));
                    if row.pools[q] > 0 {
                        prop_assert_eq!(queue.waiting, 0);
                    }
                }
            }
            let s = &out.summary;
            prop_assert!(s.accepted + s.total_rejected() <= s.arrivals);
            prop_assert!(s.incomplete <= s.arrivals);
        }
    }
}
