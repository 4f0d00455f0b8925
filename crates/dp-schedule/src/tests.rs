//! Unit tests for dp-schedule.

// ── EventQueue ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod event_queue {
    use dp_core::{PatientId, SimTime};

    use crate::EventQueue;

    #[test]
    fn push_and_pop_in_time_order() {
        let mut q = EventQueue::new();
        q.push(SimTime(0.5), PatientId(1));
        q.push(SimTime(0.1), PatientId(2));
        q.push(SimTime(0.5), PatientId(3));
        assert_eq!(q.len(), 3);
        assert_eq!(q.time_count(), 2);
        assert_eq!(q.next_time(), Some(SimTime(0.1)));

        let (t, ids) = q.pop_before(SimTime(1.0)).unwrap();
        assert_eq!(t, SimTime(0.1));
        assert_eq!(ids, vec![PatientId(2)]);

        let (t, ids) = q.pop_before(SimTime(1.0)).unwrap();
        assert_eq!(t, SimTime(0.5));
        assert_eq!(ids, vec![PatientId(1), PatientId(3)], "insertion order kept");
        assert!(q.is_empty());
    }

    #[test]
    fn pop_before_excludes_limit() {
        let mut q = EventQueue::new();
        q.push(SimTime(1.0), PatientId(0));
        assert!(q.pop_before(SimTime(1.0)).is_none());
        assert_eq!(q.len(), 1);
        assert!(q.pop_through(SimTime(1.0)).is_some());
        assert!(q.is_empty());
    }

    #[test]
    fn empty_queue() {
        let mut q = EventQueue::new();
        assert!(q.next_time().is_none());
        assert!(q.pop_through(SimTime(100.0)).is_none());
    }
}

// ── StagePool ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod pool {
    use dp_core::PatientId;

    use crate::{Admission, StagePool};

    #[test]
    fn grants_until_empty_then_queues() {
        let mut pool = StagePool::new(2);
        assert_eq!(pool.request(PatientId(0)), Admission::Granted);
        assert_eq!(pool.request(PatientId(1)), Admission::Granted);
        assert_eq!(pool.request(PatientId(2)), Admission::Queued { position: 1 });
        assert_eq!(pool.request(PatientId(3)), Admission::Queued { position: 2 });
        assert_eq!(pool.level(), 0);
        assert_eq!(pool.waiting(), 2);
    }

    #[test]
    fn top_up_admits_fifo() {
        let mut pool = StagePool::new(2);
        for i in 0..5 {
            pool.request(PatientId(i));
        }
        assert_eq!(pool.top_up(), vec![PatientId(2), PatientId(3)]);
        assert_eq!(pool.level(), 0);
        assert_eq!(pool.top_up(), vec![PatientId(4)]);
        assert_eq!(pool.level(), 1);
        assert_eq!(pool.waiting(), 0);
    }

    #[test]
    fn top_up_adds_only_shortfall() {
        let mut pool = StagePool::new(5);
        pool.request(PatientId(0));
        pool.request(PatientId(1));
        assert_eq!(pool.shortfall(), 2);
        assert!(pool.top_up().is_empty());
        assert_eq!(pool.level(), 5, "never exceeds capacity");
        assert!(pool.top_up().is_empty());
        assert_eq!(pool.level(), 5);
    }

    #[test]
    fn zero_capacity_never_grants() {
        let mut pool = StagePool::new(0);
        assert!(matches!(pool.request(PatientId(0)), Admission::Queued { .. }));
        assert!(pool.top_up().is_empty());
        assert_eq!(pool.level(), 0);
    }
}

// ── Arrivals ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod arrivals {
    use dp_core::SimRng;

    use crate::{
        FixedReferrals, POISSON_BUFFER_LEN, PoissonReferrals, ReferralSource, ReferralSourceExt,
    };

    #[test]
    fn poisson_buffer_mean_near_rate() {
        let mut rng = SimRng::new(11);
        let mut src = PoissonReferrals::new(60.0);
        src.prepare(&mut rng).unwrap();
        assert_eq!(src.buffer().len(), POISSON_BUFFER_LEN);
        let mean = src.buffer().iter().map(|&n| n as f64).sum::<f64>() / POISSON_BUFFER_LEN as f64;
        assert!((mean - 60.0).abs() < 2.0, "mean {mean}");
        let week = src.referrals(0, &mut rng);
        assert!(src.buffer().contains(&week));
    }

    #[test]
    fn zero_rate_yields_zero() {
        let mut rng = SimRng::new(1);
        let mut src = PoissonReferrals::new(0.0);
        src.prepare(&mut rng).unwrap();
        assert!((0..10).all(|w| src.referrals(w, &mut rng) == 0));
    }

    #[test]
    fn negative_rate_is_an_error() {
        let mut rng = SimRng::new(1);
        assert!(PoissonReferrals::new(-3.0).prepare(&mut rng).is_err());
    }

    #[test]
    fn same_seed_same_counts() {
        let draw = || {
            let mut rng = SimRng::new(5);
            let mut src = PoissonReferrals::new(20.0);
            src.prepare(&mut rng).unwrap();
            (0..10).map(|w| src.referrals(w, &mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draw(), draw());
    }

    #[test]
    fn fixed_then_fallback() {
        let mut rng = SimRng::new(0);
        let mut src = FixedReferrals::new(vec![3, 0, 1]).then(2);
        let counts: Vec<u32> = (0..5).map(|w| src.referrals(w, &mut rng)).collect();
        assert_eq!(counts, vec![3, 0, 1, 2, 2]);
        assert_eq!(FixedReferrals::none().referrals(9, &mut rng), 0);
    }

    #[test]
    fn combined_sums_counts() {
        let mut rng = SimRng::new(0);
        let mut src = FixedReferrals::constant(4).plus(FixedReferrals::new(vec![0, 10]));
        src.prepare(&mut rng).unwrap();
        assert_eq!(src.referrals(0, &mut rng), 4);
        assert_eq!(src.referrals(1, &mut rng), 14);
    }

    #[test]
    fn may_refer_reflects_counts() {
        assert!(PoissonReferrals::new(0.5).may_refer());
        assert!(!PoissonReferrals::new(0.0).may_refer());
        assert!(!FixedReferrals::none().may_refer());
        assert!(!FixedReferrals::new(vec![0, 0]).may_refer());
        assert!(FixedReferrals::new(vec![0, 1]).may_refer());
        assert!(FixedReferrals::constant(3).may_refer());
        assert!(!FixedReferrals::none().plus(PoissonReferrals::new(0.0)).may_refer());
        assert!(FixedReferrals::none().plus(FixedReferrals::constant(1)).may_refer());
    }
}
