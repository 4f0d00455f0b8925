//! `StagePool`: a weekly slot counter guarding one pathway stage.
//!
//! Unlike a counting semaphore, units are never released back by the
//! patient that used them.  The level only rises at the weekly top-up, and
//! only by the shortfall, so slots left unused in one week roll over without
//! ever exceeding capacity.
//!
//! Invariant: `0 <= level <= capacity`, and waiters exist only while
//! `level == 0`.

use std::collections::VecDeque;

use dp_core::PatientId;

/// Result of a unit request.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Admission {
    /// A unit was taken; the patient proceeds immediately.
    Granted,
    /// The pool is empty; the patient waits at `position` (1-based) in the FIFO.
    Queued { position: usize },
}

#[derive(Clone, Debug)]
pub struct StagePool {
    capacity: u32,
    level:    u32,
    waiters:  VecDeque<PatientId>,
}

impl StagePool {
    /// A pool starting full.
    pub fn new(capacity: u32) -> Self {
        Self { capacity, level: capacity, waiters: VecDeque::new() }
    }

    /// Take one unit for `patient`, or queue it behind any earlier waiters.
    pub fn request(&mut self, patient: PatientId) -> Admission {
        if self.level > 0 {
            debug_assert!(self.waiters.is_empty());
            self.level -= 1;
            Admission::Granted
        } else {
            self.waiters.push_back(patient);
            Admission::Queued { position: self.waiters.len() }
        }
    }

    /// Add the shortfall back and hand the new units to waiters in FIFO order.
    ///
    /// Returns the admitted patients, earliest waiter first.
    pub fn top_up(&mut self) -> Vec<PatientId> {
        self.level += self.shortfall();
        let n = (self.level as usize).min(self.waiters.len());
        self.level -= n as u32;
        self.waiters.drain(..n).collect()
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    pub fn shortfall(&self) -> u32 {
        self.capacity - self.level
    }

    /// Patients parked on this pool.
    #[inline]
    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }
}
