//! `EventQueue`: time-ordered patient resume queue.
//!
//! When a patient starts an activity it registers the time at which the
//! activity ends.  The run pops the earliest time first and resumes every
//! patient registered there in insertion order, so two patients due at the
//! same instant resume in the order they were scheduled.
//!
//! `BTreeMap` gives O(log T) insert and pop where T = number of distinct
//! pending times.

use std::collections::BTreeMap;

use dp_core::{PatientId, SimTime};

/// A priority queue mapping simulation times → patients to resume then.
#[derive(Default)]
pub struct EventQueue {
    inner: BTreeMap<SimTime, Vec<PatientId>>,
    /// Cached total entry count for O(1) `len()`.
    total: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `patient` to resume at `time`.
    pub fn push(&mut self, time: SimTime, patient: PatientId) {
        self.inner.entry(time).or_default().push(patient);
        self.total += 1;
    }

    /// Remove and return the earliest batch strictly before `limit`.
    pub fn pop_before(&mut self, limit: SimTime) -> Option<(SimTime, Vec<PatientId>)> {
        let (&time, _) = self.inner.first_key_value()?;
        if time >= limit {
            return None;
        }
        self.pop_first()
    }

    /// Remove and return the earliest batch at or before `limit`.
    pub fn pop_through(&mut self, limit: SimTime) -> Option<(SimTime, Vec<PatientId>)> {
        let (&time, _) = self.inner.first_key_value()?;
        if time > limit {
            return None;
        }
        self.pop_first()
    }

    fn pop_first(&mut self) -> Option<(SimTime, Vec<PatientId>)> {
        let (time, patients) = self.inner.pop_first()?;
        self.total -= patients.len();
        Some((time, patients))
    }

    /// The earliest time with at least one queued patient, or `None` if empty.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().copied()
    }

    /// Total number of (time, patient) entries.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of distinct pending times.
    pub fn time_count(&self) -> usize {
        self.inner.len()
    }
}
