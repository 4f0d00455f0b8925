//! Pathway stages and fixed-size per-stage maps.
//!
//! Six stages can reject a patient; three of them are gated by a
//! capacity-limited weekly pool and keep a waiting list.  `StageMap<T>` and
//! `QueueMap<T>` are plain arrays indexed by those enums, so per-stage tallies
//! stay `Copy`-cheap and allocation-free.

use std::fmt;
use std::ops::{Index, IndexMut};

/// A pathway stage at which a patient can be rejected or record work.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stage {
    Referral,
    Triage,
    Pack,
    Observations,
    Mdt,
    Assessment,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Referral,
        Stage::Triage,
        Stage::Pack,
        Stage::Observations,
        Stage::Mdt,
        Stage::Assessment,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Referral => "referral",
            Stage::Triage => "triage",
            Stage::Pack => "pack",
            Stage::Observations => "observations",
            Stage::Mdt => "mdt",
            Stage::Assessment => "assessment",
        };
        f.write_str(s)
    }
}

/// A stage gated by a weekly-replenished resource pool.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueueStage {
    Triage,
    Mdt,
    Assessment,
}

impl QueueStage {
    pub const ALL: [QueueStage; 3] = [QueueStage::Triage, QueueStage::Mdt, QueueStage::Assessment];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn stage(self) -> Stage {
        match self {
            QueueStage::Triage => Stage::Triage,
            QueueStage::Mdt => Stage::Mdt,
            QueueStage::Assessment => Stage::Assessment,
        }
    }
}

impl fmt::Display for QueueStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.stage().fmt(f)
    }
}

// ── Maps ──────────────────────────────────────────────────────────────────────

/// Generate an array-backed map keyed by a fieldless stage enum.
macro_rules! stage_map {
    ($(#[$attr:meta])* $vis:vis struct $name:ident<$key:ident; $n:literal>;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name<T>(pub [T; $n]);

        impl<T> $name<T> {
            /// Build a map by evaluating `f` once per key, in declaration order.
            pub fn from_fn(mut f: impl FnMut($key) -> T) -> Self {
                $name(std::array::from_fn(|i| f($key::ALL[i])))
            }

            pub fn iter(&self) -> impl Iterator<Item = ($key, &T)> {
                $key::ALL.into_iter().zip(self.0.iter())
            }

            pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> $name<U> {
                $name::from_fn(|k| f(&self[k]))
            }
        }

        impl<T: Default> Default for $name<T> {
            fn default() -> Self {
                $name::from_fn(|_| T::default())
            }
        }

        impl<T> Index<$key> for $name<T> {
            type Output = T;
            #[inline(always)]
            fn index(&self, key: $key) -> &T {
                &self.0[key.index()]
            }
        }

        impl<T> IndexMut<$key> for $name<T> {
            #[inline(always)]
            fn index_mut(&mut self, key: $key) -> &mut T {
                &mut self.0[key.index()]
            }
        }
    };
}

stage_map! {
    /// One value per [`Stage`].
    pub struct StageMap<Stage; 6>;
}

stage_map! {
    /// One value per [`QueueStage`].
    pub struct QueueMap<QueueStage; 3>;
}
