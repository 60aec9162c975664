/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Double-buffered score storage.
//!
//! A [`ScoreStore`] keeps, for each node, a record holding two generations of
//! its score: the _old_ one, which is read during a sweep, and the _new_ one,
//! which is written. At the end of a sweep the roles of the two slots are
//! exchanged by [flipping](Generations::flip) the slot indices, so scores are
//! never copied.
//!
//! The physical layout of a record is a type parameter implementing
//! [`Layout`]:
//!
//! - [`Compact`] packs the two generations in 16 bytes;
//! - [`Padded`] aligns each record to 128 bytes, so that nodes updated by
//!   different threads never share a cache line; the two generations occupy
//!   the first and the last slot of the record.

use super::convergence::{Distance, squared_diff};
use rayon::prelude::*;
use sync_cell_slice::{SyncCell, SyncSlice};

/// The indices of the old and new slot of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generations {
    old: usize,
    new: usize,
}

impl Generations {
    /// Creates a new pair of slot indices.
    ///
    /// # Panics
    ///
    /// If the two indices are equal.
    pub const fn new(old: usize, new: usize) -> Self {
        assert!(old != new, "The old and new slot must be distinct");
        Self { old, new }
    }

    #[inline(always)]
    pub fn old_slot(&self) -> usize {
        self.old
    }

    #[inline(always)]
    pub fn new_slot(&self) -> usize {
        self.new
    }

    /// Exchanges the roles of the two slots.
    #[inline(always)]
    pub fn flip(&mut self) {
        self.old ^= self.new;
        self.new ^= self.old;
        self.old ^= self.new;
    }
}

/// The physical layout of a per-node score record.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]` wrappers of an array of exactly
/// [`SLOTS`](Layout::SLOTS) `f64` with no padding, so that a slice of records
/// can be viewed as a slice of `f64` of length `SLOTS` times its length.
/// [`GENERATIONS`](Layout::GENERATIONS) must refer to slots smaller than
/// `SLOTS`.
pub unsafe trait Layout: Copy + Send + Sync + 'static {
    /// The number of `f64` in a record.
    const SLOTS: usize;
    /// The initial old and new slots.
    const GENERATIONS: Generations;

    /// Returns a record whose old and new slots contain `score`.
    fn splat(score: f64) -> Self;

    fn slots(&self) -> &[f64];

    fn slots_mut(&mut self) -> &mut [f64];
}

/// A 16-byte record containing just the two generations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Compact {
    score: [f64; 2],
}

unsafe impl Layout for Compact {
    const SLOTS: usize = 2;
    const GENERATIONS: Generations = Generations::new(0, 1);

    fn splat(score: f64) -> Self {
        Self {
            score: [score; 2],
        }
    }

    #[inline(always)]
    fn slots(&self) -> &[f64] {
        &self.score
    }

    #[inline(always)]
    fn slots_mut(&mut self) -> &mut [f64] {
        &mut self.score
    }
}

/// A 128-byte record, aligned to 128 bytes, using slots 0 and 15.
///
/// The alignment covers the adjacent-line prefetcher of recent x86 CPUs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C, align(128))]
pub struct Padded {
    score: [f64; 16],
}

unsafe impl Layout for Padded {
    const SLOTS: usize = 16;
    const GENERATIONS: Generations = Generations::new(15, 0);

    fn splat(score: f64) -> Self {
        let mut record = Self { score: [0.0; 16] };
        record.score[0] = score;
        record.score[15] = score;
        record
    }

    #[inline(always)]
    fn slots(&self) -> &[f64] {
        &self.score
    }

    #[inline(always)]
    fn slots_mut(&mut self) -> &mut [f64] {
        &mut self.score
    }
}

/// A double-buffered vector of scores.
#[derive(Debug, Clone)]
pub struct ScoreStore<L: Layout> {
    records: Box<[L]>,
    generations: Generations,
}

impl<L: Layout> ScoreStore<L> {
    /// Creates a store for `n` nodes, with both generations initialized to
    /// the uniform score 1/`n`.
    pub fn new(n: usize) -> Self {
        let init = 1.0 / n as f64;
        Self {
            records: vec![L::splat(init); n].into_boxed_slice(),
            generations: L::GENERATIONS,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generations(&self) -> Generations {
        self.generations
    }

    /// Returns the old score of a node.
    #[inline(always)]
    pub fn old_score(&self, node: usize) -> f64 {
        self.records[node].slots()[self.generations.old]
    }

    /// Returns the new score of a node.
    #[inline(always)]
    pub fn new_score(&self, node: usize) -> f64 {
        self.records[node].slots()[self.generations.new]
    }

    /// Sets the new score of a node.
    #[inline(always)]
    pub fn set_new_score(&mut self, node: usize, score: f64) {
        let new = self.generations.new;
        self.records[node].slots_mut()[new] = score;
    }

    /// Exchanges the roles of the two generations.
    pub fn flip(&mut self) {
        self.generations.flip();
    }

    /// Returns the distance between the new and the old generation.
    pub fn distance(&self) -> Distance {
        let mut distance = Distance::default();
        for node in 0..self.len() {
            distance.add(self.new_score(node), self.old_score(node));
        }
        distance
    }

    /// Returns the distance between the new and the old generation,
    /// computed in parallel in the current thread pool.
    pub fn par_distance(&self, min_len: usize) -> Distance {
        let Generations { old, new } = self.generations;
        Distance::from_squared(
            self.records
                .par_iter()
                .with_min_len(min_len)
                .map(|record| {
                    let slots = record.slots();
                    squared_diff(slots[new], slots[old])
                })
                .sum(),
        )
    }

    /// Returns a view of all slots of all records that can be shared among
    /// threads.
    ///
    /// The slot of generation `g` of node `i` has index `i * L::SLOTS + g`.
    pub fn as_sync_slots(&mut self) -> &[SyncCell<f64>] {
        let len = self.records.len() * L::SLOTS;
        // SAFETY: by the contract of Layout, records are arrays of L::SLOTS
        // f64 without padding.
        let slots =
            unsafe { core::slice::from_raw_parts_mut(self.records.as_mut_ptr().cast::<f64>(), len) };
        slots.as_sync_slice()
    }

    /// Returns the scores of the old generation, which after a
    /// [flip](Self::flip) is the most recent one.
    pub fn scores(&self) -> Box<[f64]> {
        (0..self.len()).map(|node| self.old_score(node)).collect()
    }
}
