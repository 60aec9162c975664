/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Distance between consecutive generations of scores.
//!
//! Engines accumulate the sum of squared differences between the new and the
//! old score of each node; the Euclidean (L2) distance is its square root.
//! Predicates can test either quantity.

use rayon::prelude::*;

/// Returns the squared difference between a new and an old score.
#[inline(always)]
pub fn squared_diff(new: f64, old: f64) -> f64 {
    let diff = new - old;
    diff * diff
}

/// The distance between two generations of scores, stored as a sum of
/// squared differences.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Distance {
    squared: f64,
}

impl Distance {
    /// Creates a distance from a sum of squared differences.
    pub const fn from_squared(squared: f64) -> Self {
        Self { squared }
    }

    /// Accumulates the squared difference between a new and an old score.
    #[inline(always)]
    pub fn add(&mut self, new: f64, old: f64) {
        self.squared += squared_diff(new, old);
    }

    /// Returns the sum of squared differences.
    pub fn squared(&self) -> f64 {
        self.squared
    }

    /// Returns the Euclidean distance.
    pub fn l2(&self) -> f64 {
        self.squared.sqrt()
    }

    /// Computes the distance between two vectors of the same length,
    /// sequentially and in index order.
    pub fn between(new: &[f64], old: &[f64]) -> Self {
        debug_assert_eq!(new.len(), old.len());
        let mut distance = Self::default();
        for (&x, &y) in new.iter().zip(old) {
            distance.add(x, y);
        }
        distance
    }

    /// Computes the distance between two vectors of the same length in
    /// parallel, in the current thread pool.
    ///
    /// `min_len` is the minimum number of indices processed by a task.
    pub fn par_between(new: &[f64], old: &[f64], min_len: usize) -> Self {
        debug_assert_eq!(new.len(), old.len());
        Self::from_squared(
            new.par_iter()
                .zip(old)
                .with_min_len(min_len)
                .map(|(&x, &y)| squared_diff(x, y))
                .sum(),
        )
    }
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.l2())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let mut d = Distance::default();
        d.add(1.0, 4.0);
        d.add(2.0, 6.0);
        assert_eq!(d.squared(), 25.0);
        assert_eq!(d.l2(), 5.0);
    }

    #[test]
    fn test_between() {
        let new = [0.5, 0.25, 0.25];
        let old = [0.25, 0.25, 0.5];
        assert_eq!(Distance::between(&new, &old).squared(), 0.125);
        let par = Distance::par_between(&new, &old, 1).squared();
        assert!((par - 0.125).abs() < 1E-15);
    }

    #[test]
    fn test_zero() {
        let x = [1.0 / 3.0; 3];
        assert_eq!(Distance::between(&x, &x), Distance::default());
        assert_eq!(Distance::between(&[], &[]).l2(), 0.0);
    }
}
