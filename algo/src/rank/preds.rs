/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Predicates implementing stopping conditions.
//!
//! All [engines](super::Engine) require a [predicate](Predicate) to stop the
//! iteration. This module provides a few such predicates: they evaluate to
//! true if the computation should be stopped.
//!
//! You can combine the predicates using the `and` and `or` methods provided
//! by the [`Predicate`] trait.
//!
//! # Examples
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use predicates::prelude::*;
//! use rankgraph_algo::rank::preds::{L2Norm, MaxIter};
//!
//! let mut predicate = L2Norm::try_from(1E-7)?.boxed();
//! predicate = predicate.or(MaxIter::from(100)).boxed();
//! #     Ok(())
//! # }
//! ```

use super::Distance;
use anyhow::ensure;
use predicates::{Predicate, reflection::PredicateReflection};
use std::fmt::Display;

#[doc(hidden)]
/// This structure is passed to stopping predicates to provide the
/// information that is needed to evaluate them.
#[derive(Debug, Clone, Copy)]
pub struct PredParams {
    pub iteration: usize,
    pub distance: Distance,
}

/// Stops after at most the provided number of iterations.
#[derive(Debug, Clone)]
pub struct MaxIter {
    max_iter: usize,
}

impl MaxIter {
    pub const DEFAULT_MAX_ITER: usize = usize::MAX;
}

impl From<usize> for MaxIter {
    fn from(max_iter: usize) -> Self {
        MaxIter { max_iter }
    }
}

impl Default for MaxIter {
    fn default() -> Self {
        Self::from(Self::DEFAULT_MAX_ITER)
    }
}

impl Display for MaxIter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("(max iter: {})", self.max_iter))
    }
}

impl PredicateReflection for MaxIter {}

impl Predicate<PredParams> for MaxIter {
    fn eval(&self, pred_params: &PredParams) -> bool {
        pred_params.iteration >= self.max_iter
    }
}

fn check_threshold(threshold: f64) -> anyhow::Result<f64> {
    ensure!(!threshold.is_nan(), "The threshold cannot be NaN");
    ensure!(threshold > 0.0, "The threshold must be positive");
    Ok(threshold)
}

/// Stops when the Euclidean distance between successive generations falls
/// below a given threshold.
#[derive(Debug, Clone)]
pub struct L2Norm {
    threshold: f64,
}

impl L2Norm {
    pub const DEFAULT_THRESHOLD: f64 = 1E-5;
}

impl TryFrom<Option<f64>> for L2Norm {
    type Error = anyhow::Error;
    fn try_from(threshold: Option<f64>) -> anyhow::Result<Self> {
        Ok(match threshold {
            Some(threshold) => L2Norm {
                threshold: check_threshold(threshold)?,
            },
            None => Self::default(),
        })
    }
}

impl TryFrom<f64> for L2Norm {
    type Error = anyhow::Error;
    fn try_from(threshold: f64) -> anyhow::Result<Self> {
        Some(threshold).try_into()
    }
}

impl Default for L2Norm {
    fn default() -> Self {
        L2Norm {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

impl Display for L2Norm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("(L2 distance: {})", self.threshold))
    }
}

impl PredicateReflection for L2Norm {}
impl Predicate<PredParams> for L2Norm {
    fn eval(&self, pred_params: &PredParams) -> bool {
        pred_params.distance.l2() <= self.threshold
    }
}

/// Stops when the sum of squared differences between successive generations
/// falls below a given threshold.
///
/// This is equivalent to an [`L2Norm`] with the square root of the threshold,
/// but it does not need to compute a square root at each iteration.
#[derive(Debug, Clone)]
pub struct SquaredL2Norm {
    threshold: f64,
}

impl SquaredL2Norm {
    pub const DEFAULT_THRESHOLD: f64 = 2.5E-5;
}

impl TryFrom<Option<f64>> for SquaredL2Norm {
    type Error = anyhow::Error;
    fn try_from(threshold: Option<f64>) -> anyhow::Result<Self> {
        Ok(match threshold {
            Some(threshold) => SquaredL2Norm {
                threshold: check_threshold(threshold)?,
            },
            None => Self::default(),
        })
    }
}

impl TryFrom<f64> for SquaredL2Norm {
    type Error = anyhow::Error;
    fn try_from(threshold: f64) -> anyhow::Result<Self> {
        Some(threshold).try_into()
    }
}

impl Default for SquaredL2Norm {
    fn default() -> Self {
        SquaredL2Norm {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

impl Display for SquaredL2Norm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("(squared L2 distance: {})", self.threshold))
    }
}

impl PredicateReflection for SquaredL2Norm {}
impl Predicate<PredParams> for SquaredL2Norm {
    fn eval(&self, pred_params: &PredParams) -> bool {
        pred_params.distance.squared() <= self.threshold
    }
}
