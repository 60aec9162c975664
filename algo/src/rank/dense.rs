/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{
    Dangling, Distance, Engine, Params, RAYON_MIN_LEN, Ranking, log_start, power_iteration,
    preds::PredParams,
};
use crate::utils::thread_pool;
use dsi_progress_logger::ProgressLog;
use predicates::Predicate;
use rankgraph::traits::RankGraph;
use rayon::prelude::*;

/// Number of nodes above which we warn about the size of a
/// [`TransitionMatrix`] (the matrix takes 8 GiB at this size).
const LARGE_DIM: usize = 1 << 15;

/// The damped transition matrix of a graph, stored densely in row-major
/// order.
///
/// The entry in row *i* and column *j* is *d* times the number of arcs from
/// *j* to *i* divided by the outdegree of *j*; when dangling rank is
/// [redistributed](Dangling::Redistribute), all entries of the column of a
/// dangling node are *d*/*n*. Space is quadratic in the number of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    dim: usize,
    entries: Box<[f64]>,
}

impl TransitionMatrix {
    /// Builds the matrix of a graph, using the current thread pool.
    ///
    /// # Panics
    ///
    /// If the number of entries overflows a `usize`.
    pub fn new<G: RankGraph + Sync>(graph: &G, damping: f64, dangling: Dangling) -> Self {
        let dim = graph.num_nodes();
        let len = dim
            .checked_mul(dim)
            .expect("The transition matrix is too large");
        if dim > LARGE_DIM {
            log::warn!(
                "Allocating a dense {dim}x{dim} matrix ({} bytes)",
                len.saturating_mul(size_of::<f64>())
            );
        }

        let mut entries = vec![0.0; len].into_boxed_slice();
        if dim == 0 {
            return Self { dim, entries };
        }

        entries
            .par_chunks_mut(dim)
            .enumerate()
            .for_each(|(row, entries)| {
                for j in graph.predecessors(row) {
                    entries[j] += damping / graph.outdegree(j) as f64;
                }
            });

        if dangling == Dangling::Redistribute {
            let spread = damping / dim as f64;
            let dangling_cols = (0..dim)
                .into_par_iter()
                .filter(|&col| (0..dim).all(|row| entries[row * dim + col] == 0.0))
                .collect::<Vec<_>>();
            log::info!("{} dangling columns", dangling_cols.len());
            entries.par_chunks_mut(dim).for_each(|entries| {
                for &col in &dangling_cols {
                    entries[col] = spread;
                }
            });
        }

        Self { dim, entries }
    }

    /// Returns the number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the entry in the given row and column.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(col < self.dim, "Column {col} out of bounds");
        self.entries[row * self.dim + col]
    }

    /// Returns a row of the matrix.
    pub fn row(&self, row: usize) -> &[f64] {
        &self.entries[row * self.dim..(row + 1) * self.dim]
    }

    /// Stores in `y` the product of this matrix and `x`, plus `baseline` on
    /// each component, using the current thread pool.
    ///
    /// # Panics
    ///
    /// If the length of `x` or `y` is not the dimension of the matrix.
    pub fn multiply(&self, x: &[f64], y: &mut [f64], baseline: f64) {
        assert_eq!(x.len(), self.dim);
        assert_eq!(y.len(), self.dim);
        if self.dim == 0 {
            return;
        }
        y.par_iter_mut()
            .zip(self.entries.par_chunks(self.dim))
            .for_each(|(y, row)| {
                *y = row
                    .iter()
                    .zip(x)
                    .fold(baseline, |acc, (&m, &x)| acc + m * x);
            });
    }
}

/// A multi-threaded engine based on a dense [`TransitionMatrix`].
///
/// At each sweep the engine computes *x*′ = (1 − *d*)/*n* + *M* *x*, where *M*
/// is the transition matrix, in parallel over rows, and then swaps *x* and
/// *x*′. By default dangling rank is
/// [redistributed](Dangling::Redistribute), so scores sum to one.
///
/// Space and time per sweep are quadratic in the number of nodes, so this
/// engine is suitable only for small graphs.
#[derive(Debug, Clone, Default)]
pub struct DenseMatrix {
    params: Params,
}

impl DenseMatrix {
    pub fn new(params: Params) -> Self {
        Self { params }
    }
}

impl Engine for DenseMatrix {
    const DEFAULT_DANGLING: Dangling = Dangling::Redistribute;

    fn params(&self) -> &Params {
        &self.params
    }

    fn run_with_logging<G: RankGraph + Sync>(
        &self,
        graph: &G,
        predicate: impl Predicate<PredParams>,
        pl: &mut impl ProgressLog,
    ) -> Option<Ranking> {
        if !self.params.accept(graph) {
            return None;
        }
        let dangling = self.dangling();
        log_start("dense matrix", &self.params, dangling, &predicate);

        let num_nodes = graph.num_nodes();
        let damping = self.params.damping;
        let thread_pool = thread_pool(self.params.num_threads);
        let matrix = thread_pool.install(|| TransitionMatrix::new(graph, damping, dangling));
        let baseline = (1.0 - damping) / num_nodes as f64;

        let mut old = vec![1.0 / num_nodes as f64; num_nodes];
        let mut new = vec![0.0; num_nodes];

        let (iterations, distance) = power_iteration(predicate, pl, || {
            thread_pool.install(|| {
                matrix.multiply(&old, &mut new, baseline);
                let distance = Distance::par_between(&new, &old, RAYON_MIN_LEN);
                std::mem::swap(&mut old, &mut new);
                distance
            })
        });

        Some(Ranking::new(old.into_boxed_slice(), iterations, distance))
    }
}
