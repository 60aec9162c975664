/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{
    Baseline, Compact, Dangling, Distance, Engine, Layout, Params, Ranking, ScoreStore,
    convergence::squared_diff, log_start, node_score, power_iteration, preds::PredParams,
};
use dsi_progress_logger::ProgressLog;
use predicates::Predicate;
use rankgraph::traits::RankGraph;
use std::marker::PhantomData;

/// The number of nodes updated by an unrolled step.
const BATCH: usize = 4;

/// A single-threaded engine processing nodes in batches of four.
///
/// Nodes beyond the last full batch are processed one by one. Squared
/// differences are accumulated in node order, so the results are identical
/// to those of [`Sequential`](super::Sequential).
#[derive(Debug, Clone)]
pub struct Unrolled<L: Layout = Compact> {
    params: Params,
    _marker: PhantomData<L>,
}

impl<L: Layout> Unrolled<L> {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            _marker: PhantomData,
        }
    }
}

impl<L: Layout> Default for Unrolled<L> {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

#[inline(always)]
fn update<G: RankGraph, L: Layout>(
    graph: &G,
    store: &mut ScoreStore<L>,
    node: usize,
    baseline: f64,
    damping: f64,
) -> f64 {
    let score = node_score(graph, node, baseline, damping, |j| store.old_score(j));
    let diff = squared_diff(score, store.old_score(node));
    store.set_new_score(node, score);
    diff
}

impl<L: Layout> Engine for Unrolled<L> {
    const DEFAULT_DANGLING: Dangling = Dangling::Discard;

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
        log_start("unrolled", &self.params, dangling, &predicate);

        let num_nodes = graph.num_nodes();
        let damping = self.params.damping;
        let baseline = Baseline::new(graph, damping, dangling);
        let mut store = ScoreStore::<L>::new(num_nodes);
        let split = num_nodes - num_nodes % BATCH;

        let (iterations, distance) = power_iteration(predicate, pl, || {
            let base = baseline.value(|j| store.old_score(j));
            let mut sum_sq = 0.0;
            for node in (0..split).step_by(BATCH) {
                sum_sq += update(graph, &mut store, node, base, damping);
                sum_sq += update(graph, &mut store, node + 1, base, damping);
                sum_sq += update(graph, &mut store, node + 2, base, damping);
                sum_sq += update(graph, &mut store, node + 3, base, damping);
            }
            for node in split..num_nodes {
                sum_sq += update(graph, &mut store, node, base, damping);
            }
            store.flip();
            Distance::from_squared(sum_sq)
        });

        Some(Ranking::new(store.scores(), iterations, distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::{Sequential, preds::MaxIter};
    use rankgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_remainder() {
        // Sizes 1 to 9 cover empty batches, full batches and all remainders
        for n in 1..10 {
            let graph = VecGraph::from_arcs((0..n).map(|i| (i, (i * 3 + 1) % n)));
            let sequential = Sequential::<Compact>::default()
                .run(&graph, MaxIter::from(10))
                .unwrap();
            let unrolled = Unrolled::<Compact>::default()
                .run(&graph, MaxIter::from(10))
                .unwrap();
            assert_eq!(sequential, unrolled, "n = {n}");
        }
    }
}
