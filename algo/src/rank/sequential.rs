/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{
    Baseline, Compact, Dangling, Distance, Engine, Layout, Params, Ranking, ScoreStore, log_start,
    node_score, power_iteration, preds::PredParams,
};
use dsi_progress_logger::ProgressLog;
use predicates::Predicate;
use rankgraph::traits::RankGraph;
use std::marker::PhantomData;

/// A single-threaded engine sweeping nodes in index order.
///
/// ```
/// use rankgraph::prelude::*;
/// use rankgraph_algo::rank::{Compact, Engine, Params, Sequential, preds::L2Norm};
///
/// let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 0)]);
/// let ranking = Sequential::<Compact>::new(Params::default())
///     .run(&graph, L2Norm::default())
///     .unwrap();
/// for score in ranking.scores() {
///     assert!((score - 1.0 / 3.0).abs() < 1E-12);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Sequential<L: Layout = Compact> {
    params: Params,
    _marker: PhantomData<L>,
}

impl<L: Layout> Sequential<L> {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            _marker: PhantomData,
        }
    }
}

impl<L: Layout> Default for Sequential<L> {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl<L: Layout> Engine for Sequential<L> {
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
        log_start("sequential", &self.params, dangling, &predicate);

        let num_nodes = graph.num_nodes();
        let damping = self.params.damping;
        let baseline = Baseline::new(graph, damping, dangling);
        let mut store = ScoreStore::<L>::new(num_nodes);

        let (iterations, distance) = power_iteration(predicate, pl, || {
            let base = baseline.value(|j| store.old_score(j));
            let mut distance = Distance::default();
            for node in 0..num_nodes {
                let score = node_score(graph, node, base, damping, |j| store.old_score(j));
                distance.add(score, store.old_score(node));
                store.set_new_score(node, score);
            }
            store.flip();
            distance
        });

        Some(Ranking::new(store.scores(), iterations, distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::{Padded, preds::MaxIter};
    use rankgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_single_sweep() {
        // A → B
        let graph = VecGraph::from_arcs([(0, 1)]);
        let ranking = Sequential::<Compact>::default()
            .run(&graph, MaxIter::from(1))
            .unwrap();
        assert_eq!(ranking.iterations(), 1);
        let scores = ranking.scores();
        assert!((scores[0] - 0.075).abs() < 1E-12);
        assert!((scores[1] - 0.5).abs() < 1E-12);
    }

    #[test]
    fn test_layouts_agree() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 0), (2, 3), (3, 3)]);
        let compact = Sequential::<Compact>::default()
            .run(&graph, MaxIter::from(20))
            .unwrap();
        let padded = Sequential::<Padded>::default()
            .run(&graph, MaxIter::from(20))
            .unwrap();
        assert_eq!(compact, padded);
    }

    #[test]
    fn test_invalid() {
        let mut params = Params::default();
        params.damping(0.0);
        let graph = VecGraph::from_arcs([(0, 1)]);
        assert!(
            Sequential::<Compact>::new(params)
                .run(&graph, MaxIter::from(1))
                .is_none()
        );
        assert!(
            Sequential::<Compact>::default()
                .run(&VecGraph::new(), MaxIter::from(1))
                .is_none()
        );
    }
}
