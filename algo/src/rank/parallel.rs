/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::{
    Baseline, Dangling, Engine, Layout, Padded, Params, Ranking, ScoreStore, log_start, node_score,
    power_iteration, preds::PredParams,
};
use crate::utils::thread_pool;
use crossbeam_utils::CachePadded;
use dsi_progress_logger::ProgressLog;
use predicates::Predicate;
use rankgraph::traits::RankGraph;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A multi-threaded engine.
///
/// At each sweep, every thread of a dedicated pool repeatedly grabs a chunk
/// of nodes from an [`AtomicUsize`] cursor and writes their new scores; the
/// size of the chunks is determined by the
/// [granularity](Params::granularity). Since each node is written by exactly
/// one thread and old scores are only read, no synchronization is necessary
/// during a sweep. Once all threads are done, the distance between the two
/// generations is computed by a separate parallel reduction.
///
/// The default [`Padded`] layout keeps the records of nodes updated by
/// different threads on different cache lines.
///
/// Summation order of the distance depends on the scheduling, so results can
/// differ from those of the single-threaded engines by a few ulps.
#[derive(Debug, Clone)]
pub struct Parallel<L: Layout = Padded> {
    params: Params,
    _marker: PhantomData<L>,
}

impl<L: Layout> Parallel<L> {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            _marker: PhantomData,
        }
    }
}

impl<L: Layout> Default for Parallel<L> {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl<L: Layout> Engine for Parallel<L> {
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
        log_start("parallel", &self.params, dangling, &predicate);

        let num_nodes = graph.num_nodes();
        let damping = self.params.damping;
        let node_granularity = self
            .params
            .granularity
            .node_granularity(num_nodes, graph.num_arcs());
        log::info!("Node granularity: {node_granularity}");

        let thread_pool = thread_pool(self.params.num_threads);
        let baseline = Baseline::new(graph, damping, dangling);
        let mut store = ScoreStore::<L>::new(num_nodes);
        let cursor = CachePadded::new(AtomicUsize::new(0));

        let (iterations, distance) = power_iteration(predicate, pl, || {
            let base = thread_pool.install(|| baseline.par_value(|j| store.old_score(j)));
            let generations = store.generations();
            let old = generations.old_slot();
            let new = generations.new_slot();

            cursor.store(0, Ordering::Relaxed);
            let slots = store.as_sync_slots();
            thread_pool.broadcast(|_| {
                loop {
                    let start = cursor.fetch_add(node_granularity, Ordering::Relaxed);
                    if start >= num_nodes {
                        break;
                    }
                    let end = (start + node_granularity).min(num_nodes);

                    for node in start..end {
                        // SAFETY: old slots are never written during a sweep
                        let score = node_score(graph, node, base, damping, |j| unsafe {
                            slots[j * L::SLOTS + old].get()
                        });
                        // SAFETY: each node belongs to exactly one chunk
                        unsafe { slots[node * L::SLOTS + new].set(score) };
                    }
                }
            });

            let distance = thread_pool.install(|| store.par_distance(node_granularity));
            store.flip();
            distance
        });

        Some(Ranking::new(store.scores(), iterations, distance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::{Compact, Sequential, preds::MaxIter};
    use crate::utils::Granularity;
    use rankgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_agrees_with_sequential() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 0), (0, 3), (4, 0), (5, 5)]);
        let mut params = Params::default();
        params.num_threads(3).granularity(Granularity::Nodes(2));
        let parallel = Parallel::<Padded>::new(params)
            .run(&graph, MaxIter::from(30))
            .unwrap();
        let compact = Parallel::<Compact>::new(params)
            .run(&graph, MaxIter::from(30))
            .unwrap();
        let sequential = Sequential::<Compact>::default()
            .run(&graph, MaxIter::from(30))
            .unwrap();
        assert_eq!(parallel.scores(), sequential.scores());
        assert_eq!(compact.scores(), sequential.scores());
        assert_eq!(parallel.iterations(), 30);
    }

    #[test]
    fn test_no_threads() {
        let mut params = Params::default();
        params.num_threads(0);
        let graph = VecGraph::from_arcs([(0, 1)]);
        assert!(
            Parallel::<Padded>::new(params)
                .run(&graph, MaxIter::from(1))
                .is_none()
        );
    }
}
