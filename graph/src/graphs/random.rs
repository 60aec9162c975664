/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rand::{Rng, SeedableRng, rngs::SmallRng};

use super::vec_graph::VecGraph;

/// Erdös-Rényi random graphs.
///
/// The Erdös-Rényi random graph model is a simple model for generating random
/// graphs. It is parameterized by the number of nodes `n` and the probability
/// `p` of an arc between any two nodes. In this implementation, loops are never
/// included.
///
/// Generation is quadratic in `n`; the result is materialized as a
/// [`VecGraph`] by [`build`](ErdosRenyi::build).
#[derive(Debug, Clone)]
pub struct ErdosRenyi {
    n: usize,
    p: f64,
    seed: u64,
}

impl ErdosRenyi {
    /// Creates a new Erdös-Rényi random graph, given the number of
    /// nodes, the probability of an arc between any two nodes, and a
    /// seed for the [pseudorandom number generator](SmallRng).
    pub fn new(n: usize, p: f64, seed: u64) -> Self {
        assert!((0.0..=1.0).contains(&p), "p must be in [0..1]");
        Self { n, p, seed }
    }

    /// Generates the graph.
    pub fn build(&self) -> VecGraph {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut g = VecGraph::empty(self.n);
        for src in 0..self.n {
            for dst in 0..self.n {
                if src != dst && rng.random_bool(self.p) {
                    g.add_arc(src, dst);
                }
            }
        }
        log::debug!(
            "Generated Erdös-Rényi graph with {} nodes and {} arcs",
            self.n,
            crate::traits::RankGraph::num_arcs(&g)
        );
        g
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RankGraph;

    #[test]
    fn test_deterministic() {
        let g0 = ErdosRenyi::new(30, 0.1, 0).build();
        let g1 = ErdosRenyi::new(30, 0.1, 0).build();
        assert_eq!(g0, g1);
    }

    #[test]
    fn test_no_loops() {
        let g = ErdosRenyi::new(20, 1.0, 0).build();
        assert_eq!(g.num_arcs(), 20 * 19);
        for node in 0..20 {
            assert!(g.predecessors(node).all(|p| p != node));
        }
    }
}
