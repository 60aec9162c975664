/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::{Labels, RankGraph};

/// A mutable [`RankGraph`] implementation based on a vector of vectors.
///
/// For each node we store its display name, its outdegree and the list of
/// its predecessors, that is, of the sources of its inbound arcs, in
/// insertion order. Parallel arcs and loops are kept as they are.
///
/// By setting the feature `serde`, this struct can be serialized using
/// [serde](https://crates.io/crates/serde).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VecGraph {
    /// The number of arcs in the graph.
    num_arcs: u64,
    /// For each node, its display name.
    names: Vec<String>,
    /// For each node, its number of outbound arcs.
    outdegrees: Vec<usize>,
    /// For each node, the sources of its inbound arcs.
    preds: Vec<Vec<usize>>,
}

impl VecGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new graph with `n` isolated nodes named after their index.
    pub fn empty(n: usize) -> Self {
        Self {
            num_arcs: 0,
            names: (0..n).map(|i| i.to_string()).collect(),
            outdegrees: vec![0; n],
            preds: vec![Vec::new(); n],
        }
    }

    /// Adds an isolated node with the given name and returns its identifier.
    ///
    /// Names are not required to be unique.
    pub fn add_node(&mut self, name: impl Into<String>) -> usize {
        let node = self.names.len();
        self.names.push(name.into());
        self.outdegrees.push(0);
        self.preds.push(Vec::new());
        node
    }

    /// Adds nodes named after their index until `node` exists.
    fn grow(&mut self, node: usize) {
        for i in self.names.len()..=node {
            self.add_node(i.to_string());
        }
    }

    /// Adds an arc from `src` to `dst`.
    ///
    /// # Panics
    ///
    /// This method will panic if one of the given nodes is greater or equal
    /// than the number of nodes in the graph.
    pub fn add_arc(&mut self, src: usize, dst: usize) {
        let max = src.max(dst);
        if max >= self.names.len() {
            panic!(
                "Node {} does not exist (the graph has {} nodes)",
                max,
                self.names.len(),
            );
        }
        self.outdegrees[src] += 1;
        self.preds[dst].push(src);
        self.num_arcs += 1;
    }

    /// Adds arcs from an [`IntoIterator`] of pairs `(src, dst)`, adding new
    /// nodes (named after their index) as needed.
    pub fn add_arcs(&mut self, arcs: impl IntoIterator<Item = (usize, usize)>) -> &mut Self {
        for (src, dst) in arcs {
            self.grow(src.max(dst));
            self.add_arc(src, dst);
        }
        self
    }

    /// Creates a new graph from an [`IntoIterator`] of pairs `(src, dst)`.
    ///
    /// The number of nodes is one plus the largest node appearing in an arc.
    pub fn from_arcs(arcs: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut g = Self::new();
        g.add_arcs(arcs);
        g
    }

    /// Returns an iterator over the nodes without outbound arcs.
    pub fn dangling_nodes(&self) -> impl Iterator<Item = usize> + '_ {
        self.outdegrees
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d == 0)
            .map(|(node, _)| node)
    }

    /// Returns the node names, in node order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Shrinks the capacity of the graph to fit its current size.
    pub fn shrink_to_fit(&mut self) {
        self.names.shrink_to_fit();
        self.outdegrees.shrink_to_fit();
        self.preds.shrink_to_fit();
        for p in self.preds.iter_mut() {
            p.shrink_to_fit();
        }
    }
}

impl RankGraph for VecGraph {
    type Predecessors<'a> = core::iter::Copied<core::slice::Iter<'a, usize>>;

    #[inline(always)]
    fn num_nodes(&self) -> usize {
        self.names.len()
    }

    #[inline(always)]
    fn num_arcs(&self) -> u64 {
        self.num_arcs
    }

    #[inline(always)]
    fn outdegree(&self, node: usize) -> usize {
        self.outdegrees[node]
    }

    #[inline(always)]
    fn predecessors(&self, node: usize) -> Self::Predecessors<'_> {
        self.preds[node].iter().copied()
    }

    #[inline(always)]
    fn indegree(&self, node: usize) -> usize {
        self.preds[node].len()
    }
}

impl Labels for VecGraph {
    #[inline(always)]
    fn name(&self, node: usize) -> &str {
        &self.names[node]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_arcs_grows() {
        let g = VecGraph::from_arcs([(0, 3), (2, 1)]);
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_arcs(), 2);
        assert_eq!(g.name(3), "3");
        assert_eq!(g.outdegree(0), 1);
        assert_eq!(g.outdegree(3), 0);
        assert_eq!(g.predecessors(3).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_parallel_arcs_and_loops() {
        let mut g = VecGraph::empty(2);
        g.add_arcs([(0, 1), (0, 1), (1, 1)]);
        assert_eq!(g.outdegree(0), 2);
        assert_eq!(g.outdegree(1), 1);
        assert_eq!(g.indegree(1), 3);
        assert_eq!(g.predecessors(1).collect::<Vec<_>>(), vec![0, 0, 1]);
        assert_eq!(g.dangling_nodes().count(), 0);
    }

    #[test]
    #[should_panic(expected = "Node 2 does not exist")]
    fn test_add_arc_unknown_node() {
        let mut g = VecGraph::empty(2);
        g.add_arc(0, 2);
    }
}
