/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Traits to access a graph from the point of view of a ranking algorithm.

PageRank-style algorithms compute the new score of a node from the old scores
of its _predecessors_, each divided by the predecessor's outdegree. A
[`RankGraph`] provides exactly this information: random access to the list of
sources of the inbound arcs of each node, and random access to outdegrees.

The display name of a node, which is needed only when emitting results, is
provided by the separate [`Labels`] trait.

*/

/// A graph providing random access to predecessors and outdegrees.
///
/// Nodes are identified by the integers in `0..num_nodes()`. Parallel arcs
/// are allowed: a predecessor appears once for each arc, and each arc counts
/// toward the outdegree of its source.
///
/// Implementations must be consistent: if `j` appears among the predecessors
/// of some node, then `outdegree(j)` must be positive.
pub trait RankGraph {
    /// The iterator returned by [`predecessors`](RankGraph::predecessors).
    type Predecessors<'a>: Iterator<Item = usize>
    where
        Self: 'a;

    /// Returns the number of nodes.
    fn num_nodes(&self) -> usize;

    /// Returns the number of arcs.
    fn num_arcs(&self) -> u64;

    /// Returns the number of outbound arcs of a node.
    fn outdegree(&self, node: usize) -> usize;

    /// Returns the sources of the inbound arcs of a node.
    fn predecessors(&self, node: usize) -> Self::Predecessors<'_>;

    /// Returns the number of inbound arcs of a node.
    ///
    /// The default implementation enumerates the predecessors.
    fn indegree(&self, node: usize) -> usize {
        self.predecessors(node).count()
    }

    /// Returns whether a node has no outbound arcs (i.e., whether it is a
    /// _rank sink_).
    #[inline(always)]
    fn is_dangling(&self, node: usize) -> bool {
        self.outdegree(node) == 0
    }
}

/// Display names of the nodes of a graph.
pub trait Labels {
    /// Returns the display name of a node.
    fn name(&self, node: usize) -> &str;
}
