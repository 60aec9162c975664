/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/// Granularity of parallel tasks, specified transparently by nodes or arcs.
///
/// Parallel sweeps hand out nodes to worker threads in chunks. The size of a
/// chunk can be expressed directly as a number of nodes, or as a tentative
/// number of arcs, in which case it is converted to a number of nodes using
/// the average indegree of the graph, so that each chunk scans approximately
/// the given number of predecessors.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Node granularity: each task will be formed by the specified number of
    /// nodes.
    Nodes(usize),
    /// Arc granularity: each task will be formed by a number of nodes whose
    /// sum of indegrees is, tentatively, the specified number of arcs.
    Arcs(u64),
}

impl core::default::Default for Granularity {
    /// Returns a default relative granularity of 1000 nodes.
    fn default() -> Self {
        Self::Nodes(1000)
    }
}

impl Granularity {
    /// Returns a node granularity for a graph with the given number of nodes
    /// and arcs.
    ///
    /// For the variant [`Nodes`](Self::Nodes), the specified number of nodes is
    /// returned. For the variant [`Arcs`](Self::Arcs), the number of nodes is
    /// computed as the specified number of arcs divided by the average
    /// degree. The result is always at least one.
    pub fn node_granularity(&self, num_nodes: usize, num_arcs: u64) -> usize {
        match self {
            Self::Nodes(n) => (*n).max(1),
            Self::Arcs(n) => {
                let average_degree = num_arcs.max(1) as f64 / num_nodes.max(1) as f64;
                (*n as f64 / average_degree)
                    .min(usize::MAX as f64)
                    .ceil()
                    .max(1.0) as usize
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes() {
        assert_eq!(Granularity::Nodes(4).node_granularity(100, 1000), 4);
        assert_eq!(Granularity::Nodes(0).node_granularity(100, 1000), 1);
        assert_eq!(Granularity::default().node_granularity(10, 10), 1000);
    }

    #[test]
    fn test_arcs() {
        // Average degree 10
        assert_eq!(Granularity::Arcs(1000).node_granularity(100, 1000), 100);
        assert_eq!(Granularity::Arcs(1).node_granularity(100, 1000), 1);
        // No arcs: the average degree is clamped
        assert_eq!(Granularity::Arcs(50).node_granularity(1, 0), 50);
    }
}
