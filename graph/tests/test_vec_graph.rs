/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rankgraph::prelude::*;

#[cfg(feature = "serde")]
#[test]
fn test_serde() -> anyhow::Result<()> {
    let g = VecGraph::from_arcs([(0, 1), (0, 2), (1, 2)]);
    let res = serde_json::to_string(&g)?;
    let p: VecGraph = serde_json::from_str(&res)?;
    assert_eq!(g, p);
    Ok(())
}

#[test]
fn test_named_nodes() {
    let mut g = VecGraph::new();
    let a = g.add_node("A");
    let b = g.add_node("B");
    let c = g.add_node("C");
    g.add_arc(a, b);
    g.add_arc(b, c);
    g.add_arc(c, a);
    g.add_arc(a, c);

    assert_eq!(g.num_nodes(), 3);
    assert_eq!(g.num_arcs(), 4);
    assert_eq!(g.names(), ["A", "B", "C"]);
    assert_eq!(g.name(c), "C");
    assert_eq!(g.outdegree(a), 2);
    assert_eq!(g.predecessors(c).collect::<Vec<_>>(), vec![b, a]);
    assert_eq!(g.indegree(c), 2);
    assert!(!g.is_dangling(c));
}

#[test]
fn test_dangling_nodes() {
    // Star: four leaves pointing to a center without outbound arcs
    let g = VecGraph::from_arcs([(1, 0), (2, 0), (3, 0), (4, 0)]);
    assert_eq!(g.dangling_nodes().collect::<Vec<_>>(), vec![0]);
    for leaf in 1..5 {
        assert_eq!(g.indegree(leaf), 0);
        assert_eq!(g.outdegree(leaf), 1);
    }
    assert_eq!(g.indegree(0), 4);
}

#[test]
fn test_empty() {
    let g = VecGraph::empty(0);
    assert_eq!(g.num_nodes(), 0);
    assert_eq!(g.num_arcs(), 0);
    assert_eq!(g.dangling_nodes().count(), 0);

    let mut g = VecGraph::empty(3);
    assert_eq!(g.dangling_nodes().count(), 3);
    g.shrink_to_fit();
    assert_eq!(g.name(2), "2");
}
