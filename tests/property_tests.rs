//! Property-based tests for graphbench
//!
//! Verifies traversal and ingestion invariants hold for arbitrary graphs

use std::collections::BTreeMap;

use graphbench::{
    AdjacencyList, CsrStore, Edge, EdgeList, GraphStore, IngestOptions, TraversalEngine, VertexId,
    UNREACHED,
};
use proptest::prelude::*;

/// Random edge list, relabelled so endpoint ids are dense (`0..V`)
fn prop_edge_list(
    num_edges: impl Strategy<Value = usize>,
    max_node: impl Strategy<Value = u32>,
) -> impl Strategy<Value = Vec<Edge>> {
    (num_edges, max_node).prop_flat_map(|(n, max_node)| {
        let max_node = max_node.max(1);
        prop::collection::vec(
            (0..max_node, 0..max_node, 0u8..100)
                .prop_map(|(src, dst, w)| Edge::new(src, dst, f64::from(w) / 10.0)),
            1..=n.max(1),
        )
        .prop_map(densify)
    })
}

fn densify(edges: Vec<Edge>) -> Vec<Edge> {
    let mut ids = BTreeMap::new();
    for edge in &edges {
        ids.insert(edge.from.0, 0);
        ids.insert(edge.to.0, 0);
    }
    for (rank, slot) in ids.values_mut().enumerate() {
        *slot = rank as u32;
    }
    edges
        .into_iter()
        .map(|e| Edge::new(ids[&e.from.0], ids[&e.to.0], e.weight))
        .collect()
}

fn engine<S: GraphStore>(list: &EdgeList) -> TraversalEngine<S> {
    let mut engine = TraversalEngine::<S>::with_vertices(list.vertex_count());
    engine.populate(list.edges()).unwrap();
    engine
}

/// Hop distances by repeated relaxation, independent of queue order
fn reference_distances(edges: &[Edge], vertex_count: usize, source: usize) -> Vec<u64> {
    let mut dist = vec![UNREACHED; vertex_count + 1];
    dist[source] = 0;
    for _ in 0..vertex_count {
        let mut changed = false;
        for e in edges {
            let (u, v) = (e.from.index(), e.to.index());
            if dist[u] != UNREACHED && dist[u] + 1 < dist[v] {
                dist[v] = dist[u] + 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    dist
}

// Property: BFS distances are exact hop-count shortest paths
proptest! {
    #[test]
    fn prop_bfs_matches_shortest_hops(edges in prop_edge_list(1usize..80usize, 1u32..30u32)) {
        let list = EdgeList::from_edges(edges, IngestOptions::default()).unwrap();
        let bfs = engine::<AdjacencyList>(&list).bfs(VertexId(0)).unwrap();

        let expected = reference_distances(list.edges(), list.vertex_count(), 0);
        prop_assert_eq!(bfs.values(), expected.as_slice());
    }
}

// Property: DFS orders on the reachable component are a gap-free permutation
proptest! {
    #[test]
    fn prop_dfs_order_is_permutation(edges in prop_edge_list(1usize..80usize, 1u32..30u32)) {
        let list = EdgeList::from_edges(edges, IngestOptions::default()).unwrap();
        let engine = engine::<CsrStore>(&list);
        let bfs = engine.bfs(VertexId(0)).unwrap();
        let dfs = engine.dfs(VertexId(0)).unwrap();

        // Same reachable set as BFS
        for (b, d) in bfs.values().iter().zip(dfs.values()) {
            prop_assert_eq!(*b == UNREACHED, *d == UNREACHED);
        }

        let mut orders: Vec<u64> = dfs
            .values()
            .iter()
            .enumerate()
            .filter(|&(v, &o)| v != 0 && o != UNREACHED)
            .map(|(_, &o)| o)
            .collect();
        orders.sort_unstable();
        let expected: Vec<u64> = (1..=orders.len() as u64).collect();
        prop_assert_eq!(orders, expected);
        prop_assert_eq!(dfs.values()[0], 0);
    }
}

// Property: with unit weights both sums count tree edges (reached - 1)
proptest! {
    #[test]
    fn prop_unit_weight_sums_count_tree_edges(edges in prop_edge_list(1usize..60usize, 1u32..25u32)) {
        let unit: Vec<_> = edges.iter().map(|e| Edge::new(e.from.0, e.to.0, 1.0)).collect();
        let list = EdgeList::from_edges(unit, IngestOptions::default()).unwrap();
        let engine = engine::<AdjacencyList>(&list);

        let bfs = engine.bfs(VertexId(0)).unwrap();
        let dfs = engine.dfs(VertexId(0)).unwrap();
        let tree_edges = (bfs.reached() - 1) as f64;
        prop_assert_eq!(bfs.weight_sum(), tree_edges);
        prop_assert_eq!(dfs.weight_sum(), tree_edges);
    }
}

// Property: undirected expansion doubles the edge list with mirrored weights
proptest! {
    #[test]
    fn prop_undirected_doubles_edges(edges in prop_edge_list(1usize..100usize, 1u32..40u32)) {
        let n = edges.len();
        let list = EdgeList::from_edges(
            edges.clone(),
            IngestOptions { undirected: true, ..IngestOptions::default() },
        )
        .unwrap();

        prop_assert_eq!(list.edges().len(), 2 * n);
        prop_assert_eq!(&list.edges()[..n], edges.as_slice());
        for (forward, reverse) in edges.iter().zip(&list.edges()[n..]) {
            prop_assert_eq!(*reverse, forward.reversed());
        }
    }
}

// Property: populating twice from the same list gives identical adjacency
proptest! {
    #[test]
    fn prop_population_is_deterministic(edges in prop_edge_list(1usize..100usize, 1u32..40u32)) {
        let list = EdgeList::from_edges(edges, IngestOptions::default()).unwrap();
        let a = engine::<CsrStore>(&list);
        let b = engine::<CsrStore>(&list);

        prop_assert_eq!(a.store().csr_components(), b.store().csr_components());
    }
}

// Property: both backends expose the same neighbor sequences and traversals
proptest! {
    #[test]
    fn prop_backends_agree(
        edges in prop_edge_list(1usize..100usize, 1u32..40u32),
        sort in any::<bool>(),
    ) {
        let list = EdgeList::from_edges(edges, IngestOptions::default()).unwrap();
        let mut adj = engine::<AdjacencyList>(&list);
        let mut csr = engine::<CsrStore>(&list);
        if sort {
            adj.sort_by_neighbor_id().unwrap();
            csr.sort_by_neighbor_id().unwrap();
        }

        for v in 0..list.vertex_count() as u32 {
            let left: Vec<_> = adj.store().neighbors(VertexId(v)).unwrap().collect();
            let right: Vec<_> = csr.store().neighbors(VertexId(v)).unwrap().collect();
            prop_assert_eq!(left, right);
        }
        prop_assert_eq!(adj.bfs(VertexId(0)).unwrap(), csr.bfs(VertexId(0)).unwrap());
        prop_assert_eq!(adj.dfs(VertexId(0)).unwrap(), csr.dfs(VertexId(0)).unwrap());
    }
}
