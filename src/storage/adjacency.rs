//! Per-vertex growable adjacency lists
//!
//! ```text
//! Edges: 0 → 2 (1.0), 0 → 1 (0.5), 1 → 2 (2.0)
//!
//! slots[0]: [(2, 1.0), (1, 0.5)]
//! slots[1]: [(2, 2.0)]
//! slots[2]: []
//! ```

use std::iter::Copied;
use std::mem::size_of;
use std::slice;

use super::{GraphStore, VertexId, Weight, SLOT_SLACK};
use crate::error::Result;

/// Adjacency-list backend: `Vec<(neighbor, weight)>` per vertex slot
#[derive(Debug, Clone)]
pub struct AdjacencyList {
    slots: Vec<Vec<(VertexId, Weight)>>,
    vertex_count: usize,
    edge_count: usize,
}

impl GraphStore for AdjacencyList {
    type Neighbors<'a> = Copied<slice::Iter<'a, (VertexId, Weight)>>;

    fn with_vertices(vertex_count: usize) -> Self {
        Self {
            slots: vec![Vec::new(); vertex_count + SLOT_SLACK],
            vertex_count,
            edge_count: 0,
        }
    }

    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn insert_edge(&mut self, from: VertexId, to: VertexId, weight: Weight) -> Result<()> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        self.slots[from.index()].push((to, weight));
        self.edge_count += 1;
        Ok(())
    }

    fn sort_by_neighbor_id(&mut self) -> Result<()> {
        for list in &mut self.slots {
            list.sort_by_key(|&(to, _)| to);
        }
        Ok(())
    }

    fn neighbors(&self, vertex: VertexId) -> Result<Self::Neighbors<'_>> {
        self.check_vertex(vertex)?;
        Ok(self.slots[vertex.index()].iter().copied())
    }

    fn heap_bytes(&self) -> usize {
        let headers = self.slots.capacity() * size_of::<Vec<(VertexId, Weight)>>();
        let entries: usize = self
            .slots
            .iter()
            .map(|list| list.capacity() * size_of::<(VertexId, Weight)>())
            .sum();
        headers + entries
    }
}

impl Default for AdjacencyList {
    fn default() -> Self {
        Self::with_vertices(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::storage::Edge;

    fn collect(store: &AdjacencyList, v: u32) -> Vec<(u32, f64)> {
        store
            .neighbors(VertexId(v))
            .unwrap()
            .map(|(to, w)| (to.0, w))
            .collect()
    }

    #[test]
    fn test_empty_store() {
        let store = AdjacencyList::with_vertices(0);
        assert_eq!(store.vertex_count(), 0);
        assert_eq!(store.slot_count(), 2);
        assert_eq!(store.edge_count(), 0);
        assert!(collect(&store, 1).is_empty());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut store = AdjacencyList::with_vertices(4);
        store
            .populate(&[
                Edge::new(0, 3, 1.0),
                Edge::new(0, 1, 2.0),
                Edge::new(0, 2, 3.0),
            ])
            .unwrap();

        assert_eq!(collect(&store, 0), vec![(3, 1.0), (1, 2.0), (2, 3.0)]);
        assert_eq!(store.edge_count(), 3);
    }

    #[test]
    fn test_duplicates_and_self_loops_kept() {
        let mut store = AdjacencyList::with_vertices(2);
        store
            .populate(&[
                Edge::new(0, 1, 1.0),
                Edge::new(0, 1, 1.0),
                Edge::new(1, 1, 4.0),
            ])
            .unwrap();

        assert_eq!(collect(&store, 0).len(), 2);
        assert_eq!(collect(&store, 1), vec![(1, 4.0)]);
    }

    #[test]
    fn test_sort_by_neighbor_id_moves_weights_with_neighbors() {
        let mut store = AdjacencyList::with_vertices(4);
        store
            .populate(&[
                Edge::new(0, 3, 0.3),
                Edge::new(0, 1, 0.1),
                Edge::new(0, 2, 0.2),
                Edge::new(0, 1, 0.9),
            ])
            .unwrap();
        store.sort_by_neighbor_id().unwrap();

        assert_eq!(
            collect(&store, 0),
            vec![(1, 0.1), (1, 0.9), (2, 0.2), (3, 0.3)]
        );
    }

    #[test]
    fn test_out_of_range_insert_rejected() {
        let mut store = AdjacencyList::with_vertices(2);
        let err = store
            .insert_edge(VertexId(0), VertexId(4), 1.0)
            .unwrap_err();
        assert!(matches!(err, GraphError::OutOfRangeVertex { vertex: 4, .. }));
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_neighbors_restartable() {
        let mut store = AdjacencyList::with_vertices(3);
        store
            .populate(&[Edge::new(0, 1, 1.0), Edge::new(0, 2, 1.0)])
            .unwrap();

        let iter = store.neighbors(VertexId(0)).unwrap();
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_heap_bytes_grows() {
        let mut store = AdjacencyList::with_vertices(8);
        let before = store.heap_bytes();
        store.insert_edge(VertexId(0), VertexId(1), 1.0).unwrap();
        assert!(store.heap_bytes() > before);
    }
}
