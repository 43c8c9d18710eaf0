//! CSR (Compressed Sparse Row) storage backend
//!
//! Based on `GraphBLAST` (Yang et al., ACM `ToMS` 2022) for cache-friendly sparse layout.
//!
//! # CSR Format
//!
//! ```text
//! Graph: 0 → 1, 0 → 2, 1 → 2
//!
//! CSR:
//!   row_offsets: [0, 2, 3, 3, 3, 3]  // Node 0: edges [0..2), Node 1: [2..3), rest empty (incl. 2 slack slots)
//!   col_indices: [1, 2, 2]            // Edge 0 → node 1, edge 1 → node 2, edge 2 → node 2
//!   edge_weights: [1.0, 1.0, 1.0]
//! ```
//!
//! Inserted edges are staged and only become visible after
//! [`GraphStore::finalize`], which compacts them into the arrays above with a
//! stable counting sort (per-vertex insertion order is kept).

use std::iter::{Copied, Zip};
use std::mem::size_of;
use std::slice;

use super::{Edge, GraphStore, VertexId, Weight, SLOT_SLACK};
use crate::error::{GraphError, Result};

/// CSR backend with a staging buffer
///
/// Optimized for:
/// - contiguous neighbor scans during BFS/DFS
/// - low per-vertex overhead (one offset per slot)
///
/// # Example
///
/// ```
/// use graphbench::storage::{CsrStore, Edge, GraphStore, VertexId};
///
/// let mut store = CsrStore::with_vertices(3);
/// store.populate(&[Edge::new(0, 1, 1.0), Edge::new(0, 2, 1.0)]).unwrap();
///
/// let neighbors: Vec<_> = store.neighbors(VertexId(0)).unwrap().map(|(v, _)| v.0).collect();
/// assert_eq!(neighbors, vec![1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct CsrStore {
    /// Slot i's edges live in `row_offsets[i]..row_offsets[i + 1]`
    /// Length: slots + 1
    row_offsets: Vec<usize>,

    /// Edge targets, grouped by source slot
    col_indices: Vec<VertexId>,

    /// Edge weights, parallel to `col_indices`
    edge_weights: Vec<Weight>,

    /// Edges inserted since the last finalize
    pending: Vec<Edge>,

    vertex_count: usize,
}

impl CsrStore {
    /// Raw CSR arrays (offsets, targets, weights)
    #[must_use]
    pub fn csr_components(&self) -> (&[usize], &[VertexId], &[Weight]) {
        (&self.row_offsets, &self.col_indices, &self.edge_weights)
    }

    /// Whether staged edges are waiting for [`GraphStore::finalize`]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn row(&self, slot: usize) -> (usize, usize) {
        (self.row_offsets[slot], self.row_offsets[slot + 1])
    }
}

impl GraphStore for CsrStore {
    type Neighbors<'a> = Zip<Copied<slice::Iter<'a, VertexId>>, Copied<slice::Iter<'a, Weight>>>;

    fn with_vertices(vertex_count: usize) -> Self {
        Self {
            row_offsets: vec![0; vertex_count + SLOT_SLACK + 1],
            col_indices: Vec::new(),
            edge_weights: Vec::new(),
            pending: Vec::new(),
            vertex_count,
        }
    }

    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn edge_count(&self) -> usize {
        self.col_indices.len() + self.pending.len()
    }

    fn insert_edge(&mut self, from: VertexId, to: VertexId, weight: Weight) -> Result<()> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;
        self.pending.push(Edge { from, to, weight });
        Ok(())
    }

    /// Compact compacted + staged edges into fresh CSR arrays
    ///
    /// Existing edges of a slot stay ahead of newly staged ones.
    fn finalize(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let slots = self.slot_count();
        let total = self.edge_count();

        // Degree per slot
        let mut counts = vec![0_usize; slots];
        for slot in 0..slots {
            let (start, end) = self.row(slot);
            counts[slot] = end - start;
        }
        for edge in &self.pending {
            counts[edge.from.index()] += 1;
        }

        // Prefix sum → new offsets
        let mut row_offsets = Vec::with_capacity(slots + 1);
        let mut offset = 0_usize;
        row_offsets.push(offset);
        for count in &counts {
            offset += count;
            row_offsets.push(offset);
        }

        let mut col_indices = vec![VertexId(0); total];
        let mut edge_weights = vec![0.0; total];
        let mut cursor = row_offsets[..slots].to_vec();

        for slot in 0..slots {
            let (start, end) = self.row(slot);
            for idx in start..end {
                col_indices[cursor[slot]] = self.col_indices[idx];
                edge_weights[cursor[slot]] = self.edge_weights[idx];
                cursor[slot] += 1;
            }
        }
        for edge in self.pending.drain(..) {
            let slot = edge.from.index();
            col_indices[cursor[slot]] = edge.to;
            edge_weights[cursor[slot]] = edge.weight;
            cursor[slot] += 1;
        }

        self.row_offsets = row_offsets;
        self.col_indices = col_indices;
        self.edge_weights = edge_weights;
        self.pending.shrink_to_fit();

        Ok(())
    }

    fn sort_by_neighbor_id(&mut self) -> Result<()> {
        if self.has_pending() {
            return Err(GraphError::Unfinalized);
        }

        let mut scratch: Vec<(VertexId, Weight)> = Vec::new();
        for slot in 0..self.slot_count() {
            let (start, end) = self.row(slot);
            if end - start < 2 {
                continue;
            }
            scratch.clear();
            scratch.extend(
                self.col_indices[start..end]
                    .iter()
                    .copied()
                    .zip(self.edge_weights[start..end].iter().copied()),
            );
            scratch.sort_by_key(|&(to, _)| to);
            for (idx, (to, weight)) in scratch.iter().enumerate() {
                self.col_indices[start + idx] = *to;
                self.edge_weights[start + idx] = *weight;
            }
        }

        Ok(())
    }

    fn neighbors(&self, vertex: VertexId) -> Result<Self::Neighbors<'_>> {
        self.check_vertex(vertex)?;
        if self.has_pending() {
            return Err(GraphError::Unfinalized);
        }

        let (start, end) = self.row(vertex.index());
        Ok(self.col_indices[start..end]
            .iter()
            .copied()
            .zip(self.edge_weights[start..end].iter().copied()))
    }

    fn heap_bytes(&self) -> usize {
        self.row_offsets.capacity() * size_of::<usize>()
            + self.col_indices.capacity() * size_of::<VertexId>()
            + self.edge_weights.capacity() * size_of::<Weight>()
            + self.pending.capacity() * size_of::<Edge>()
    }
}

impl Default for CsrStore {
    fn default() -> Self {
        Self::with_vertices(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(store: &CsrStore, v: u32) -> Vec<u32> {
        store
            .neighbors(VertexId(v))
            .unwrap()
            .map(|(to, _)| to.0)
            .collect()
    }

    #[test]
    fn test_empty_store() {
        let store = CsrStore::with_vertices(0);
        assert_eq!(store.vertex_count(), 0);
        assert_eq!(store.edge_count(), 0);

        let (row_offsets, col_indices, edge_weights) = store.csr_components();
        assert_eq!(row_offsets, &[0, 0, 0]);
        assert!(col_indices.is_empty());
        assert!(edge_weights.is_empty());
    }

    #[test]
    fn test_populate_builds_csr() {
        let mut store = CsrStore::with_vertices(3);
        store
            .populate(&[
                Edge::new(0, 1, 1.0),
                Edge::new(0, 2, 1.0),
                Edge::new(1, 2, 1.0),
            ])
            .unwrap();

        let (row_offsets, col_indices, edge_weights) = store.csr_components();
        assert_eq!(row_offsets, &[0, 2, 3, 3, 3, 3]);
        assert_eq!(col_indices, &[VertexId(1), VertexId(2), VertexId(2)]);
        assert_eq!(edge_weights, &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_interleaved_sources_keep_insertion_order() {
        let mut store = CsrStore::with_vertices(4);
        store
            .populate(&[
                Edge::new(1, 3, 1.0),
                Edge::new(0, 2, 1.0),
                Edge::new(1, 0, 1.0),
                Edge::new(0, 1, 1.0),
            ])
            .unwrap();

        assert_eq!(targets(&store, 0), vec![2, 1]);
        assert_eq!(targets(&store, 1), vec![3, 0]);
    }

    #[test]
    fn test_neighbors_before_finalize_is_error() {
        let mut store = CsrStore::with_vertices(2);
        store.insert_edge(VertexId(0), VertexId(1), 1.0).unwrap();

        assert!(store.has_pending());
        assert_eq!(store.edge_count(), 1);
        assert!(matches!(
            store.neighbors(VertexId(0)),
            Err(GraphError::Unfinalized)
        ));
        assert!(matches!(
            store.sort_by_neighbor_id(),
            Err(GraphError::Unfinalized)
        ));
    }

    #[test]
    fn test_second_finalize_appends_after_existing_edges() {
        let mut store = CsrStore::with_vertices(3);
        store.populate(&[Edge::new(0, 2, 1.0)]).unwrap();
        store.populate(&[Edge::new(0, 1, 2.0), Edge::new(2, 0, 3.0)]).unwrap();

        assert_eq!(targets(&store, 0), vec![2, 1]);
        assert_eq!(targets(&store, 2), vec![0]);
        assert_eq!(store.edge_count(), 3);
    }

    #[test]
    fn test_sort_by_neighbor_id() {
        let mut store = CsrStore::with_vertices(4);
        store
            .populate(&[
                Edge::new(0, 3, 0.3),
                Edge::new(0, 1, 0.1),
                Edge::new(0, 2, 0.2),
            ])
            .unwrap();
        store.sort_by_neighbor_id().unwrap();

        let pairs: Vec<_> = store
            .neighbors(VertexId(0))
            .unwrap()
            .map(|(to, w)| (to.0, w))
            .collect();
        assert_eq!(pairs, vec![(1, 0.1), (2, 0.2), (3, 0.3)]);
    }

    #[test]
    fn test_one_based_ids_fit_in_slack() {
        // Vertices 1..=3 with V = 3
        let mut store = CsrStore::with_vertices(3);
        store
            .populate(&[Edge::new(1, 2, 1.0), Edge::new(2, 3, 1.0)])
            .unwrap();

        assert_eq!(targets(&store, 2), vec![3]);
        assert!(store.insert_edge(VertexId(5), VertexId(1), 1.0).is_err());
    }
}
