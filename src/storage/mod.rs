//! Graph storage layer
//!
//! The [`GraphStore`] trait is the capability set traversal code is written
//! against. Two backends implement it:
//!
//! - [`AdjacencyList`]: one growable neighbor vector per vertex (default)
//! - [`CsrStore`]: staged edges compacted into CSR arrays by the finalize hook
//!
//! Both own `vertex_count + 2` slots so that files using 1-based ids fit
//! without remapping.

pub mod adjacency;
pub mod csr;

pub use adjacency::AdjacencyList;
pub use csr::CsrStore;

use crate::error::{GraphError, Result};

/// Edge weight
pub type Weight = f64;

/// Extra adjacency slots allocated past the derived vertex count
pub const SLOT_SLACK: usize = 2;

/// Vertex identifier (dense, zero-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub u32);

impl VertexId {
    /// Position of this vertex in per-vertex arrays
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed, weighted edge as produced by ingestion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Source vertex
    pub from: VertexId,
    /// Target vertex
    pub to: VertexId,
    /// Edge weight (1.0 for unweighted inputs)
    pub weight: Weight,
}

impl Edge {
    /// Build an edge from raw ids
    #[must_use]
    pub const fn new(from: u32, to: u32, weight: Weight) -> Self {
        Self {
            from: VertexId(from),
            to: VertexId(to),
            weight,
        }
    }

    /// Same edge with endpoints swapped and identical weight
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            weight: self.weight,
        }
    }
}

/// Backend-agnostic adjacency storage
///
/// Edges are kept in insertion order per source vertex. Duplicate edges and
/// self-loops are stored as given.
///
/// # Example
///
/// ```
/// use graphbench::storage::{AdjacencyList, Edge, GraphStore, VertexId};
///
/// let mut store = AdjacencyList::with_vertices(3);
/// store.populate(&[Edge::new(0, 2, 1.0), Edge::new(0, 1, 0.5)]).unwrap();
///
/// let neighbors: Vec<_> = store.neighbors(VertexId(0)).unwrap().collect();
/// assert_eq!(neighbors, vec![(VertexId(2), 1.0), (VertexId(1), 0.5)]);
/// ```
pub trait GraphStore {
    /// Lazy `(neighbor, weight)` sequence over one vertex's adjacency
    type Neighbors<'a>: Iterator<Item = (VertexId, Weight)> + Clone
    where
        Self: 'a;

    /// Create an empty store sized for `vertex_count` vertices
    fn with_vertices(vertex_count: usize) -> Self
    where
        Self: Sized;

    /// Derived vertex count V
    fn vertex_count(&self) -> usize;

    /// Number of addressable slots (`V + SLOT_SLACK`)
    fn slot_count(&self) -> usize {
        self.vertex_count() + SLOT_SLACK
    }

    /// Number of stored directed edges (including not-yet-finalized ones)
    fn edge_count(&self) -> usize;

    /// Append `to` to `from`'s neighbor list
    ///
    /// # Errors
    ///
    /// Returns `OutOfRangeVertex` if either endpoint is outside the slot range
    fn insert_edge(&mut self, from: VertexId, to: VertexId, weight: Weight) -> Result<()>;

    /// Post-population hook; a no-op unless the backend compacts its data
    ///
    /// # Errors
    ///
    /// Backend-specific
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Insert every edge in order, then run [`GraphStore::finalize`]
    ///
    /// # Errors
    ///
    /// Stops at the first edge that fails to insert
    fn populate(&mut self, edges: &[Edge]) -> Result<()> {
        for edge in edges {
            self.insert_edge(edge.from, edge.to, edge.weight)?;
        }
        self.finalize()
    }

    /// Reorder every neighbor list ascending by neighbor id (stable)
    ///
    /// # Errors
    ///
    /// Backend-specific
    fn sort_by_neighbor_id(&mut self) -> Result<()>;

    /// Neighbors of `vertex` in current internal order
    ///
    /// # Errors
    ///
    /// Returns `OutOfRangeVertex` if `vertex` is outside the slot range
    fn neighbors(&self, vertex: VertexId) -> Result<Self::Neighbors<'_>>;

    /// Approximate heap bytes held by adjacency data
    fn heap_bytes(&self) -> usize;

    /// Reject ids outside `[0, slot_count)`
    ///
    /// # Errors
    ///
    /// Returns `OutOfRangeVertex` for ids past the last slot
    fn check_vertex(&self, vertex: VertexId) -> Result<()> {
        if vertex.index() < self.slot_count() {
            Ok(())
        } else {
            Err(GraphError::out_of_range(
                u64::from(vertex.0),
                self.slot_count() as u64,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_reversed_keeps_weight() {
        let edge = Edge::new(3, 7, 2.5);
        let rev = edge.reversed();
        assert_eq!(rev, Edge::new(7, 3, 2.5));
    }

    #[test]
    fn test_check_vertex_uses_slack() {
        let store = AdjacencyList::with_vertices(4);
        assert_eq!(store.slot_count(), 6);
        assert!(store.check_vertex(VertexId(5)).is_ok());
        assert!(matches!(
            store.check_vertex(VertexId(6)),
            Err(GraphError::OutOfRangeVertex { vertex: 6, upper: 6, .. })
        ));
    }
}
