//! Graph algorithms (BFS, DFS)
//!
//! Traversals run against any [`crate::storage::GraphStore`] backend.

pub mod traversal;

pub use traversal::{Traversal, TraversalEngine, TraversalKind, UNREACHED};
