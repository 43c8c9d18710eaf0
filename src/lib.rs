//! graphbench: storage-agnostic graph traversal benchmarking
//!
//! # Overview
//!
//! graphbench loads edge lists into interchangeable adjacency backends and
//! times BFS and DFS over them, sampling process memory around each rebuild.
//!
//! # Quick Start
//!
//! ```
//! use graphbench::{AdjacencyList, Edge, TraversalEngine, VertexId};
//!
//! let mut engine = TraversalEngine::<AdjacencyList>::with_vertices(3);
//! engine.populate(&[Edge::new(0, 1, 0.5), Edge::new(1, 2, 0.25)])?;
//!
//! let bfs = engine.bfs(VertexId(0))?;
//! assert_eq!(bfs.value(VertexId(2)), Some(2));
//! assert_eq!(bfs.weight_sum(), 0.75);
//! # Ok::<(), graphbench::GraphError>(())
//! ```
//!
//! # Architecture
//!
//! - **Ingest**: `<name>.e` edge lists, optional undirected expansion
//! - **Storage**: [`GraphStore`] trait with vector-of-vectors and CSR backends
//! - **Algorithms**: BFS (hop distance) and iterative DFS (discovery order)
//! - **Harness**: repeated populate + traverse cycles with timing and memory deltas
//! - **Generator**: seeded density graphs for reproducible inputs

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod algorithms;
pub mod error;
pub mod generator;
pub mod harness;
pub mod ingest;
pub mod storage;

// Re-export core types
pub use algorithms::{Traversal, TraversalEngine, TraversalKind, UNREACHED};
pub use error::{GraphError, Result};
pub use harness::{BenchConfig, BenchReport, BenchmarkHarness, IterationMetrics, ProcessSampler};
pub use ingest::{EdgeList, IdBase, IngestOptions};
pub use storage::{AdjacencyList, CsrStore, Edge, GraphStore, VertexId, Weight};
