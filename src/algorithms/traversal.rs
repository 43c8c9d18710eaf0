//! Graph traversal algorithms (BFS, DFS)
//!
//! Both walks are written against [`GraphStore`] only, so any backend can be
//! swapped in without touching the algorithms.
//!
//! # Semantics
//!
//! - **BFS** records, per vertex, the hop distance from the source. The weight
//!   sum counts each tree edge once: the edge a vertex was discovered over.
//! - **DFS** records, per vertex, its discovery order (source = 0, then 1, 2,
//!   ...). The weight of every tree edge is added before descending into it.
//!   The walk uses an explicit frame stack, so deep chains cannot overflow the
//!   call stack.
//!
//! Vertices never reached keep [`UNREACHED`].

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{GraphError, Result};
use crate::ingest::IdBase;
use crate::storage::{Edge, GraphStore, VertexId, Weight};

/// Sentinel for vertices the traversal did not reach (`i64::MAX`)
pub const UNREACHED: u64 = i64::MAX as u64;

/// Which traversal produced a [`Traversal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalKind {
    /// Breadth-first: values are hop distances
    Bfs,
    /// Depth-first: values are discovery order
    Dfs,
}

impl TraversalKind {
    /// Result-file extension (`bfs` / `dfs`)
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
        }
    }

    /// Upper-case label used in reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bfs => "BFS",
            Self::Dfs => "DFS",
        }
    }
}

/// Snapshot of one finished traversal
///
/// Holds one value per vertex id `0..=V` (the extra id covers 1-based inputs).
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    kind: TraversalKind,
    source: VertexId,
    values: Vec<u64>,
    weight_sum: Weight,
}

impl Traversal {
    /// Traversal kind
    #[must_use]
    pub const fn kind(&self) -> TraversalKind {
        self.kind
    }

    /// Source vertex
    #[must_use]
    pub const fn source(&self) -> VertexId {
        self.source
    }

    /// Per-vertex distance (BFS) or order (DFS), [`UNREACHED`] if not found
    #[must_use]
    pub fn values(&self) -> &[u64] {
        &self.values
    }

    /// Value for one vertex, `None` if unreached or out of range
    #[must_use]
    pub fn value(&self, vertex: VertexId) -> Option<u64> {
        self.values
            .get(vertex.index())
            .copied()
            .filter(|&v| v != UNREACHED)
    }

    /// Accumulated tree-edge weight
    #[must_use]
    pub const fn weight_sum(&self) -> Weight {
        self.weight_sum
    }

    /// Number of vertices reached, source included
    #[must_use]
    pub fn reached(&self) -> usize {
        self.values.iter().filter(|&&v| v != UNREACHED).count()
    }

    /// Write `<id> <value>` lines, one per vertex id
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`
    pub fn write_to<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        for (id, value) in self.values.iter().enumerate() {
            writeln!(out, "{id} {value}")?;
        }
        out.flush()
    }

    /// Write the result file at `path`
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be created or written
    pub fn write_results(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| GraphError::io(path, e))?;
        self.write_to(BufWriter::new(file))
            .map_err(|e| GraphError::io(path, e))?;
        info!(kind = self.kind.label(), path = %path.display(), "results written");
        Ok(())
    }
}

/// Per-run scratch state; dropped when the traversal returns
struct TraversalState {
    visited: Vec<bool>,
    values: Vec<u64>,
    weight_sum: Weight,
}

impl TraversalState {
    fn new(slots: usize) -> Self {
        Self {
            visited: vec![false; slots],
            values: vec![UNREACHED; slots],
            weight_sum: 0.0,
        }
    }

    fn is_visited(&self, vertex: VertexId) -> bool {
        self.visited[vertex.index()]
    }

    fn visit(&mut self, vertex: VertexId, value: u64) {
        self.visited[vertex.index()] = true;
        self.values[vertex.index()] = value;
    }

    fn finish(mut self, kind: TraversalKind, source: VertexId, vertex_count: usize) -> Traversal {
        self.values.truncate(vertex_count + 1);
        Traversal {
            kind,
            source,
            values: self.values,
            weight_sum: self.weight_sum,
        }
    }
}

/// Runs BFS/DFS over an owned store
///
/// # Example
///
/// ```
/// use graphbench::algorithms::{TraversalEngine, UNREACHED};
/// use graphbench::storage::{AdjacencyList, Edge, VertexId};
///
/// let mut engine = TraversalEngine::<AdjacencyList>::with_vertices(4);
/// engine
///     .populate(&[Edge::new(0, 1, 1.0), Edge::new(1, 2, 1.0), Edge::new(2, 3, 1.0)])
///     .unwrap();
///
/// let bfs = engine.bfs(VertexId(0)).unwrap();
/// assert_eq!(&bfs.values()[..4], &[0, 1, 2, 3]);
/// assert_eq!(bfs.weight_sum(), 3.0);
///
/// let dfs = engine.dfs(VertexId(0)).unwrap();
/// assert_eq!(&dfs.values()[..4], &[0, 1, 2, 3]);
/// assert_eq!(dfs.values()[4], UNREACHED);
/// ```
#[derive(Debug)]
pub struct TraversalEngine<S: GraphStore> {
    store: S,
    id_base: IdBase,
    max_dfs_depth: Option<usize>,
}

impl<S: GraphStore> TraversalEngine<S> {
    /// Wrap an existing store
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            id_base: IdBase::Zero,
            max_dfs_depth: None,
        }
    }

    /// Fresh, empty store sized for `vertex_count` vertices
    #[must_use]
    pub fn with_vertices(vertex_count: usize) -> Self {
        Self::new(S::with_vertices(vertex_count))
    }

    /// Bound the DFS frame stack; `None` means unbounded
    #[must_use]
    pub fn with_max_dfs_depth(mut self, limit: Option<usize>) -> Self {
        self.max_dfs_depth = limit;
        self
    }

    /// Numbering convention used to validate traversal sources
    ///
    /// Sources must lie in `[0, V)`, or `[1, V]` for [`IdBase::One`].
    #[must_use]
    pub fn with_id_base(mut self, id_base: IdBase) -> Self {
        self.id_base = id_base;
        self
    }

    /// Underlying store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Consume the engine, returning its store
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Bulk-load edges into the store (runs its finalize hook)
    ///
    /// # Errors
    ///
    /// Propagates store errors (`OutOfRangeVertex`)
    pub fn populate(&mut self, edges: &[Edge]) -> Result<()> {
        self.store.populate(edges)
    }

    /// Sort every neighbor list by neighbor id
    ///
    /// # Errors
    ///
    /// Propagates store errors
    pub fn sort_by_neighbor_id(&mut self) -> Result<()> {
        self.store.sort_by_neighbor_id()
    }

    /// Run the traversal of the given kind
    ///
    /// # Errors
    ///
    /// See [`TraversalEngine::bfs`] and [`TraversalEngine::dfs`]
    pub fn run(&self, kind: TraversalKind, source: VertexId) -> Result<Traversal> {
        match kind {
            TraversalKind::Bfs => self.bfs(source),
            TraversalKind::Dfs => self.dfs(source),
        }
    }

    fn check_source(&self, source: VertexId) -> Result<()> {
        let (lower, upper) = self.id_base.range(self.store.vertex_count());
        let vertex = u64::from(source.0);
        if vertex < lower || vertex >= upper {
            return Err(GraphError::OutOfRangeVertex {
                vertex,
                lower,
                upper,
            });
        }
        Ok(())
    }

    /// Breadth-first search from `source`
    ///
    /// # Errors
    ///
    /// Returns `OutOfRangeVertex` if `source` is outside the vertex range
    pub fn bfs(&self, source: VertexId) -> Result<Traversal> {
        self.check_source(source)?;

        let mut state = TraversalState::new(self.store.slot_count());
        let mut queue = VecDeque::new();

        state.visit(source, 0);
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            let next_distance = state.values[current.index()] + 1;
            for (neighbor, weight) in self.store.neighbors(current)? {
                if !state.is_visited(neighbor) {
                    state.visit(neighbor, next_distance);
                    state.weight_sum += weight;
                    queue.push_back(neighbor);
                }
            }
        }

        let result = state.finish(TraversalKind::Bfs, source, self.store.vertex_count());
        debug!(
            source = source.0,
            reached = result.reached(),
            sum = result.weight_sum(),
            "bfs finished"
        );
        Ok(result)
    }

    /// Depth-first search from `source` with an explicit frame stack
    ///
    /// Each frame is the neighbor iterator of a vertex on the current path;
    /// its position is where the walk resumes after backtracking.
    ///
    /// # Errors
    ///
    /// - `OutOfRangeVertex` if `source` is outside the vertex range
    /// - `StackDepthExceeded` if the path grows past the configured limit
    pub fn dfs(&self, source: VertexId) -> Result<Traversal> {
        self.check_source(source)?;

        let mut state = TraversalState::new(self.store.slot_count());
        let mut last_order = 0_u64;

        state.visit(source, 0);
        let mut stack: Vec<S::Neighbors<'_>> = vec![self.store.neighbors(source)?];

        while let Some(frame) = stack.last_mut() {
            let Some((neighbor, weight)) = frame.next() else {
                stack.pop();
                continue;
            };
            if state.is_visited(neighbor) {
                continue;
            }

            last_order += 1;
            state.visit(neighbor, last_order);
            state.weight_sum += weight;

            if let Some(limit) = self.max_dfs_depth {
                if stack.len() >= limit {
                    return Err(GraphError::StackDepthExceeded { limit });
                }
            }
            stack.push(self.store.neighbors(neighbor)?);
        }

        let result = state.finish(TraversalKind::Dfs, source, self.store.vertex_count());
        debug!(
            source = source.0,
            reached = result.reached(),
            sum = result.weight_sum(),
            "dfs finished"
        );
        Ok(result)
    }
}
