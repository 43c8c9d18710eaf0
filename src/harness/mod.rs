//! Benchmark harness: repeated populate + traverse cycles
//!
//! Each iteration builds a fresh store, times population, then times BFS and
//! DFS from the configured source. Memory is sampled before and after each of
//! the three phases. Only iteration 0 persists its traversal outputs.

pub mod sampler;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::algorithms::{Traversal, TraversalEngine, TraversalKind};
use crate::error::{GraphError, Result};
use crate::ingest::{graph_file, EdgeList};
use crate::storage::{GraphStore, VertexId, Weight};

pub use sampler::{MemoryDelta, MemorySample, ProcessSampler, ResourceSampler};

/// Harness settings (built by the CLI from its arguments)
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Source vertex for both traversals
    pub source: u64,
    /// Number of populate + traverse cycles
    pub iterations: usize,
    /// Multi-line, human-readable rows instead of comma-joined ones
    pub debug: bool,
    /// Sort neighbor lists after population (timed with population)
    pub sort_neighbors: bool,
    /// Optional DFS frame limit
    pub max_dfs_depth: Option<usize>,
    /// Base path for `<base>.bfs` / `<base>.dfs`; `None` skips persisting
    pub results_base: Option<PathBuf>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            source: 1,
            iterations: 1,
            debug: false,
            sort_neighbors: false,
            max_dfs_depth: None,
            results_base: None,
        }
    }
}

/// How one traversal phase ended
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseOutcome {
    /// Traversal ran to completion
    Completed {
        /// Wall-clock time of the traversal
        elapsed: Duration,
        /// Process memory change across the traversal
        memory: MemoryDelta,
        /// Accumulated tree-edge weight
        weight_sum: Weight,
        /// Vertices reached, source included
        reached: usize,
    },
    /// Traversal stopped with a recoverable error (DFS depth guard)
    Failed {
        /// Time spent before the error
        elapsed: Duration,
        /// Process memory change up to the error
        memory: MemoryDelta,
        /// Error message
        reason: String,
    },
}

impl PhaseOutcome {
    fn completed(elapsed: Duration, memory: MemoryDelta, traversal: &Traversal) -> Self {
        Self::Completed {
            elapsed,
            memory,
            weight_sum: traversal.weight_sum(),
            reached: traversal.reached(),
        }
    }

    /// Wall-clock time of the phase
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Completed { elapsed, .. } | Self::Failed { elapsed, .. } => *elapsed,
        }
    }

    /// Memory change attributed to the phase
    #[must_use]
    pub const fn memory(&self) -> MemoryDelta {
        match self {
            Self::Completed { memory, .. } | Self::Failed { memory, .. } => *memory,
        }
    }

    /// Weight sum, if the phase completed
    #[must_use]
    pub const fn weight_sum(&self) -> Option<Weight> {
        match self {
            Self::Completed { weight_sum, .. } => Some(*weight_sum),
            Self::Failed { .. } => None,
        }
    }

    fn row_cells(&self) -> String {
        let memory = self.memory();
        format!(
            "{:.3},{},{},{}",
            millis(self.elapsed()),
            memory.resident_bytes,
            memory.virtual_bytes,
            sum_cell(self)
        )
    }

    fn report_line(&self, label: &str) -> String {
        let memory = self.memory();
        match self {
            Self::Completed {
                elapsed,
                weight_sum,
                reached,
                ..
            } => format!(
                "  {label} execution time: {:.3} ms, sum: {weight_sum}, reached: {reached}, \
                 memory delta: rss {} bytes, virtual {} bytes\n",
                millis(*elapsed),
                memory.resident_bytes,
                memory.virtual_bytes
            ),
            Self::Failed {
                elapsed, reason, ..
            } => format!(
                "  {label} failed after {:.3} ms: {reason}, \
                 memory delta: rss {} bytes, virtual {} bytes\n",
                millis(*elapsed),
                memory.resident_bytes,
                memory.virtual_bytes
            ),
        }
    }
}

/// Measurements of one iteration
#[derive(Debug, Clone, PartialEq)]
pub struct IterationMetrics {
    /// Zero-based iteration index
    pub iteration: usize,
    /// Population time (including the optional neighbor sort)
    pub populate: Duration,
    /// Process memory change across store construction + population
    pub memory: MemoryDelta,
    /// Heap bytes the store reports for its adjacency data
    pub store_bytes: usize,
    /// BFS phase
    pub bfs: PhaseOutcome,
    /// DFS phase
    pub dfs: PhaseOutcome,
}

impl IterationMetrics {
    /// Column names matching [`IterationMetrics::to_row`]
    pub const CSV_HEADER: &'static str = "iteration,populate_ms,rss_delta_bytes,virt_delta_bytes,store_bytes,\
         bfs_ms,bfs_rss_delta_bytes,bfs_virt_delta_bytes,bfs_sum,\
         dfs_ms,dfs_rss_delta_bytes,dfs_virt_delta_bytes,dfs_sum";

    /// Comma-joined single line; a failed phase reports `failed` as its sum
    #[must_use]
    pub fn to_row(&self) -> String {
        format!(
            "{},{:.3},{},{},{},{},{}",
            self.iteration,
            millis(self.populate),
            self.memory.resident_bytes,
            self.memory.virtual_bytes,
            self.store_bytes,
            self.bfs.row_cells(),
            self.dfs.row_cells(),
        )
    }

    /// Multi-line human-readable block
    #[must_use]
    pub fn to_report(&self) -> String {
        let mut out = format!(
            "iteration {}\n  population time: {:.3} ms\n  \
             memory delta: rss {} bytes, virtual {} bytes (store ~{} bytes)\n",
            self.iteration,
            millis(self.populate),
            self.memory.resident_bytes,
            self.memory.virtual_bytes,
            self.store_bytes
        );
        out.push_str(&self.bfs.report_line("BFS"));
        out.push_str(&self.dfs.report_line("DFS"));
        out
    }

    /// Row in the configured style
    #[must_use]
    pub fn render(&self, debug: bool) -> String {
        if debug {
            self.to_report()
        } else {
            self.to_row()
        }
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}

fn sum_cell(phase: &PhaseOutcome) -> String {
    phase
        .weight_sum()
        .map_or_else(|| "failed".to_string(), |sum| sum.to_string())
}

/// Aggregate over all iterations
#[derive(Debug, Clone, Default)]
pub struct BenchReport {
    /// One entry per iteration, in order
    pub iterations: Vec<IterationMetrics>,
    /// Result files written by iteration 0
    pub written: Vec<PathBuf>,
}

impl BenchReport {
    /// Mean population time
    #[must_use]
    pub fn mean_populate(&self) -> Duration {
        mean(self.iterations.iter().map(|m| m.populate))
    }

    /// Mean time of a traversal phase
    #[must_use]
    pub fn mean_traversal(&self, kind: TraversalKind) -> Duration {
        mean(self.iterations.iter().map(|m| match kind {
            TraversalKind::Bfs => m.bfs.elapsed(),
            TraversalKind::Dfs => m.dfs.elapsed(),
        }))
    }
}

fn mean(durations: impl Iterator<Item = Duration>) -> Duration {
    let (total, count) = durations.fold((Duration::ZERO, 0_u32), |(sum, n), d| (sum + d, n + 1));
    if count == 0 {
        Duration::ZERO
    } else {
        total / count
    }
}

/// Drives the benchmark over a loaded edge list
///
/// The store backend is chosen per call to [`BenchmarkHarness::run`].
///
/// # Example
///
/// ```
/// use graphbench::harness::{BenchConfig, BenchmarkHarness, MemorySample, ResourceSampler};
/// use graphbench::ingest::{EdgeList, IngestOptions};
/// use graphbench::storage::{AdjacencyList, Edge};
///
/// struct Fixed;
/// impl ResourceSampler for Fixed {
///     fn sample(&mut self) -> MemorySample {
///         MemorySample::default()
///     }
/// }
///
/// let edges = EdgeList::from_edges(
///     [Edge::new(0, 1, 1.0), Edge::new(1, 2, 1.0)],
///     IngestOptions::default(),
/// ).unwrap();
/// let config = BenchConfig { source: 0, iterations: 3, ..BenchConfig::default() };
///
/// let mut harness = BenchmarkHarness::new(&edges, config, Fixed).unwrap();
/// let report = harness.run::<AdjacencyList, _>(|_| {}).unwrap();
/// assert_eq!(report.iterations.len(), 3);
/// assert_eq!(report.iterations[0].bfs.weight_sum(), Some(2.0));
/// ```
#[derive(Debug)]
pub struct BenchmarkHarness<'a, R: ResourceSampler> {
    edges: &'a EdgeList,
    config: BenchConfig,
    source: VertexId,
    sampler: R,
}

impl<'a, R: ResourceSampler> BenchmarkHarness<'a, R> {
    /// Validate the configuration against the loaded graph
    ///
    /// # Errors
    ///
    /// Returns `OutOfRangeVertex` if the source is not a vertex of the graph
    pub fn new(edges: &'a EdgeList, config: BenchConfig, sampler: R) -> Result<Self> {
        let source = edges.check_source(config.source)?;
        if !edges.edges().iter().any(|e| e.from == source) {
            warn!(%source, "source vertex has no outgoing edges");
        }
        Ok(Self {
            edges,
            config,
            source,
            sampler,
        })
    }

    /// Harness configuration
    #[must_use]
    pub const fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Run every iteration with backend `S`, handing each row to `on_row`
    ///
    /// # Errors
    ///
    /// Population failures and result-file I/O errors abort the run.
    /// A DFS depth-guard hit is recorded in the row instead.
    pub fn run<S, F>(&mut self, mut on_row: F) -> Result<BenchReport>
    where
        S: GraphStore,
        F: FnMut(&IterationMetrics),
    {
        let mut report = BenchReport::default();
        for iteration in 0..self.config.iterations {
            let (metrics, written) = self.run_iteration::<S>(iteration)?;
            on_row(&metrics);
            report.iterations.push(metrics);
            report.written.extend(written);
        }

        info!(
            iterations = report.iterations.len(),
            populate_ms = millis(report.mean_populate()),
            bfs_ms = millis(report.mean_traversal(TraversalKind::Bfs)),
            dfs_ms = millis(report.mean_traversal(TraversalKind::Dfs)),
            "benchmark finished (means)"
        );
        Ok(report)
    }

    fn run_iteration<S: GraphStore>(
        &mut self,
        iteration: usize,
    ) -> Result<(IterationMetrics, Vec<PathBuf>)> {
        debug!(iteration, "iteration start");

        let before = self.sampler.sample();
        let mut engine = TraversalEngine::<S>::with_vertices(self.edges.vertex_count())
            .with_id_base(self.edges.id_base())
            .with_max_dfs_depth(self.config.max_dfs_depth);

        let start = Instant::now();
        engine.populate(self.edges.edges())?;
        if self.config.sort_neighbors {
            engine.sort_by_neighbor_id()?;
        }
        let populate = start.elapsed();

        let memory = self.sampler.sample().delta_since(&before);
        let store_bytes = engine.store().heap_bytes();

        let before = self.sampler.sample();
        let start = Instant::now();
        let bfs_result = engine.bfs(self.source)?;
        let elapsed = start.elapsed();
        let bfs_memory = self.sampler.sample().delta_since(&before);
        let bfs = PhaseOutcome::completed(elapsed, bfs_memory, &bfs_result);

        let before = self.sampler.sample();
        let start = Instant::now();
        let dfs_result = match engine.dfs(self.source) {
            Ok(traversal) => Some(traversal),
            Err(err @ GraphError::StackDepthExceeded { .. }) => {
                warn!(iteration, error = %err, "dfs aborted");
                None
            }
            Err(err) => return Err(err),
        };
        let elapsed = start.elapsed();
        let dfs_memory = self.sampler.sample().delta_since(&before);
        let dfs = match &dfs_result {
            Some(traversal) => PhaseOutcome::completed(elapsed, dfs_memory, traversal),
            None => PhaseOutcome::Failed {
                elapsed,
                memory: dfs_memory,
                reason: "stack depth exceeded".to_string(),
            },
        };

        let mut written = Vec::new();
        if iteration == 0 {
            if let Some(base) = &self.config.results_base {
                written.push(persist(base, &bfs_result)?);
                if let Some(traversal) = &dfs_result {
                    written.push(persist(base, traversal)?);
                }
            }
        }

        // Store is discarded here; the next iteration rebuilds it
        drop(engine);

        Ok((
            IterationMetrics {
                iteration,
                populate,
                memory,
                store_bytes,
                bfs,
                dfs,
            },
            written,
        ))
    }
}

fn persist(base: &Path, traversal: &Traversal) -> Result<PathBuf> {
    let path = graph_file(base, traversal.kind().extension());
    traversal.write_results(&path)?;
    Ok(path)
}
