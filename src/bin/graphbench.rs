//! Graph traversal benchmark.
//!
//! Loads `<graph>.e`, then runs N populate + BFS + DFS cycles on the chosen
//! backend. Metrics rows go to stdout, logs to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use graphbench::harness::{BenchConfig, BenchmarkHarness, IterationMetrics, ProcessSampler};
use graphbench::ingest::{EdgeList, IdBase, IngestOptions};
use graphbench::storage::{AdjacencyList, CsrStore, GraphStore};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    if let Err(err) = try_main() {
        eprintln!("graphbench failed: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    install_tracing_subscriber(args.debug);

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let options = IngestOptions::from(&args);
    let backend = args.backend;
    let graph = args.graph.clone();
    let config = BenchConfig::from(args);

    let edges = EdgeList::read(&graph, options)
        .with_context(|| format!("loading graph {}", graph.display()))?;
    let kind = if edges.is_undirected() {
        "Undirected"
    } else {
        "Directed"
    };
    tracing::info!(
        kind,
        vertices = edges.vertex_count(),
        edges = edges.edges().len(),
        weighted = edges.is_weighted(),
        backend = backend.label(),
        "graph summary"
    );

    match backend {
        Backend::Adjacency => run::<AdjacencyList>(&edges, config),
        Backend::Csr => run::<CsrStore>(&edges, config),
    }
}

fn run<S: GraphStore>(edges: &EdgeList, config: BenchConfig) -> Result<()> {
    let debug = config.debug;
    let mut harness = BenchmarkHarness::new(edges, config, ProcessSampler::new())
        .context("invalid source vertex")?;

    if !debug {
        println!("{}", IterationMetrics::CSV_HEADER);
    }
    let report = harness
        .run::<S, _>(|metrics| println!("{}", metrics.render(debug)))
        .context("benchmark run failed")?;

    for path in &report.written {
        tracing::info!(path = %path.display(), "results written");
    }
    Ok(())
}

fn install_tracing_subscriber(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(name = "graphbench", version, about = "Time BFS and DFS over an edge-list graph")]
struct Args {
    /// Graph base path; `<graph>.e` is read, `<graph>.bfs`/`.dfs` are written
    graph: PathBuf,

    /// Source vertex for both traversals
    #[arg(short, long, default_value_t = 1)]
    source: u64,

    /// Number of populate + traverse cycles
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    iterations: u64,

    /// Pair every edge with its reverse
    #[arg(short = 'U', long)]
    undirected: bool,

    /// Human-readable rows and debug-level logs
    #[arg(short, long)]
    debug: bool,

    /// Adjacency storage backend
    #[arg(long, value_enum, default_value_t = Backend::Adjacency)]
    backend: Backend,

    /// Sort neighbor lists by id after population
    #[arg(long)]
    sort_neighbors: bool,

    /// Take the vertex count from `<graph>.v`
    #[arg(long)]
    vertex_file: bool,

    /// Input ids are 1-based
    #[arg(long)]
    one_based: bool,

    /// Fail DFS once its stack holds this many frames
    #[arg(long)]
    max_dfs_depth: Option<usize>,

    /// Write result files here instead of beside the input
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum, Eq, PartialEq)]
#[value(rename_all = "kebab_case")]
enum Backend {
    Adjacency,
    Csr,
}

impl Backend {
    fn label(self) -> &'static str {
        match self {
            Backend::Adjacency => "adjacency",
            Backend::Csr => "csr",
        }
    }
}

impl From<&Args> for IngestOptions {
    fn from(value: &Args) -> Self {
        Self {
            undirected: value.undirected,
            id_base: if value.one_based {
                IdBase::One
            } else {
                IdBase::Zero
            },
            vertex_file: value.vertex_file,
        }
    }
}

impl From<Args> for BenchConfig {
    fn from(value: Args) -> Self {
        let results_base = match (&value.output_dir, value.graph.file_name()) {
            (Some(dir), Some(name)) => dir.join(name),
            _ => value.graph.clone(),
        };
        Self {
            source: value.source,
            iterations: usize::try_from(value.iterations).unwrap_or(usize::MAX),
            debug: value.debug,
            sort_neighbors: value.sort_neighbors,
            max_dfs_depth: value.max_dfs_depth,
            results_base: Some(results_base),
        }
    }
}
