//! Synthetic density-based graph generator
//!
//! Every ordered pair `(i, j)` of `0..nodes` becomes an edge with probability
//! `density / 100`, weighted `k / 100` for a uniform `k` in `0..100`. Output is
//! deterministic for a given seed.
//!
//! Isolated vertices do not show up in the edge file, so generated graphs
//! should be loaded with the `.v` file as the vertex count source.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::error::{GraphError, Result};
use crate::ingest::graph_file;
use crate::storage::{Edge, Weight};

/// Generator parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    /// Number of vertices, ids `0..nodes`
    pub nodes: u32,
    /// Edge probability in percent, clamped to `[0, 100]`
    pub density: f64,
    /// PRNG seed
    pub seed: u64,
    /// Draw only pairs `i < j`, for graphs meant to be loaded as undirected
    pub undirected: bool,
}

impl GeneratorConfig {
    /// File stem `N<nodes>_D<density>_S<seed>`
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("N{}_D{}_S{}", self.nodes, self.density, self.seed)
    }

    fn probability(&self) -> f64 {
        if self.density.is_nan() {
            return 0.0;
        }
        (self.density / 100.0).clamp(0.0, 1.0)
    }
}

/// Draw the edge list for `config`
#[must_use]
pub fn generate(config: &GeneratorConfig) -> Vec<Edge> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let p = config.probability();
    let mut edges = Vec::new();

    for from in 0..config.nodes {
        let first = if config.undirected { from + 1 } else { 0 };
        for to in first..config.nodes {
            if rng.gen_bool(p) {
                let weight = Weight::from(rng.gen_range(0_u8..100)) / 100.0;
                edges.push(Edge::new(from, to, weight));
            }
        }
    }
    edges
}

/// Write `<dir>/<stem>.e` and `<dir>/<stem>.v`, returning the base path
///
/// # Errors
///
/// Returns `Io` if the directory or either file cannot be written
pub fn write(config: &GeneratorConfig, edges: &[Edge], dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| GraphError::io(dir, e))?;
    let base = dir.join(config.file_stem());

    let edge_path = graph_file(&base, "e");
    write_lines(
        &edge_path,
        edges.iter().map(|e| format!("{} {} {}", e.from, e.to, e.weight)),
    )?;

    let vertex_path = graph_file(&base, "v");
    write_lines(&vertex_path, (0..config.nodes).map(|v| v.to_string()))?;

    info!(
        base = %base.display(),
        nodes = config.nodes,
        edges = edges.len(),
        "graph written"
    );
    Ok(base)
}

fn write_lines(path: &Path, lines: impl Iterator<Item = String>) -> Result<()> {
    let file = File::create(path).map_err(|e| GraphError::io(path, e))?;
    let mut out = BufWriter::new(file);
    for line in lines {
        writeln!(out, "{line}").map_err(|e| GraphError::io(path, e))?;
    }
    out.flush().map_err(|e| GraphError::io(path, e))
}
