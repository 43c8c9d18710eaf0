//! Edge-list ingestion
//!
//! Reads `<name>.e` files (one `from to [weight]` edge per non-empty line),
//! applies undirected expansion and derives the vertex count.
//!
//! # Rules
//!
//! - Weighted-ness is decided once from the first data line: three columns
//!   means every line must carry a weight, two columns means every weight is 1.
//! - Any line with a different column count aborts ingestion.
//! - V is the number of distinct endpoint ids, unless the `.v` file is
//!   consulted (see [`IngestOptions::vertex_file`]).
//! - Undirected expansion appends the reversed copy of every edge after all
//!   forward edges, so the stored list is `fwd[0..n] ++ rev[0..n]`.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{GraphError, Result};
use crate::storage::{Edge, VertexId, Weight};

/// Where vertex numbering starts in the input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdBase {
    /// Ids lie in `[0, V)`
    #[default]
    Zero,
    /// Ids lie in `[1, V]` (uses the store's slack slots)
    One,
}

impl IdBase {
    /// Half-open id range `[lower, upper)` for `vertex_count` vertices
    #[must_use]
    pub const fn range(self, vertex_count: usize) -> (u64, u64) {
        let v = vertex_count as u64;
        match self {
            Self::Zero => (0, v),
            Self::One => (1, v + 1),
        }
    }
}

/// Ingestion switches
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestOptions {
    /// Pair every edge with its reverse
    pub undirected: bool,
    /// Id numbering convention of the input
    pub id_base: IdBase,
    /// Take V from the `<name>.v` file instead of counting distinct endpoints
    pub vertex_file: bool,
}

/// Append an extension to a graph base path (`data/g` → `data/g.e`)
///
/// Unlike [`Path::with_extension`] this keeps dots already in the name.
#[must_use]
pub fn graph_file(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// An ordered, validated edge sequence ready for population
#[derive(Debug, Clone)]
pub struct EdgeList {
    edges: Vec<Edge>,
    vertex_count: usize,
    input_edges: usize,
    weighted: bool,
    options: IngestOptions,
}

impl EdgeList {
    /// Load `<base>.e` (and `<base>.v` when requested)
    ///
    /// # Errors
    ///
    /// - `Io` if a file cannot be opened or read
    /// - `MalformedInput` on a bad line
    /// - `OutOfRangeVertex` if an endpoint falls outside the derived range
    pub fn read(base: &Path, options: IngestOptions) -> Result<Self> {
        let edge_path = graph_file(base, "e");
        info!(path = %edge_path.display(), undirected = options.undirected, "loading graph");

        let file = File::open(&edge_path).map_err(|e| GraphError::io(&edge_path, e))?;
        let (edges, weighted) = parse_edges(BufReader::new(file), &edge_path)?;

        let declared = if options.vertex_file {
            Some(count_vertex_file(&graph_file(base, "v"))?)
        } else {
            None
        };

        let list = Self::build(edges, weighted, declared, options)?;
        info!(
            vertices = list.vertex_count,
            edges = list.edges.len(),
            weighted = list.weighted,
            "graph loaded"
        );
        Ok(list)
    }

    /// Parse an edge list from any reader; `origin` is only used in errors
    ///
    /// # Errors
    ///
    /// Same as [`EdgeList::read`], minus the `.v` lookup
    pub fn parse<R: BufRead>(reader: R, origin: &Path, options: IngestOptions) -> Result<Self> {
        let (edges, weighted) = parse_edges(reader, origin)?;
        Self::build(edges, weighted, None, options)
    }

    /// Build from already-tokenized directed edges (generators, tests)
    ///
    /// # Errors
    ///
    /// Returns `OutOfRangeVertex` if an endpoint is outside the derived range
    pub fn from_edges<I>(edges: I, options: IngestOptions) -> Result<Self>
    where
        I: IntoIterator<Item = Edge>,
    {
        let edges: Vec<Edge> = edges.into_iter().collect();
        let weighted = edges.iter().any(|e| (e.weight - 1.0).abs() > Weight::EPSILON);
        Self::build(edges, weighted, None, options)
    }

    fn build(
        mut edges: Vec<Edge>,
        weighted: bool,
        declared_vertices: Option<usize>,
        options: IngestOptions,
    ) -> Result<Self> {
        let input_edges = edges.len();

        let distinct: HashSet<VertexId> = edges.iter().flat_map(|e| [e.from, e.to]).collect();
        let vertex_count = declared_vertices.unwrap_or(distinct.len());
        debug!(distinct = distinct.len(), vertex_count, "derived vertex count");

        let (lower, upper) = options.id_base.range(vertex_count);
        for edge in &edges {
            for id in [edge.from, edge.to] {
                let id = u64::from(id.0);
                if id < lower || id >= upper {
                    return Err(GraphError::OutOfRangeVertex {
                        vertex: id,
                        lower,
                        upper,
                    });
                }
            }
        }

        let self_loops = edges.iter().filter(|e| e.from == e.to).count();
        if self_loops > 0 {
            warn!(self_loops, "edge list contains self-loops; storing them as-is");
        }

        if options.undirected {
            edges.reserve(input_edges);
            for idx in 0..input_edges {
                let reverse = edges[idx].reversed();
                edges.push(reverse);
            }
        }

        Ok(Self {
            edges,
            vertex_count,
            input_edges,
            weighted,
            options,
        })
    }

    /// Edges in population order
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Derived vertex count V
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of edges read from the input, before expansion
    #[must_use]
    pub const fn input_edge_count(&self) -> usize {
        self.input_edges
    }

    /// Whether the input carried a weight column
    #[must_use]
    pub const fn is_weighted(&self) -> bool {
        self.weighted
    }

    /// Whether undirected expansion was applied
    #[must_use]
    pub const fn is_undirected(&self) -> bool {
        self.options.undirected
    }

    /// Id numbering convention of the input
    #[must_use]
    pub const fn id_base(&self) -> IdBase {
        self.options.id_base
    }

    /// Valid id range `[lower, upper)` for this graph
    #[must_use]
    pub const fn id_range(&self) -> (u64, u64) {
        self.options.id_base.range(self.vertex_count)
    }

    /// Validate a traversal source against the graph's id range
    ///
    /// # Errors
    ///
    /// Returns `OutOfRangeVertex` if `source` is outside [`EdgeList::id_range`]
    pub fn check_source(&self, source: u64) -> Result<VertexId> {
        let (lower, upper) = self.id_range();
        if source < lower || source >= upper {
            return Err(GraphError::OutOfRangeVertex {
                vertex: source,
                lower,
                upper,
            });
        }
        u32::try_from(source)
            .map(VertexId)
            .map_err(|_| GraphError::OutOfRangeVertex {
                vertex: source,
                lower,
                upper,
            })
    }
}

fn malformed(path: &Path, line: usize, reason: impl Into<String>) -> GraphError {
    GraphError::MalformedInput {
        path: path.to_path_buf(),
        line,
        reason: reason.into(),
    }
}

fn parse_edges<R: BufRead>(reader: R, path: &Path) -> Result<(Vec<Edge>, bool)> {
    let mut edges = Vec::new();
    let mut columns: Option<usize> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| GraphError::io(path, e))?;
        let line_no = idx + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        let expected = match columns {
            Some(expected) => expected,
            None => {
                if tokens.len() != 2 && tokens.len() != 3 {
                    return Err(malformed(
                        path,
                        line_no,
                        format!("expected 2 or 3 columns, found {}", tokens.len()),
                    ));
                }
                columns = Some(tokens.len());
                tokens.len()
            }
        };
        if tokens.len() != expected {
            return Err(malformed(
                path,
                line_no,
                format!("expected {expected} columns, found {}", tokens.len()),
            ));
        }

        let from = parse_id(tokens[0], path, line_no)?;
        let to = parse_id(tokens[1], path, line_no)?;
        let weight = if expected == 3 {
            tokens[2]
                .parse::<Weight>()
                .map_err(|_| malformed(path, line_no, format!("invalid weight `{}`", tokens[2])))?
        } else {
            1.0
        };

        edges.push(Edge {
            from,
            to,
            weight,
        });
    }

    Ok((edges, columns == Some(3)))
}

fn parse_id(token: &str, path: &Path, line: usize) -> Result<VertexId> {
    token
        .parse::<u32>()
        .map(VertexId)
        .map_err(|_| malformed(path, line, format!("invalid vertex id `{token}`")))
}

fn count_vertex_file(path: &Path) -> Result<usize> {
    let file = File::open(path).map_err(|e| GraphError::io(path, e))?;
    let mut count = 0;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| GraphError::io(path, e))?;
        if !line.trim().is_empty() {
            count += 1;
        }
    }
    debug!(path = %path.display(), count, "vertex file read");
    Ok(count)
}
