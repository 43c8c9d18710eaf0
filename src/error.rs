//! Error taxonomy for ingestion, storage and traversal
//!
//! Every failure mode the engine can hit is a variant here. Ingestion and
//! population errors are fatal for a run; `StackDepthExceeded` is reported per
//! traversal and leaves the store intact.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the graph engine
#[derive(Debug, Error)]
pub enum GraphError {
    /// A file could not be opened, read or written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File the operation was addressing
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// An edge line does not match the expected column layout
    #[error("malformed input in {}, line {line}: {reason}", path.display())]
    MalformedInput {
        /// Edge file being parsed
        path: PathBuf,
        /// 1-based line number in the file
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// A vertex id falls outside the valid range
    #[error("vertex {vertex} out of range (valid ids: {lower}..{upper})")]
    OutOfRangeVertex {
        /// Offending vertex id
        vertex: u64,
        /// Inclusive lower bound
        lower: u64,
        /// Exclusive upper bound
        upper: u64,
    },

    /// DFS frame stack grew past the configured limit
    #[error("DFS stack depth exceeded limit of {limit} frames")]
    StackDepthExceeded {
        /// Configured frame limit
        limit: usize,
    },

    /// Backend was read before its finalize hook ran
    #[error("graph store has pending edges; call finalize() before reading neighbors")]
    Unfinalized,
}

impl GraphError {
    /// Shorthand for an out-of-range id against `[0, upper)`
    #[must_use]
    pub fn out_of_range(vertex: u64, upper: u64) -> Self {
        Self::OutOfRangeVertex {
            vertex,
            lower: 0,
            upper,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, GraphError>;
