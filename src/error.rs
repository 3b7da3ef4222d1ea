//! Error types

use thiserror::Error;

use crate::expr::ParseError;
use crate::synth::SynthesisError;

/// Error of a generation run
///
/// Any error aborts the whole run: no partial netlist is produced.
#[derive(Debug, Error)]
pub enum Error {
    /// No gate was allowed
    #[error("at least one gate kind must be allowed")]
    EmptyGateSet,
    /// An equation could not be parsed
    #[error("line {line}: {source}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Cause
        #[source]
        source: ParseError,
    },
    /// An equation could not be mapped to the allowed gates
    #[error("line {line}: {source}")]
    Synthesis {
        /// 1-based line number
        line: usize,
        /// Cause
        #[source]
        source: SynthesisError,
    },
    /// Invalid configuration file
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),
    /// Failed to write JSON output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// File access error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type of the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;
