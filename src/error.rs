//! Error types for the analysis pipeline.

use std::num::ParseIntError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the sample extractor, calculators and aligner.
///
/// None of these are recoverable: a malformed input means the benchmark
/// data itself has to be fixed, so every error is handed straight back to
/// the caller.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A line ending in `ns/op` whose value is not an integer.
    #[error("line {line_no}: invalid ns/op value in {line:?}")]
    Parse {
        line_no: usize,
        line: String,
        #[source]
        source: ParseIntError,
    },

    /// A sequence whose length does not match what the operation needs.
    #[error("{what}: expected {expected} samples, got {actual}")]
    Shape {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A value that would make throughput undefined (zero, negative or non-finite).
    #[error("{what}: value {value} at index {index} is outside the valid domain")]
    Domain {
        what: &'static str,
        index: usize,
        value: f64,
    },

    /// The benchmark log at `path` could not be opened or read.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Read failure from a source with no path attached.
    #[error(transparent)]
    Stream(#[from] std::io::Error),
}

impl AnalysisError {
    pub fn shape(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::Shape {
            what,
            expected,
            actual,
        }
    }

    pub fn domain(what: &'static str, index: usize, value: f64) -> Self {
        Self::Domain { what, index, value }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
