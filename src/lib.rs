//! Throughput/latency and crash-recovery charts for consensus-protocol benchmarks.
//!
//! Benchmark latencies (from `go test -bench` logs or literal arrays) flow
//! through [`throughput`], [`align`] and [`recovery`] into
//! [`chart::ChartSpec`]s, which any [`chart::ChartEmitter`] can draw.

pub mod align;
pub mod chart;
pub mod dataset;
pub mod error;
pub mod export;
pub mod extract;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod recovery;
pub mod text_summary;
pub mod throughput;
#[cfg(feature = "tui")]
pub mod tui;

pub use error::{AnalysisError, Result};
