//! Extraction of latency samples from `go test -bench` output.
//!
//! Only lines whose final token is exactly `ns/op` carry a sample; the value
//! is the token right before the unit. Everything else (PASS/ok lines, test
//! chatter, `-benchmem` columns) is skipped.

use crate::error::{AnalysisError, Result};
use crate::model::{LatencySample, LatencySeries};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, trace};

const UNIT_TOKEN: &str = "ns/op";

/// One qualifying benchmark line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkRecord {
    /// First token of the line, e.g. `Benchmark_3_1kB-8`.
    pub name: String,
    /// Iteration count reported by the harness, when the line has one.
    pub iterations: Option<u64>,
    pub ns_per_op: LatencySample,
}

/// Parse every `... <value> ns/op` line of `reader` in file order.
pub fn extract_records<R: BufRead>(reader: R) -> Result<Vec<BenchmarkRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.last() != Some(&UNIT_TOKEN) || tokens.len() < 2 {
            trace!(line_no = idx + 1, "skipping non-benchmark line");
            continue;
        }
        let value = tokens[tokens.len() - 2];
        let ns = value.parse::<u64>().map_err(|source| AnalysisError::Parse {
            line_no: idx + 1,
            line: line.clone(),
            source,
        })?;
        let iterations = if tokens.len() >= 3 {
            tokens[tokens.len() - 3].parse::<u64>().ok()
        } else {
            None
        };
        records.push(BenchmarkRecord {
            name: tokens[0].to_string(),
            iterations,
            ns_per_op: LatencySample(ns),
        });
    }
    Ok(records)
}

/// Ordered latency samples plus their count.
///
/// The count is what callers use as a split point between runs, so it is
/// always the exact number of qualifying lines.
pub fn extract_samples<R: BufRead>(reader: R) -> Result<(LatencySeries, usize)> {
    let samples: LatencySeries = extract_records(reader)?
        .into_iter()
        .map(|r| r.ns_per_op)
        .collect();
    let count = samples.len();
    Ok((samples, count))
}

/// Open `path` and extract its samples. The file is closed on every return path.
pub fn extract_from_path(path: &Path) -> Result<(LatencySeries, usize)> {
    let (samples, count) = with_file(path, extract_samples)?;
    debug!(path = %path.display(), count, "extracted benchmark samples");
    Ok((samples, count))
}

/// Like [`extract_records`], reading from the file at `path`.
pub fn records_from_path(path: &Path) -> Result<Vec<BenchmarkRecord>> {
    let records = with_file(path, extract_records)?;
    for r in &records {
        debug!(
            name = %r.name,
            iterations = ?r.iterations,
            ns = r.ns_per_op.nanos(),
            "benchmark record"
        );
    }
    debug!(path = %path.display(), count = records.len(), "extracted benchmark records");
    Ok(records)
}

fn with_file<T>(path: &Path, read: impl FnOnce(BufReader<File>) -> Result<T>) -> Result<T> {
    let io_err = |source| AnalysisError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    read(BufReader::new(file)).map_err(|e| match e {
        AnalysisError::Stream(source) => io_err(source),
        other => other,
    })
}

/// Chop a concatenated log (one run per cluster size) into runs of
/// `benchmark_count` samples each.
pub fn split_runs(samples: &[LatencySample], benchmark_count: usize) -> Result<Vec<LatencySeries>> {
    if benchmark_count == 0 {
        return Err(AnalysisError::domain("benchmark count", 0, 0.0));
    }
    let remainder = samples.len() % benchmark_count;
    if remainder != 0 {
        return Err(AnalysisError::shape(
            "trailing benchmark run",
            benchmark_count,
            remainder,
        ));
    }
    Ok(samples
        .chunks(benchmark_count)
        .map(|chunk| chunk.to_vec())
        .collect())
}

/// Fields encoded in a benchmark function name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkName {
    pub servers: u32,
    /// Injected fault count, present in the `Benchmark_<servers>_<faults>_<size>` form.
    pub faults: Option<u32>,
    pub payload_bytes: u64,
}

/// Decode `Benchmark_<servers>_<size>` or `Benchmark_<servers>_<faults>_<size>`,
/// optionally with a `-<procs>` suffix.
pub fn parse_benchmark_name(name: &str) -> Option<BenchmarkName> {
    let name = match name.rsplit_once('-') {
        Some((head, procs)) if procs.chars().all(|c| c.is_ascii_digit()) => head,
        _ => name,
    };
    let parts: Vec<&str> = name.split('_').collect();
    let (servers, faults, size) = match parts.as_slice() {
        ["Benchmark", servers, size] => (servers, None, size),
        ["Benchmark", servers, faults, size] => (servers, Some(faults.parse::<u32>().ok()?), size),
        _ => return None,
    };
    Some(BenchmarkName {
        servers: servers.parse::<u32>().ok()?,
        faults,
        payload_bytes: parse_size(size)?,
    })
}

fn parse_size(s: &str) -> Option<u64> {
    let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (num, unit) = s.split_at(digits_end);
    let num = num.parse::<u64>().ok()?;
    let multiplier = match unit {
        "" | "B" => 1,
        "kB" | "KB" => 1 << 10,
        "MB" => 1 << 20,
        "GB" => 1 << 30,
        _ => return None,
    };
    num.checked_mul(multiplier)
}
