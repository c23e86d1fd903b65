//! Wiring from a [`Dataset`] to finished chart descriptions.

use crate::align::align_recovery;
use crate::chart::{self, ChartSpec};
use crate::dataset::{Dataset, FaultFreeRun};
use crate::error::{AnalysisError, Result};
use crate::extract::{parse_benchmark_name, records_from_path, split_runs};
use crate::model::{series_from_nanos, BenchConfig, LatencySample, Protocol, ProtocolVariant};
use crate::recovery;
use crate::throughput::calc_throughput_and_latency;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    /// One throughput/latency chart per fault-free sweep
    FaultFree,
    /// All fault-free sweeps on one chart
    Comparison,
    /// Throughput over time across a crash and recovery
    Timeline,
    /// Mean recovery time bars
    Recovery,
    /// Every chart the dataset supports
    All,
}

impl ChartKind {
    fn includes(self, other: ChartKind) -> bool {
        self == ChartKind::All || self == other
    }
}

/// Build every chart `kind` selects from `dataset`.
pub fn build_charts(dataset: &Dataset, kind: ChartKind) -> Result<Vec<ChartSpec>> {
    let mut charts = Vec::new();

    if kind.includes(ChartKind::FaultFree) || kind.includes(ChartKind::Comparison) {
        let mut pairs = Vec::with_capacity(dataset.fault_free.len());
        for run in &dataset.fault_free {
            let pair = calc_throughput_and_latency(&series_from_nanos(&run.samples), &dataset.bench)?;
            pairs.push((run.variant.to_string(), pair));
        }
        if kind.includes(ChartKind::FaultFree) {
            charts.extend(
                pairs
                    .iter()
                    .map(|(label, pair)| chart::fault_free_chart(label, pair)),
            );
        }
        if kind.includes(ChartKind::Comparison) && !pairs.is_empty() {
            charts.push(chart::fault_free_comparison(&pairs));
        }
    }

    if kind.includes(ChartKind::Timeline) {
        match &dataset.recovery_timeline {
            Some(run) => {
                let timeline = align_recovery(
                    &series_from_nanos(&run.primary),
                    &series_from_nanos(&run.continuation),
                    run.payload_size,
                    dataset.bench.base_size,
                )?;
                charts.push(chart::recovery_timeline_chart(
                    &run.variant.to_string(),
                    &timeline,
                ));
            }
            None if kind == ChartKind::Timeline => {
                warn!("dataset has no recovery timeline; nothing to draw");
            }
            None => {}
        }
    }

    if kind.includes(ChartKind::Recovery) && !dataset.recovery.is_empty() {
        charts.push(chart::recovery_bar_chart(recovery::aggregate(
            &dataset.recovery,
        )?));
    }

    info!(count = charts.len(), ?kind, "built charts");
    Ok(charts)
}

/// Turn a `go test -bench` log into fault-free runs, one per `benchmark_count` lines.
///
/// Runs are labelled from the `Benchmark_<servers>[_<faults>]_<size>` name of
/// their first line when it follows that convention, otherwise by position.
/// The fault threshold comes from the cluster size under `protocol`'s quorum rule.
pub fn runs_from_log(path: &Path, protocol: Protocol, cfg: &BenchConfig) -> Result<Vec<FaultFreeRun>> {
    let records = records_from_path(path)?;
    let samples: Vec<LatencySample> = records.iter().map(|r| r.ns_per_op).collect();
    let runs = split_runs(&samples, cfg.benchmark_count)?;

    let mut out = Vec::with_capacity(runs.len());
    for (idx, run) in runs.into_iter().enumerate() {
        let first = &records[idx * cfg.benchmark_count];
        let variant = match parse_benchmark_name(&first.name) {
            Some(name) if name.servers > 0 => {
                let variant = ProtocolVariant::new(protocol, protocol.tolerated_faults(name.servers));
                if variant.replicas() != name.servers {
                    warn!(
                        servers = name.servers,
                        replicas = variant.replicas(),
                        "cluster size is not minimal for {variant}"
                    );
                }
                if let Some(faults) = name.faults.filter(|&f| f > 0) {
                    warn!(faults, "run {idx} was recorded with injected faults");
                }
                variant
            }
            _ => {
                debug!(name = %first.name, "unrecognised benchmark name, labelling by position");
                ProtocolVariant::new(protocol, idx as u32 + 1)
            }
        };
        out.push(FaultFreeRun {
            variant,
            samples: run.iter().map(|s| s.nanos()).collect(),
        });
    }
    if out.is_empty() {
        return Err(AnalysisError::shape("benchmark log", cfg.benchmark_count, 0));
    }
    Ok(out)
}
