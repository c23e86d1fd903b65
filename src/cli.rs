use anyhow::{Context, Result};
use clap::Parser;
use consensus_bench_plots::chart::{ChartEmitter, ChartSpec};
use consensus_bench_plots::dataset::Dataset;
use consensus_bench_plots::export::{JsonFileEmitter, JsonWriterEmitter};
use consensus_bench_plots::model::Protocol;
use consensus_bench_plots::pipeline::{build_charts, runs_from_log, ChartKind};
use consensus_bench_plots::text_summary::TextEmitter;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "consensus-bench-plots",
    version,
    about = "Charts throughput/latency and crash recovery of consensus benchmarks"
)]
pub struct Cli {
    /// JSON dataset; sections it omits use the built-in XPaxos measurements
    #[arg(long)]
    pub dataset: Option<PathBuf>,

    /// `go test -bench` output to chart instead of the dataset's fault-free sweeps (repeatable)
    #[arg(long = "bench-log")]
    pub bench_logs: Vec<PathBuf>,

    /// Protocol the benchmark logs were recorded with
    #[arg(long, value_enum, default_value_t = ProtocolArg::Xpaxos)]
    pub protocol: ProtocolArg,

    /// Smallest payload size of a sweep
    #[arg(long)]
    pub base_size: Option<u64>,

    /// Number of payload sizes in a sweep
    #[arg(long)]
    pub benchmark_count: Option<usize>,

    /// Which charts to produce
    #[arg(long, value_enum, default_value_t = ChartKind::All)]
    pub chart: ChartKind,

    /// Print a text summary and exit (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Print the chart descriptions as JSON and exit (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Also write each chart as JSON into this directory
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Save chart JSON under the local data directory
    #[arg(long)]
    pub auto_save: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProtocolArg {
    Xpaxos,
    Pbft,
    Raft,
}

impl From<ProtocolArg> for Protocol {
    fn from(p: ProtocolArg) -> Self {
        match p {
            ProtocolArg::Xpaxos => Protocol::XPaxos,
            ProtocolArg::Pbft => Protocol::Pbft,
            ProtocolArg::Raft => Protocol::Raft,
        }
    }
}

/// Resolve the dataset: file (or built-in), then CLI overrides, then benchmark logs.
pub fn build_dataset(args: &Cli) -> Result<Dataset> {
    let mut dataset = match args.dataset.as_deref() {
        Some(path) => Dataset::load(path)?,
        None => Dataset::builtin(),
    };
    if let Some(base) = args.base_size {
        dataset.bench.base_size = base;
    }
    if let Some(count) = args.benchmark_count {
        dataset.bench.benchmark_count = count;
    }

    if !args.bench_logs.is_empty() {
        let mut runs = Vec::new();
        for path in &args.bench_logs {
            let extracted = runs_from_log(path, args.protocol.into(), &dataset.bench)
                .with_context(|| format!("extract benchmark runs from {}", path.display()))?;
            runs.extend(extracted);
        }
        dataset.fault_free = runs;
    }
    Ok(dataset)
}

pub fn run(args: Cli) -> Result<()> {
    if args.text && args.json {
        return Err(anyhow::anyhow!("--text and --json are mutually exclusive"));
    }

    let dataset = build_dataset(&args)?;
    let charts = build_charts(&dataset, args.chart).context("chart generation failed")?;

    let mut sinks: Vec<Box<dyn ChartEmitter>> = Vec::new();
    if let Some(dir) = args.export_dir.as_deref() {
        sinks.push(Box::new(JsonFileEmitter::new(dir)?));
    }
    if args.auto_save {
        sinks.push(Box::new(JsonFileEmitter::auto_save()?));
    }
    sinks.push(primary_sink(&args)?);

    emit_all(&mut sinks, &charts)
}

fn emit_all(sink: &mut dyn ChartEmitter, charts: &[ChartSpec]) -> Result<()> {
    for chart in charts {
        sink.emit(chart)
            .with_context(|| format!("emit chart {:?}", chart.title))?;
    }
    sink.finish()?;
    info!(count = charts.len(), "done");
    Ok(())
}

fn primary_sink(args: &Cli) -> Result<Box<dyn ChartEmitter>> {
    if args.json {
        return Ok(Box::new(JsonWriterEmitter::new(std::io::stdout())));
    }
    if args.text {
        return Ok(Box::new(TextEmitter::new(std::io::stdout())));
    }
    #[cfg(feature = "tui")]
    {
        Ok(Box::new(consensus_bench_plots::tui::TerminalEmitter::new()?))
    }
    #[cfg(not(feature = "tui"))]
    {
        // Fallback when built without TUI support.
        Ok(Box::new(TextEmitter::new(std::io::stdout())))
    }
}
