//! Chart descriptions and the sink that draws them.
//!
//! The analysis code never touches a drawing surface. It builds a
//! [`ChartSpec`] and hands it to whatever [`ChartEmitter`] the caller chose
//! (terminal renderer, JSON export, ...).

use crate::model::{AlignedTimeline, RecoveryChart, ThroughputLatencyPair};
use anyhow::Result;
use serde::{Deserialize, Serialize};

pub const THROUGHPUT_LABEL: &str = "Throughput (MB/s)";
pub const LATENCY_LABEL: &str = "Latency (ms)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesColor {
    Red,
    Green,
    Blue,
    Cyan,
    Magenta,
    Yellow,
}

/// Colors assigned to series in order of appearance.
pub const PALETTE: [SeriesColor; 6] = [
    SeriesColor::Red,
    SeriesColor::Green,
    SeriesColor::Blue,
    SeriesColor::Cyan,
    SeriesColor::Magenta,
    SeriesColor::Yellow,
];

pub fn palette_color(idx: usize) -> SeriesColor {
    PALETTE[idx % PALETTE.len()]
}

/// One labelled (x, y) series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub label: String,
    pub color: SeriesColor,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartBody {
    Lines { series: Vec<LineSeries> },
    Bars { chart: RecoveryChart },
}

/// Everything a sink needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub body: ChartBody,
}

impl ChartSpec {
    pub fn series(&self) -> &[LineSeries] {
        match &self.body {
            ChartBody::Lines { series } => series,
            ChartBody::Bars { .. } => &[],
        }
    }
}

/// Rendering sink. Implementations own all display state.
pub trait ChartEmitter {
    fn emit(&mut self, chart: &ChartSpec) -> Result<()>;

    /// Called once after the last chart of a run.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Fan a chart out to several sinks in order.
impl<E: ChartEmitter + ?Sized> ChartEmitter for Vec<Box<E>> {
    fn emit(&mut self, chart: &ChartSpec) -> Result<()> {
        for emitter in self.iter_mut() {
            emitter.emit(chart)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        for emitter in self.iter_mut() {
            emitter.finish()?;
        }
        Ok(())
    }
}

/// Throughput vs. latency of a single fault-free sweep.
pub fn fault_free_chart(label: &str, pair: &ThroughputLatencyPair) -> ChartSpec {
    ChartSpec {
        title: "Throughput vs. Latency (Fault-Free)".into(),
        x_label: THROUGHPUT_LABEL.into(),
        y_label: LATENCY_LABEL.into(),
        body: ChartBody::Lines {
            series: vec![LineSeries {
                label: label.to_string(),
                color: SeriesColor::Blue,
                points: pair.points(),
            }],
        },
    }
}

/// Several fault-free sweeps on shared axes.
pub fn fault_free_comparison(runs: &[(String, ThroughputLatencyPair)]) -> ChartSpec {
    let series = runs
        .iter()
        .enumerate()
        .map(|(idx, (label, pair))| LineSeries {
            label: label.clone(),
            color: palette_color(idx),
            points: pair.points(),
        })
        .collect();
    ChartSpec {
        title: "Throughput vs. Latency (Fault-Free)".into(),
        x_label: THROUGHPUT_LABEL.into(),
        y_label: LATENCY_LABEL.into(),
        body: ChartBody::Lines { series },
    }
}

/// Throughput over elapsed time across a crash and its recovery.
pub fn recovery_timeline_chart(label: &str, timeline: &AlignedTimeline) -> ChartSpec {
    ChartSpec {
        title: "Throughput vs. Time (Crash Recovery)".into(),
        x_label: "Time (s)".into(),
        y_label: THROUGHPUT_LABEL.into(),
        body: ChartBody::Lines {
            series: vec![LineSeries {
                label: label.to_string(),
                color: SeriesColor::Blue,
                points: timeline.points(),
            }],
        },
    }
}

/// Mean recovery time per variant, grouped by number of crashed replicas.
pub fn recovery_bar_chart(chart: RecoveryChart) -> ChartSpec {
    ChartSpec {
        title: "Mean Recovery Time".into(),
        x_label: "Number of Crash Failures".into(),
        y_label: "Recovery Time (s)".into(),
        body: ChartBody::Bars { chart },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> ThroughputLatencyPair {
        ThroughputLatencyPair {
            throughput_mbps: vec![1.0, 2.0],
            latency_ms: vec![1.0, 1.0],
        }
    }

    #[derive(Default)]
    struct Recorder {
        titles: Vec<String>,
        finished: bool,
    }

    impl ChartEmitter for Recorder {
        fn emit(&mut self, chart: &ChartSpec) -> Result<()> {
            self.titles.push(chart.title.clone());
            Ok(())
        }

        fn finish(&mut self) -> Result<()> {
            self.finished = true;
            Ok(())
        }
    }

    #[test]
    fn fault_free_plots_throughput_against_latency() {
        let chart = fault_free_chart("XPaxos (t=1)", &pair());
        assert_eq!(chart.x_label, THROUGHPUT_LABEL);
        assert_eq!(chart.series()[0].points, vec![(1.0, 1.0), (2.0, 1.0)]);
    }

    #[test]
    fn comparison_assigns_palette_in_order() {
        let runs = vec![
            ("a".to_string(), pair()),
            ("b".to_string(), pair()),
            ("c".to_string(), pair()),
        ];
        let chart = fault_free_comparison(&runs);
        let colors: Vec<SeriesColor> = chart.series().iter().map(|s| s.color).collect();
        assert_eq!(
            colors,
            vec![SeriesColor::Red, SeriesColor::Green, SeriesColor::Blue]
        );
        assert_eq!(palette_color(6), SeriesColor::Red);
    }

    #[test]
    fn bar_chart_has_no_line_series() {
        let chart = recovery_bar_chart(RecoveryChart::default());
        assert!(chart.series().is_empty());
    }

    #[test]
    fn json_body_is_tagged() {
        let json = serde_json::to_value(recovery_bar_chart(RecoveryChart::default())).unwrap();
        assert_eq!(json["body"]["kind"], "bars");
    }

    #[test]
    fn boxed_emitters_fan_out() {
        let mut sinks: Vec<Box<Recorder>> = vec![Box::default(), Box::default()];
        sinks.emit(&fault_free_chart("x", &pair())).unwrap();
        sinks.finish().unwrap();
        assert!(sinks.iter().all(|r| r.titles.len() == 1 && r.finished));
    }
}
