//! Text summary builder for CLI output.
//!
//! This module computes metrics and formats human-readable lines for text mode.

use crate::chart::{ChartBody, ChartEmitter, ChartSpec};
use crate::metrics;
use anyhow::Result;
use std::io::Write;

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

/// Summarise one chart: a header, then one line per series or per bar group.
pub fn build_text_summary(chart: &ChartSpec) -> TextSummary {
    let mut lines = vec![format!("== {} ==", chart.title)];

    match &chart.body {
        ChartBody::Lines { series } => {
            for s in series {
                match metrics::compute_point_metrics(&s.points) {
                    Some((mean, median, p25, p75)) => lines.push(format!(
                        "{}: {} points, {} avg {:.4} med {:.4} p25 {:.4} p75 {:.4}",
                        s.label,
                        s.points.len(),
                        chart.y_label,
                        mean,
                        median,
                        p25,
                        p75
                    )),
                    None => lines.push(format!(
                        "{}: {} points (too few for metrics)",
                        s.label,
                        s.points.len()
                    )),
                }
            }
        }
        ChartBody::Bars { chart: bars } => {
            for group in &bars.groups {
                let entries: Vec<String> = group
                    .bars
                    .iter()
                    .map(|b| format!("{} {:.3} s", b.variant, b.seconds))
                    .collect();
                let mean = group.mean_seconds().unwrap_or(f64::NAN);
                lines.push(format!(
                    "{}: {} (mean {:.3} s)",
                    group.category,
                    entries.join(", "),
                    mean
                ));
            }
        }
    }

    TextSummary { lines }
}

/// Prints a text summary of every chart to `out`.
pub struct TextEmitter<W: Write> {
    out: W,
}

impl<W: Write> TextEmitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChartEmitter for TextEmitter<W> {
    fn emit(&mut self, chart: &ChartSpec) -> Result<()> {
        for line in build_text_summary(chart).lines {
            writeln!(self.out, "{}", line)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
