//! Grouping of mean recovery latencies for the crash-recovery bar chart.

use crate::error::{AnalysisError, Result};
use crate::model::{RecoveryBar, RecoveryChart, RecoveryGroup, RecoveryMeasurement, NS_PER_S};

/// Reshape measurements into per-fault-count groups of seconds-denominated bars.
///
/// Groups keep the order in which their category first appears, bars keep
/// input order within a group. Bar `j` of group `g` sits at
/// `g * (widest_group + 1) + j`, leaving one empty slot between groups.
pub fn aggregate(measurements: &[RecoveryMeasurement]) -> Result<RecoveryChart> {
    let mut groups: Vec<RecoveryGroup> = Vec::new();
    for (i, m) in measurements.iter().enumerate() {
        if !m.latency_ns.is_finite() || m.latency_ns < 0.0 {
            return Err(AnalysisError::domain("recovery latency", i, m.latency_ns));
        }
        let bar = RecoveryBar {
            variant: m.variant.clone(),
            seconds: m.latency_ns / NS_PER_S,
            offset: 0.0,
        };
        match groups.iter_mut().find(|g| g.category == m.category) {
            Some(group) => group.bars.push(bar),
            None => groups.push(RecoveryGroup {
                category: m.category,
                bars: vec![bar],
            }),
        }
    }

    let stride = groups.iter().map(|g| g.bars.len()).max().unwrap_or(0) + 1;
    for (g, group) in groups.iter_mut().enumerate() {
        for (j, bar) in group.bars.iter_mut().enumerate() {
            bar.offset = (g * stride + j) as f64;
        }
    }

    Ok(RecoveryChart { groups })
}
