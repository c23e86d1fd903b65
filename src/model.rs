use serde::{Deserialize, Serialize};
use std::fmt;

/// Nanoseconds per millisecond.
pub const NS_PER_MS: f64 = 1e6;
/// Milliseconds per second.
pub const MS_PER_S: f64 = 1e3;
/// Nanoseconds per second.
pub const NS_PER_S: f64 = 1e9;

/// Elapsed time of one benchmark operation, in nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LatencySample(pub u64);

impl LatencySample {
    pub fn nanos(self) -> u64 {
        self.0
    }

    pub fn as_millis_f64(self) -> f64 {
        self.0 as f64 / NS_PER_MS
    }
}

impl From<u64> for LatencySample {
    fn from(ns: u64) -> Self {
        Self(ns)
    }
}

/// Latency samples in benchmark order; index i was measured with payload `base * 2^i`.
pub type LatencySeries = Vec<LatencySample>;

/// Convert a slice of raw nanosecond values into a series.
pub fn series_from_nanos(ns: &[u64]) -> LatencySeries {
    ns.iter().copied().map(LatencySample).collect()
}

/// Payload progression parameters shared by every benchmark run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub base_size: u64,
    pub benchmark_count: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            base_size: 1024,
            benchmark_count: 14,
        }
    }
}

/// Throughput (MB/s) and latency (ms) derived from one latency series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputLatencyPair {
    pub throughput_mbps: Vec<f64>,
    pub latency_ms: Vec<f64>,
}

impl ThroughputLatencyPair {
    /// Points for a throughput-vs-latency plot (x = throughput, y = latency).
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.throughput_mbps
            .iter()
            .copied()
            .zip(self.latency_ms.iter().copied())
            .collect()
    }
}

/// A crash run and its recovery sample stitched into one timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedTimeline {
    /// Seconds elapsed before each operation started.
    pub elapsed_s: Vec<f64>,
    pub latency_ms: Vec<f64>,
    pub throughput_mbps: Vec<f64>,
    /// Position of the inserted recovery sample.
    pub splice_index: usize,
}

impl AlignedTimeline {
    pub fn len(&self) -> usize {
        self.elapsed_s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elapsed_s.is_empty()
    }

    /// Points for a throughput-vs-time plot (x = elapsed seconds, y = throughput).
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.elapsed_s
            .iter()
            .copied()
            .zip(self.throughput_mbps.iter().copied())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    XPaxos,
    Pbft,
    Raft,
}

impl Protocol {
    pub fn display_name(self) -> &'static str {
        match self {
            Protocol::XPaxos => "XPaxos",
            Protocol::Pbft => "PBFT",
            Protocol::Raft => "Raft",
        }
    }

    /// Smallest cluster that tolerates `t` faults: 3t + 1 for PBFT, 2t + 1 otherwise.
    pub fn replicas_for(self, t: u32) -> u32 {
        match self {
            Protocol::Pbft => 3 * t + 1,
            Protocol::XPaxos | Protocol::Raft => 2 * t + 1,
        }
    }

    /// Largest fault threshold a cluster of `servers` replicas supports.
    pub fn tolerated_faults(self, servers: u32) -> u32 {
        let spare = servers.saturating_sub(1);
        match self {
            Protocol::Pbft => spare / 3,
            Protocol::XPaxos | Protocol::Raft => spare / 2,
        }
    }
}

/// One protocol configuration, e.g. "XPaxos (t=2)".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProtocolVariant {
    pub protocol: Protocol,
    /// Number of tolerated faults.
    pub t: u32,
}

impl ProtocolVariant {
    pub fn new(protocol: Protocol, t: u32) -> Self {
        Self { protocol, t }
    }

    pub fn replicas(&self) -> u32 {
        self.protocol.replicas_for(self.t)
    }
}

impl fmt::Display for ProtocolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (t={})", self.protocol.display_name(), self.t)
    }
}

/// Number of crashed replicas a recovery measurement was taken under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaultCategory(pub u32);

impl fmt::Display for FaultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 1 {
            write!(f, "1 Crash Failure")
        } else {
            write!(f, "{} Crash Failures", self.0)
        }
    }
}

/// Mean recovery latency (ns) of one variant under one fault count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryMeasurement {
    pub variant: ProtocolVariant,
    pub category: FaultCategory,
    pub latency_ns: f64,
}

/// One bar of the recovery chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryBar {
    pub variant: ProtocolVariant,
    pub seconds: f64,
    /// Horizontal slot; bars of one group are adjacent, groups are separated by one slot.
    pub offset: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryGroup {
    pub category: FaultCategory,
    pub bars: Vec<RecoveryBar>,
}

impl RecoveryGroup {
    /// Mean recovery time across the variants of this group.
    pub fn mean_seconds(&self) -> Option<f64> {
        if self.bars.is_empty() {
            return None;
        }
        Some(self.bars.iter().map(|b| b.seconds).sum::<f64>() / self.bars.len() as f64)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoveryChart {
    pub groups: Vec<RecoveryGroup>,
}

impl RecoveryChart {
    pub fn bars(&self) -> impl Iterator<Item = (&FaultCategory, &RecoveryBar)> {
        self.groups
            .iter()
            .flat_map(|g| g.bars.iter().map(move |b| (&g.category, b)))
    }

    pub fn max_seconds(&self) -> f64 {
        self.bars().map(|(_, b)| b.seconds).fold(0.0_f64, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bench_config_matches_benchmark_suite() {
        let cfg = BenchConfig::default();
        assert_eq!(cfg.base_size, 1024);
        assert_eq!(cfg.benchmark_count, 14);
    }

    #[test]
    fn bench_config_fills_missing_fields() {
        let cfg: BenchConfig = serde_json::from_str(r#"{"benchmark_count": 4}"#).unwrap();
        assert_eq!(cfg.base_size, 1024);
        assert_eq!(cfg.benchmark_count, 4);
    }

    #[test]
    fn fault_category_labels() {
        assert_eq!(FaultCategory(1).to_string(), "1 Crash Failure");
        assert_eq!(FaultCategory(3).to_string(), "3 Crash Failures");
    }

    #[test]
    fn variant_label_and_replicas() {
        let v = ProtocolVariant::new(Protocol::XPaxos, 5);
        assert_eq!(v.to_string(), "XPaxos (t=5)");
        assert_eq!(v.replicas(), 11);
        assert_eq!(ProtocolVariant::new(Protocol::Pbft, 5).replicas(), 16);
        assert_eq!(ProtocolVariant::new(Protocol::Raft, 2).replicas(), 5);
    }

    #[test]
    fn fault_threshold_follows_protocol() {
        assert_eq!(Protocol::XPaxos.tolerated_faults(3), 1);
        assert_eq!(Protocol::XPaxos.tolerated_faults(11), 5);
        assert_eq!(Protocol::Pbft.tolerated_faults(4), 1);
        assert_eq!(Protocol::Pbft.tolerated_faults(7), 2);
        assert_eq!(Protocol::Pbft.tolerated_faults(16), 5);
        assert_eq!(Protocol::Raft.tolerated_faults(0), 0);
    }

    #[test]
    fn sample_millis() {
        assert_eq!(LatencySample(1_370_523).as_millis_f64(), 1.370523);
    }

    #[test]
    fn group_mean() {
        let group = RecoveryGroup {
            category: FaultCategory(1),
            bars: vec![
                RecoveryBar {
                    variant: ProtocolVariant::new(Protocol::XPaxos, 1),
                    seconds: 1.0,
                    offset: 0.0,
                },
                RecoveryBar {
                    variant: ProtocolVariant::new(Protocol::XPaxos, 2),
                    seconds: 3.0,
                    offset: 2.0,
                },
            ],
        };
        assert_eq!(group.mean_seconds(), Some(2.0));
    }
}
