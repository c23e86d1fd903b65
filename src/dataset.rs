//! Benchmark inputs: the measured XPaxos numbers and an optional JSON
//! override file.

use crate::model::{BenchConfig, FaultCategory, Protocol, ProtocolVariant, RecoveryMeasurement};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One fault-free payload sweep (nanoseconds per op, smallest payload first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultFreeRun {
    pub variant: ProtocolVariant,
    pub samples: Vec<u64>,
}

/// A crash run plus the run that observed the recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryRun {
    pub variant: ProtocolVariant,
    pub primary: Vec<u64>,
    pub continuation: Vec<u64>,
    #[serde(default = "default_payload_size")]
    pub payload_size: u64,
}

fn default_payload_size() -> u64 {
    BenchConfig::default().base_size
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub bench: BenchConfig,
    pub fault_free: Vec<FaultFreeRun>,
    pub recovery_timeline: Option<RecoveryRun>,
    pub recovery: Vec<RecoveryMeasurement>,
}

impl Dataset {
    /// Measurements taken on the XPaxos implementation with 1 kB..8 MB payloads.
    pub fn builtin() -> Self {
        let xpaxos = |t| ProtocolVariant::new(Protocol::XPaxos, t);
        Self {
            bench: BenchConfig::default(),
            fault_free: vec![
                FaultFreeRun {
                    variant: xpaxos(1),
                    samples: vec![
                        1370523, 1403328, 1414017, 1458120, 1548804, 1718874, 2079989, 2764268,
                        4238630, 7200030, 13070145, 23446588, 45938973, 96908592,
                    ],
                },
                FaultFreeRun {
                    variant: xpaxos(2),
                    samples: vec![
                        1880869, 1925783, 1954873, 2007609, 2147153, 2336045, 2810776, 3925262,
                        6001965, 10236870, 18271642, 35378452, 69094325, 124575934,
                    ],
                },
                FaultFreeRun {
                    variant: xpaxos(5),
                    samples: vec![
                        10001447, 10013064, 10552734, 10844408, 11691880, 11553041, 10873228,
                        13479840, 18486121, 27493842, 37603711, 65881652, 120539304, 247515066,
                    ],
                },
            ],
            recovery_timeline: None,
            recovery: vec![
                RecoveryMeasurement {
                    variant: xpaxos(1),
                    category: FaultCategory(1),
                    latency_ns: 216791615.53,
                },
                RecoveryMeasurement {
                    variant: xpaxos(2),
                    category: FaultCategory(1),
                    latency_ns: 224369102.625,
                },
                RecoveryMeasurement {
                    variant: xpaxos(5),
                    category: FaultCategory(1),
                    latency_ns: 145684775.285,
                },
            ],
        }
    }

    /// Load a dataset file. Sections it leaves out are taken from [`Dataset::builtin`].
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read dataset {}", path.display()))?;
        let parsed: Dataset = serde_json::from_str(&raw)
            .with_context(|| format!("parse dataset {}", path.display()))?;
        Ok(parsed.with_fallback(Self::builtin()))
    }

    /// Fill empty sections from `fallback`. `bench` always comes from `self`.
    pub fn with_fallback(mut self, fallback: Dataset) -> Self {
        if self.fault_free.is_empty() {
            self.fault_free = fallback.fault_free;
        }
        if self.recovery_timeline.is_none() {
            self.recovery_timeline = fallback.recovery_timeline;
        }
        if self.recovery.is_empty() {
            self.recovery = fallback.recovery;
        }
        self
    }
}
