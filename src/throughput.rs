//! Throughput/latency derivation under the doubling payload progression.

use crate::error::{AnalysisError, Result};
use crate::model::{BenchConfig, LatencySample, ThroughputLatencyPair};

/// Payload sizes of a benchmark sweep: `base, 2*base, 4*base, ...`, `count` entries.
///
/// Fails with a domain error at the first size that does not fit in a `u64`.
pub fn payload_sizes(base: u64, count: usize) -> Result<Vec<u64>> {
    let mut sizes = Vec::with_capacity(count);
    let mut size = base;
    for i in 0..count {
        if i > 0 {
            size = size
                .checked_mul(2)
                .ok_or_else(|| AnalysisError::domain("payload size", i, size as f64 * 2.0))?;
        }
        sizes.push(size);
    }
    Ok(sizes)
}

/// Payload sizes divided by the base, so the first factor is always 1.
pub fn normalized_payload_factors(base: u64, count: usize) -> Result<Vec<f64>> {
    Ok(payload_sizes(base, count)?
        .into_iter()
        .map(|size| size as f64 / base as f64)
        .collect())
}

/// Convert one nanosecond sample to milliseconds, rejecting zero.
pub(crate) fn latency_ms(index: usize, sample: LatencySample, what: &'static str) -> Result<f64> {
    if sample.nanos() == 0 {
        return Err(AnalysisError::domain(what, index, 0.0));
    }
    Ok(sample.as_millis_f64())
}

/// Derive throughput (MB/s) and latency (ms) for one benchmark sweep.
///
/// `samples[i]` must be the latency measured at payload `base_size * 2^i`;
/// there must be exactly `benchmark_count` of them.
pub fn calc_throughput_and_latency(
    samples: &[LatencySample],
    cfg: &BenchConfig,
) -> Result<ThroughputLatencyPair> {
    if samples.len() != cfg.benchmark_count {
        return Err(AnalysisError::shape(
            "latency series",
            cfg.benchmark_count,
            samples.len(),
        ));
    }
    if cfg.base_size == 0 {
        return Err(AnalysisError::domain("base payload size", 0, 0.0));
    }

    let factors = normalized_payload_factors(cfg.base_size, cfg.benchmark_count)?;
    let mut throughput_mbps = Vec::with_capacity(samples.len());
    let mut latencies = Vec::with_capacity(samples.len());
    for (i, (&sample, factor)) in samples.iter().zip(factors).enumerate() {
        let ms = latency_ms(i, sample, "latency series")?;
        throughput_mbps.push(factor / ms);
        latencies.push(ms);
    }

    Ok(ThroughputLatencyPair {
        throughput_mbps,
        latency_ms: latencies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::series_from_nanos;
    use proptest::prelude::*;

    const XPAXOS_T1: [u64; 14] = [
        1370523, 1403328, 1414017, 1458120, 1548804, 1718874, 2079989, 2764268, 4238630, 7200030,
        13070145, 23446588, 45938973, 96908592,
    ];

    #[test]
    fn payload_sizes_double_from_base() {
        assert_eq!(payload_sizes(1024, 4).unwrap(), vec![1024, 2048, 4096, 8192]);
        assert_eq!(payload_sizes(1024, 1).unwrap(), vec![1024]);
        assert!(payload_sizes(1024, 0).unwrap().is_empty());
    }

    #[test]
    fn normalized_factors_start_at_one() {
        let factors = normalized_payload_factors(1024, 14).unwrap();
        assert_eq!(factors[0], 1.0);
        assert_eq!(factors[13], 8192.0);
    }

    #[test]
    fn xpaxos_reference_sweep() {
        let pair =
            calc_throughput_and_latency(&series_from_nanos(&XPAXOS_T1), &BenchConfig::default())
                .unwrap();
        assert_eq!(pair.latency_ms.len(), 14);
        assert_eq!(pair.latency_ms[0], 1.370523);
        assert!((pair.throughput_mbps[0] - 0.7297).abs() < 1e-4);
        assert_eq!(pair.throughput_mbps[0], 1.0 / 1.370523);
        assert_eq!(pair.throughput_mbps[13], 8192.0 / (96908592.0 / 1e6));
    }

    #[test]
    fn length_mismatch_is_shape_error() {
        let err = calc_throughput_and_latency(
            &series_from_nanos(&XPAXOS_T1[..13]),
            &BenchConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Shape {
                expected: 14,
                actual: 13,
                ..
            }
        ));
    }

    #[test]
    fn zero_latency_is_domain_error() {
        let mut ns = XPAXOS_T1;
        ns[4] = 0;
        let err = calc_throughput_and_latency(&series_from_nanos(&ns), &BenchConfig::default())
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Domain { index: 4, .. }));
    }

    #[test]
    fn oversized_sweep_is_domain_error() {
        // 1024 * 2^53 is the last size that fits in a u64.
        assert_eq!(payload_sizes(1024, 54).unwrap()[53], 1 << 63);
        let err = payload_sizes(1024, 55).unwrap_err();
        assert!(matches!(err, AnalysisError::Domain { index: 54, .. }));

        let cfg = BenchConfig {
            base_size: 1024,
            benchmark_count: 60,
        };
        let err = calc_throughput_and_latency(&series_from_nanos(&[1_000_000; 60]), &cfg)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Domain { index: 54, .. }));
    }

    #[test]
    fn custom_base_and_count() {
        let cfg = BenchConfig {
            base_size: 4096,
            benchmark_count: 3,
        };
        let pair = calc_throughput_and_latency(&series_from_nanos(&[1_000_000; 3]), &cfg).unwrap();
        assert_eq!(pair.throughput_mbps, vec![1.0, 2.0, 4.0]);
        assert_eq!(pair.latency_ms, vec![1.0, 1.0, 1.0]);
    }

    proptest! {
        #[test]
        fn constant_series_scales_with_payload(v in 1u64..10_000_000_000, n in 1usize..20) {
            let cfg = BenchConfig { base_size: 1024, benchmark_count: n };
            let samples = series_from_nanos(&vec![v; n]);
            let pair = calc_throughput_and_latency(&samples, &cfg).unwrap();
            for (i, t) in pair.throughput_mbps.iter().enumerate() {
                let expected = 2f64.powi(i as i32) / (v as f64 / 1e6);
                prop_assert!((t - expected).abs() <= expected * 1e-12);
            }
        }

        #[test]
        fn calculation_is_deterministic(ns in proptest::collection::vec(1u64..u32::MAX as u64, 14)) {
            let samples = series_from_nanos(&ns);
            let cfg = BenchConfig::default();
            let a = calc_throughput_and_latency(&samples, &cfg).unwrap();
            let b = calc_throughput_and_latency(&samples, &cfg).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
