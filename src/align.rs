//! Crash-recovery timeline construction.
//!
//! A recovery benchmark produces two runs: the primary run, during which a
//! replica is crashed halfway through, and a continuation whose first
//! operation is the one that waited on the view change. The timeline puts
//! that operation back where the crash happened and lays every operation
//! out on a cumulative time axis.

use crate::error::{AnalysisError, Result};
use crate::model::{AlignedTimeline, LatencySample, MS_PER_S};
use crate::throughput::latency_ms;
use tracing::debug;

/// Index at which the recovery sample is inserted into a run of `len` samples.
pub fn splice_point(len: usize) -> usize {
    len / 2
}

/// `primary[..L/2] + continuation[0] + primary[L/2..]`.
pub fn splice(primary: &[LatencySample], continuation: &[LatencySample]) -> Result<Vec<LatencySample>> {
    let recovery = *continuation
        .first()
        .ok_or_else(|| AnalysisError::shape("recovery continuation", 1, 0))?;
    let mid = splice_point(primary.len());
    let mut spliced = Vec::with_capacity(primary.len() + 1);
    spliced.extend_from_slice(&primary[..mid]);
    spliced.push(recovery);
    spliced.extend_from_slice(&primary[mid..]);
    Ok(spliced)
}

/// Copy the throughput of the recovery sample onto the point right before it.
///
/// The operation preceding the crash shows an artificial spike in the raw
/// data; the chart deliberately flattens it to the recovery value. This is
/// an exact overwrite and must stay one.
pub fn apply_readability_correction(throughput: &mut [f64], splice_index: usize) {
    if splice_index == 0 || splice_index >= throughput.len() {
        return;
    }
    throughput[splice_index - 1] = throughput[splice_index];
}

/// Running sum of prior latencies, in seconds. The first point is at 0.
pub fn cumulative_elapsed_seconds(latency_ms: &[f64]) -> Vec<f64> {
    let mut elapsed = Vec::with_capacity(latency_ms.len());
    let mut total = 0.0;
    for ms in latency_ms {
        elapsed.push(total);
        total += ms / MS_PER_S;
    }
    elapsed
}

/// Build the throughput-vs-time view of a crash-recovery run.
pub fn align_recovery(
    primary: &[LatencySample],
    continuation: &[LatencySample],
    payload_size: u64,
    base_unit: u64,
) -> Result<AlignedTimeline> {
    if base_unit == 0 {
        return Err(AnalysisError::domain("base unit", 0, 0.0));
    }
    let spliced = splice(primary, continuation)?;
    let splice_index = splice_point(primary.len());
    let factor = payload_size as f64 / base_unit as f64;

    let mut latencies = Vec::with_capacity(spliced.len());
    let mut throughput = Vec::with_capacity(spliced.len());
    for (i, &sample) in spliced.iter().enumerate() {
        let ms = latency_ms(i, sample, "recovery timeline")?;
        latencies.push(ms);
        throughput.push(factor / ms);
    }
    apply_readability_correction(&mut throughput, splice_index);
    let elapsed_s = cumulative_elapsed_seconds(&latencies);

    debug!(
        points = spliced.len(),
        splice_index, "aligned crash-recovery timeline"
    );
    Ok(AlignedTimeline {
        elapsed_s,
        latency_ms: latencies,
        throughput_mbps: throughput,
        splice_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::series_from_nanos;
    use proptest::prelude::*;

    #[test]
    fn splice_inserts_recovery_at_midpoint() {
        let primary = series_from_nanos(&[1, 2, 3, 4]);
        let continuation = series_from_nanos(&[99, 100]);
        let out = splice(&primary, &continuation).unwrap();
        assert_eq!(out, series_from_nanos(&[1, 2, 99, 3, 4]));
    }

    #[test]
    fn odd_length_uses_floor_midpoint() {
        assert_eq!(splice_point(5), 2);
        let out = splice(&series_from_nanos(&[1, 2, 3, 4, 5]), &series_from_nanos(&[9])).unwrap();
        assert_eq!(out, series_from_nanos(&[1, 2, 9, 3, 4, 5]));
    }

    #[test]
    fn empty_continuation_is_shape_error() {
        let err = splice(&series_from_nanos(&[1, 2]), &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::Shape { expected: 1, actual: 0, .. }));
    }

    #[test]
    fn empty_primary_yields_recovery_only() {
        let tl = align_recovery(&[], &series_from_nanos(&[2_000_000]), 1024, 1024).unwrap();
        assert_eq!(tl.len(), 1);
        assert_eq!(tl.splice_index, 0);
        assert_eq!(tl.throughput_mbps, vec![0.5]);
        assert_eq!(tl.elapsed_s, vec![0.0]);
    }

    #[test]
    fn readability_correction_overwrites_preceding_point() {
        // Primary: four 1 ms ops, recovery op took 250 ms.
        let primary = series_from_nanos(&[1_000_000; 4]);
        let continuation = series_from_nanos(&[250_000_000]);
        let tl = align_recovery(&primary, &continuation, 1024, 1024).unwrap();
        assert_eq!(tl.splice_index, 2);
        assert_eq!(tl.throughput_mbps, vec![1.0, 0.004, 0.004, 1.0, 1.0]);
        // Latencies themselves are left untouched.
        assert_eq!(tl.latency_ms, vec![1.0, 1.0, 250.0, 1.0, 1.0]);
    }

    #[test]
    fn elapsed_time_accumulates_prior_latency_in_seconds() {
        let primary = series_from_nanos(&[1_000_000, 3_000_000]);
        let continuation = series_from_nanos(&[500_000_000]);
        let tl = align_recovery(&primary, &continuation, 2048, 1024).unwrap();
        assert_eq!(tl.latency_ms, vec![1.0, 500.0, 3.0]);
        assert_eq!(tl.elapsed_s[0], 0.0);
        assert_eq!(tl.elapsed_s[1], 0.001);
        assert!((tl.elapsed_s[2] - 0.501).abs() < 1e-12);
        assert_eq!(tl.throughput_mbps[2], 2.0 / 3.0);
    }

    #[test]
    fn zero_latency_is_domain_error() {
        let err = align_recovery(
            &series_from_nanos(&[1, 0, 3]),
            &series_from_nanos(&[5]),
            1024,
            1024,
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::Domain { index: 2, .. }));
    }

    proptest! {
        #[test]
        fn output_is_one_longer_than_primary(
            primary in proptest::collection::vec(1u64..1_000_000_000, 0..64),
            continuation in proptest::collection::vec(1u64..1_000_000_000, 1..8),
        ) {
            let tl = align_recovery(
                &series_from_nanos(&primary),
                &series_from_nanos(&continuation),
                1024,
                1024,
            ).unwrap();
            prop_assert_eq!(tl.len(), primary.len() + 1);
            prop_assert_eq!(tl.throughput_mbps.len(), primary.len() + 1);
            let mid = primary.len() / 2;
            if mid > 0 {
                prop_assert_eq!(tl.throughput_mbps[mid - 1], tl.throughput_mbps[mid]);
            }
            prop_assert!(tl.elapsed_s.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
