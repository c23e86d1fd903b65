/// Compute (mean, median, 25th percentile, 75th percentile) of a series.
/// Returns `None` for fewer than two values.
pub fn compute_metrics(values: &[f64]) -> Option<(f64, f64, f64, f64)> {
    if values.len() < 2 {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    let mean = values.iter().sum::<f64>() / n as f64;
    let median = sorted[n / 2];
    let p25 = sorted[n / 4];
    let p75 = sorted[3 * n / 4];
    Some((mean, median, p25, p75))
}

/// Metrics over the y-values of (x, y) chart points.
pub fn compute_point_metrics(points: &[(f64, f64)]) -> Option<(f64, f64, f64, f64)> {
    let values: Vec<f64> = points.iter().map(|(_, y)| *y).collect();
    compute_metrics(&values)
}

/// Upper bound for a chart axis: the largest value plus 10% headroom.
pub fn axis_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.10
    } else {
        1.0
    }
}
