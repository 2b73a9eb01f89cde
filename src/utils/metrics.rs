//! Statistical helpers shared by the regime engine and the liquidity
//! estimator.
//!
//! Functions operate on slices of `f64` and return `None` when the input
//! does not contain enough data to produce a result. Dispersion uses the
//! population convention (divide by `n`), which the regime statistics
//! depend on for numeric parity.

/// Arithmetic mean. Returns `None` for an empty slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    match data.len() {
        0 => None,
        n => Some(data.iter().sum::<f64>() / n as f64),
    }
}

/// Population variance: mean of squared deviations from the mean.
/// Exactly `0.0` for a single observation, `None` when empty.
pub fn population_variance(data: &[f64]) -> Option<f64> {
    match data.len() {
        0 => None,
        1 => Some(0.0),
        n => {
            let m = mean(data)?;
            let sum_sq: f64 = data.iter().map(|&v| (v - m) * (v - m)).sum();
            Some(sum_sq / n as f64)
        }
    }
}

/// Population standard deviation. Exactly `0.0` for a single observation.
pub fn population_std_dev(data: &[f64]) -> Option<f64> {
    population_variance(data).map(|v| v.sqrt())
}

/// Recursive exponential moving average seeded with the first observation,
/// `s_t = alpha * x_t + (1 - alpha) * s_{t-1}`. No bias correction is applied.
///
/// An `alpha` outside `(0, 1]` (or NaN) degrades to `1.0`, i.e. the raw series.
pub fn ema(data: &[f64], alpha: f64) -> Vec<f64> {
    let alpha = if alpha > 0.0 && alpha <= 1.0 { alpha } else { 1.0 };
    let mut state: Option<f64> = None;
    data.iter()
        .map(|&x| {
            let next = state.map_or(x, |s| alpha * x + (1.0 - alpha) * s);
            state = Some(next);
            next
        })
        .collect()
}

/// EMA from a span `n` (alpha = 2/(n+1)). A span of zero is treated as one,
/// so the output always has the same length as the input.
pub fn ema_from_span(data: &[f64], span: usize) -> Vec<f64> {
    let span = span.max(1) as f64;
    ema(data, 2.0 / (span + 1.0))
}
