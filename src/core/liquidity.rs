//! Smoothed Amihud illiquidity estimator.
//!
//! For every bar the absolute fractional price change is divided by the
//! traded volume, giving a price-impact-per-volume ratio. The raw series
//! is smoothed with a recursive EWMA and then forced strictly positive so
//! downstream bucketing can take ratios and logs of it safely.

use crate::core::math::abs_pct_change;
use crate::core::types::Bar;
use crate::utils::metrics::ema_from_span;

/// Default EWMA span.
pub const DEFAULT_SPAN: usize = 20;

/// Value used for every bar when the smoothed series has no positive entry.
pub const ILLIQUIDITY_FLOOR: f64 = 1e-8;

/// Estimator configured with an EWMA span.
#[derive(Debug, Clone, Copy)]
pub struct AmihudEstimator {
    pub span: usize,
}

impl Default for AmihudEstimator {
    fn default() -> Self {
        Self { span: DEFAULT_SPAN }
    }
}

impl AmihudEstimator {
    pub fn new(span: usize) -> Self {
        Self { span }
    }

    /// One strictly positive illiquidity value per bar, in input order.
    pub fn estimate(&self, bars: &[Bar]) -> Vec<f64> {
        amihud_illiquidity(bars, self.span)
    }
}

/// Unsmoothed impact-per-volume ratios.
///
/// The first bar has zero change. A bar without positive volume reuses the
/// last positive volume seen; before any such volume exists the ratio is
/// zero. Non-finite ratios become zero.
pub fn raw_impact_ratios(bars: &[Bar]) -> Vec<f64> {
    let mut out = Vec::with_capacity(bars.len());
    let mut last_volume: Option<f64> = None;
    let mut prev_close: Option<f64> = None;

    for bar in bars {
        let change = match prev_close {
            Some(prev) => abs_pct_change(prev, bar.close),
            None => 0.0,
        };
        prev_close = Some(bar.close);

        if bar.volume > 0.0 && bar.volume.is_finite() {
            last_volume = Some(bar.volume);
        }
        let ratio = match last_volume {
            Some(v) => change / v,
            None => 0.0,
        };
        out.push(if ratio.is_finite() { ratio } else { 0.0 });
    }
    out
}

/// Smoothed illiquidity series. Never fails: degenerate input (no volume at
/// all, flat prices) yields the floor value rather than an error.
pub fn amihud_illiquidity(bars: &[Bar], span: usize) -> Vec<f64> {
    let raw = raw_impact_ratios(bars);
    let mut smoothed = ema_from_span(&raw, span);

    let min_positive = smoothed
        .iter()
        .copied()
        .filter(|v| *v > 0.0 && v.is_finite())
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))));

    let fill = min_positive.unwrap_or(ILLIQUIDITY_FLOOR);
    for v in smoothed.iter_mut() {
        if !(*v > 0.0 && v.is_finite()) {
            *v = fill;
        }
    }
    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars(points: &[(f64, f64)]) -> Vec<Bar> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(close, volume))| Bar::new(i as u64 * 60_000, close, volume))
            .collect()
    }

    #[test]
    fn test_raw_ratios() {
        let b = bars(&[(100.0, 1000.0), (110.0, 1000.0), (99.0, 500.0)]);
        let raw = raw_impact_ratios(&b);
        assert_eq!(raw[0], 0.0);
        assert!((raw[1] - 0.1 / 1000.0).abs() < 1e-15);
        assert!((raw[2] - 0.1 / 500.0).abs() < 1e-15);
    }

    #[test]
    fn test_zero_volume_carries_forward() {
        let b = bars(&[(100.0, 2000.0), (110.0, 0.0)]);
        let raw = raw_impact_ratios(&b);
        assert!((raw[1] - 0.1 / 2000.0).abs() < 1e-15);
    }

    #[test]
    fn test_zero_volume_before_any_volume_is_zero_ratio() {
        let b = bars(&[(100.0, 0.0), (120.0, 0.0), (100.0, 10.0)]);
        let raw = raw_impact_ratios(&b);
        assert_eq!(raw[0], 0.0);
        assert_eq!(raw[1], 0.0);
        assert!(raw[2] > 0.0);
    }

    #[test]
    fn test_output_strictly_positive_and_same_length() {
        let b = bars(&[(100.0, 1000.0), (100.0, 1000.0), (101.0, 800.0), (100.5, 0.0)]);
        let out = amihud_illiquidity(&b, 3);
        assert_eq!(out.len(), b.len());
        assert!(out.iter().all(|v| *v > 0.0));
        // leading zeros are replaced with the smallest positive smoothed value
        let min_later = out[2..].iter().cloned().fold(f64::INFINITY, f64::min);
        assert_eq!(out[0], min_later);
    }

    #[test]
    fn test_all_zero_volume_uses_floor() {
        let b = bars(&[(100.0, 0.0), (105.0, 0.0), (95.0, 0.0)]);
        let out = AmihudEstimator::default().estimate(&b);
        assert_eq!(out, vec![ILLIQUIDITY_FLOOR; 3]);
    }

    #[test]
    fn test_zero_price_does_not_poison_series() {
        let b = bars(&[(0.0, 100.0), (10.0, 100.0), (11.0, 100.0)]);
        let out = amihud_illiquidity(&b, 2);
        assert!(out.iter().all(|v| v.is_finite() && *v > 0.0));
    }

    #[test]
    fn test_empty_input() {
        assert!(amihud_illiquidity(&[], DEFAULT_SPAN).is_empty());
    }
}
