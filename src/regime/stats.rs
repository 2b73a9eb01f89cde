//! Per-regime performance statistics.
//!
//! Outcomes are bucketed by [`RegimeKey`] and each bucket is folded into a
//! fresh [`RegimeStats`]. Buckets are independent, so callers that need to
//! can aggregate them on separate threads.

use std::collections::BTreeMap;

use crate::core::types::{RegimeKey, RegimeStats, TradeOutcome};
use crate::utils::metrics::{mean, population_std_dev};

/// Regime statistics keyed by regime. Only regimes with at least one trade
/// are present; absence means "no data".
pub type RegimeStatsMap = BTreeMap<RegimeKey, RegimeStats>;

/// Aggregate a set of outcomes into one [`RegimeStats`]. Returns `None`
/// for an empty set, so a zero-count aggregate is never materialised.
pub fn aggregate<'a, I>(outcomes: I) -> Option<RegimeStats>
where
    I: IntoIterator<Item = &'a TradeOutcome>,
{
    let mut pnls = Vec::new();
    let mut drawdowns = Vec::new();
    let mut wins = 0usize;
    let mut gains = Vec::new();
    let mut losses = Vec::new();

    for t in outcomes {
        pnls.push(t.pnl);
        drawdowns.push(t.max_drawdown);
        if t.win {
            wins += 1;
        }
        if t.pnl > 0.0 {
            gains.push(t.pnl);
        } else if t.pnl < 0.0 {
            losses.push(-t.pnl);
        }
    }

    let count = pnls.len();
    let avg_pnl = mean(&pnls)?;
    Some(RegimeStats {
        count,
        win_rate: wins as f64 / count as f64,
        avg_pnl,
        std_pnl: population_std_dev(&pnls).unwrap_or(0.0),
        avg_drawdown: mean(&drawdowns).unwrap_or(0.0),
        avg_win: mean(&gains).unwrap_or(0.0),
        avg_loss: mean(&losses).unwrap_or(0.0),
    })
}

/// Bucket outcomes by regime and aggregate every non-empty bucket.
pub fn compute_regime_stats(trades: &[TradeOutcome]) -> RegimeStatsMap {
    let mut buckets: BTreeMap<&RegimeKey, Vec<&TradeOutcome>> = BTreeMap::new();
    for t in trades {
        buckets.entry(&t.regime).or_default().push(t);
    }

    buckets
        .into_iter()
        .filter_map(|(key, items)| aggregate(items).map(|stats| (key.clone(), stats)))
        .collect()
}

/// Statistics over every trade regardless of regime; the sizing fallback
/// when a single regime is too thin.
pub fn compute_global_stats(trades: &[TradeOutcome]) -> Option<RegimeStats> {
    aggregate(trades)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::approx_eq;

    fn key_a() -> RegimeKey {
        RegimeKey::new("high", "up", "short_gamma", "thin")
    }

    fn key_b() -> RegimeKey {
        RegimeKey::new("low", "flat", "long_gamma", "deep")
    }

    fn scenario() -> Vec<TradeOutcome> {
        let mut trades = Vec::new();
        for _ in 0..7 {
            trades.push(TradeOutcome::new(key_a(), 100.0, true));
        }
        for _ in 0..3 {
            trades.push(TradeOutcome::new(key_a(), -50.0, false));
        }
        for _ in 0..2 {
            trades.push(TradeOutcome::new(key_b(), 50.0, true));
        }
        for _ in 0..3 {
            trades.push(TradeOutcome::new(key_b(), -30.0, false));
        }
        trades
    }

    #[test]
    fn test_two_regime_scenario() {
        let stats = compute_regime_stats(&scenario());
        assert_eq!(stats.len(), 2);

        let a = &stats[&key_a()];
        assert_eq!(a.count, 10);
        assert!(approx_eq(a.win_rate, 0.7, 1e-12));
        assert!(approx_eq(a.avg_pnl, 55.0, 1e-9));
        assert!(approx_eq(a.avg_win, 100.0, 1e-12));
        assert!(approx_eq(a.avg_loss, 50.0, 1e-12));
        // population std: sqrt(0.7 * 45^2 + 0.3 * 105^2) = sqrt(4725)
        assert!(approx_eq(a.std_pnl, 4725.0_f64.sqrt(), 1e-9));

        let b = &stats[&key_b()];
        assert_eq!(b.count, 5);
        assert!(approx_eq(b.win_rate, 0.4, 1e-12));
        assert!(approx_eq(b.avg_pnl, 2.0, 1e-9));
    }

    #[test]
    fn test_keys_and_counts_match_input() {
        let trades = scenario();
        let stats = compute_regime_stats(&trades);
        for (key, s) in &stats {
            let n = trades.iter().filter(|t| &t.regime == key).count();
            assert_eq!(s.count, n);
        }
        let total: usize = stats.values().map(|s| s.count).sum();
        assert_eq!(total, trades.len());
    }

    #[test]
    fn test_single_trade_has_zero_std() {
        let trades = vec![TradeOutcome::new(key_a(), -12.5, false).with_drawdown(20.0)];
        let s = &compute_regime_stats(&trades)[&key_a()];
        assert_eq!(s.count, 1);
        assert_eq!(s.std_pnl, 0.0);
        assert_eq!(s.avg_drawdown, 20.0);
        assert_eq!(s.avg_win, 0.0);
        assert_eq!(s.avg_loss, 12.5);
    }

    #[test]
    fn test_identical_pnl_has_zero_std() {
        let trades: Vec<_> = (0..9).map(|_| TradeOutcome::new(key_b(), 0.1, true)).collect();
        let s = &compute_regime_stats(&trades)[&key_b()];
        assert!(s.std_pnl.abs() < 1e-12);
    }

    #[test]
    fn test_drawdown_average_includes_untracked_trades() {
        let trades = vec![
            TradeOutcome::new(key_a(), 10.0, true).with_drawdown(6.0),
            TradeOutcome::new(key_a(), 10.0, true),
            TradeOutcome::new(key_a(), 10.0, true),
        ];
        let s = &compute_regime_stats(&trades)[&key_a()];
        assert!(approx_eq(s.avg_drawdown, 2.0, 1e-12));
    }

    #[test]
    fn test_win_flag_is_independent_of_pnl_sign() {
        // a small positive trade below the caller's win threshold
        let trades = vec![
            TradeOutcome::new(key_a(), 1.0, false),
            TradeOutcome::new(key_a(), 40.0, true),
        ];
        let s = &compute_regime_stats(&trades)[&key_a()];
        assert!(approx_eq(s.win_rate, 0.5, 1e-12));
        assert!(approx_eq(s.avg_win, 20.5, 1e-12));
    }

    #[test]
    fn test_empty_input() {
        assert!(compute_regime_stats(&[]).is_empty());
        assert!(compute_global_stats(&[]).is_none());
    }

    #[test]
    fn test_global_stats_span_all_regimes() {
        let g = compute_global_stats(&scenario()).unwrap();
        assert_eq!(g.count, 15);
        assert!(approx_eq(g.win_rate, 9.0 / 15.0, 1e-12));
    }
}
