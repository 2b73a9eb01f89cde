//! Regime filtering and ranking.
//!
//! Regimes with fewer trades than the threshold are dropped and the rest
//! are ranked in descending order of the chosen metric. The sort is
//! stable; ties keep the iteration order of the statistics map.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::core::types::{RegimeKey, RegimeStats};
use crate::error::OptimizerError;
use crate::regime::stats::RegimeStatsMap;

/// Default inclusive minimum trade count.
pub const DEFAULT_MIN_TRADES: usize = 20;

/// Metric used to rank regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    AvgPnl,
    WinRate,
    Count,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::AvgPnl => "avg_pnl",
            SortKey::WinRate => "win_rate",
            SortKey::Count => "count",
        }
    }

    /// Value of this metric for a regime.
    pub fn metric(&self, stats: &RegimeStats) -> f64 {
        match self {
            SortKey::AvgPnl => stats.avg_pnl,
            SortKey::WinRate => stats.win_rate,
            SortKey::Count => stats.count as f64,
        }
    }

    /// Historical parsing behaviour: unrecognised names rank by `avg_pnl`.
    pub fn parse_lenient(name: &str) -> SortKey {
        name.parse().unwrap_or_else(|_| {
            warn!(sort_key = name, "unknown sort key, falling back to avg_pnl");
            SortKey::AvgPnl
        })
    }
}

impl FromStr for SortKey {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avg_pnl" => Ok(SortKey::AvgPnl),
            "win_rate" => Ok(SortKey::WinRate),
            "count" => Ok(SortKey::Count),
            other => Err(OptimizerError::UnknownSortKey(other.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regimes with `count >= min_trades`, best first under `sort_by`.
pub fn pick_best_regimes(
    stats: &RegimeStatsMap,
    min_trades: usize,
    sort_by: SortKey,
) -> Vec<(RegimeKey, RegimeStats)> {
    let mut ranked: Vec<(RegimeKey, RegimeStats)> = stats
        .iter()
        .filter(|(_, s)| s.count >= min_trades)
        .map(|(k, s)| (k.clone(), s.clone()))
        .collect();

    ranked.sort_by(|(_, a), (_, b)| descending_nan_last(sort_by.metric(a), sort_by.metric(b)));
    ranked
}

// Total order: larger first, NaN after every number.
fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}
