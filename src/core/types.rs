//! Core value objects for the regime optimization pipeline.
//!
//! Everything here is an immutable value: regime keys, closed trade
//! outcomes, per-regime aggregates and the price/volume bars consumed
//! by the liquidity estimator. All types are serialisable via
//! [`serde`] so callers can persist them in whatever format they like.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite market-regime cell.
///
/// Equality, ordering and hashing are structural: two keys built from the
/// same four bucket labels are the same regime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegimeKey {
    pub volatility: String, // e.g. "low", "normal", "high"
    pub trend: String,      // e.g. "up", "down", "flat"
    pub dealer: String,     // dealer gamma positioning, e.g. "long_gamma"
    pub liquidity: String,  // depth bucket, e.g. "deep", "thin"
}

impl RegimeKey {
    pub fn new(
        volatility: impl Into<String>,
        trend: impl Into<String>,
        dealer: impl Into<String>,
        liquidity: impl Into<String>,
    ) -> Self {
        Self {
            volatility: volatility.into(),
            trend: trend.into(),
            dealer: dealer.into(),
            liquidity: liquidity.into(),
        }
    }
}

impl fmt::Display for RegimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.volatility, self.trend, self.dealer, self.liquidity)
    }
}

/// One closed trade tagged with the regime it was entered in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub regime: RegimeKey,
    /// Realized PnL in account currency or risk units.
    pub pnl: f64,
    /// Supplied by the ledger; the win threshold is the caller's choice.
    pub win: bool,
    /// Maximum adverse excursion while the trade was open. Zero when the
    /// ledger does not track it.
    #[serde(default)]
    pub max_drawdown: f64,
}

impl TradeOutcome {
    pub fn new(regime: RegimeKey, pnl: f64, win: bool) -> Self {
        Self { regime, pnl, win, max_drawdown: 0.0 }
    }

    pub fn with_drawdown(mut self, max_drawdown: f64) -> Self {
        self.max_drawdown = max_drawdown;
        self
    }
}

/// Aggregate performance of one regime cell.
///
/// Always recomputed wholesale from the outcomes; never updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeStats {
    pub count: usize,
    pub win_rate: f64,
    pub avg_pnl: f64,
    /// Population standard deviation of PnL (divides by n). Exactly 0 for n = 1.
    pub std_pnl: f64,
    pub avg_drawdown: f64,
    /// Mean PnL of trades with positive PnL, 0 when there are none.
    pub avg_win: f64,
    /// Mean magnitude of trades with negative PnL, 0 when there are none.
    pub avg_loss: f64,
}

/// A single price/volume observation from the market-data collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(default)]
    pub ts_ms: u64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(ts_ms: u64, close: f64, volume: f64) -> Self {
        Self { ts_ms, close, volume }
    }
}
