//! Performance feedback strategies.
//!
//! A [`PnlFeedbackStrategy`] looks at realized regime performance and
//! proposes additive parameter changes; a [`ParameterUpdateStrategy`]
//! applies those proposals to a parameter set. Both are pure: they return
//! new values and leave their inputs untouched, so they can be swapped or
//! chained freely.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::core::types::RegimeStats;

/// Named strategy parameters (`max_fraction`, `min_trades`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParams(pub BTreeMap<String, f64>);

impl StrategyParams {
    pub fn get(&self, k: &str) -> Option<f64> {
        self.0.get(k).copied()
    }
    pub fn set(&mut self, k: &str, v: f64) {
        self.0.insert(k.to_string(), v);
    }
    pub fn with(mut self, k: &str, v: f64) -> Self {
        self.set(k, v);
        self
    }
}

/// Proposed additive changes, keyed by parameter name.
pub type ParameterUpdates = BTreeMap<String, f64>;

pub trait PnlFeedbackStrategy: Send + Sync {
    fn update(&self, stats: &RegimeStats, params: &StrategyParams) -> ParameterUpdates;
}

pub trait ParameterUpdateStrategy: Send + Sync {
    fn apply_updates(&self, params: &StrategyParams, updates: &ParameterUpdates) -> StrategyParams;
}

/// Steps a single parameter down when a regime loses money or draws down
/// too far, and half a step up when it wins more often than not.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawdownFeedback {
    pub target: String,
    pub step: f64,
    pub drawdown_limit: f64,
    pub min_trades: usize,
}

impl Default for DrawdownFeedback {
    fn default() -> Self {
        Self {
            target: "max_fraction".to_string(),
            step: 0.01,
            drawdown_limit: 0.05,
            min_trades: 20,
        }
    }
}

impl PnlFeedbackStrategy for DrawdownFeedback {
    fn update(&self, stats: &RegimeStats, _params: &StrategyParams) -> ParameterUpdates {
        let mut out = ParameterUpdates::new();
        if stats.count < self.min_trades {
            return out;
        }
        if stats.avg_pnl < 0.0 || stats.avg_drawdown > self.drawdown_limit {
            out.insert(self.target.clone(), -self.step);
        } else if stats.win_rate > 0.5 && stats.avg_pnl > 0.0 {
            out.insert(self.target.clone(), self.step * 0.5);
        }
        out
    }
}

/// Adds deltas to existing parameters and clamps the result to per-name
/// bounds. Unknown parameter names are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundedUpdater {
    pub bounds: BTreeMap<String, (f64, f64)>,
}

impl BoundedUpdater {
    pub fn new(bounds: BTreeMap<String, (f64, f64)>) -> Self {
        Self { bounds }
    }

    pub fn with_bound(mut self, name: &str, min: f64, max: f64) -> Self {
        self.bounds.insert(name.to_string(), (min, max));
        self
    }
}

impl ParameterUpdateStrategy for BoundedUpdater {
    fn apply_updates(&self, params: &StrategyParams, updates: &ParameterUpdates) -> StrategyParams {
        let mut next = params.clone();
        for (name, delta) in updates {
            let Some(current) = params.get(name) else {
                debug!(param = %name, "ignoring update for unknown parameter");
                continue;
            };
            if !delta.is_finite() {
                continue;
            }
            let mut value = current + delta;
            if let Some(&(lo, hi)) = self.bounds.get(name) {
                value = value.max(lo).min(hi);
            }
            next.set(name, value);
        }
        next
    }
}
