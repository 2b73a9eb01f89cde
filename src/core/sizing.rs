//! Empirical position sizing.
//!
//! Converts regime win/loss statistics into a capped Kelly fraction. Thin
//! regimes fall back to global statistics and then to a conservative fixed
//! fraction, so a recommendation is always produced.

use serde::{Deserialize, Serialize};

use crate::core::math::{clamp01, kelly_fraction};
use crate::core::types::RegimeStats;
use crate::decision::fusion::{DecisionContext, ML_PROB_UP};

/// Configuration for the sizing refiner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    pub max_fraction: f64,   // cap on the risk fraction (0.0 - 1.0)
    pub fallback_ratio: f64, // share of the cap used when samples are thin
    #[serde(skip)]
    pub min_trades: usize,   // set from the selector threshold
    pub ml_blend: f64,       // weight of ml_prob_up in the win probability
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            max_fraction: 0.25,
            fallback_ratio: 0.5,
            min_trades: 20,
            ml_blend: 0.0,
        }
    }
}

/// Where the sizing estimate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingSource {
    Regime,
    Global,
    Fallback,
}

impl SizingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizingSource::Regime => "regime",
            SizingSource::Global => "global",
            SizingSource::Fallback => "fallback",
        }
    }
}

/// Sizing result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingDecision {
    /// Recommended risk fraction in [0, cap].
    pub fraction: f64,
    /// Unclamped Kelly value, absent on the fixed fallback.
    pub raw_kelly: Option<f64>,
    /// Win probability fed into the Kelly formula.
    pub win_prob: Option<f64>,
    pub source: SizingSource,
    /// Trade count behind the estimate (0 for the fallback).
    pub sample_count: usize,
}

/// Capped Kelly fraction for one set of statistics.
///
/// Below `min_trades` samples (or with no statistics at all) the result is
/// `fallback_ratio * cap`. Otherwise `win_rate - (1 - win_rate) / (avg_win / avg_loss)`
/// clamped to `[0, cap]`.
pub fn refine_fraction(stats: Option<&RegimeStats>, cap: f64, min_trades: usize, fallback_ratio: f64) -> f64 {
    let cap = sanitize_cap(cap);
    match stats {
        Some(s) if s.count >= min_trades => kelly_fraction(s.win_rate, s.avg_win, s.avg_loss).clamp(0.0, cap),
        _ => cap * clamp01(fallback_ratio),
    }
}

fn sanitize_cap(cap: f64) -> f64 {
    if cap.is_finite() { clamp01(cap) } else { 0.0 }
}

/// Sizing refiner holding the configured guard rails.
#[derive(Debug, Clone, Default)]
pub struct KellyRefiner {
    config: SizingConfig,
}

impl KellyRefiner {
    pub fn new(config: SizingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    /// Size with the configured cap.
    pub fn refine(
        &self,
        regime: Option<&RegimeStats>,
        global: Option<&RegimeStats>,
        context: &DecisionContext,
    ) -> SizingDecision {
        self.refine_with_cap(regime, global, context, self.config.max_fraction)
    }

    /// Size with an explicit cap, e.g. one adjusted by performance feedback.
    pub fn refine_with_cap(
        &self,
        regime: Option<&RegimeStats>,
        global: Option<&RegimeStats>,
        context: &DecisionContext,
        cap: f64,
    ) -> SizingDecision {
        let cap = sanitize_cap(cap);
        let min = self.config.min_trades;

        let chosen = match (regime, global) {
            (Some(r), _) if r.count >= min => Some((r, SizingSource::Regime)),
            (_, Some(g)) if g.count >= min => Some((g, SizingSource::Global)),
            _ => None,
        };

        let Some((stats, source)) = chosen else {
            return SizingDecision {
                fraction: refine_fraction(None, cap, min, self.config.fallback_ratio),
                raw_kelly: None,
                win_prob: None,
                source: SizingSource::Fallback,
                sample_count: 0,
            };
        };

        let win_prob = self.blended_win_prob(stats.win_rate, context);
        let raw = kelly_fraction(win_prob, stats.avg_win, stats.avg_loss);
        SizingDecision {
            fraction: raw.clamp(0.0, cap),
            raw_kelly: Some(raw),
            win_prob: Some(win_prob),
            source,
            sample_count: stats.count,
        }
    }

    fn blended_win_prob(&self, win_rate: f64, context: &DecisionContext) -> f64 {
        let w = clamp01(self.config.ml_blend);
        if w == 0.0 {
            return win_rate;
        }
        match context.get(ML_PROB_UP).and_then(|v| v.as_f64()).filter(|p| p.is_finite()) {
            Some(p) => (1.0 - w) * win_rate + w * clamp01(p),
            None => win_rate,
        }
    }
}
