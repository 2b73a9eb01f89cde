//! Threshold-based regime classification.
//!
//! Turns a market snapshot into a [`RegimeKey`] by bucketing each of the
//! four dimensions against fixed thresholds. Non-finite inputs land in the
//! middle bucket of their dimension.

use serde::{Deserialize, Serialize};

use crate::core::types::RegimeKey;

/// Inputs for one classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Realized volatility, annualised.
    pub realized_vol: f64,
    /// Trailing return used as the trend signal.
    pub trend_return: f64,
    /// Dealer net gamma exposure (positive = dealers long gamma).
    pub dealer_gamma: f64,
    /// Smoothed illiquidity; usually the last value of the Amihud series.
    #[serde(default)]
    pub illiquidity: Option<f64>,
}

/// Bucket boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub vol_low: f64,
    pub vol_high: f64,
    pub trend_threshold: f64,
    pub gamma_neutral_band: f64,
    pub illiq_deep: f64,
    pub illiq_thin: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            vol_low: 0.12,
            vol_high: 0.25,
            trend_threshold: 0.01,
            gamma_neutral_band: 0.0,
            illiq_deep: 1e-7,
            illiq_thin: 1e-5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegimeClassifier {
    cfg: ClassifierConfig,
}

impl RegimeClassifier {
    pub fn new(cfg: ClassifierConfig) -> Self {
        Self { cfg }
    }

    pub fn classify_volatility(&self, vol: f64) -> &'static str {
        bucket(vol, self.cfg.vol_low, self.cfg.vol_high, ("low", "normal", "high"))
    }

    pub fn classify_trend(&self, ret: f64) -> &'static str {
        let t = self.cfg.trend_threshold.abs();
        bucket(ret, -t, t, ("down", "flat", "up"))
    }

    pub fn classify_dealer(&self, gamma: f64) -> &'static str {
        let band = self.cfg.gamma_neutral_band.abs();
        bucket(gamma, -band, band, ("short_gamma", "neutral", "long_gamma"))
    }

    pub fn classify_liquidity(&self, illiquidity: f64) -> &'static str {
        // higher illiquidity = thinner book
        bucket(illiquidity, self.cfg.illiq_deep, self.cfg.illiq_thin, ("deep", "normal", "thin"))
    }

    /// Classify a snapshot. A snapshot without an illiquidity reading is
    /// treated as normal depth.
    pub fn classify(&self, snap: &MarketSnapshot) -> RegimeKey {
        RegimeKey::new(
            self.classify_volatility(snap.realized_vol),
            self.classify_trend(snap.trend_return),
            self.classify_dealer(snap.dealer_gamma),
            snap.illiquidity
                .map(|v| self.classify_liquidity(v))
                .unwrap_or("normal"),
        )
    }
}

fn bucket(value: f64, lower: f64, upper: f64, labels: (&'static str, &'static str, &'static str)) -> &'static str {
    if !value.is_finite() {
        labels.1
    } else if value < lower {
        labels.0
    } else if value > upper {
        labels.2
    } else {
        labels.1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_snapshot() {
        let c = RegimeClassifier::default();
        let key = c.classify(&MarketSnapshot {
            realized_vol: 0.40,
            trend_return: -0.03,
            dealer_gamma: -1.5e9,
            illiquidity: Some(2e-5),
        });
        assert_eq!(key, RegimeKey::new("high", "down", "short_gamma", "thin"));
    }

    #[test]
    fn test_boundaries_fall_in_middle_bucket() {
        let c = RegimeClassifier::default();
        assert_eq!(c.classify_volatility(0.12), "normal");
        assert_eq!(c.classify_volatility(0.25), "normal");
        assert_eq!(c.classify_trend(0.01), "flat");
        assert_eq!(c.classify_dealer(0.0), "neutral");
        assert_eq!(c.classify_liquidity(1e-7), "normal");
    }

    #[test]
    fn test_non_finite_inputs() {
        let c = RegimeClassifier::default();
        let key = c.classify(&MarketSnapshot {
            realized_vol: f64::NAN,
            trend_return: f64::INFINITY,
            dealer_gamma: 2.0,
            illiquidity: None,
        });
        assert_eq!(key, RegimeKey::new("normal", "flat", "long_gamma", "normal"));
    }

    #[test]
    fn test_same_inputs_same_key() {
        let c = RegimeClassifier::new(ClassifierConfig { vol_low: 0.1, ..Default::default() });
        let snap = MarketSnapshot { realized_vol: 0.05, trend_return: 0.02, dealer_gamma: 1.0, illiquidity: Some(1e-8) };
        assert_eq!(c.classify(&snap), c.classify(&snap.clone()));
        assert_eq!(c.classify(&snap), RegimeKey::new("low", "up", "long_gamma", "deep"));
    }
}
