use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::core::liquidity::DEFAULT_SPAN;
use crate::core::sizing::SizingConfig;
use crate::decision::feedback::{BoundedUpdater, DrawdownFeedback};
use crate::decision::model::LinearModelParams;
use crate::error::{OptimizerError, Result};
use crate::regime::classifier::ClassifierConfig;
use crate::regime::selector::{SortKey, DEFAULT_MIN_TRADES};
use crate::utils::logging::LogConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/base.toml";

const MAX_FRACTION: &str = "max_fraction";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub liquidity: LiquidityConfig,
    pub selector: SelectorConfig,
    pub sizing: SizingConfig,
    pub classifier: ClassifierConfig,
    pub model: ModelConfig,
    pub feedback: FeedbackConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LiquidityConfig {
    pub span: usize,
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self { span: DEFAULT_SPAN }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SelectorConfig {
    pub min_trades: usize,
    pub sort_by: String,
    /// Rank unknown sort keys by avg_pnl instead of rejecting them.
    pub lenient_sort_key: bool,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            min_trades: DEFAULT_MIN_TRADES,
            sort_by: SortKey::default().to_string(),
            lenient_sort_key: false,
        }
    }
}

impl SelectorConfig {
    pub fn sort_key(&self) -> Result<SortKey> {
        if self.lenient_sort_key {
            Ok(SortKey::parse_lenient(&self.sort_by))
        } else {
            self.sort_by.parse()
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelBackend {
    None,
    #[default]
    Linear,
    Http,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub backend: ModelBackend,
    pub url: Option<String>,
    pub bias: f64,
    pub weights: BTreeMap<String, f64>,
    pub return_scale: f64,
    pub vol_feature: String,
    pub default_vol: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let p = LinearModelParams::default();
        Self {
            backend: ModelBackend::default(),
            url: None,
            bias: p.bias,
            weights: p.weights,
            return_scale: p.return_scale,
            vol_feature: p.vol_feature,
            default_vol: p.default_vol,
        }
    }
}

impl ModelConfig {
    pub fn linear_params(&self) -> LinearModelParams {
        LinearModelParams {
            bias: self.bias,
            weights: self.weights.clone(),
            return_scale: self.return_scale,
            vol_feature: self.vol_feature.clone(),
            default_vol: self.default_vol,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedbackConfig {
    pub target: String,
    pub step: f64,
    pub drawdown_limit: f64,
    pub min_trades: usize,
    /// Inclusive `[min, max]` per parameter name. Without an entry for
    /// `max_fraction` the cap moves within `[0, sizing.max_fraction]`.
    pub bounds: BTreeMap<String, (f64, f64)>,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        let fb = DrawdownFeedback::default();
        Self {
            target: fb.target,
            step: fb.step,
            drawdown_limit: fb.drawdown_limit,
            min_trades: fb.min_trades,
            bounds: BTreeMap::new(),
        }
    }
}

impl FeedbackConfig {
    pub fn drawdown_feedback(&self) -> DrawdownFeedback {
        DrawdownFeedback {
            target: self.target.clone(),
            step: self.step,
            drawdown_limit: self.drawdown_limit,
            min_trades: self.min_trades,
        }
    }

    /// Updater over the configured bounds, with the sizing cap as the
    /// default ceiling for `max_fraction`.
    pub fn bounded_updater(&self, max_fraction: f64) -> BoundedUpdater {
        let mut bounds = self.bounds.clone();
        bounds.entry(MAX_FRACTION.to_string()).or_insert((0.0, max_fraction));
        BoundedUpdater::new(bounds)
    }
}

impl AppConfig {
    /// Check value ranges and cross-field requirements.
    pub fn validate(&self) -> Result<()> {
        if self.liquidity.span == 0 {
            return Err(OptimizerError::Config("liquidity.span must be >= 1".into()));
        }
        let s = &self.sizing;
        if !(s.max_fraction > 0.0 && s.max_fraction <= 1.0) {
            return Err(OptimizerError::Config(format!(
                "sizing.max_fraction {} outside (0, 1]",
                s.max_fraction
            )));
        }
        if !(0.0..=1.0).contains(&s.fallback_ratio) {
            return Err(OptimizerError::Config(format!(
                "sizing.fallback_ratio {} outside [0, 1]",
                s.fallback_ratio
            )));
        }
        if !(0.0..=1.0).contains(&s.ml_blend) {
            return Err(OptimizerError::Config(format!("sizing.ml_blend {} outside [0, 1]", s.ml_blend)));
        }
        self.selector.sort_key()?;
        if self.model.backend == ModelBackend::Http && self.model.url.is_none() {
            return Err(OptimizerError::Config("model.url is required for the http backend".into()));
        }
        for (name, (lo, hi)) in &self.feedback.bounds {
            if lo > hi {
                return Err(OptimizerError::Config(format!("feedback.bounds.{} has min > max", name)));
            }
        }
        if let Some(&(lo, hi)) = self.feedback.bounds.get(MAX_FRACTION) {
            if !(lo..=hi).contains(&s.max_fraction) {
                return Err(OptimizerError::Config(format!(
                    "feedback.bounds.max_fraction [{}, {}] excludes sizing.max_fraction {}",
                    lo, hi, s.max_fraction
                )));
            }
        }
        Ok(())
    }
}

/// Parse and validate a TOML document.
pub fn parse(s: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
    let s = fs::read_to_string(path)?;
    parse(&s)
}

pub fn load_base() -> Result<AppConfig> {
    load_from(DEFAULT_CONFIG_PATH)
}
