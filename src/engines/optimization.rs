//! Regime optimizer.
//!
//! Wires the pipeline together: liquidity estimation, regime statistics and
//! ranking, prediction fusion and Kelly sizing, plus the feedback loop that
//! adjusts the sizing cap from realized performance. Everything except the
//! model call is synchronous and pure.

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::{AppConfig, ModelBackend, ModelConfig};
use crate::core::liquidity::AmihudEstimator;
use crate::core::sizing::{KellyRefiner, SizingDecision};
use crate::core::types::{Bar, RegimeKey, RegimeStats, TradeOutcome};
use crate::decision::feedback::{ParameterUpdateStrategy, PnlFeedbackStrategy, StrategyParams};
use crate::decision::fusion::{fuse_prediction, DecisionContext};
use crate::decision::http_model::HttpPredictionModel;
use crate::decision::model::{LinearSignalModel, PredictionModel};
use crate::decision::types::{PredictionFeatures, PredictionResult};
use crate::error::{OptimizerError, Result};
use crate::regime::classifier::{MarketSnapshot, RegimeClassifier};
use crate::regime::selector::{pick_best_regimes, SortKey};
use crate::regime::stats::{compute_global_stats, compute_regime_stats, RegimeStatsMap};

/// Context key carrying the recommended risk fraction.
pub const RISK_FRACTION: &str = "risk_fraction";
/// Context key naming where the sizing estimate came from.
pub const SIZING_SOURCE: &str = "sizing_source";

const MAX_FRACTION: &str = "max_fraction";

/// Output of [`RegimeOptimizer::analyze`].
#[derive(Debug, Clone)]
pub struct RegimeReport {
    pub stats: RegimeStatsMap,
    /// Statistics over all trades; the sizing fallback for thin regimes.
    pub global: Option<RegimeStats>,
    /// Regimes meeting the threshold, best first.
    pub ranked: Vec<(RegimeKey, RegimeStats)>,
    pub sort_by: SortKey,
    pub min_trades: usize,
}

impl RegimeReport {
    pub fn get(&self, regime: &RegimeKey) -> Option<&RegimeStats> {
        self.stats.get(regime)
    }

    /// Zero-based position of `regime` in the ranking, if it qualified.
    pub fn rank_of(&self, regime: &RegimeKey) -> Option<usize> {
        self.ranked.iter().position(|(k, _)| k == regime)
    }
}

/// Output of [`RegimeOptimizer::recommend`].
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub regime: RegimeKey,
    pub regime_rank: Option<usize>,
    pub prediction: PredictionResult,
    /// Caller's context plus the `ml_*` keys, `risk_fraction` and `sizing_source`.
    pub context: DecisionContext,
    pub sizing: SizingDecision,
}

pub struct RegimeOptimizer {
    cfg: AppConfig,
    sort_by: SortKey,
    classifier: RegimeClassifier,
    refiner: KellyRefiner,
    params: StrategyParams,
    model: Option<Arc<dyn PredictionModel>>,
    feedback: Box<dyn PnlFeedbackStrategy>,
    updater: Box<dyn ParameterUpdateStrategy>,
}

impl RegimeOptimizer {
    /// Build from configuration. The model is created from `cfg.model`.
    pub fn new(cfg: AppConfig) -> Result<Self> {
        cfg.validate()?;
        let sort_by = cfg.selector.sort_key()?;

        let mut sizing = cfg.sizing.clone();
        sizing.min_trades = cfg.selector.min_trades;

        let params = StrategyParams::default().with(MAX_FRACTION, sizing.max_fraction);
        let model = model_from_config(&cfg.model)?;
        let updater = cfg.feedback.bounded_updater(sizing.max_fraction);

        Ok(Self {
            sort_by,
            classifier: RegimeClassifier::new(cfg.classifier.clone()),
            refiner: KellyRefiner::new(sizing),
            params,
            model,
            feedback: Box::new(cfg.feedback.drawdown_feedback()),
            updater: Box::new(updater),
            cfg,
        })
    }

    pub fn with_model(mut self, model: Arc<dyn PredictionModel>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn without_model(mut self) -> Self {
        self.model = None;
        self
    }

    pub fn with_feedback(mut self, feedback: Box<dyn PnlFeedbackStrategy>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_updater(mut self, updater: Box<dyn ParameterUpdateStrategy>) -> Self {
        self.updater = updater;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    /// Current sizing cap; starts at `sizing.max_fraction` and moves with feedback.
    pub fn max_fraction(&self) -> f64 {
        self.params.get(MAX_FRACTION).unwrap_or(self.cfg.sizing.max_fraction)
    }

    /// Smoothed illiquidity per bar using the configured span.
    pub fn liquidity(&self, bars: &[Bar]) -> Vec<f64> {
        AmihudEstimator::new(self.cfg.liquidity.span).estimate(bars)
    }

    pub fn classify(&self, snapshot: &MarketSnapshot) -> RegimeKey {
        self.classifier.classify(snapshot)
    }

    /// Aggregate trades per regime and rank the qualifying ones.
    #[instrument(skip_all, fields(n_trades = trades.len()))]
    pub fn analyze(&self, trades: &[TradeOutcome]) -> RegimeReport {
        let stats = compute_regime_stats(trades);
        let global = compute_global_stats(trades);
        let min_trades = self.cfg.selector.min_trades;
        let ranked = pick_best_regimes(&stats, min_trades, self.sort_by);

        info!(
            regimes = stats.len(),
            qualified = ranked.len(),
            min_trades,
            sort_by = %self.sort_by,
            "regime statistics computed"
        );
        if let Some((best, s)) = ranked.first() {
            debug!(regime = %best, count = s.count, avg_pnl = s.avg_pnl, win_rate = s.win_rate, "top regime");
        }

        RegimeReport { stats, global, ranked, sort_by: self.sort_by, min_trades }
    }

    /// Predict, fuse and size a prospective trade in `regime`.
    #[instrument(skip_all, fields(regime = %regime))]
    pub async fn recommend(
        &self,
        report: &RegimeReport,
        regime: &RegimeKey,
        context: &DecisionContext,
        features: &PredictionFeatures,
    ) -> Result<Recommendation> {
        let model = self.model.as_ref().ok_or(OptimizerError::MissingModel)?;
        let prediction = model
            .predict(features)
            .await
            .map_err(|e| OptimizerError::Prediction(e.to_string()))?;

        let mut fused = fuse_prediction(context, &prediction);
        let sizing = self.refiner.refine_with_cap(
            report.get(regime),
            report.global.as_ref(),
            &fused,
            self.max_fraction(),
        );
        fused.insert(RISK_FRACTION.into(), json!(sizing.fraction));
        fused.insert(SIZING_SOURCE.into(), json!(sizing.source.as_str()));

        info!(
            fraction = sizing.fraction,
            source = sizing.source.as_str(),
            samples = sizing.sample_count,
            prob_up = prediction.prob_up,
            "sizing recommendation"
        );

        Ok(Recommendation {
            regime: regime.clone(),
            regime_rank: report.rank_of(regime),
            prediction,
            context: fused,
            sizing,
        })
    }

    /// Feed realized regime performance back into the strategy parameters.
    pub fn apply_feedback(&mut self, stats: &RegimeStats) -> &StrategyParams {
        let updates = self.feedback.update(stats, &self.params);
        if !updates.is_empty() {
            let old = self.max_fraction();
            self.params = self.updater.apply_updates(&self.params, &updates);
            debug!(old_cap = old, new_cap = self.max_fraction(), ?updates, "feedback applied");
        }
        &self.params
    }
}

/// Instantiate the configured prediction model, if any.
pub fn model_from_config(cfg: &ModelConfig) -> Result<Option<Arc<dyn PredictionModel>>> {
    match cfg.backend {
        ModelBackend::None => Ok(None),
        ModelBackend::Linear => Ok(Some(Arc::new(LinearSignalModel::new(cfg.linear_params())))),
        ModelBackend::Http => {
            let url = cfg
                .url
                .clone()
                .ok_or_else(|| OptimizerError::Config("model.url is required for the http backend".into()))?;
            Ok(Some(Arc::new(HttpPredictionModel::new(url))))
        }
    }
}
