//! Prediction model capability.
//!
//! The core only depends on the forecast shape; any model (a local scorer,
//! a remote inference sidecar, a test double) can plug in by implementing
//! [`PredictionModel`].

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use std::collections::BTreeMap;

use crate::core::math::sigmoid;
use super::types::{PredictionFeatures, PredictionResult};

#[async_trait]
pub trait PredictionModel: Send + Sync {
    async fn predict(&self, features: &PredictionFeatures) -> Result<PredictionResult>;
}

/// Parameters for [`LinearSignalModel`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelParams {
    pub bias: f64,
    pub weights: BTreeMap<String, f64>,
    /// Expected return at full conviction (prob_up = 1).
    pub return_scale: f64,
    /// Feature holding the volatility forecast.
    pub vol_feature: String,
    /// Volatility reported when `vol_feature` is missing.
    pub default_vol: f64,
}

impl Default for LinearModelParams {
    fn default() -> Self {
        Self {
            bias: 0.0,
            weights: BTreeMap::new(),
            return_scale: 0.02,
            vol_feature: "realized_vol".to_string(),
            default_vol: 0.2,
        }
    }
}

/// Logistic scorer over a weighted sum of features.
///
/// Missing features contribute zero. Deterministic, no I/O.
#[derive(Debug, Clone, Default)]
pub struct LinearSignalModel {
    params: LinearModelParams,
}

impl LinearSignalModel {
    pub fn new(params: LinearModelParams) -> Self {
        Self { params }
    }

    /// Raw linear score before the logistic link.
    pub fn score(&self, features: &PredictionFeatures) -> f64 {
        self.params.weights.iter().fold(self.params.bias, |acc, (name, w)| {
            let x = features.get(name).filter(|v| v.is_finite()).unwrap_or(0.0);
            acc + w * x
        })
    }
}

#[async_trait]
impl PredictionModel for LinearSignalModel {
    async fn predict(&self, features: &PredictionFeatures) -> Result<PredictionResult> {
        let z = self.score(features);
        let prob_up = sigmoid(z);
        let prob_down = 1.0 - prob_up;
        let expected_vol = features
            .get(&self.params.vol_feature)
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(self.params.default_vol);

        let mut metadata = Map::new();
        metadata.insert("model".into(), json!("linear"));
        metadata.insert("score".into(), json!(z));

        Ok(PredictionResult {
            prob_up,
            prob_down,
            expected_return: (prob_up - prob_down) * self.params.return_scale,
            expected_vol,
            metadata,
        })
    }
}
