use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::model::PredictionModel;
use super::types::{PredictionFeatures, PredictionResult};

/// Prediction model served by an inference sidecar.
///
/// The feature bag is POSTed as a flat JSON object to `{base_url}/predict`;
/// the response body must decode into a [`PredictionResult`].
#[derive(Clone)]
pub struct HttpPredictionModel {
    http: Client,
    base_url: String,
}

impl HttpPredictionModel {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/predict", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PredictionModel for HttpPredictionModel {
    async fn predict(&self, features: &PredictionFeatures) -> Result<PredictionResult> {
        let url = self.endpoint();
        debug!(%url, n_features = features.len(), "requesting prediction");

        let resp = self.http.post(url).json(features).send().await?;
        if resp.status() != StatusCode::OK {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("prediction sidecar returned {}: {}", status, body));
        }
        let result: PredictionResult = resp.json().await?;
        Ok(result)
    }
}
