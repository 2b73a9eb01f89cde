//! Prediction inputs and outputs.
//!
//! A [`PredictionModel`](super::model::PredictionModel) turns a bag of named
//! features into a typed forecast. Both sides are serialisable via
//! [`serde`] so remote models can exchange them as JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Named real-valued features handed to a prediction model.
///
/// A thin wrapper that provides typed getters and setters in the same way
/// the decision context does for JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionFeatures(pub BTreeMap<String, f64>);

impl PredictionFeatures {
    pub fn new() -> Self {
        Self::default()
    }
    /// Retrieve a feature by name, if present.
    pub fn get(&self, k: &str) -> Option<f64> {
        self.0.get(k).copied()
    }
    /// Set a feature value.
    pub fn set(&mut self, k: &str, v: f64) {
        self.0.insert(k.to_string(), v);
    }
    /// Builder-style variant of [`set`](Self::set).
    pub fn with(mut self, k: &str, v: f64) -> Self {
        self.set(k, v);
        self
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for PredictionFeatures {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Forecast produced by a prediction model.
///
/// `prob_up` and `prob_down` are reported independently; models should
/// keep their sum near 1 but consumers must not rely on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prob_up: f64,
    pub prob_down: f64,
    pub expected_return: f64,
    pub expected_vol: f64,
    /// Free-form model metadata (model name, version, raw scores, ...).
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl PredictionResult {
    pub fn new(prob_up: f64, prob_down: f64, expected_return: f64, expected_vol: f64) -> Self {
        Self {
            prob_up,
            prob_down,
            expected_return,
            expected_vol,
            metadata: Map::new(),
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_features_accessors() {
        let f = PredictionFeatures::new().with("rsi", 55.0).with("vol", 0.2);
        assert_eq!(f.get("rsi"), Some(55.0));
        assert_eq!(f.get("missing"), None);
        assert_eq!(f.len(), 2);

        let g: PredictionFeatures = vec![("rsi", 55.0), ("vol", 0.2)].into_iter().collect();
        assert_eq!(f, g);
    }

    #[test]
    fn test_features_serialize_as_plain_map() {
        let f = PredictionFeatures::new().with("momentum", 1.5);
        assert_eq!(serde_json::to_string(&f).unwrap(), r#"{"momentum":1.5}"#);
    }

    #[test]
    fn test_result_metadata_defaults_to_empty() {
        let r: PredictionResult = serde_json::from_str(
            r#"{"prob_up":0.6,"prob_down":0.4,"expected_return":0.01,"expected_vol":0.2}"#,
        )
        .unwrap();
        assert!(r.metadata.is_empty());
        assert_eq!(r.prob_up, 0.6);
    }
}
