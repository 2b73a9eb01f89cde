//! Prediction fusion.
//!
//! Merges a model forecast into a trade decision context. The caller's
//! context is borrowed immutably and a new, extended map is returned, so
//! the original can never observe the added keys.

use serde_json::{Map, Value};

use super::types::PredictionResult;

/// Everything known about a prospective trade before sizing.
pub type DecisionContext = Map<String, Value>;

pub const ML_PROB_UP: &str = "ml_prob_up";
pub const ML_PROB_DOWN: &str = "ml_prob_down";
pub const ML_EXPECTED_RETURN: &str = "ml_expected_return";
pub const ML_EXPECTED_VOL: &str = "ml_expected_vol";
pub const ML_META: &str = "ml_meta";

/// Return `context` plus the five `ml_*` keys copied from `prediction`.
///
/// Existing keys are preserved; an `ml_*` key already present in the
/// context is overwritten in the returned copy only.
pub fn fuse_prediction(context: &DecisionContext, prediction: &PredictionResult) -> DecisionContext {
    let mut fused = context.clone();
    fused.insert(ML_PROB_UP.into(), float(prediction.prob_up));
    fused.insert(ML_PROB_DOWN.into(), float(prediction.prob_down));
    fused.insert(ML_EXPECTED_RETURN.into(), float(prediction.expected_return));
    fused.insert(ML_EXPECTED_VOL.into(), float(prediction.expected_vol));
    fused.insert(ML_META.into(), Value::Object(prediction.metadata.clone()));
    fused
}

// JSON has no NaN/inf; those become null rather than panicking.
fn float(v: f64) -> Value {
    Value::from(v)
}
