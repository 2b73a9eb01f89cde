//! Decision layer module index.
//!
//! - [`types`]: feature bags and forecasts exchanged with models.
//! - [`model`]: the [`PredictionModel`](model::PredictionModel) capability
//!   and a local linear scorer.
//! - [`http_model`]: a model served by an HTTP inference sidecar.
//! - [`fusion`]: non-destructive merge of a forecast into a decision context.
//! - [`feedback`]: performance feedback and parameter update strategies.

pub mod types;
pub mod model;
pub mod http_model;
pub mod fusion;
pub mod feedback;

pub use fusion::{fuse_prediction, DecisionContext};
pub use model::PredictionModel;
pub use types::{PredictionFeatures, PredictionResult};
