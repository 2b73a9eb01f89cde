use thiserror::Error;

/// Errors raised by the optimization core.
///
/// Degenerate numeric input (zero volume, single-sample regimes, no losing
/// trades) never ends up here; those cases resolve to numeric fallbacks.
#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("config error: {0}")]
    Config(String),
    #[error("unknown sort key '{0}' (expected one of: avg_pnl, win_rate, count)")]
    UnknownSortKey(String),
    #[error("no prediction model configured")]
    MissingModel,
    #[error("prediction error: {0}")]
    Prediction(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for OptimizerError {
    fn from(err: toml::de::Error) -> Self {
        OptimizerError::Parse(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_json::Error> for OptimizerError {
    fn from(err: serde_json::Error) -> Self {
        OptimizerError::Parse(format!("JSON parsing error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
