//! Value objects and the numeric building blocks of the pipeline.

pub mod types;
pub mod math;
pub mod liquidity;
pub mod sizing;

pub use types::{Bar, RegimeKey, RegimeStats, TradeOutcome};
