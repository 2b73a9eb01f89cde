//! Regime layer.
//!
//! - [`classifier`]: maps market snapshots to [`RegimeKey`](crate::core::types::RegimeKey)s.
//! - [`stats`]: aggregates trade outcomes per regime.
//! - [`selector`]: filters and ranks regimes.

pub mod classifier;
pub mod stats;
pub mod selector;

pub use classifier::{ClassifierConfig, MarketSnapshot, RegimeClassifier};
pub use selector::{pick_best_regimes, SortKey, DEFAULT_MIN_TRADES};
pub use stats::{compute_global_stats, compute_regime_stats, RegimeStatsMap};
