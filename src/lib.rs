//! Regime-aware strategy optimization core.
//!
//! Historical trade outcomes are bucketed into market-regime cells,
//! summarised per regime, filtered and ranked; an external model's
//! forecast is fused into the trade decision context; and a capped Kelly
//! fraction is derived from the regime's empirical win/loss statistics.
//!
//! Data flow:
//!
//! ```text
//! bars -> core::liquidity -> regime::classifier -> tagged TradeOutcomes
//!      -> regime::stats -> regime::selector
//! features -> decision::model -> decision::fusion (context)
//! stats + fused context -> core::sizing -> risk fraction
//! ```
//!
//! [`engines::RegimeOptimizer`] runs the whole flow from an [`config::AppConfig`].

pub mod config;
pub mod core;
pub mod decision;
pub mod engines;
pub mod error;
pub mod regime;
pub mod utils;

pub use crate::core::types::{Bar, RegimeKey, RegimeStats, TradeOutcome};
pub use crate::error::{OptimizerError, Result};
