pub mod optimization;

pub use optimization::{Recommendation, RegimeOptimizer, RegimeReport};
