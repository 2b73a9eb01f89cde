pub mod metrics;
pub mod logging;
