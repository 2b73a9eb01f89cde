//! Numeric utilities for sizing and signal calculations.
//!
//! Small, total functions: none of them panic or return NaN for the
//! degenerate inputs the pipeline feeds them (zero prices, empty sides of
//! a win/loss partition).

/// Clamp a probability or fraction into `[0, 1]`. NaN maps to `0.0`.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Absolute fractional change between two prices. Non-finite results
/// (zero or missing previous price) are reported as `0.0`.
pub fn abs_pct_change(old_value: f64, new_value: f64) -> f64 {
    let change = ((new_value - old_value) / old_value).abs();
    if change.is_finite() { change } else { 0.0 }
}

/// Logistic function.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Absolute-tolerance float comparison.
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Unclamped Kelly fraction from a win probability and mean win/loss
/// magnitudes: `p - (1 - p) / (avg_win / avg_loss)`.
///
/// With no observed losses (`avg_loss == 0`) the loss term is zero and the
/// result is `p`. With losses but no positive wins the payoff ratio is zero
/// and the result is `0.0`.
pub fn kelly_fraction(win_prob: f64, avg_win: f64, avg_loss: f64) -> f64 {
    if !win_prob.is_finite() {
        return 0.0;
    }
    if avg_loss <= 0.0 {
        return win_prob;
    }
    if avg_win <= 0.0 {
        return 0.0;
    }
    let payoff = avg_win / avg_loss;
    win_prob - (1.0 - win_prob) / payoff
}
