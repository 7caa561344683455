//! Logistic activation.

use ndarray::{ArrayD, ArrayViewD};

/// Logistic sigmoid: `1 / (1 + exp(-x))`.
///
/// Evaluated directly, without a log-domain rewrite. For very negative `x` the
/// exponential overflows to `inf` and the result is exactly `0.0`; for very
/// positive `x` it rounds to exactly `1.0`. `NaN` propagates.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Elementwise [`sigmoid`] over an array of any dimensionality.
pub fn sigmoid_array(x: ArrayViewD<'_, f64>) -> ArrayD<f64> {
    x.mapv(sigmoid)
}
