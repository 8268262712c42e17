//! Split-cosine-bell taper.

use std::f64::consts::PI;

/// Taper weights of length `n` with `fraction` of the record tapered,
/// half at each end.
///
/// `fraction == 0` gives all ones.
pub(crate) fn split_cosine_bell(n: usize, fraction: f64) -> Vec<f64> {
    let m = ((fraction * n as f64) / 2.0).round() as usize;
    let m = m.min(n / 2);
    let mut w = vec![1.0; n];
    for i in 0..m {
        let v = 0.5 * (1.0 - (PI * (i as f64 + 0.5) / m as f64).cos());
        w[i] = v;
        w[n - 1 - i] = v;
    }
    w
}
