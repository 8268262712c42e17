//! Statistical helper functions shared by the CCEW diagnostics crates.
//!
//! Everything here works on plain `&[f64]` slices. Functions that compare
//! two series skip pairs where either value is non-finite, so NaN-marked
//! missing samples never leak into a score.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Sample variance with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn variance(data: &[f64]) -> f64 {
    let n = data.len();
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    let mean = data.iter().sum::<f64>() / nf;
    data.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / (nf - 1.0)
}

/// Population variance with N denominator.
///
/// This is the normalisation Parseval's theorem uses, so spectral totals are
/// compared against it. Returns 0.0 if empty.
pub fn population_variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64
}

/// Sample standard deviation with N-1 denominator.
/// Returns 0.0 if fewer than 2 elements.
pub fn sd(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Mean of squared values.
pub fn mean_square(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().map(|&x| x * x).sum::<f64>() / data.len() as f64
}

/// Remove the mean from `data` in place.
pub fn remove_mean(data: &mut [f64]) {
    let m = mean(data);
    for x in data.iter_mut() {
        *x -= m;
    }
}

/// Remove the least-squares linear trend (against sample index) in place.
///
/// Series shorter than 2 samples are only demeaned.
pub fn remove_linear_trend(data: &mut [f64]) {
    let n = data.len();
    if n < 2 {
        remove_mean(data);
        return;
    }
    let nf = n as f64;
    let t_mean = (nf - 1.0) / 2.0;
    let y_mean = mean(data);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in data.iter().enumerate() {
        let dt = i as f64 - t_mean;
        sxy += dt * (y - y_mean);
        sxx += dt * dt;
    }
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };

    for (i, y) in data.iter_mut().enumerate() {
        *y -= y_mean + slope * (i as f64 - t_mean);
    }
}

/// Collect the index-aligned pairs where both values are finite.
fn finite_pairs(x: &[f64], y: &[f64]) -> Vec<(f64, f64)> {
    x.iter()
        .zip(y.iter())
        .filter(|(xi, yi)| xi.is_finite() && yi.is_finite())
        .map(|(xi, yi)| (*xi, *yi))
        .collect()
}

/// Pearson correlation coefficient.
///
/// Filters to indices where both `x[i]` and `y[i]` are finite.
/// Returns `None` if fewer than 3 finite pairs or if the denominator is zero
/// (constant input).
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let pairs = finite_pairs(x, y);

    if pairs.len() < 3 {
        return None;
    }

    let n = pairs.len() as f64;
    let mx: f64 = pairs.iter().map(|(xi, _)| xi).sum::<f64>() / n;
    let my: f64 = pairs.iter().map(|(_, yi)| yi).sum::<f64>() / n;

    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    for &(xi, yi) in &pairs {
        let dx = xi - mx;
        let dy = yi - my;
        sum_xy += dx * dy;
        sum_xx += dx * dx;
        sum_yy += dy * dy;
    }

    let denom = (sum_xx * sum_yy).sqrt();
    if denom == 0.0 {
        return None;
    }

    Some((sum_xy / denom).clamp(-1.0, 1.0))
}

/// Root-mean-square difference `sqrt(mean((x - y)^2))` over finite pairs.
///
/// Returns `None` when no finite pair exists.
pub fn rmse(x: &[f64], y: &[f64]) -> Option<f64> {
    let pairs = finite_pairs(x, y);
    if pairs.is_empty() {
        return None;
    }
    let mse = pairs.iter().map(|(a, b)| (a - b) * (a - b)).sum::<f64>() / pairs.len() as f64;
    Some(mse.sqrt())
}

/// Mean absolute difference over finite pairs.
pub fn mae(x: &[f64], y: &[f64]) -> Option<f64> {
    let pairs = finite_pairs(x, y);
    if pairs.is_empty() {
        return None;
    }
    Some(pairs.iter().map(|(a, b)| (a - b).abs()).sum::<f64>() / pairs.len() as f64)
}

/// Mean difference `mean(x - y)` over finite pairs.
pub fn bias(x: &[f64], y: &[f64]) -> Option<f64> {
    let pairs = finite_pairs(x, y);
    if pairs.is_empty() {
        return None;
    }
    Some(pairs.iter().map(|(a, b)| a - b).sum::<f64>() / pairs.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&data), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_sd() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(sd(&data), 2.138090, epsilon = 1e-6);
    }

    #[test]
    fn test_sd_single() {
        assert_eq!(sd(&[5.0]), 0.0);
    }

    #[test]
    fn test_variance_two() {
        // [3.0, 7.0]: mean=5, sum_sq=8, var=8/1=8
        assert_relative_eq!(variance(&[3.0, 7.0]), 8.0, epsilon = 1e-10);
    }

    #[test]
    fn test_population_variance() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(population_variance(&data), 4.0, epsilon = 1e-12);
        assert_eq!(population_variance(&[]), 0.0);
    }

    #[test]
    fn test_mean_square() {
        assert_relative_eq!(mean_square(&[1.0, -1.0, 3.0]), 11.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_remove_linear_trend_exact_line() {
        let mut data: Vec<f64> = (0..10).map(|i| 3.0 + 0.5 * i as f64).collect();
        remove_linear_trend(&mut data);
        for v in data {
            assert!(v.abs() < 1e-12);
        }
    }

    #[test]
    fn test_remove_linear_trend_keeps_oscillation() {
        // A full cosine cycle has no trend and zero mean.
        let n = 16;
        let mut data: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / n as f64).cos())
            .collect();
        let before = data.clone();
        remove_linear_trend(&mut data);
        for (a, b) in data.iter().zip(before.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_remove_mean() {
        let mut data = [1.0, 2.0, 3.0];
        remove_mean(&mut data);
        assert_eq!(data, [-1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_pearson_correlation_perfect() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        let r = pearson_correlation(&x, &y);
        assert_relative_eq!(r.unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pearson_correlation_insufficient() {
        let x = [1.0, 2.0];
        let y = [3.0, 4.0];
        assert!(pearson_correlation(&x, &y).is_none());
    }

    #[test]
    fn test_pearson_correlation_with_nan() {
        let x = [1.0, f64::NAN, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, f64::NAN, 8.0, 10.0];
        // Finite pairs: (1,2), (4,8), (5,10) give 3 pairs, perfect linear
        let r = pearson_correlation(&x, &y);
        assert_relative_eq!(r.unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_pearson_correlation_constant() {
        assert!(pearson_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_error_metrics() {
        let x = [1.0, 2.0, 3.0];
        let y = [2.0, 2.0, 5.0];
        assert_relative_eq!(rmse(&x, &y).unwrap(), (5.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(mae(&x, &y).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(bias(&x, &y).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_error_metrics_identical_and_empty() {
        let x = [0.3, 1.7, -2.0];
        assert_eq!(rmse(&x, &x), Some(0.0));
        assert_eq!(mae(&x, &x), Some(0.0));
        assert!(rmse(&[f64::NAN], &[1.0]).is_none());
        assert!(bias(&[], &[]).is_none());
    }
}
