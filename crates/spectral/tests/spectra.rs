//! Integration tests for spectral estimation on synthetic records.

use approx::assert_relative_eq;
use ccew_grid::{GridField, LatBand, TimeAxis, TimeLonSeries};
use ccew_spectral::{
    BackgroundEstimator, Detrend, Significance, SpectralConfig, SpectralError, SpectralTransformer, normalize,
};
use chrono::NaiveDate;
use ndarray::{Array2, Array3, s};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

fn noise(n_time: usize, n_lon: usize, seed: u64) -> Array2<f64> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    Array2::from_shape_fn((n_time, n_lon), |_| normal.sample(&mut rng))
}

fn detrended_mean_square(block: ndarray::ArrayView2<'_, f64>) -> f64 {
    let mut total = 0.0;
    for col in block.columns() {
        let mut c = col.to_vec();
        ccew_stats::remove_linear_trend(&mut c);
        total += c.iter().map(|v| v * v).sum::<f64>();
    }
    total / block.len() as f64
}

#[test]
fn parseval_single_segment() {
    let x = noise(96, 24, 42);
    let series = TimeLonSeries::new(x.clone(), 1.0).unwrap();
    let spec = SpectralTransformer::new(SpectralConfig::new(96, 0))
        .unwrap()
        .transform(&series)
        .unwrap();
    assert_eq!(spec.report().used(), 1);
    assert_relative_eq!(
        spec.total_power(),
        detrended_mean_square(x.view()),
        max_relative = 1e-6
    );
}

#[test]
fn parseval_averages_non_overlapping_segments() {
    let x = noise(192, 16, 7);
    let series = TimeLonSeries::new(x.clone(), 1.0).unwrap();
    let spec = SpectralTransformer::new(SpectralConfig::new(64, 0))
        .unwrap()
        .transform(&series)
        .unwrap();
    assert_eq!(spec.report().used(), 3);
    let expected = (0..3)
        .map(|i| detrended_mean_square(x.slice(s![i * 64..(i + 1) * 64, ..])))
        .sum::<f64>()
        / 3.0;
    assert_relative_eq!(spec.total_power(), expected, max_relative = 1e-6);
    assert!(spec.power().iter().all(|&p| p >= 0.0));
}

#[test]
fn one_missing_segment_is_dropped_and_reported() {
    let mut x = noise(192, 16, 11);
    x[[100, 5]] = f64::NAN;
    let series = TimeLonSeries::new(x.clone(), 1.0).unwrap();
    let spec = SpectralTransformer::new(SpectralConfig::new(64, 0))
        .unwrap()
        .transform(&series)
        .unwrap();
    let report = spec.report();
    assert_eq!(report.total(), 3);
    assert_eq!(report.used(), 2);
    assert_eq!(report.dropped().len(), 1);
    assert_eq!(report.dropped()[0].index, 1);
    assert_eq!(report.filled_cells(), 0);

    let expected = (detrended_mean_square(x.slice(s![0..64, ..]))
        + detrended_mean_square(x.slice(s![128..192, ..])))
        / 2.0;
    assert_relative_eq!(spec.total_power(), expected, max_relative = 1e-6);
}

#[test]
fn short_record_is_an_error() {
    let series = TimeLonSeries::new(noise(50, 8, 1), 1.0).unwrap();
    let err = SpectralTransformer::new(SpectralConfig::default())
        .unwrap()
        .transform(&series)
        .unwrap_err();
    assert_eq!(err, SpectralError::SeriesTooShort { len: 50, min: 96 });
}

fn band_field(seed: u64) -> GridField {
    let lats: Vec<f64> = (-4..=4).map(|j| j as f64 * 2.5).collect();
    let lons: Vec<f64> = (0..16).map(|i| i as f64 * 22.5).collect();
    let time = TimeAxis::regular(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(), 0.0, 1.0, 128).unwrap();
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let values = Array3::from_shape_fn((128, 9, 16), |_| normal.sample(&mut rng));
    GridField::from_time_lat_lon("pr", values, time, lats, lons, 1.0e20).unwrap()
}

#[test]
fn symmetric_plus_antisymmetric_equals_raw() {
    let field = band_field(3);
    let cfg = SpectralConfig::new(64, 32);
    let dec = SpectralTransformer::new(cfg)
        .unwrap()
        .decompose(&field, &LatBand::equatorial(10.0).unwrap(), 0)
        .unwrap();
    let raw = dec.raw.power();
    let sum = &dec.symmetric.power() + &dec.antisymmetric.power();
    let scale = raw.iter().cloned().fold(0.0, f64::max);
    for (a, b) in sum.iter().zip(raw.iter()) {
        assert!((a - b).abs() <= 1e-10 * scale);
    }
    assert_eq!(dec.raw.report().used(), 3);
}

#[test]
fn symmetric_wave_has_no_antisymmetric_power() {
    // Kelvin-like pattern: identical at mirrored latitudes
    let lats: Vec<f64> = (-2..=2).map(|j| j as f64 * 5.0).collect();
    let lons: Vec<f64> = (0..16).map(|i| i as f64 * 22.5).collect();
    let time = TimeAxis::regular(NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(), 0.0, 1.0, 64).unwrap();
    let values = Array3::from_shape_fn((64, 5, 16), |(t, j, l)| {
        let envelope = (-(lats[j] / 10.0_f64).powi(2)).exp();
        envelope * (2.0 * PI * (2.0 * l as f64 / 16.0 - t as f64 / 16.0)).cos()
    });
    let field = GridField::from_time_lat_lon("pr", values, time, lats.clone(), lons, 1.0e20).unwrap();
    let cfg = SpectralConfig::new(64, 0).with_taper_fraction(0.0).with_detrend(Detrend::Mean);
    let dec = SpectralTransformer::new(cfg)
        .unwrap()
        .decompose(&field, &LatBand::equatorial(10.0).unwrap(), 0)
        .unwrap();
    assert!(dec.antisymmetric.total_power() < 1e-20);
    let peak = dec.symmetric.power_at(2, 4).unwrap();
    assert_relative_eq!(peak, dec.symmetric.total_power(), max_relative = 1e-9);
}

#[test]
fn background_is_positive_and_bounded() {
    let field = band_field(5);
    let dec = SpectralTransformer::new(SpectralConfig::new(64, 32))
        .unwrap()
        .decompose(&field, &LatBand::default(), 0)
        .unwrap();
    let source = dec.background_source().unwrap();
    let bg = BackgroundEstimator::default().estimate(&source).unwrap();
    let max_raw = source.power().iter().cloned().fold(0.0, f64::max);
    assert!(bg.floor() > 0.0);
    for &b in bg.power().iter() {
        assert!(b > 0.0);
        assert!(b <= max_raw + bg.floor() + 1e-15);
    }
}

#[test]
fn injected_wave_is_significant() {
    let mut x = noise(256, 16, 99);
    for ((t, l), v) in x.indexed_iter_mut() {
        *v += 3.0 * (2.0 * PI * (4.0 * l as f64 / 16.0 - t as f64 / 8.0)).cos();
    }
    let series = TimeLonSeries::new(x, 1.0).unwrap();
    let spec = SpectralTransformer::new(SpectralConfig::new(64, 32))
        .unwrap()
        .transform(&series)
        .unwrap();
    let bg = BackgroundEstimator::default().estimate(&spec).unwrap();
    let norm = normalize(&spec, &bg, Significance::ChiSquared { confidence: 0.99 }).unwrap();
    // 1/8 cpd on 64-sample segments is frequency index 8
    let w = spec.axes().wavenumber_index(4).unwrap();
    assert!(norm.ratio()[[w, 8]] > norm.threshold());
    assert!(norm.significant_bins().contains(&(4, 0.125)));
}

#[test]
fn all_zero_input_rejected_by_background() {
    let series = TimeLonSeries::new(Array2::zeros((64, 8)), 1.0).unwrap();
    let spec = SpectralTransformer::new(SpectralConfig::new(64, 0))
        .unwrap()
        .transform(&series)
        .unwrap();
    let err = BackgroundEstimator::default().estimate(&spec).unwrap_err();
    assert!(matches!(err, SpectralError::NumericalInstability(_)));
}
