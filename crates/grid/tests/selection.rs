//! Integration tests for chaining field selections.

use approx::assert_relative_eq;
use ccew_grid::{GridError, GridField, LatBand, TimeAxis};
use chrono::NaiveDate;
use ndarray::Array4;

fn field() -> GridField {
    let origin = NaiveDate::from_ymd_opt(1998, 1, 1).unwrap();
    let time = TimeAxis::regular(origin, 0.0, 1.0, 60).unwrap();
    let lats: Vec<f64> = (-4..=4).map(|j| j as f64 * 2.5).collect();
    let lons: Vec<f64> = (0..16).map(|i| i as f64 * 22.5).collect();
    let levels = vec![1000.0, 850.0, 500.0, 200.0];
    // value encodes (level, lat) so selections can be checked exactly
    let values = Array4::from_shape_fn((60, 4, 9, 16), |(t, k, j, _)| {
        100.0 * k as f64 + lats[j] + 0.001 * t as f64
    });
    GridField::new("ta", values, time, Some(levels), lats.clone(), lons, 1.0e20).unwrap()
}

#[test]
fn crop_then_extract_then_band_average() {
    let f = field();
    let d = |m, day| NaiveDate::from_ymd_opt(1998, m, day).unwrap();
    let cropped = f.crop_time(d(1, 11), d(2, 9)).unwrap();
    assert_eq!(cropped.n_time(), 30);

    let at500 = cropped.extract_level(500.0).unwrap();
    let avg = at500.band_average(&LatBand::equatorial(10.0).unwrap(), 0).unwrap();
    assert_eq!(avg.n_time(), 30);
    assert_eq!(avg.n_lon(), 16);
    // symmetric band cancels the latitude term
    assert_relative_eq!(avg.values()[[0, 3]], 200.0 + 0.010, epsilon = 1e-9);
}

#[test]
fn symmetric_components_reconstruct_rows() {
    let f = field();
    let band = LatBand::equatorial(5.0).unwrap();
    let rows = f.band_rows(&band, 1).unwrap();
    let pairs = f.symmetric_pairs(&band, 1).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(pairs.len(), 3);

    for pair in pairs.iter().filter(|p| p.lat > 0.0) {
        let north = rows.iter().find(|(lat, _)| *lat == pair.lat).unwrap();
        let anti = pair.antisymmetric.as_ref().unwrap();
        let rebuilt = &pair.symmetric.values() + &anti.values();
        for (a, b) in rebuilt.iter().zip(north.1.values().iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }
}

#[test]
fn requested_range_outside_data() {
    let f = field();
    let err = f
        .crop_time(
            NaiveDate::from_ymd_opt(1998, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(1998, 6, 1).unwrap(),
        )
        .unwrap_err();
    assert!(matches!(err, GridError::TimeRangeOutside { .. }));
}

#[test]
fn empty_band_is_reported() {
    let f = field();
    let band = LatBand::new(30.0, 40.0).unwrap();
    assert!(matches!(
        f.band_average(&band, 0),
        Err(GridError::EmptyBand { .. })
    ));
}
