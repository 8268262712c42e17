//! The gridded field container.

use chrono::NaiveDate;
use ndarray::{Array2, Array3, Array4, ArrayView2, ArrayView4, Axis, s};
use tracing::debug;

use crate::error::GridError;
use crate::series::{LAT_TOL, LatBand, TimeLonSeries};
use crate::time::TimeAxis;
use crate::validate::{ValidationCollector, validate_monotonic, validate_regular};

/// Relative tolerance when comparing a value against the fill value.
const FILL_TOL: f64 = 1e-6;

/// Symmetric and antisymmetric rows for one latitude `|lat|` of a band.
#[derive(Debug, Clone)]
pub struct SymmetricPair {
    /// Absolute latitude of the pair.
    pub lat: f64,
    /// `(f(lat) + f(-lat)) / 2`, or the equator row itself.
    pub symmetric: TimeLonSeries,
    /// `(f(lat) - f(-lat)) / 2`; `None` on the equator.
    pub antisymmetric: Option<TimeLonSeries>,
}

/// A gridded physical field indexed `(time, level, lat, lon)`.
///
/// Fields without a vertical axis carry a level dimension of length one
/// and report `levels() == None`. A cell is missing when it is non-finite
/// or equal to the fill value. The field is immutable after construction;
/// selection methods return new fields.
#[derive(Debug, Clone)]
pub struct GridField {
    name: String,
    units: Option<String>,
    values: Array4<f64>,
    time: TimeAxis,
    levels: Option<Vec<f64>>,
    lats: Vec<f64>,
    lons: Vec<f64>,
    fill_value: f64,
}

impl GridField {
    /// Create a field after validating array shape against every axis.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DimensionMismatch`] if an array dimension
    /// disagrees with its axis, and [`GridError::Validation`] if latitudes
    /// are not strictly monotonic, longitudes not strictly increasing and
    /// regular, or levels not strictly monotonic.
    pub fn new(
        name: impl Into<String>,
        values: Array4<f64>,
        time: TimeAxis,
        levels: Option<Vec<f64>>,
        lats: Vec<f64>,
        lons: Vec<f64>,
        fill_value: f64,
    ) -> Result<Self, GridError> {
        let (nt, nz, ny, nx) = values.dim();
        let n_levels = levels.as_ref().map_or(1, Vec::len);

        for (dim, expected, got) in [
            ("time", time.len(), nt),
            ("level", n_levels, nz),
            ("lat", lats.len(), ny),
            ("lon", lons.len(), nx),
        ] {
            if expected != got {
                return Err(GridError::DimensionMismatch {
                    name: dim.to_string(),
                    expected,
                    got,
                });
            }
        }

        let mut c = ValidationCollector::new();
        c.merge(validate_monotonic("lat", &lats, false));
        c.merge(validate_monotonic("lon", &lons, true));
        c.merge(validate_regular("lon", &lons));
        if let Some(levels) = &levels {
            c.merge(validate_monotonic("level", levels, false));
        }
        c.finish()?;

        Ok(Self {
            name: name.into(),
            units: None,
            values,
            time,
            levels,
            lats,
            lons,
            fill_value,
        })
    }

    /// Create a single-level field from a `(time, lat, lon)` array.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GridField::new`].
    pub fn from_time_lat_lon(
        name: impl Into<String>,
        values: Array3<f64>,
        time: TimeAxis,
        lats: Vec<f64>,
        lons: Vec<f64>,
        fill_value: f64,
    ) -> Result<Self, GridError> {
        Self::new(
            name,
            values.insert_axis(Axis(1)),
            time,
            None,
            lats,
            lons,
            fill_value,
        )
    }

    /// Attach a units string.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Rename the field.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Variable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Units string, if known.
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// The `(time, level, lat, lon)` values.
    pub fn values(&self) -> ArrayView4<'_, f64> {
        self.values.view()
    }

    /// Time axis.
    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    /// Vertical axis, if any.
    pub fn levels(&self) -> Option<&[f64]> {
        self.levels.as_deref()
    }

    /// Latitudes in degrees.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Longitudes in degrees.
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Fill-value sentinel.
    pub fn fill_value(&self) -> f64 {
        self.fill_value
    }

    /// Number of time steps.
    pub fn n_time(&self) -> usize {
        self.values.dim().0
    }

    /// Number of levels (1 without a vertical axis).
    pub fn n_levels(&self) -> usize {
        self.values.dim().1
    }

    /// Number of latitudes.
    pub fn n_lat(&self) -> usize {
        self.values.dim().2
    }

    /// Number of longitudes.
    pub fn n_lon(&self) -> usize {
        self.values.dim().3
    }

    /// Returns `true` if `v` is non-finite or equals the fill value.
    pub fn is_missing(&self, v: f64) -> bool {
        !v.is_finite() || (v - self.fill_value).abs() <= FILL_TOL * self.fill_value.abs().max(1.0)
    }

    /// Number of missing cells in the whole field.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|&&v| self.is_missing(v)).count()
    }

    /// Index of the level equal to `level`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::NoLevelAxis`] for a field without levels and
    /// [`GridError::LevelNotFound`] when no level matches exactly.
    pub fn level_index(&self, level: f64) -> Result<usize, GridError> {
        let levels = self.levels.as_ref().ok_or_else(|| GridError::NoLevelAxis {
            name: self.name.clone(),
        })?;
        levels
            .iter()
            .position(|&l| (l - level).abs() <= 1e-9 * level.abs().max(1.0))
            .ok_or(GridError::LevelNotFound { level })
    }

    /// Single-level field at `level`; no vertical interpolation is attempted.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GridField::level_index`].
    pub fn extract_level(&self, level: f64) -> Result<GridField, GridError> {
        let k = self.level_index(level)?;
        let values = self.values.slice(s![.., k..k + 1, .., ..]).to_owned();
        Ok(Self {
            name: self.name.clone(),
            units: self.units.clone(),
            values,
            time: self.time.clone(),
            levels: Some(vec![level]),
            lats: self.lats.clone(),
            lons: self.lons.clone(),
            fill_value: self.fill_value,
        })
    }

    /// Field trimmed to the days `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::TimeRangeOutside`] when the data does not cover
    /// the requested range.
    pub fn crop_time(&self, start: NaiveDate, end: NaiveDate) -> Result<GridField, GridError> {
        let range = self.time.range_indices(start, end)?;
        debug!(
            field = %self.name,
            from = self.n_time(),
            to = range.len(),
            %start,
            %end,
            "cropping time axis"
        );
        let values = self.values.slice(s![range.clone(), .., .., ..]).to_owned();
        Ok(Self {
            name: self.name.clone(),
            units: self.units.clone(),
            values,
            time: self.time.slice(range),
            levels: self.levels.clone(),
            lats: self.lats.clone(),
            lons: self.lons.clone(),
            fill_value: self.fill_value,
        })
    }

    /// Apply `v * scale + offset` to every present cell; missing cells keep
    /// their sentinel.
    pub fn map_values(&self, scale: f64, offset: f64) -> GridField {
        let mut out = self.clone();
        let fill = self.fill_value;
        out.values.mapv_inplace(|v| {
            if self.is_missing(v) {
                if v.is_finite() { fill } else { v }
            } else {
                v * scale + offset
            }
        });
        out
    }

    fn check_level(&self, level: usize) -> Result<(), GridError> {
        if level >= self.n_levels() {
            return Err(GridError::LevelIndexOutOfRange {
                index: level,
                n_levels: self.n_levels(),
            });
        }
        Ok(())
    }

    fn samples_per_day(&self) -> f64 {
        self.time.samples_per_day().unwrap_or(1.0)
    }

    /// `(time, lat, lon)` view at a level index, missing cells untouched.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LevelIndexOutOfRange`] for a bad index.
    pub fn level_slice(&self, level: usize) -> Result<ndarray::ArrayView3<'_, f64>, GridError> {
        self.check_level(level)?;
        Ok(self.values.slice(s![.., level, .., ..]))
    }

    /// `(time, lon)` row at one latitude index with missing cells as NaN.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::LevelIndexOutOfRange`] or
    /// [`GridError::DimensionMismatch`] for out-of-range indices.
    pub fn time_lon_row(&self, level: usize, lat_index: usize) -> Result<TimeLonSeries, GridError> {
        self.check_level(level)?;
        if lat_index >= self.n_lat() {
            return Err(GridError::DimensionMismatch {
                name: "lat index".into(),
                expected: self.n_lat(),
                got: lat_index,
            });
        }
        let row: ArrayView2<'_, f64> = self.values.slice(s![.., level, lat_index, ..]);
        let clean = row.mapv(|v| if self.is_missing(v) { f64::NAN } else { v });
        TimeLonSeries::new(clean, self.samples_per_day())
    }

    fn band_indices(&self, band: &LatBand) -> Result<Vec<usize>, GridError> {
        let idx: Vec<usize> = self
            .lats
            .iter()
            .enumerate()
            .filter(|&(_, &lat)| band.contains(lat))
            .map(|(i, _)| i)
            .collect();
        if idx.is_empty() {
            return Err(GridError::EmptyBand {
                south: band.south(),
                north: band.north(),
            });
        }
        Ok(idx)
    }

    /// Individual latitude rows inside `band`, paired with their latitude.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyBand`] if no latitude lies in the band.
    pub fn band_rows(&self, band: &LatBand, level: usize) -> Result<Vec<(f64, TimeLonSeries)>, GridError> {
        self.check_level(level)?;
        self.band_indices(band)?
            .into_iter()
            .map(|i| Ok((self.lats[i], self.time_lon_row(level, i)?)))
            .collect()
    }

    /// Unweighted average across the latitudes inside `band`.
    ///
    /// Missing cells are skipped; a `(time, lon)` cell missing at every
    /// latitude stays NaN.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyBand`] if no latitude lies in the band.
    pub fn band_average(&self, band: &LatBand, level: usize) -> Result<TimeLonSeries, GridError> {
        self.check_level(level)?;
        let idx = self.band_indices(band)?;
        let (nt, _, _, nx) = self.values.dim();

        let mut sum = Array2::<f64>::zeros((nt, nx));
        let mut count = Array2::<usize>::zeros((nt, nx));
        for &j in &idx {
            let row = self.values.slice(s![.., level, j, ..]);
            for ((t, x), &v) in row.indexed_iter() {
                if !self.is_missing(v) {
                    sum[[t, x]] += v;
                    count[[t, x]] += 1;
                }
            }
        }

        let avg = Array2::from_shape_fn((nt, nx), |(t, x)| {
            let n = count[[t, x]];
            if n == 0 { f64::NAN } else { sum[[t, x]] / n as f64 }
        });
        TimeLonSeries::new(avg, self.samples_per_day())
    }

    /// Symmetric/antisymmetric rows about the equator for every `|lat|` in
    /// `band`.
    ///
    /// Pairs are returned with increasing `|lat|`. A missing cell in either
    /// mirror row makes both components missing.
    ///
    /// Spectral decomposition does not go through this: it mirrors rows in
    /// wavenumber-frequency space. These grid-space components serve callers
    /// that need symmetric or antisymmetric fields directly.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyBand`] if no latitude lies in the band and
    /// [`GridError::AsymmetricLatitudes`] when a latitude has no mirror.
    pub fn symmetric_pairs(&self, band: &LatBand, level: usize) -> Result<Vec<SymmetricPair>, GridError> {
        let rows = self.band_rows(band, level)?;
        let lats: Vec<f64> = rows.iter().map(|(lat, _)| *lat).collect();

        let mut pairs = Vec::new();
        for (north, south) in mirror_pairs(&lats)? {
            let (lat, north_row) = &rows[north];
            let Some(south) = south else {
                pairs.push(SymmetricPair {
                    lat: 0.0,
                    symmetric: north_row.clone(),
                    antisymmetric: None,
                });
                continue;
            };
            let n = north_row.values();
            let sv = rows[south].1.values();
            let sym = (&n + &sv).mapv(|v| v / 2.0);
            let anti = (&n - &sv).mapv(|v| v / 2.0);
            pairs.push(SymmetricPair {
                lat: *lat,
                symmetric: TimeLonSeries::new(sym, north_row.samples_per_day())?,
                antisymmetric: Some(TimeLonSeries::new(anti, north_row.samples_per_day())?),
            });
        }
        Ok(pairs)
    }
}

/// Pair every latitude `>= 0` with its mirror across the equator.
///
/// Returns `(north, Some(south))` index pairs into `lats`, or `(equator,
/// None)` for a latitude on the equator, ordered by increasing `|lat|`.
///
/// # Errors
///
/// Returns [`GridError::AsymmetricLatitudes`] when any latitude lacks a
/// mirror.
pub fn mirror_pairs(lats: &[f64]) -> Result<Vec<(usize, Option<usize>)>, GridError> {
    let find = |target: f64| lats.iter().position(|lat| (lat - target).abs() <= LAT_TOL);

    for &lat in lats {
        if lat.abs() > LAT_TOL && find(-lat).is_none() {
            return Err(GridError::AsymmetricLatitudes { lat, mirror: -lat });
        }
    }

    let mut northern: Vec<usize> = (0..lats.len()).filter(|&i| lats[i] >= -LAT_TOL).collect();
    northern.sort_by(|&a, &b| lats[a].total_cmp(&lats[b]));

    Ok(northern
        .into_iter()
        .map(|i| {
            if lats[i].abs() <= LAT_TOL {
                (i, None)
            } else {
                (i, find(-lats[i]))
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn axis(n: usize) -> TimeAxis {
        TimeAxis::regular(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), 0.0, 1.0, n).unwrap()
    }

    fn lons(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 * 360.0 / n as f64).collect()
    }

    #[test]
    fn new_rejects_shape_mismatch() {
        let values = Array3::<f64>::zeros((4, 3, 8));
        let err = GridField::from_time_lat_lon("pr", values, axis(4), vec![-5.0, 0.0, 5.0], lons(6), -999.0)
            .unwrap_err();
        assert_eq!(
            err,
            GridError::DimensionMismatch {
                name: "lon".into(),
                expected: 6,
                got: 8
            }
        );
    }

    #[test]
    fn new_accumulates_axis_problems() {
        let values = Array3::<f64>::zeros((4, 3, 4));
        let err = GridField::from_time_lat_lon(
            "pr",
            values,
            axis(4),
            vec![0.0, 0.0, 5.0],
            vec![0.0, 90.0, 80.0, 270.0],
            -999.0,
        )
        .unwrap_err();
        match err {
            GridError::Validation { count, .. } => assert!(count >= 2),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_detection_uses_fill_value() {
        let mut values = Array3::<f64>::ones((2, 1, 4));
        values[[0, 0, 1]] = 1.0e20;
        values[[1, 0, 2]] = f64::NAN;
        let f = GridField::from_time_lat_lon("pr", values, axis(2), vec![0.0], lons(4), 1.0e20).unwrap();
        assert!(f.is_missing(1.0e20));
        assert!(f.is_missing(1.0000001e20));
        assert!(!f.is_missing(1.0));
        assert_eq!(f.missing_count(), 2);
    }

    #[test]
    fn band_average_skips_missing() {
        let mut values = Array3::<f64>::zeros((1, 3, 2));
        values[[0, 0, 0]] = 1.0;
        values[[0, 1, 0]] = 3.0;
        values[[0, 2, 0]] = -999.0;
        values[[0, 0, 1]] = -999.0;
        values[[0, 1, 1]] = -999.0;
        values[[0, 2, 1]] = -999.0;
        let f = GridField::from_time_lat_lon("pr", values, axis(1), vec![-5.0, 0.0, 5.0], lons(2), -999.0)
            .unwrap();
        let avg = f.band_average(&LatBand::equatorial(10.0).unwrap(), 0).unwrap();
        assert_relative_eq!(avg.values()[[0, 0]], 2.0);
        assert!(avg.values()[[0, 1]].is_nan());
    }

    #[test]
    fn symmetric_pairs_split_mirror_rows() {
        // lat -5 holds 1.0, lat 0 holds 2.0, lat 5 holds 3.0
        let values = Array3::from_shape_fn((2, 3, 4), |(_, j, _)| [1.0, 2.0, 3.0][j]);
        let f = GridField::from_time_lat_lon("pr", values, axis(2), vec![-5.0, 0.0, 5.0], lons(4), -999.0)
            .unwrap();
        let pairs = f.symmetric_pairs(&LatBand::equatorial(5.0).unwrap(), 0).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].lat, 0.0);
        assert!(pairs[0].antisymmetric.is_none());
        assert_relative_eq!(pairs[1].symmetric.values()[[0, 0]], 2.0);
        assert_relative_eq!(
            pairs[1].antisymmetric.as_ref().unwrap().values()[[0, 0]],
            1.0
        );
    }

    #[test]
    fn symmetric_pairs_require_mirror() {
        let values = Array3::<f64>::zeros((2, 2, 4));
        let f = GridField::from_time_lat_lon("pr", values, axis(2), vec![-5.0, 2.5], lons(4), -999.0).unwrap();
        let err = f.symmetric_pairs(&LatBand::equatorial(5.0).unwrap(), 0).unwrap_err();
        assert!(matches!(err, GridError::AsymmetricLatitudes { .. }));
    }

    #[test]
    fn extract_level_exact_match_only() {
        let values = Array4::from_shape_fn((2, 3, 1, 4), |(_, k, _, _)| k as f64);
        let f = GridField::new(
            "ta",
            values,
            axis(2),
            Some(vec![1000.0, 850.0, 500.0]),
            vec![0.0],
            lons(4),
            -999.0,
        )
        .unwrap();
        let f850 = f.extract_level(850.0).unwrap();
        assert_eq!(f850.n_levels(), 1);
        assert_eq!(f850.levels(), Some(&[850.0][..]));
        assert_relative_eq!(f850.values()[[1, 0, 0, 3]], 1.0);
        assert_eq!(f.extract_level(700.0).unwrap_err(), GridError::LevelNotFound { level: 700.0 });
    }

    #[test]
    fn level_requests_on_surface_field() {
        let f = GridField::from_time_lat_lon("pr", Array3::zeros((2, 1, 4)), axis(2), vec![0.0], lons(4), -999.0)
            .unwrap();
        assert!(matches!(f.level_index(850.0), Err(GridError::NoLevelAxis { .. })));
        assert!(matches!(
            f.band_rows(&LatBand::default(), 1),
            Err(GridError::LevelIndexOutOfRange { index: 1, n_levels: 1 })
        ));
    }

    #[test]
    fn crop_time_keeps_requested_days() {
        let values = Array3::from_shape_fn((10, 1, 2), |(t, _, _)| t as f64);
        let f = GridField::from_time_lat_lon("pr", values, axis(10), vec![0.0], lons(2), -999.0).unwrap();
        let d = |day| NaiveDate::from_ymd_opt(2000, 1, day).unwrap();
        let c = f.crop_time(d(3), d(5)).unwrap();
        assert_eq!(c.n_time(), 3);
        assert_relative_eq!(c.values()[[0, 0, 0, 0]], 2.0);
        assert_relative_eq!(c.time().offsets()[0], 2.0);
    }

    #[test]
    fn map_values_preserves_missing() {
        let mut values = Array3::<f64>::ones((1, 1, 2));
        values[[0, 0, 1]] = -999.0;
        let f = GridField::from_time_lat_lon("pr", values, axis(1), vec![0.0], lons(2), -999.0).unwrap();
        let g = f.map_values(86400.0, 0.0);
        assert_relative_eq!(g.values()[[0, 0, 0, 0]], 86400.0);
        assert_relative_eq!(g.values()[[0, 0, 0, 1]], -999.0);
    }
}
