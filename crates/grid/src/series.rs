//! Time-longitude series and latitude bands.

use ndarray::{Array2, ArrayView2};

use crate::error::GridError;

/// Tolerance in degrees when matching latitudes against band edges and mirrors.
pub(crate) const LAT_TOL: f64 = 1e-6;

/// A latitude band `[south, north]` in degrees, edges inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatBand {
    south: f64,
    north: f64,
}

impl LatBand {
    /// Create a band.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidBand`] if an edge is non-finite, outside
    /// [-90, 90], or `south > north`.
    pub fn new(south: f64, north: f64) -> Result<Self, GridError> {
        let in_range = |v: f64| v.is_finite() && (-90.0..=90.0).contains(&v);
        if !in_range(south) || !in_range(north) || south > north {
            return Err(GridError::InvalidBand { south, north });
        }
        Ok(Self { south, north })
    }

    /// Band symmetric about the equator, `[-half_width, half_width]`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidBand`] for a negative or oversized width.
    pub fn equatorial(half_width: f64) -> Result<Self, GridError> {
        Self::new(-half_width, half_width)
    }

    /// Southern edge.
    pub fn south(&self) -> f64 {
        self.south
    }

    /// Northern edge.
    pub fn north(&self) -> f64 {
        self.north
    }

    /// Returns `true` when `lat` lies inside the band.
    pub fn contains(&self, lat: f64) -> bool {
        lat >= self.south - LAT_TOL && lat <= self.north + LAT_TOL
    }
}

impl Default for LatBand {
    /// The 15S-15N band used for tropical wave spectra.
    fn default() -> Self {
        Self {
            south: -15.0,
            north: 15.0,
        }
    }
}

/// A `(time, lon)` array sampled at a fixed interval.
///
/// Missing samples are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeLonSeries {
    values: Array2<f64>,
    samples_per_day: f64,
}

impl TimeLonSeries {
    /// Wrap a `(time, lon)` array.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Validation`] if the array is empty or the
    /// sampling rate is not a positive finite number.
    pub fn new(values: Array2<f64>, samples_per_day: f64) -> Result<Self, GridError> {
        let (nt, nl) = values.dim();
        let mut problems = Vec::new();
        if nt == 0 || nl == 0 {
            problems.push(format!("series shape ({nt}, {nl}) is empty"));
        }
        if !samples_per_day.is_finite() || samples_per_day <= 0.0 {
            problems.push(format!("samples per day {samples_per_day} must be positive"));
        }
        if !problems.is_empty() {
            return Err(GridError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            });
        }
        Ok(Self {
            values,
            samples_per_day,
        })
    }

    /// Build a series by evaluating `f(time_index, lon_index)`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`TimeLonSeries::new`].
    pub fn from_fn<F>(n_time: usize, n_lon: usize, samples_per_day: f64, f: F) -> Result<Self, GridError>
    where
        F: FnMut((usize, usize)) -> f64,
    {
        Self::new(Array2::from_shape_fn((n_time, n_lon), f), samples_per_day)
    }

    /// The `(time, lon)` values.
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Consume the series and return the array.
    pub fn into_values(self) -> Array2<f64> {
        self.values
    }

    /// Number of time steps.
    pub fn n_time(&self) -> usize {
        self.values.nrows()
    }

    /// Number of longitudes.
    pub fn n_lon(&self) -> usize {
        self.values.ncols()
    }

    /// Samples per day.
    pub fn samples_per_day(&self) -> f64 {
        self.samples_per_day
    }

    /// Sampling interval in days.
    pub fn step_days(&self) -> f64 {
        1.0 / self.samples_per_day
    }

    /// Number of NaN cells.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_finite()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_validation() {
        assert!(LatBand::new(-10.0, 10.0).is_ok());
        assert!(LatBand::new(10.0, -10.0).is_err());
        assert!(LatBand::new(-95.0, 10.0).is_err());
        assert!(LatBand::new(f64::NAN, 10.0).is_err());
        assert!(LatBand::equatorial(-1.0).is_err());
    }

    #[test]
    fn band_contains_edges() {
        let band = LatBand::equatorial(15.0).unwrap();
        assert!(band.contains(15.0));
        assert!(band.contains(-15.0));
        assert!(!band.contains(17.5));
    }

    #[test]
    fn default_band_is_15s_15n() {
        let band = LatBand::default();
        assert_eq!(band.south(), -15.0);
        assert_eq!(band.north(), 15.0);
    }

    #[test]
    fn series_rejects_bad_sampling() {
        let values = Array2::zeros((4, 4));
        assert!(TimeLonSeries::new(values.clone(), 0.0).is_err());
        assert!(TimeLonSeries::new(Array2::zeros((0, 4)), 1.0).is_err());
        assert!(TimeLonSeries::new(values, 4.0).is_ok());
    }

    #[test]
    fn series_counts_missing() {
        let s = TimeLonSeries::from_fn(3, 2, 1.0, |(t, l)| if t == l { f64::NAN } else { 1.0 })
            .unwrap();
        assert_eq!(s.missing_count(), 2);
        assert_eq!(s.n_time(), 3);
        assert_eq!(s.n_lon(), 2);
        assert_eq!(s.step_days(), 1.0);
    }
}
