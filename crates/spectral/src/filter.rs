//! Wavenumber-frequency band filtering of whole records.

use ccew_grid::TimeLonSeries;
use ndarray::Array2;
use num_complex::Complex;
use tracing::debug;

use crate::config::SpectralConfig;
use crate::error::SpectralError;
use crate::fft::Fft2;
use crate::segment::fill_gaps;
use crate::spectrum::WavenumberFrequencyAxes;

/// Apply the missing-data policy to a whole record.
///
/// Returns the series unchanged when nothing is missing, gap-filled when the
/// missing fraction is within `config.max_missing_fraction()`.
///
/// # Errors
///
/// Returns [`SpectralError::MissingDataExceeded`] for a record with too many
/// missing cells.
pub fn fill_missing(series: &TimeLonSeries, config: &SpectralConfig) -> Result<TimeLonSeries, SpectralError> {
    let missing = series.missing_count();
    if missing == 0 {
        return Ok(series.clone());
    }
    let fraction = missing as f64 / (series.n_time() * series.n_lon()) as f64;
    if fraction > config.max_missing_fraction() {
        return Err(SpectralError::MissingDataExceeded {
            segments: 1,
            threshold: config.max_missing_fraction(),
        });
    }

    let mut values = series.values().to_owned();
    let mut filled = 0;
    for mut col in values.columns_mut() {
        let mut buf = col.to_vec();
        filled += fill_gaps(&mut buf, config.gap_fill());
        for (dst, v) in col.iter_mut().zip(&buf) {
            *dst = *v;
        }
    }
    debug!(filled, fraction, "gap-filled record");
    Ok(TimeLonSeries::new(values, series.samples_per_day())?)
}

/// Keep the space-time components of `series` whose folded `(wavenumber,
/// frequency)` satisfies `keep`, and return the real filtered series.
///
/// The whole record is transformed at once. Missing cells are handled with
/// the transformer's policy: the record is rejected when its missing
/// fraction exceeds `config.max_missing_fraction()` and gap-filled
/// otherwise. Zero-frequency and Nyquist bins are kept when either sign of
/// their wavenumber satisfies `keep`.
///
/// # Errors
///
/// Returns [`SpectralError::MissingDataExceeded`] for a record with too many
/// missing cells.
#[tracing::instrument(skip_all, fields(n_time = series.n_time(), n_lon = series.n_lon()))]
pub fn bandpass<F>(series: &TimeLonSeries, config: &SpectralConfig, keep: F) -> Result<TimeLonSeries, SpectralError>
where
    F: Fn(i32, f64) -> bool,
{
    let (nt, nx) = (series.n_time(), series.n_lon());
    let values = fill_missing(series, config)?.into_values();

    let axes = WavenumberFrequencyAxes::new(nx, nt, series.samples_per_day());
    let mut spec = Fft2::forward(nt, nx).transform_real(values.view())?;
    let self_conjugate = |f: usize| f == 0 || (nt % 2 == 0 && f == nt / 2);

    let mut kept = 0usize;
    for ((j, m), c) in spec.indexed_iter_mut() {
        let (s, f) = if j <= nt / 2 {
            (axes.wavenumber_of(m), j)
        } else {
            (axes.wrap(m as i64), nt - j)
        };
        let freq = axes.frequencies()[f];
        let retain = if self_conjugate(f) {
            keep(s, freq) || keep(-s, freq)
        } else {
            keep(s, freq)
        };
        if retain {
            kept += 1;
        } else {
            *c = Complex::new(0.0, 0.0);
        }
    }
    debug!(kept, total = nt * nx, "band bins retained");

    Fft2::inverse(nt, nx).process(&mut spec)?;
    let norm = 1.0 / (nt * nx) as f64;
    let out: Array2<f64> = spec.mapv(|c| c.re * norm);
    Ok(TimeLonSeries::new(out, series.samples_per_day())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn component(t: usize, l: usize, k: f64, period: f64) -> f64 {
        (2.0 * PI * (k * l as f64 / 16.0 - t as f64 / period)).cos()
    }

    fn mixed() -> TimeLonSeries {
        TimeLonSeries::from_fn(64, 16, 1.0, |(t, l)| component(t, l, 3.0, 8.0) + component(t, l, -2.0, 16.0))
            .unwrap()
    }

    #[test]
    fn keeps_eastward_component_only() {
        let out = bandpass(&mixed(), &SpectralConfig::default(), |s, _| s > 0).unwrap();
        for ((t, l), v) in out.values().indexed_iter() {
            assert_relative_eq!(*v, component(t, l, 3.0, 8.0), epsilon = 1e-9);
        }
    }

    #[test]
    fn frequency_window_selects_slow_component() {
        let out = bandpass(&mixed(), &SpectralConfig::default(), |_, f| f > 0.03 && f < 0.1).unwrap();
        for ((t, l), v) in out.values().indexed_iter() {
            assert_relative_eq!(*v, component(t, l, -2.0, 16.0), epsilon = 1e-9);
        }
    }

    #[test]
    fn missing_record_rejected_by_default() {
        let mut values = mixed().into_values();
        values[[3, 3]] = f64::NAN;
        let series = TimeLonSeries::new(values, 1.0).unwrap();
        let err = bandpass(&series, &SpectralConfig::default(), |_, _| true).unwrap_err();
        assert!(matches!(err, SpectralError::MissingDataExceeded { .. }));

        let lenient = SpectralConfig::default().with_max_missing_fraction(0.01);
        let out = bandpass(&series, &lenient, |_, _| true).unwrap();
        assert!(out.values().iter().all(|v| v.is_finite()));
    }
}
