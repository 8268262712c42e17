//! Space-time spectral transformer.

use ccew_grid::{GridField, LatBand, TimeLonSeries, mirror_pairs};
use ndarray::{Array2, ArrayView2};
use num_complex::Complex;
use tracing::debug;

use crate::config::SpectralConfig;
use crate::error::SpectralError;
use crate::fft::Fft2;
use crate::segment::{SegmentReport, prepare_segments};
use crate::spectrum::{Component, SymmetricDecomposition, WavenumberFrequencyAxes, WavenumberFrequencySpectrum};

/// Computes segment-averaged wavenumber-frequency power spectra.
///
/// Each used segment is scaled so its total power equals the mean square of
/// its detrended, untapered samples; the estimate is the mean over used
/// segments, so total power matches the time-domain variance.
#[derive(Debug, Clone)]
pub struct SpectralTransformer {
    config: SpectralConfig,
}

/// Folded power of the row spectra summed over rows, before the
/// per-segment variance rescale.
fn folded_power(axes: &WavenumberFrequencyAxes, spectra: &[Array2<Complex<f64>>], norm: f64) -> Array2<f64> {
    let mut power = Array2::<f64>::zeros((axes.n_wavenumbers(), axes.n_frequencies()));
    for x in spectra {
        axes.fold_into(x, &mut power, |c| c.norm_sqr() * norm);
    }
    power
}

/// Factor bringing a segment's folded total onto its untapered variance.
/// Without a taper it is 1 up to rounding.
fn segment_scale(target_variance: f64, folded_total: f64) -> f64 {
    if folded_total > 0.0 {
        target_variance / folded_total
    } else {
        0.0
    }
}

struct Accumulated {
    raw: Array2<f64>,
    symmetric: Array2<f64>,
    antisymmetric: Array2<f64>,
    axes: WavenumberFrequencyAxes,
    report: SegmentReport,
}

impl SpectralTransformer {
    /// Create a transformer.
    ///
    /// # Errors
    ///
    /// Returns the configuration's validation error.
    pub fn new(config: SpectralConfig) -> Result<Self, SpectralError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &SpectralConfig {
        &self.config
    }

    /// Raw power spectrum of one time-longitude series.
    ///
    /// # Errors
    ///
    /// Returns [`SpectralError::SeriesTooShort`] when no segment fits and
    /// [`SpectralError::MissingDataExceeded`] when every segment is dropped.
    #[tracing::instrument(skip_all, fields(n_time = series.n_time(), n_lon = series.n_lon()))]
    pub fn transform(&self, series: &TimeLonSeries) -> Result<WavenumberFrequencySpectrum, SpectralError> {
        let acc = self.accumulate(&[series.values()], &[], series.samples_per_day())?;
        Ok(WavenumberFrequencySpectrum::new(
            acc.raw,
            acc.axes,
            Component::Raw,
            acc.report,
        ))
    }

    /// Raw, symmetric and antisymmetric spectra of the latitude rows of
    /// `band` at a level index.
    ///
    /// The raw spectrum is the average of the per-row spectra; the
    /// symmetric and antisymmetric spectra are built from the mirrored row
    /// pairs and normalized by the same row count, so they add up to raw.
    ///
    /// # Errors
    ///
    /// Propagates field selection errors (empty band, missing mirror
    /// latitude) plus the conditions of [`SpectralTransformer::transform`].
    #[tracing::instrument(skip_all, fields(field = field.name(), level = level))]
    pub fn decompose(
        &self,
        field: &GridField,
        band: &LatBand,
        level: usize,
    ) -> Result<SymmetricDecomposition, SpectralError> {
        let rows = field.band_rows(band, level)?;
        let lats: Vec<f64> = rows.iter().map(|(lat, _)| *lat).collect();
        let pairs = mirror_pairs(&lats)?;
        let views: Vec<ArrayView2<'_, f64>> = rows.iter().map(|(_, s)| s.values()).collect();
        let spd = rows[0].1.samples_per_day();

        let acc = self.accumulate(&views, &pairs, spd)?;
        let spectrum = |power, component| {
            WavenumberFrequencySpectrum::new(power, acc.axes.clone(), component, acc.report.clone())
        };
        Ok(SymmetricDecomposition {
            raw: spectrum(acc.raw, Component::Raw),
            symmetric: spectrum(acc.symmetric, Component::Symmetric),
            antisymmetric: spectrum(acc.antisymmetric, Component::Antisymmetric),
        })
    }

    fn accumulate(
        &self,
        rows: &[ArrayView2<'_, f64>],
        pairs: &[(usize, Option<usize>)],
        samples_per_day: f64,
    ) -> Result<Accumulated, SpectralError> {
        let (segments, report) = prepare_segments(&self.config, rows)?;
        let length = self.config.segment_length();
        let n_lon = rows[0].ncols();
        let axes = WavenumberFrequencyAxes::new(n_lon, length, samples_per_day);
        let fft = Fft2::forward(length, n_lon);
        let shape = (axes.n_wavenumbers(), axes.n_frequencies());
        let norm = 1.0 / ((length * n_lon) as f64).powi(2);
        let n_rows = rows.len() as f64;

        let mut raw = Array2::<f64>::zeros(shape);
        let mut symmetric = Array2::<f64>::zeros(shape);
        let mut antisymmetric = Array2::<f64>::zeros(shape);

        for seg in &segments {
            let spectra = seg
                .rows
                .iter()
                .map(|r| fft.transform_real(r.view()))
                .collect::<Result<Vec<_>, _>>()?;
            let seg_raw = folded_power(&axes, &spectra, norm);

            let mut seg_sym = Array2::<f64>::zeros(shape);
            let mut seg_anti = Array2::<f64>::zeros(shape);
            for &(north, south) in pairs {
                match south {
                    None => axes.fold_into(&spectra[north], &mut seg_sym, |c| c.norm_sqr() * norm),
                    Some(south) => {
                        let sym = (&spectra[north] + &spectra[south]).mapv(|c| c * 0.5);
                        let anti = (&spectra[north] - &spectra[south]).mapv(|c| c * 0.5);
                        axes.fold_into(&sym, &mut seg_sym, |c| 2.0 * c.norm_sqr() * norm);
                        axes.fold_into(&anti, &mut seg_anti, |c| 2.0 * c.norm_sqr() * norm);
                    }
                }
            }

            let scale = segment_scale(seg.target_variance, seg_raw.sum());
            debug!(start = seg.start, scale, "segment normalization");
            raw.scaled_add(scale / n_rows, &seg_raw);
            symmetric.scaled_add(scale / n_rows, &seg_sym);
            antisymmetric.scaled_add(scale / n_rows, &seg_anti);
        }

        let used = segments.len() as f64;
        for a in [&mut raw, &mut symmetric, &mut antisymmetric] {
            a.mapv_inplace(|v| v / used);
        }

        Ok(Accumulated {
            raw,
            symmetric,
            antisymmetric,
            axes,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Detrend;
    use approx::assert_relative_eq;
    use ccew_stats::population_variance;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};
    use std::f64::consts::PI;

    fn wave(n_time: usize, n_lon: usize, k: f64, period_days: f64) -> TimeLonSeries {
        TimeLonSeries::from_fn(n_time, n_lon, 1.0, |(t, l)| {
            let lon = 2.0 * PI * l as f64 / n_lon as f64;
            (k * lon - 2.0 * PI * t as f64 / period_days).cos()
        })
        .unwrap()
    }

    #[test]
    fn eastward_wave_peaks_at_positive_wavenumber() {
        let cfg = SpectralConfig::new(64, 0).with_taper_fraction(0.0).with_detrend(Detrend::Mean);
        let spec = SpectralTransformer::new(cfg).unwrap().transform(&wave(64, 16, 3.0, 8.0)).unwrap();
        // period 8 days on 64 samples is frequency index 8
        let peak = spec.power_at(3, 8).unwrap();
        assert_relative_eq!(peak, spec.total_power(), epsilon = 1e-9);
        assert_relative_eq!(peak, 0.5, epsilon = 1e-9);
        assert!(spec.power_at(-3, 8).unwrap() < 1e-20);
    }

    #[test]
    fn westward_wave_peaks_at_negative_wavenumber() {
        let cfg = SpectralConfig::new(64, 0).with_taper_fraction(0.0).with_detrend(Detrend::Mean);
        let spec = SpectralTransformer::new(cfg).unwrap().transform(&wave(64, 16, -5.0, 4.0)).unwrap();
        assert_relative_eq!(spec.power_at(-5, 16).unwrap(), 0.5, epsilon = 1e-9);
    }

    fn noise(n_time: usize, n_lon: usize, seed: u64) -> Array2<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Normal::new(2.0, 1.5).unwrap();
        Array2::from_shape_fn((n_time, n_lon), |_| dist.sample(&mut rng))
    }

    // Folded power with no rescale must already equal the mean over
    // longitudes of each column's population variance.
    fn check_unscaled_fold(n_time: usize, n_lon: usize, seed: u64) {
        let x = noise(n_time, n_lon, seed);
        let cfg = SpectralConfig::new(n_time, 0)
            .with_taper_fraction(0.0)
            .with_detrend(Detrend::Mean);
        let (segments, _) = prepare_segments(&cfg, &[x.view()]).unwrap();
        let axes = WavenumberFrequencyAxes::new(n_lon, n_time, 1.0);
        let spectra = vec![Fft2::forward(n_time, n_lon).transform_real(segments[0].rows[0].view()).unwrap()];
        let norm = 1.0 / ((n_time * n_lon) as f64).powi(2);
        let total = folded_power(&axes, &spectra, norm).sum();

        let expected = x
            .columns()
            .into_iter()
            .map(|c| population_variance(&c.to_vec()))
            .sum::<f64>()
            / n_lon as f64;
        assert_relative_eq!(total, expected, max_relative = 1e-12);
        assert_relative_eq!(segment_scale(segments[0].target_variance, total), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn untapered_fold_conserves_variance_even_sizes() {
        check_unscaled_fold(64, 16, 3);
    }

    #[test]
    fn untapered_fold_conserves_variance_odd_sizes() {
        check_unscaled_fold(45, 15, 5);
    }

    #[test]
    fn empty_segment_has_zero_scale() {
        assert_eq!(segment_scale(0.0, 0.0), 0.0);
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(SpectralTransformer::new(SpectralConfig::new(10, 10)).is_err());
    }
}
