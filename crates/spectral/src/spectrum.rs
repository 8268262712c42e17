//! Wavenumber-frequency spectra and their axes.

use ndarray::{Array2, ArrayView2, Zip};
use num_complex::Complex;

use crate::error::SpectralError;
use crate::segment::SegmentReport;

/// Axes of a folded wavenumber-frequency spectrum.
///
/// Wavenumbers are the `n_lon` integers `-(n_lon / 2) ..= (n_lon - 1) / 2`
/// in cycles per globe, positive for eastward propagation. Frequencies are
/// `0 ..= segment_length / 2` bins at `j / (segment_length * dt)` cycles
/// per day.
#[derive(Debug, Clone, PartialEq)]
pub struct WavenumberFrequencyAxes {
    n_lon: usize,
    segment_length: usize,
    wavenumbers: Vec<i32>,
    frequencies: Vec<f64>,
}

impl WavenumberFrequencyAxes {
    /// Axes for segments of `segment_length` samples on `n_lon` longitudes.
    pub fn new(n_lon: usize, segment_length: usize, samples_per_day: f64) -> Self {
        let lo = -((n_lon / 2) as i32);
        let wavenumbers = (0..n_lon as i32).map(|i| lo + i).collect();
        let frequencies = (0..=segment_length / 2)
            .map(|j| j as f64 * samples_per_day / segment_length as f64)
            .collect();
        Self {
            n_lon,
            segment_length,
            wavenumbers,
            frequencies,
        }
    }

    /// Wavenumbers in cycles per globe.
    pub fn wavenumbers(&self) -> &[i32] {
        &self.wavenumbers
    }

    /// Frequencies in cycles per day.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Number of wavenumbers.
    pub fn n_wavenumbers(&self) -> usize {
        self.wavenumbers.len()
    }

    /// Number of frequencies.
    pub fn n_frequencies(&self) -> usize {
        self.frequencies.len()
    }

    /// Segment length the frequency axis was built for.
    pub fn segment_length(&self) -> usize {
        self.segment_length
    }

    /// Row of wavenumber `s`, if on the axis.
    pub fn wavenumber_index(&self, s: i32) -> Option<usize> {
        let i = s + (self.n_lon / 2) as i32;
        (0..self.n_lon as i32).contains(&i).then_some(i as usize)
    }

    /// Wrap a signed integer onto the wavenumber axis.
    pub(crate) fn wrap(&self, v: i64) -> i32 {
        let n = self.n_lon as i64;
        let r = v.rem_euclid(n);
        (if r > (n - 1) / 2 { r - n } else { r }) as i32
    }

    /// Folded wavenumber of FFT longitude bin `m` at a non-negative frequency.
    pub(crate) fn wavenumber_of(&self, m: usize) -> i32 {
        self.wrap(-(m as i64))
    }

    /// Weight of frequency index `f` when folding negative frequencies:
    /// 1 at zero and Nyquist, 2 elsewhere.
    pub fn fold_weight(&self, f: usize) -> f64 {
        if f == 0 || (self.segment_length % 2 == 0 && f == self.segment_length / 2) {
            1.0
        } else {
            2.0
        }
    }

    /// Fold `weight(j) * g(X[j, m])` over the non-negative frequency rows of
    /// an FFT into `out`, indexed `(wavenumber, frequency)`.
    pub fn fold_into<T, F>(&self, fft: &Array2<Complex<f64>>, out: &mut Array2<T>, g: F)
    where
        T: Copy + std::ops::AddAssign + std::ops::Mul<f64, Output = T>,
        F: Fn(Complex<f64>) -> T,
    {
        for f in 0..self.n_frequencies() {
            let w = self.fold_weight(f);
            for m in 0..self.n_lon {
                let s = self.wavenumber_of(m);
                let row = (s + (self.n_lon / 2) as i32) as usize;
                out[[row, f]] += g(fft[[f, m]]) * w;
            }
        }
    }
}

/// Which part of a band a spectrum describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    /// All latitude rows.
    Raw,
    /// Equatorially symmetric part.
    Symmetric,
    /// Equatorially antisymmetric part.
    Antisymmetric,
}

impl Component {
    /// Lowercase name used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Raw => "raw",
            Component::Symmetric => "symmetric",
            Component::Antisymmetric => "antisymmetric",
        }
    }
}

/// Power per `(wavenumber, frequency)` bin, in variance units per bin.
#[derive(Debug, Clone, PartialEq)]
pub struct WavenumberFrequencySpectrum {
    power: Array2<f64>,
    axes: WavenumberFrequencyAxes,
    component: Component,
    report: SegmentReport,
}

impl WavenumberFrequencySpectrum {
    pub(crate) fn new(
        power: Array2<f64>,
        axes: WavenumberFrequencyAxes,
        component: Component,
        report: SegmentReport,
    ) -> Self {
        Self {
            power,
            axes,
            component,
            report,
        }
    }

    /// Power indexed `(wavenumber, frequency)`.
    pub fn power(&self) -> ArrayView2<'_, f64> {
        self.power.view()
    }

    /// Spectral axes.
    pub fn axes(&self) -> &WavenumberFrequencyAxes {
        &self.axes
    }

    /// Component flag.
    pub fn component(&self) -> Component {
        self.component
    }

    /// Segmenting report.
    pub fn report(&self) -> &SegmentReport {
        &self.report
    }

    /// Sum of power over all bins; equals the time-domain variance.
    pub fn total_power(&self) -> f64 {
        self.power.sum()
    }

    /// Power at wavenumber `s` and frequency index `f`.
    pub fn power_at(&self, s: i32, f: usize) -> Option<f64> {
        let w = self.axes.wavenumber_index(s)?;
        self.power.get([w, f]).copied()
    }

    /// Sum of power over the bins where `keep(wavenumber, frequency)` holds.
    pub fn band_power<F>(&self, keep: F) -> f64
    where
        F: Fn(i32, f64) -> bool,
    {
        self.power
            .indexed_iter()
            .filter(|((w, f), _)| keep(self.axes.wavenumbers[*w], self.axes.frequencies[*f]))
            .map(|(_, p)| p)
            .sum()
    }
}

/// Raw, symmetric and antisymmetric spectra of one latitude band.
///
/// `symmetric + antisymmetric == raw` bin for bin.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricDecomposition {
    /// Average spectrum of all latitude rows.
    pub raw: WavenumberFrequencySpectrum,
    /// Symmetric component.
    pub symmetric: WavenumberFrequencySpectrum,
    /// Antisymmetric component.
    pub antisymmetric: WavenumberFrequencySpectrum,
}

impl SymmetricDecomposition {
    /// Mean of the symmetric and antisymmetric spectra, the customary input
    /// to background estimation.
    ///
    /// # Errors
    ///
    /// Returns [`SpectralError::DimensionMismatch`] if the components were
    /// built on different axes.
    pub fn background_source(&self) -> Result<WavenumberFrequencySpectrum, SpectralError> {
        if self.symmetric.axes != self.antisymmetric.axes {
            return Err(SpectralError::DimensionMismatch(
                "symmetric and antisymmetric axes differ".into(),
            ));
        }
        let mut power = Array2::zeros(self.symmetric.power.raw_dim());
        Zip::from(&mut power)
            .and(&self.symmetric.power)
            .and(&self.antisymmetric.power)
            .for_each(|p, &s, &a| *p = 0.5 * (s + a));
        Ok(WavenumberFrequencySpectrum::new(
            power,
            self.symmetric.axes.clone(),
            Component::Raw,
            self.raw.report.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wavenumber_axis_even_and_odd() {
        let even = WavenumberFrequencyAxes::new(8, 16, 1.0);
        assert_eq!(even.wavenumbers(), &[-4, -3, -2, -1, 0, 1, 2, 3]);
        let odd = WavenumberFrequencyAxes::new(9, 16, 1.0);
        assert_eq!(odd.wavenumbers(), &[-4, -3, -2, -1, 0, 1, 2, 3, 4]);
        assert_eq!(odd.wavenumber_index(4), Some(8));
        assert_eq!(odd.wavenumber_index(5), None);
    }

    #[test]
    fn frequency_axis_in_cycles_per_day() {
        let axes = WavenumberFrequencyAxes::new(8, 96, 4.0);
        assert_eq!(axes.n_frequencies(), 49);
        assert!((axes.frequencies()[1] - 4.0 / 96.0).abs() < 1e-15);
        assert!((axes.frequencies()[48] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn fold_weights() {
        let axes = WavenumberFrequencyAxes::new(8, 16, 1.0);
        assert_eq!(axes.fold_weight(0), 1.0);
        assert_eq!(axes.fold_weight(3), 2.0);
        assert_eq!(axes.fold_weight(8), 1.0);
        let odd = WavenumberFrequencyAxes::new(8, 15, 1.0);
        assert_eq!(odd.fold_weight(7), 2.0);
    }

    #[test]
    fn eastward_bin_maps_to_positive_wavenumber() {
        let axes = WavenumberFrequencyAxes::new(8, 16, 1.0);
        // positive frequency row, lon bin 6 = -2 mod 8
        assert_eq!(axes.wavenumber_of(6), 2);
        assert_eq!(axes.wavenumber_of(0), 0);
        assert_eq!(axes.wavenumber_of(4), -4);
    }
}
