//! Two-dimensional (time × longitude) FFT over ndarray arrays.

use std::sync::Arc;

use ndarray::{Array2, ArrayView2, Axis};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::SpectralError;

/// Planned 2D transform for a fixed `(time, lon)` shape.
///
/// Unnormalized in both directions, as rustfft is.
pub struct Fft2 {
    shape: (usize, usize),
    time: Arc<dyn Fft<f64>>,
    lon: Arc<dyn Fft<f64>>,
}

impl Fft2 {
    /// Plan a forward transform.
    pub fn forward(n_time: usize, n_lon: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            shape: (n_time, n_lon),
            time: planner.plan_fft_forward(n_time),
            lon: planner.plan_fft_forward(n_lon),
        }
    }

    /// Plan an inverse transform.
    pub fn inverse(n_time: usize, n_lon: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            shape: (n_time, n_lon),
            time: planner.plan_fft_inverse(n_time),
            lon: planner.plan_fft_inverse(n_lon),
        }
    }

    /// The `(time, lon)` shape this plan accepts.
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Transform `data` in place along both axes.
    ///
    /// # Errors
    ///
    /// Returns [`SpectralError::DimensionMismatch`] if `data` does not have
    /// the planned shape.
    pub fn process(&self, data: &mut Array2<Complex<f64>>) -> Result<(), SpectralError> {
        if data.dim() != self.shape {
            return Err(SpectralError::DimensionMismatch(format!(
                "array {:?} vs FFT plan {:?}",
                data.dim(),
                self.shape
            )));
        }
        process_lanes(data, Axis(1), self.lon.as_ref());
        process_lanes(data, Axis(0), self.time.as_ref());
        Ok(())
    }

    /// Transform a real array, returning the complex spectrum.
    ///
    /// # Errors
    ///
    /// Same as [`Fft2::process`].
    pub fn transform_real(&self, data: ArrayView2<'_, f64>) -> Result<Array2<Complex<f64>>, SpectralError> {
        let mut out = data.mapv(|v| Complex::new(v, 0.0));
        self.process(&mut out)?;
        Ok(out)
    }
}

fn process_lanes(data: &mut Array2<Complex<f64>>, axis: Axis, fft: &dyn Fft<f64>) {
    let mut buf = vec![Complex::new(0.0, 0.0); data.len_of(axis)];
    let mut scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
    for mut lane in data.lanes_mut(axis) {
        for (b, v) in buf.iter_mut().zip(lane.iter()) {
            *b = *v;
        }
        fft.process_with_scratch(&mut buf, &mut scratch);
        for (v, b) in lane.iter_mut().zip(&buf) {
            *v = *b;
        }
    }
}
