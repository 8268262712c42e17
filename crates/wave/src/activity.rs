//! Per-mode wave activity time series.

use ccew_grid::TimeAxis;

use crate::mode::WaveMode;

/// Projection coefficients of a field onto one mode, per time step.
///
/// `coefficients[t]` is `<x(t), p> / <p, p>` for the primary pattern `p`;
/// `quadrature[t]` the same for the quadrature pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveActivity {
    mode: WaveMode,
    time: TimeAxis,
    coefficients: Vec<f64>,
    quadrature: Option<Vec<f64>>,
    primary_norm_sq: f64,
    quadrature_norm_sq: f64,
    n_cells: usize,
}

impl WaveActivity {
    pub(crate) fn new(
        mode: WaveMode,
        time: TimeAxis,
        coefficients: Vec<f64>,
        quadrature: Option<(Vec<f64>, f64)>,
        primary_norm_sq: f64,
        n_cells: usize,
    ) -> Self {
        let (quadrature, quadrature_norm_sq) = match quadrature {
            Some((q, n)) => (Some(q), n),
            None => (None, 0.0),
        };
        Self {
            mode,
            time,
            coefficients,
            quadrature,
            primary_norm_sq,
            quadrature_norm_sq,
            n_cells,
        }
    }

    /// Build an activity series directly from amplitudes, e.g. one read
    /// back from disk. Variance contributions assume a unit-norm pattern on
    /// a single cell.
    pub fn from_amplitudes(mode: WaveMode, time: TimeAxis, amplitude: Vec<f64>) -> Self {
        Self::new(mode, time, amplitude, None, 1.0, 1)
    }

    /// Wave mode.
    pub fn mode(&self) -> WaveMode {
        self.mode
    }

    /// Time axis.
    pub fn time(&self) -> &TimeAxis {
        &self.time
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// Returns `true` if there are no time steps.
    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Primary-pattern coefficients.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Quadrature-pattern coefficients.
    pub fn quadrature(&self) -> Option<&[f64]> {
        self.quadrature.as_deref()
    }

    /// Activity amplitude: `sqrt(a1² + a2²)` with a quadrature pattern,
    /// `|a1|` without.
    pub fn amplitude(&self) -> Vec<f64> {
        match &self.quadrature {
            Some(q) => self
                .coefficients
                .iter()
                .zip(q)
                .map(|(a, b)| a.hypot(*b))
                .collect(),
            None => self.coefficients.iter().map(|a| a.abs()).collect(),
        }
    }

    /// Phase `atan2(a2, a1)` in radians, with a quadrature pattern.
    pub fn phase(&self) -> Option<Vec<f64>> {
        self.quadrature.as_ref().map(|q| {
            self.coefficients
                .iter()
                .zip(q)
                .map(|(a, b)| b.atan2(*a))
                .collect()
        })
    }

    /// Mean square, over time and grid cells, of the field component this
    /// mode reconstructs.
    ///
    /// Summed over mutually orthogonal modes this gives the mean square of
    /// the projected field.
    pub fn variance_contribution(&self) -> f64 {
        if self.coefficients.is_empty() || self.n_cells == 0 {
            return 0.0;
        }
        let mut total: f64 = self.coefficients.iter().map(|a| a * a).sum::<f64>() * self.primary_norm_sq;
        if let Some(q) = &self.quadrature {
            total += q.iter().map(|b| b * b).sum::<f64>() * self.quadrature_norm_sq;
        }
        total / (self.coefficients.len() * self.n_cells) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn axis(n: usize) -> TimeAxis {
        TimeAxis::regular(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(), 0.0, 1.0, n).unwrap()
    }

    #[test]
    fn amplitude_and_phase_from_quadrature() {
        let a = WaveActivity::new(
            WaveMode::Kelvin,
            axis(2),
            vec![3.0, 0.0],
            Some((vec![4.0, -2.0], 1.0)),
            1.0,
            4,
        );
        assert_eq!(a.amplitude(), vec![5.0, 2.0]);
        let phase = a.phase().unwrap();
        assert_relative_eq!(phase[1], -std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn variance_contribution_weights_by_norm() {
        let a = WaveActivity::new(WaveMode::Mjo, axis(2), vec![1.0, 3.0], None, 8.0, 4);
        // mean of a^2 = 5, times |p|^2 / cells = 2
        assert_relative_eq!(a.variance_contribution(), 10.0);
        assert!(a.phase().is_none());
    }
}
