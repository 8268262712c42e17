//! Empirical wave basis: orthogonal spatial patterns on a fixed grid.

use ndarray::Array2;
use tracing::debug;

use crate::band::WaveBand;
use crate::error::WaveError;
use crate::mode::WaveMode;

/// Relative tolerance on the normalized inner product between patterns.
const ORTHOGONALITY_TOL: f64 = 1e-6;
/// Tolerance in degrees when comparing grid coordinates.
const COORD_TOL: f64 = 1e-6;

/// Spatial structure of one wave mode on the basis grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ModePattern {
    mode: WaveMode,
    band: WaveBand,
    primary: Array2<f64>,
    quadrature: Option<Array2<f64>>,
}

impl ModePattern {
    /// A pattern `(lat, lon)` using the customary band for `mode`.
    pub fn new(mode: WaveMode, primary: Array2<f64>) -> Self {
        Self {
            mode,
            band: WaveBand::for_mode(mode),
            primary,
            quadrature: None,
        }
    }

    /// Add a quadrature pattern, making the activity amplitude phase-invariant.
    pub fn with_quadrature(mut self, quadrature: Array2<f64>) -> Self {
        self.quadrature = Some(quadrature);
        self
    }

    /// Override the filter band.
    pub fn with_band(mut self, band: WaveBand) -> Self {
        self.band = band;
        self
    }

    /// Wave mode.
    pub fn mode(&self) -> WaveMode {
        self.mode
    }

    /// Filter band.
    pub fn band(&self) -> &WaveBand {
        &self.band
    }

    /// Primary pattern `(lat, lon)`.
    pub fn primary(&self) -> &Array2<f64> {
        &self.primary
    }

    /// Quadrature pattern, if any.
    pub fn quadrature(&self) -> Option<&Array2<f64>> {
        self.quadrature.as_ref()
    }

    fn labelled(&self) -> Vec<(String, &Array2<f64>)> {
        let mut out = vec![(self.mode.to_string(), &self.primary)];
        if let Some(q) = &self.quadrature {
            out.push((format!("{}/quadrature", self.mode), q));
        }
        out
    }
}

/// An immutable set of mutually orthogonal mode patterns on one grid.
///
/// Loaded once and shared between workers behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveBasis {
    lats: Vec<f64>,
    lons: Vec<f64>,
    patterns: Vec<ModePattern>,
}

impl WaveBasis {
    /// Build a basis, checking every pattern against the grid and each
    /// other.
    ///
    /// # Errors
    ///
    /// Returns [`WaveError::DimensionMismatch`] for a pattern off the grid,
    /// [`WaveError::DegeneratePattern`] for a zero or non-finite pattern,
    /// [`WaveError::DuplicateMode`] for a repeated mode and
    /// [`WaveError::NonOrthogonalBasis`] when two patterns overlap.
    pub fn new(lats: Vec<f64>, lons: Vec<f64>, patterns: Vec<ModePattern>) -> Result<Self, WaveError> {
        let mut labelled: Vec<(String, &Array2<f64>, f64)> = Vec::new();
        for (i, p) in patterns.iter().enumerate() {
            if patterns[..i].iter().any(|q| q.mode == p.mode) {
                return Err(WaveError::DuplicateMode(p.mode));
            }
            for (label, arr) in p.labelled() {
                let (ny, nx) = arr.dim();
                if ny != lats.len() {
                    return Err(WaveError::DimensionMismatch {
                        what: "latitude",
                        basis: lats.len(),
                        field: ny,
                    });
                }
                if nx != lons.len() {
                    return Err(WaveError::DimensionMismatch {
                        what: "longitude",
                        basis: lons.len(),
                        field: nx,
                    });
                }
                let norm = arr.iter().map(|v| v * v).sum::<f64>().sqrt();
                if !norm.is_finite() || norm == 0.0 {
                    return Err(WaveError::DegeneratePattern { mode: p.mode });
                }
                labelled.push((label, arr, norm));
            }
        }

        for (i, (la, a, na)) in labelled.iter().enumerate() {
            for (lb, b, nb) in &labelled[i + 1..] {
                let cosine = (*a * *b).sum() / (na * nb);
                if cosine.abs() > ORTHOGONALITY_TOL {
                    return Err(WaveError::NonOrthogonalBasis {
                        a: la.clone(),
                        b: lb.clone(),
                        cosine,
                    });
                }
            }
        }
        debug!(patterns = labelled.len(), n_lat = lats.len(), n_lon = lons.len(), "wave basis validated");

        Ok(Self { lats, lons, patterns })
    }

    /// Latitudes of the basis grid.
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Longitudes of the basis grid.
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// All patterns.
    pub fn patterns(&self) -> &[ModePattern] {
        &self.patterns
    }

    /// Modes in basis order.
    pub fn modes(&self) -> Vec<WaveMode> {
        self.patterns.iter().map(|p| p.mode).collect()
    }

    /// Pattern for `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`WaveError::UnknownMode`] if the mode is absent.
    pub fn pattern(&self, mode: WaveMode) -> Result<&ModePattern, WaveError> {
        self.patterns
            .iter()
            .find(|p| p.mode == mode)
            .ok_or(WaveError::UnknownMode(mode))
    }

    /// Check that a field grid equals the basis grid exactly.
    ///
    /// # Errors
    ///
    /// Returns [`WaveError::DimensionMismatch`] on differing length or any
    /// coordinate differing by more than `1e-6` degrees.
    pub fn check_grid(&self, lats: &[f64], lons: &[f64]) -> Result<(), WaveError> {
        for (what, basis, field) in [("latitude", &self.lats, lats), ("longitude", &self.lons, lons)] {
            let same = basis.len() == field.len()
                && basis.iter().zip(field).all(|(a, b)| (a - b).abs() <= COORD_TOL);
            if !same {
                return Err(WaveError::DimensionMismatch {
                    what,
                    basis: basis.len(),
                    field: field.len(),
                });
            }
        }
        Ok(())
    }
}
