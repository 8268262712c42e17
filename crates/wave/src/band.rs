//! Wavenumber-frequency bands that isolate each wave mode.

use crate::dispersion::DispersionCurve;
use crate::error::WaveError;
use crate::mode::WaveMode;

/// Equivalent-depth bounds applied through a dispersion curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRange {
    /// Dispersion relation evaluated at both depths.
    pub curve: DispersionCurve,
    /// Shallowest equivalent depth in metres.
    pub min: f64,
    /// Deepest equivalent depth in metres.
    pub max: f64,
}

/// A region of the wavenumber-frequency plane.
///
/// Wavenumbers are inclusive integer bounds in cycles per globe (eastward
/// positive); frequencies are inclusive bounds in cycles per day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveBand {
    k_min: i32,
    k_max: i32,
    f_min: f64,
    f_max: f64,
    depth: Option<DepthRange>,
}

impl WaveBand {
    /// Create a rectangular band.
    ///
    /// # Errors
    ///
    /// Returns [`WaveError::InvalidBand`] for inverted bounds or a
    /// non-finite or negative frequency.
    pub fn new(k_min: i32, k_max: i32, f_min: f64, f_max: f64) -> Result<Self, WaveError> {
        if k_min > k_max {
            return Err(WaveError::InvalidBand(format!("wavenumbers {k_min} > {k_max}")));
        }
        if !f_min.is_finite() || !f_max.is_finite() || f_min < 0.0 || f_min > f_max {
            return Err(WaveError::InvalidBand(format!("frequencies [{f_min}, {f_max}]")));
        }
        Ok(Self {
            k_min,
            k_max,
            f_min,
            f_max,
            depth: None,
        })
    }

    /// Restrict the band to frequencies between the dispersion curves at two
    /// equivalent depths.
    ///
    /// # Errors
    ///
    /// Returns [`WaveError::InvalidBand`] unless `0 < min <= max`.
    pub fn with_equivalent_depth(mut self, curve: DispersionCurve, min: f64, max: f64) -> Result<Self, WaveError> {
        if !(min > 0.0 && min <= max && max.is_finite()) {
            return Err(WaveError::InvalidBand(format!("equivalent depths [{min}, {max}]")));
        }
        self.depth = Some(DepthRange { curve, min, max });
        Ok(self)
    }

    /// Customary filter band for a mode.
    pub fn for_mode(mode: WaveMode) -> Self {
        let band = |k_min, k_max, f_min, f_max| Self {
            k_min,
            k_max,
            f_min,
            f_max,
            depth: None,
        };
        let depth = |curve, min, max| Some(DepthRange { curve, min, max });
        match mode {
            WaveMode::Kelvin => Self {
                depth: depth(DispersionCurve::Kelvin, 8.0, 90.0),
                ..band(1, 14, 1.0 / 20.0, 1.0 / 2.5)
            },
            WaveMode::Mjo => band(1, 5, 1.0 / 96.0, 1.0 / 30.0),
            WaveMode::EquatorialRossby => Self {
                depth: depth(DispersionCurve::EquatorialRossby(1), 8.0, 90.0),
                ..band(-10, -1, 1.0 / 48.0, 1.0 / 10.0)
            },
            WaveMode::MixedRossbyGravity => Self {
                depth: depth(DispersionCurve::MixedRossbyGravity, 8.0, 90.0),
                ..band(-10, -1, 1.0 / 6.0, 1.0 / 3.0)
            },
            WaveMode::EastwardInertioGravity(0) => Self {
                depth: depth(DispersionCurve::MixedRossbyGravity, 12.0, 50.0),
                ..band(1, 14, 1.0 / 4.5, 1.0 / 2.0)
            },
            WaveMode::EastwardInertioGravity(n) => Self {
                depth: depth(DispersionCurve::InertioGravity(n), 12.0, 50.0),
                ..band(1, 15, 1.0 / 2.5, 1.0 / 1.25)
            },
            WaveMode::WestwardInertioGravity(n) => Self {
                depth: depth(DispersionCurve::InertioGravity(n.max(1)), 12.0, 50.0),
                ..band(-15, -1, 1.0 / 2.5, 1.0 / 1.25)
            },
            WaveMode::TropicalDepression => band(-20, -6, 1.0 / 5.0, 1.0 / 2.5),
        }
    }

    /// Lowest wavenumber.
    pub fn k_min(&self) -> i32 {
        self.k_min
    }

    /// Highest wavenumber.
    pub fn k_max(&self) -> i32 {
        self.k_max
    }

    /// Lowest frequency in cpd.
    pub fn f_min(&self) -> f64 {
        self.f_min
    }

    /// Highest frequency in cpd.
    pub fn f_max(&self) -> f64 {
        self.f_max
    }

    /// Equivalent-depth restriction, if any.
    pub fn depth(&self) -> Option<&DepthRange> {
        self.depth.as_ref()
    }

    /// Returns `true` when the bin `(s, f)` lies inside the band.
    pub fn contains(&self, s: i32, f: f64) -> bool {
        if s < self.k_min || s > self.k_max || f < self.f_min || f > self.f_max {
            return false;
        }
        match &self.depth {
            None => true,
            Some(d) => {
                let (Some(a), Some(b)) = (
                    d.curve.frequency(f64::from(s), d.min),
                    d.curve.frequency(f64::from(s), d.max),
                ) else {
                    return false;
                };
                f >= a.min(b) && f <= a.max(b)
            }
        }
    }
}
