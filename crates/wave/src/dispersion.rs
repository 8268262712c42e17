//! Shallow-water dispersion curves on the equatorial beta plane.

use std::f64::consts::PI;

/// Earth radius in metres.
pub const EARTH_RADIUS: f64 = 6.371e6;
/// Earth rotation rate in rad/s.
pub const EARTH_OMEGA: f64 = 7.292e-5;
/// Gravitational acceleration in m/s².
pub const GRAVITY: f64 = 9.81;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Dispersion relation of one family of equatorially trapped waves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispersionCurve {
    /// `omega = c k`.
    Kelvin,
    /// Long-wave equatorial Rossby approximation of meridional mode `n`.
    EquatorialRossby(u8),
    /// `n = 0` mixed Rossby-gravity / eastward inertio-gravity branch.
    MixedRossbyGravity,
    /// Inertio-gravity waves of meridional mode `n >= 1`.
    InertioGravity(u8),
}

impl DispersionCurve {
    /// Frequency in cycles per day at zonal wavenumber `s` (cycles per
    /// globe) for equivalent depth `h` in metres.
    ///
    /// Returns `None` where the branch does not exist (negative frequency).
    pub fn frequency(&self, s: f64, h: f64) -> Option<f64> {
        let beta = 2.0 * EARTH_OMEGA / EARTH_RADIUS;
        let c = (GRAVITY * h).sqrt();
        let k = s / EARTH_RADIUS;

        let omega = match *self {
            DispersionCurve::Kelvin => c * k,
            DispersionCurve::EquatorialRossby(n) => {
                let m = 2.0 * f64::from(n) + 1.0;
                -beta * k / (k * k + m * beta / c)
            }
            DispersionCurve::MixedRossbyGravity => {
                let half = c * k / 2.0;
                half + (half * half + beta * c).sqrt()
            }
            DispersionCurve::InertioGravity(n) => {
                // high-frequency root of w^3 - (c^2 k^2 + m beta c) w - beta c^2 k = 0
                let m = 2.0 * f64::from(n) + 1.0;
                let base = c * c * k * k + m * beta * c;
                let mut w = base.sqrt();
                for _ in 0..50 {
                    let next = (base + beta * c * c * k / w).sqrt();
                    if (next - w).abs() <= 1e-14 * w {
                        w = next;
                        break;
                    }
                    w = next;
                }
                w
            }
        };

        (omega.is_finite() && omega >= 0.0).then_some(omega * SECONDS_PER_DAY / (2.0 * PI))
    }
}
