//! Accumulated validation utilities.
//!
//! Provides [`ValidationCollector`] for gathering multiple validation errors
//! into a single [`GridError::Validation`], plus axis checks shared by the
//! field constructors.

use crate::error::GridError;

/// Relative tolerance used when checking that an axis is regularly spaced.
const SPACING_TOL: f64 = 1e-6;

/// Accumulates validation errors and converts them into a single
/// [`GridError::Validation`].
pub(crate) struct ValidationCollector {
    errors: Vec<String>,
}

impl ValidationCollector {
    /// Create an empty collector.
    pub(crate) fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record one validation error.
    pub(crate) fn push(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    /// Absorb every message recorded by another collector.
    pub(crate) fn merge(&mut self, other: ValidationCollector) {
        self.errors.extend(other.errors);
    }

    /// Returns the number of recorded errors.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.errors.len()
    }

    /// Consume the collector and return `Ok(())` if no errors were recorded,
    /// or `Err(GridError::Validation { count, details })` otherwise.
    pub(crate) fn finish(self) -> Result<(), GridError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(GridError::Validation {
                count: self.errors.len(),
                details: self.errors.join("; "),
            })
        }
    }
}

/// Check that an axis is non-empty, finite and strictly monotonic.
///
/// `increasing_only` rejects strictly decreasing axes (longitude, time).
pub(crate) fn validate_monotonic(name: &str, axis: &[f64], increasing_only: bool) -> ValidationCollector {
    let mut c = ValidationCollector::new();

    if axis.is_empty() {
        c.push(format!("{name} axis is empty"));
        return c;
    }

    if let Some(i) = axis.iter().position(|v| !v.is_finite()) {
        c.push(format!("{name} axis has a non-finite value at index {i}"));
        return c;
    }

    if axis.len() < 2 {
        return c;
    }

    let increasing = axis.windows(2).all(|w| w[1] > w[0]);
    let decreasing = axis.windows(2).all(|w| w[1] < w[0]);
    if increasing_only && !increasing {
        c.push(format!("{name} axis must be strictly increasing"));
    } else if !increasing && !decreasing {
        c.push(format!("{name} axis must be strictly monotonic"));
    }

    c
}

/// Check that consecutive axis values share one spacing.
pub(crate) fn validate_regular(name: &str, axis: &[f64]) -> ValidationCollector {
    let mut c = ValidationCollector::new();
    if axis.len() < 3 {
        return c;
    }

    let step = axis[1] - axis[0];
    for (i, w) in axis.windows(2).enumerate() {
        let d = w[1] - w[0];
        if (d - step).abs() > SPACING_TOL * step.abs().max(1.0) {
            c.push(format!(
                "{name} axis spacing {d} at index {i} differs from {step}"
            ));
            break;
        }
    }

    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_empty_is_ok() {
        assert!(ValidationCollector::new().finish().is_ok());
    }

    #[test]
    fn collector_joins_messages() {
        let mut c = ValidationCollector::new();
        c.push("first");
        c.push("second");
        assert_eq!(c.len(), 2);
        match c.finish() {
            Err(GridError::Validation { count, details }) => {
                assert_eq!(count, 2);
                assert_eq!(details, "first; second");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn monotonic_accepts_decreasing_latitudes() {
        let c = validate_monotonic("lat", &[10.0, 0.0, -10.0], false);
        assert!(c.finish().is_ok());
    }

    #[test]
    fn monotonic_rejects_decreasing_when_increasing_only() {
        let c = validate_monotonic("lon", &[10.0, 0.0], true);
        assert!(c.finish().is_err());
    }

    #[test]
    fn monotonic_rejects_empty_and_nan() {
        assert_eq!(validate_monotonic("lat", &[], false).len(), 1);
        assert_eq!(validate_monotonic("lat", &[0.0, f64::NAN], false).len(), 1);
    }

    #[test]
    fn regular_detects_uneven_spacing() {
        assert!(validate_regular("lon", &[0.0, 2.5, 5.0, 7.5]).finish().is_ok());
        assert!(validate_regular("lon", &[0.0, 2.5, 5.0, 8.0]).finish().is_err());
    }
}
