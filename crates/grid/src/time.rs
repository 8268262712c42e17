//! Regular time axis anchored to a calendar origin.

use chrono::{NaiveDate, TimeDelta};

use crate::error::GridError;
use crate::validate::{ValidationCollector, validate_monotonic, validate_regular};

/// Time coordinate of a gridded field.
///
/// Values are offsets in days from `origin` (proleptic Gregorian calendar),
/// strictly increasing and regularly spaced.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    origin: NaiveDate,
    offsets: Vec<f64>,
}

impl TimeAxis {
    /// Create a time axis from day offsets relative to `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Validation`] if the offsets are empty, non-finite,
    /// not strictly increasing or not regularly spaced.
    pub fn new(origin: NaiveDate, offsets: Vec<f64>) -> Result<Self, GridError> {
        let mut c = ValidationCollector::new();
        c.merge(validate_monotonic("time", &offsets, true));
        c.merge(validate_regular("time", &offsets));
        c.finish()?;
        Ok(Self { origin, offsets })
    }

    /// Build `n` samples starting at `start` days with spacing `step` days.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Validation`] when `n == 0` or `step <= 0`.
    pub fn regular(origin: NaiveDate, start: f64, step: f64, n: usize) -> Result<Self, GridError> {
        let offsets = (0..n).map(|i| start + step * i as f64).collect();
        Self::new(origin, offsets)
    }

    /// Calendar origin of the offsets.
    pub fn origin(&self) -> NaiveDate {
        self.origin
    }

    /// Offsets in days.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    /// Number of time steps.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns `true` if the axis has no samples.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Sampling interval in days, `None` for a single-sample axis.
    pub fn step_days(&self) -> Option<f64> {
        if self.offsets.len() < 2 {
            None
        } else {
            Some(self.offsets[1] - self.offsets[0])
        }
    }

    /// Samples per day, `None` for a single-sample axis.
    pub fn samples_per_day(&self) -> Option<f64> {
        self.step_days().map(|dt| 1.0 / dt)
    }

    /// Calendar date containing the sample at `index`.
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        let offset = *self.offsets.get(index)?;
        self.origin
            .checked_add_signed(TimeDelta::days(offset.floor() as i64))
    }

    /// Offset in days of midnight on `date`.
    pub fn offset_of(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64
    }

    /// Indices of the samples falling on days `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::TimeRangeOutside`] when `start > end`, when the
    /// data begins after `start` or ends before `end`.
    pub fn range_indices(&self, start: NaiveDate, end: NaiveDate) -> Result<std::ops::Range<usize>, GridError> {
        if start > end {
            return Err(GridError::TimeRangeOutside {
                reason: format!("requested start {start} is after requested end {end}"),
            });
        }
        let lo = self.offset_of(start);
        let hi = self.offset_of(end) + 1.0;

        let first = self.offsets[0];
        let last = self.offsets[self.offsets.len() - 1];
        if first >= lo + 1.0 {
            return Err(GridError::TimeRangeOutside {
                reason: format!(
                    "dataset start ({}) is after requested start ({start})",
                    self.date_at(0).unwrap_or(self.origin)
                ),
            });
        }
        if last < hi - 1.0 {
            return Err(GridError::TimeRangeOutside {
                reason: format!(
                    "dataset end ({}) is before requested end ({end})",
                    self.date_at(self.offsets.len() - 1).unwrap_or(self.origin)
                ),
            });
        }

        let begin = self.offsets.iter().position(|&t| t >= lo).unwrap_or(self.offsets.len());
        let stop = self.offsets.iter().position(|&t| t >= hi).unwrap_or(self.offsets.len());
        Ok(begin..stop)
    }

    /// Sub-axis restricted to `range`.
    pub(crate) fn slice(&self, range: std::ops::Range<usize>) -> Self {
        Self {
            origin: self.origin,
            offsets: self.offsets[range].to_vec(),
        }
    }
}
