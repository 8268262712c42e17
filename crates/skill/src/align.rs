//! Pairing of model and observed time axes.

use ccew_grid::TimeAxis;

use crate::config::Alignment;
use crate::error::SkillError;

/// Index pairs `(model, observed)` of matched time stamps.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pairing {
    pub pairs: Vec<(usize, usize)>,
    /// Matched times in days from the observed origin.
    pub time: Vec<f64>,
    pub dropped: usize,
}

/// Offsets of `axis` expressed in days from `origin`.
fn shifted(axis: &TimeAxis, origin: chrono::NaiveDate) -> Vec<f64> {
    let shift = (axis.origin() - origin).num_days() as f64;
    axis.offsets().iter().map(|t| t + shift).collect()
}

pub(crate) fn align(
    model: &TimeAxis,
    observed: &TimeAxis,
    alignment: Alignment,
    tolerance: f64,
) -> Result<Pairing, SkillError> {
    let origin = observed.origin();
    let m = shifted(model, origin);
    let o = observed.offsets();

    match alignment {
        Alignment::Strict => {
            if m.len() != o.len() {
                return Err(SkillError::TemporalMisalignment {
                    reason: format!("model has {} time steps, observations {}", m.len(), o.len()),
                });
            }
            if let Some(i) = m.iter().zip(o).position(|(a, b)| (a - b).abs() > tolerance) {
                return Err(SkillError::TemporalMisalignment {
                    reason: format!(
                        "step {i}: model day {:.6}, observed day {:.6} (from {origin})",
                        m[i], o[i]
                    ),
                });
            }
            Ok(Pairing {
                pairs: (0..o.len()).map(|i| (i, i)).collect(),
                time: o.to_vec(),
                dropped: 0,
            })
        }
        Alignment::Intersect => {
            // both axes are strictly increasing
            let (mut i, mut j) = (0, 0);
            let mut pairs = Vec::new();
            let mut time = Vec::new();
            while i < m.len() && j < o.len() {
                if (m[i] - o[j]).abs() <= tolerance {
                    pairs.push((i, j));
                    time.push(o[j]);
                    i += 1;
                    j += 1;
                } else if m[i] < o[j] {
                    i += 1;
                } else {
                    j += 1;
                }
            }
            let dropped = m.len() + o.len() - 2 * pairs.len();
            Ok(Pairing { pairs, time, dropped })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn axis(y: i32, m: u32, d: u32, start: f64, n: usize) -> TimeAxis {
        TimeAxis::regular(NaiveDate::from_ymd_opt(y, m, d).unwrap(), start, 1.0, n).unwrap()
    }

    #[test]
    fn strict_accepts_shifted_origin() {
        // same dates expressed from different origins
        let model = axis(2000, 1, 1, 10.0, 5);
        let obs = axis(2000, 1, 11, 0.0, 5);
        let p = align(&model, &obs, Alignment::Strict, 1e-6).unwrap();
        assert_eq!(p.pairs, vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
        assert_eq!(p.dropped, 0);
    }

    #[test]
    fn strict_rejects_length_mismatch() {
        let err = align(&axis(2000, 1, 1, 0.0, 5), &axis(2000, 1, 1, 0.0, 6), Alignment::Strict, 1e-6)
            .unwrap_err();
        assert!(matches!(err, SkillError::TemporalMisalignment { .. }));
    }

    #[test]
    fn strict_rejects_offset_mismatch() {
        let err = align(&axis(2000, 1, 2, 0.0, 5), &axis(2000, 1, 1, 0.0, 5), Alignment::Strict, 1e-6)
            .unwrap_err();
        assert!(format!("{err}").contains("step 0"));
    }

    #[test]
    fn intersect_keeps_common_steps() {
        let model = axis(2000, 1, 1, 0.0, 10);
        let obs = axis(2000, 1, 1, 4.0, 10);
        let p = align(&model, &obs, Alignment::Intersect, 1e-6).unwrap();
        assert_eq!(p.pairs.len(), 6);
        assert_eq!(p.pairs[0], (4, 0));
        assert_eq!(p.time[0], 4.0);
        assert_eq!(p.dropped, 8);
    }
}
