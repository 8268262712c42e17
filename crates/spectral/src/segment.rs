//! Segment planning, missing-data policy and per-segment preprocessing.

use ndarray::{Array2, ArrayView2, s};
use tracing::{debug, warn};

use crate::config::{Detrend, GapFill, SpectralConfig};
use crate::error::SpectralError;
use crate::taper::split_cosine_bell;

/// A segment excluded from the estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedSegment {
    /// Position of the segment in the plan.
    pub index: usize,
    /// First sample of the segment.
    pub start: usize,
    /// Fraction of missing cells across all rows.
    pub missing_fraction: f64,
}

/// Bookkeeping for how the record was segmented.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentReport {
    total: usize,
    used: usize,
    dropped: Vec<DroppedSegment>,
    filled_cells: usize,
}

impl SegmentReport {
    /// Number of segments that fit in the record.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of segments contributing to the estimate.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Segments dropped for exceeding the missing-data threshold.
    pub fn dropped(&self) -> &[DroppedSegment] {
        &self.dropped
    }

    /// Missing cells replaced by gap filling in the used segments.
    pub fn filled_cells(&self) -> usize {
        self.filled_cells
    }
}

/// One segment of a group of co-located rows after gap filling,
/// detrending and tapering.
#[derive(Debug, Clone)]
pub struct PreparedSegment {
    /// First sample of the segment.
    pub start: usize,
    /// Tapered `(time, lon)` arrays, one per input row.
    pub rows: Vec<Array2<f64>>,
    /// Sum over rows of the mean square of the detrended, untapered row.
    pub target_variance: f64,
}

/// Start indices of every full segment in a record of `n_time` samples.
pub(crate) fn segment_starts(n_time: usize, length: usize, hop: usize) -> Vec<usize> {
    if hop == 0 || n_time < length {
        return Vec::new();
    }
    (0..=n_time - length).step_by(hop).collect()
}

/// Cut rows sharing a `(time, lon)` shape into segments and preprocess them.
///
/// A segment whose missing fraction (over every cell of every row) exceeds
/// the configured threshold is dropped for all rows and reported; smaller
/// gaps are filled and counted.
///
/// # Errors
///
/// Returns [`SpectralError::DimensionMismatch`] for rows of differing shape,
/// [`SpectralError::SeriesTooShort`] when no segment fits, and
/// [`SpectralError::MissingDataExceeded`] when every segment is dropped.
pub fn prepare_segments(
    config: &SpectralConfig,
    rows: &[ArrayView2<'_, f64>],
) -> Result<(Vec<PreparedSegment>, SegmentReport), SpectralError> {
    config.validate()?;
    let Some(first) = rows.first() else {
        return Err(SpectralError::DimensionMismatch("no rows to segment".into()));
    };
    let (nt, nx) = first.dim();
    if let Some(bad) = rows.iter().find(|r| r.dim() != (nt, nx)) {
        return Err(SpectralError::DimensionMismatch(format!(
            "row shape {:?} differs from {:?}",
            bad.dim(),
            (nt, nx)
        )));
    }

    let length = config.segment_length();
    let starts = segment_starts(nt, length, config.hop());
    if starts.is_empty() {
        return Err(SpectralError::SeriesTooShort { len: nt, min: length });
    }

    let taper = split_cosine_bell(length, config.taper_fraction());
    let cells = (rows.len() * length * nx) as f64;
    let mut report = SegmentReport {
        total: starts.len(),
        ..SegmentReport::default()
    };
    let mut prepared = Vec::with_capacity(starts.len());

    for (index, &start) in starts.iter().enumerate() {
        let window = s![start..start + length, ..];
        let missing: usize = rows
            .iter()
            .map(|r| r.slice(window).iter().filter(|v| !v.is_finite()).count())
            .sum();
        let fraction = missing as f64 / cells;

        if fraction > config.max_missing_fraction() {
            warn!(
                segment = index,
                start,
                missing_fraction = fraction,
                threshold = config.max_missing_fraction(),
                "dropping segment: missing data exceeded"
            );
            report.dropped.push(DroppedSegment {
                index,
                start,
                missing_fraction: fraction,
            });
            continue;
        }

        let mut target_variance = 0.0;
        let mut seg_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let mut seg = row.slice(window).to_owned();
            let mut mean_sq = 0.0;
            let mut col = vec![0.0; length];
            for x in 0..nx {
                for (c, v) in col.iter_mut().zip(seg.column(x)) {
                    *c = *v;
                }
                if missing > 0 {
                    report.filled_cells += fill_gaps(&mut col, config.gap_fill());
                }
                match config.detrend() {
                    Detrend::Mean => ccew_stats::remove_mean(&mut col),
                    Detrend::Linear => ccew_stats::remove_linear_trend(&mut col),
                }
                mean_sq += ccew_stats::mean_square(&col);
                for ((dst, v), w) in seg.column_mut(x).iter_mut().zip(&col).zip(&taper) {
                    *dst = v * w;
                }
            }
            target_variance += mean_sq / nx as f64;
            seg_rows.push(seg);
        }

        report.used += 1;
        prepared.push(PreparedSegment {
            start,
            rows: seg_rows,
            target_variance,
        });
    }

    if prepared.is_empty() {
        return Err(SpectralError::MissingDataExceeded {
            segments: report.total,
            threshold: config.max_missing_fraction(),
        });
    }

    debug!(
        total = report.total,
        used = report.used,
        dropped = report.dropped.len(),
        filled = report.filled_cells,
        "segmented record"
    );
    Ok((prepared, report))
}

/// Replace non-finite samples in place and return how many were replaced.
///
/// A column with no present sample is filled with zeros.
pub(crate) fn fill_gaps(col: &mut [f64], method: GapFill) -> usize {
    let present: Vec<usize> = (0..col.len()).filter(|&i| col[i].is_finite()).collect();
    let n_missing = col.len() - present.len();
    if n_missing == 0 {
        return 0;
    }
    if present.is_empty() {
        col.fill(0.0);
        return n_missing;
    }

    match method {
        GapFill::Mean => {
            let mean = present.iter().map(|&i| col[i]).sum::<f64>() / present.len() as f64;
            for v in col.iter_mut().filter(|v| !v.is_finite()) {
                *v = mean;
            }
        }
        GapFill::Linear => {
            let first = present[0];
            let last = present[present.len() - 1];
            let (head, tail) = (col[first], col[last]);
            col[..first].fill(head);
            col[last + 1..].fill(tail);
            for pair in present.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                if b - a < 2 {
                    continue;
                }
                let (va, vb) = (col[a], col[b]);
                for i in a + 1..b {
                    let t = (i - a) as f64 / (b - a) as f64;
                    col[i] = va + t * (vb - va);
                }
            }
        }
    }
    n_missing
}
