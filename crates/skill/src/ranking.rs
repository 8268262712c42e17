//! Ranking of model runs by their error against observations.

use serde::Serialize;

/// Errors closer than this share a rank.
const TIE_TOL: f64 = 1e-10;

/// One run's position in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunScore {
    pub run: String,
    /// Error the ranking is based on (RMSE for activity skill).
    pub error: f64,
    /// Error rescaled to [0, 1] across runs; 0 is the best run.
    pub normalized_score: f64,
    /// 1-based rank; tied runs share the rank of the first of them.
    pub rank: usize,
}

/// Rank runs by ascending error.
///
/// Non-finite errors sort last and get a normalized score of 1.
pub fn rank_runs(runs: &[(String, f64)]) -> Vec<RunScore> {
    let finite = runs.iter().map(|(_, e)| *e).filter(|e| e.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    let mut sorted: Vec<(&str, f64)> = runs.iter().map(|(r, e)| (r.as_str(), *e)).collect();
    sorted.sort_by(|a, b| match (a.1.is_finite(), b.1.is_finite()) {
        (true, true) => a.1.total_cmp(&b.1),
        (x, y) => y.cmp(&x),
    });

    let mut scores: Vec<RunScore> = Vec::with_capacity(sorted.len());
    for (i, (run, error)) in sorted.into_iter().enumerate() {
        let normalized_score = if !error.is_finite() {
            1.0
        } else if range.abs() < TIE_TOL {
            0.0
        } else {
            (error - min) / range
        };
        let rank = match scores.last() {
            Some(prev) if (prev.error - error).abs() < TIE_TOL => prev.rank,
            _ => i + 1,
        };
        scores.push(RunScore {
            run: run.to_string(),
            error,
            normalized_score,
            rank,
        });
    }
    scores
}
