//! Heuristic diagnosis confidence.

use crate::types::PatternScores;

/// Severity score treated as full confidence
const SEVERITY_SCALE: f64 = 100.0;

/// Average of the clipped severity ratio and the clipped strongest-axis ratio,
/// rounded to two decimals
pub fn estimate(severity_score: i32, scores: &PatternScores, pattern_axis_cap: u32) -> f64 {
    let severity = (f64::from(severity_score) / SEVERITY_SCALE).clamp(0.0, 1.0);
    let cap = f64::from(pattern_axis_cap.max(1));
    let pattern = (f64::from(scores.max_axis()) / cap).clamp(0.0, 1.0);

    round2((severity + pattern) / 2.0)
}

/// Round to two decimals, ties to even on the exact binary value
///
/// `0.125` is an exact tie and goes to `0.12`; `(0.6 + 0.25) / 2` is stored
/// just below `0.425` and goes to `0.42`, even though `value * 100.0` lands
/// on `42.5` after the multiplication rounds.
fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    // Exact error of the multiplication
    let residual = value.mul_add(100.0, -scaled);
    let floor = scaled.floor();

    let rounded = if scaled - floor != 0.5 {
        scaled.round()
    } else if residual > 0.0 {
        floor + 1.0
    } else if residual < 0.0 {
        floor
    } else if floor % 2.0 == 0.0 {
        floor
    } else {
        floor + 1.0
    };
    rounded / 100.0
}
