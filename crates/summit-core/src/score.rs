//! Position-to-points decay curve.

/// Highest rank that still awards points.
const SCORED_RANKS: u32 = 30;

/// Points for the top rank.
const MAX_POINTS: f64 = 100.0;

/// Points for the last scored rank.
const MIN_POINTS: f64 = 1.0;

/// Points awarded for completing the demon at `position`.
///
/// Ranks outside `1..=30` (including 0) award nothing. Within range the
/// points decay linearly from 100 at rank 1 to 1 at rank 30.
pub fn score(position: u32) -> u32 {
    if position < 1 || position > SCORED_RANKS {
        return 0;
    }
    let decay = (MAX_POINTS - MIN_POINTS) / (SCORED_RANKS - 1) as f64;
    let points = MAX_POINTS - (position - 1) as f64 * decay;
    points.max(MIN_POINTS).round() as u32
}
