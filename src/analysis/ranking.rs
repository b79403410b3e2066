//! Risk ranking by relative water level.
//!
//! Stations whose relative level is undefined (no reading, or an
//! inconsistent typical range) are excluded outright, never ranked as zero.
//! Both selectors sort descending with a stable sort, so equal levels keep
//! their input order.

use crate::model::Station;

/// Every station with a defined relative level, paired with that level,
/// highest first.
fn ranked(stations: &[Station]) -> Vec<(&Station, f64)> {
    let mut levels: Vec<_> = stations
        .iter()
        .filter_map(|s| s.relative_water_level().map(|level| (s, level)))
        .collect();
    levels.sort_by(|a, b| b.1.total_cmp(&a.1));
    levels
}

/// Stations whose relative level is strictly greater than `tol`, with the
/// level, sorted by level descending.
pub fn stations_over_threshold(stations: &[Station], tol: f64) -> Vec<(&Station, f64)> {
    ranked(stations)
        .into_iter()
        .filter(|(_, level)| *level > tol)
        .collect()
}

/// The `n` stations with the highest relative level, highest first.
///
/// Returns fewer than `n` when fewer stations have a defined level, and
/// nothing for `n == 0`.
pub fn top_n_by_relative_level(stations: &[Station], n: usize) -> Vec<&Station> {
    ranked(stations)
        .into_iter()
        .take(n)
        .map(|(station, _)| station)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
