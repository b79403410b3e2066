//! River grouping and river ranking utilities.
//!
//! `stations_by_river` takes the flat station list produced by the ingest
//! layer and organises it into per-river groups, making it convenient to ask
//! "which stations are on the River Cam?" without filtering a flat list
//! every time.
//!
//! Stations with no river name are not dropped: they form their own group
//! keyed `None`, which is counted and ranked like any named river. Keys are
//! ordered with `None` first, then river names ascending.
//!
//! Ranking has to see global counts, so if station lists are ever sharded,
//! merge them before calling `rivers_by_station_count`.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::Station;

/// A river name as used for grouping; `None` is the unknown-river group.
pub type RiverKey<'a> = Option<&'a str>;

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// The distinct rivers that have at least one station.
pub fn rivers_with_station(stations: &[Station]) -> BTreeSet<RiverKey<'_>> {
    stations.iter().map(|s| s.river()).collect()
}

/// Groups stations by river.
///
/// Every station appears in exactly one group; within a group stations
/// keep their input order.
pub fn stations_by_river(stations: &[Station]) -> BTreeMap<RiverKey<'_>, Vec<&Station>> {
    let mut grouped: BTreeMap<RiverKey<'_>, Vec<&Station>> = BTreeMap::new();

    for station in stations {
        grouped.entry(station.river()).or_default().push(station);
    }

    grouped
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Rivers with the most stations, as `(river, station_count)`.
///
/// The cutoff is the count of the `n`-th largest river (or the smallest count
/// when `n` exceeds the number of rivers), and every river at or above the
/// cutoff is returned. Ties at the boundary are never dropped, so the result
/// can be longer than `n`. Sorted by count descending, then river ascending.
/// `n == 0` returns nothing.
pub fn rivers_by_station_count(
    stations: &[Station],
    n: usize,
) -> Vec<(RiverKey<'_>, usize)> {
    let mut counts: Vec<(RiverKey<'_>, usize)> = stations_by_river(stations)
        .into_iter()
        .map(|(river, on_river)| (river, on_river.len()))
        .collect();

    // BTreeMap iteration already yields rivers ascending, so a stable sort
    // on count alone gives the final (count desc, river asc) order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    if n == 0 || counts.is_empty() {
        return Vec::new();
    }
    let cutoff = counts[n.min(counts.len()) - 1].1;

    counts.retain(|&(_, count)| count >= cutoff);
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
