//! Station list assembly.
//!
//! Builds the `Station` list from the feed (or its cache) and keeps each
//! station's latest level in step with the latest-readings response. This
//! is the only place that mutates `Station::latest_level`.

use std::collections::HashMap;

use crate::config::CacheConfig;
use crate::ingest::ea::{self, EaClient};
use crate::logging::DataSource;
use crate::model::{FetchError, Station};

/// Lowest name similarity `find_station_fuzzy` accepts.
pub const MIN_NAME_SIMILARITY: f64 = 0.7;

/// Fetches the station list and builds a `Station` for each usable record.
pub fn build_station_list(
    client: &EaClient,
    cache: &CacheConfig,
) -> Result<Vec<Station>, FetchError> {
    let data = client.fetch_station_data(cache)?;
    let stations = ea::parse_station_list(&data)?;
    log::info!(target: DataSource::Ea.target(), "built {} stations", stations.len());
    Ok(stations)
}

/// Fetches latest readings and applies them to `stations`.
///
/// Returns the number of stations that received a level.
pub fn update_water_levels(
    stations: &mut [Station],
    client: &EaClient,
    cache: &CacheConfig,
) -> Result<usize, FetchError> {
    let data = client.fetch_latest_water_level_data(cache)?;
    let levels = ea::parse_latest_levels(&data)?;
    let updated = apply_latest_levels(stations, &levels);
    log::info!(
        target: DataSource::Ea.target(),
        "latest level for {}/{} stations",
        updated,
        stations.len()
    );
    Ok(updated)
}

/// Sets each station's latest level from a measure-id keyed map.
///
/// Every level is cleared first, so a station whose measure is missing from
/// `levels` ends up with no level rather than a stale one.
pub fn apply_latest_levels(stations: &mut [Station], levels: &HashMap<String, f64>) -> usize {
    let mut updated = 0;
    for station in stations.iter_mut() {
        station.latest_level = levels.get(station.measure_id()).copied();
        if station.latest_level.is_some() {
            updated += 1;
        }
    }
    updated
}

/// Looks up a station by exact name.
pub fn find_station<'a>(stations: &'a [Station], name: &str) -> Option<&'a Station> {
    stations.iter().find(|s| s.name() == name)
}

/// Ranks stations by Jaro-Winkler similarity between their name and `query`,
/// ignoring case. Best match first; equal scores keep input order.
pub fn closest_stations<'a>(
    stations: &'a [Station],
    query: &str,
    n: usize,
) -> Vec<(&'a Station, f64)> {
    let query = query.to_lowercase();
    let mut scored: Vec<(&Station, f64)> = stations
        .iter()
        .map(|s| {
            let name = s.name().to_lowercase();
            (s, strsim::jaro_winkler(&query, &name))
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(n);
    scored
}

/// Exact name if present, otherwise the most similar name scoring at least
/// `MIN_NAME_SIMILARITY`.
pub fn find_station_fuzzy<'a>(stations: &'a [Station], query: &str) -> Option<&'a Station> {
    if let Some(station) = find_station(stations, query) {
        return Some(station);
    }
    closest_stations(stations, query, 1)
        .into_iter()
        .find(|(_, score)| *score >= MIN_NAME_SIMILARITY)
        .map(|(station, _)| station)
}

/// Pairs each station with the result fetched for its measure id.
///
/// `None` marks a station whose measure has no entry in `results`.
pub fn match_by_measure<'a, T>(
    targets: &[&'a Station],
    results: Vec<(String, T)>,
) -> Vec<(&'a Station, Option<T>)> {
    let mut by_measure: HashMap<String, T> = results.into_iter().collect();
    targets
        .iter()
        .map(|station| (*station, by_measure.remove(station.measure_id())))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
