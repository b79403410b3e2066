//! Geographic queries over stations.
//!
//! Great-circle distance uses the haversine formula on a sphere of radius
//! 6371 km. Sorting is stable, so stations at equal distance keep their
//! input order.

use crate::model::{Coord, Station};

/// Mean Earth radius used for all distances, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points, in kilometres.
///
/// `distance(p, p)` is exactly zero. The argument to `asin` is clamped to 1
/// so near-antipodal rounding cannot produce NaN.
pub fn distance(a: Coord, b: Coord) -> f64 {
    let half_dlat = ((b.latitude - a.latitude) / 2.0).to_radians();
    let half_dlon = ((b.longitude - a.longitude) / 2.0).to_radians();

    let h = half_dlat.sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * half_dlon.sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// `(name, town, distance_km)` for every station, nearest first.
pub fn stations_by_distance(
    stations: &[Station],
    origin: Coord,
) -> Vec<(&str, Option<&str>, f64)> {
    let mut distances: Vec<_> = stations
        .iter()
        .map(|s| (s.name(), s.town(), distance(s.coord(), origin)))
        .collect();
    distances.sort_by(|a, b| a.2.total_cmp(&b.2));
    distances
}

/// Stations no further than `radius_km` from `centre`, in input order.
///
/// The boundary is inclusive. A negative or NaN radius matches nothing.
pub fn stations_within_radius(
    stations: &[Station],
    centre: Coord,
    radius_km: f64,
) -> Vec<&Station> {
    stations
        .iter()
        .filter(|s| distance(s.coord(), centre) <= radius_km)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
