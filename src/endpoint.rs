//! HTTP endpoint for querying the station snapshot
//!
//! Provides a small read-only REST API so external tools (dashboards,
//! notebooks) can pull the same rankings the CLI prints.
//!
//! Endpoints:
//! - GET /health - Service health check
//! - GET /stations/high-risk?n=N - Highest relative levels
//! - GET /stations/over-threshold?tol=T - Relative level above T
//! - GET /stations/near?lat=..&lon=..[&radius=R] - Distance queries
//! - GET /rivers?n=N - Rivers ranked by station count
//! - GET /stations/inconsistent - Stations with unusable typical ranges

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use serde_json::json;

use crate::analysis::{groupings, ranking};
use crate::config::ReportConfig;
use crate::geo;
use crate::logging::DataSource;
use crate::model::{self, Coord, Station};

const AVAILABLE_ENDPOINTS: [&str; 6] = [
    "/health",
    "/stations/high-risk?n=N",
    "/stations/over-threshold?tol=T",
    "/stations/near?lat=LAT&lon=LON[&radius=KM]",
    "/rivers?n=N",
    "/stations/inconsistent",
];

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// One station as returned by the ranking and radius endpoints
#[derive(Debug, Serialize)]
pub struct StationSummary<'a> {
    pub name: &'a str,
    pub town: Option<&'a str>,
    pub river: Option<&'a str>,
    pub latitude: f64,
    pub longitude: f64,
    pub latest_level: Option<f64>,
    /// `null` when the typical range is inconsistent or there is no level
    pub relative_level: Option<f64>,
}

impl<'a> From<&'a Station> for StationSummary<'a> {
    fn from(station: &'a Station) -> Self {
        let coord = station.coord();
        StationSummary {
            name: station.name(),
            town: station.town(),
            river: station.river(),
            latitude: coord.latitude,
            longitude: coord.longitude,
            latest_level: station.latest_level,
            relative_level: station.relative_water_level(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DistanceEntry<'a> {
    pub name: &'a str,
    pub town: Option<&'a str>,
    pub distance_km: f64,
}

#[derive(Debug, Serialize)]
pub struct RiverCount<'a> {
    /// `null` for stations with no river recorded
    pub river: Option<&'a str>,
    pub station_count: usize,
}

/// Errors from starting the endpoint
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("failed to start HTTP server on port {port}: {reason}")]
    Bind { port: u16, reason: String },
}

// ---------------------------------------------------------------------------
// Query parsing
// ---------------------------------------------------------------------------

/// Splits a request URL into its path and decoded query parameters.
fn split_url(url: &str) -> (&str, HashMap<String, String>) {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let params = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let decode = |s: &str| {
                urlencoding::decode(s)
                    .map(|d| d.into_owned())
                    .unwrap_or_else(|_| s.to_string())
            };
            (decode(key), decode(value))
        })
        .collect();
    (path, params)
}

/// Optional typed parameter; present but unparseable is an error message.
fn param<T: FromStr>(params: &HashMap<String, String>, key: &str) -> Result<Option<T>, String> {
    match params.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid value for '{}': {}", key, raw)),
    }
}

fn required<T: FromStr>(params: &HashMap<String, String>, key: &str) -> Result<T, String> {
    param(params, key)?.ok_or_else(|| format!("missing required parameter '{}'", key))
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Routes a request URL against the snapshot, returning status and body.
///
/// Query parameters left out fall back to the values in `report`.
pub fn route(stations: &[Station], report: &ReportConfig, url: &str) -> (u16, serde_json::Value) {
    let (path, params) = split_url(url);

    let result = match path {
        "/health" => Ok(handle_health(stations)),
        "/stations/high-risk" => handle_high_risk(stations, report, &params),
        "/stations/over-threshold" => handle_over_threshold(stations, report, &params),
        "/stations/near" => handle_near(stations, &params),
        "/rivers" => handle_rivers(stations, report, &params),
        "/stations/inconsistent" => Ok(json!({
            "stations": model::inconsistent_typical_range_stations(stations)
        })),
        _ => {
            return (
                404,
                json!({
                    "error": "Not found",
                    "available_endpoints": AVAILABLE_ENDPOINTS,
                }),
            );
        }
    };

    match result {
        Ok(body) => (200, body),
        Err(message) => (400, json!({ "error": message })),
    }
}

fn handle_health(stations: &[Station]) -> serde_json::Value {
    json!({
        "status": "ok",
        "service": "floodwatch",
        "version": env!("CARGO_PKG_VERSION"),
        "station_count": stations.len(),
    })
}

fn handle_high_risk(
    stations: &[Station],
    report: &ReportConfig,
    params: &HashMap<String, String>,
) -> Result<serde_json::Value, String> {
    let n = param(params, "n")?.unwrap_or(report.high_risk_count);
    let top: Vec<StationSummary> = ranking::top_n_by_relative_level(stations, n)
        .into_iter()
        .map(StationSummary::from)
        .collect();
    Ok(json!({ "n": n, "stations": top }))
}

fn handle_over_threshold(
    stations: &[Station],
    report: &ReportConfig,
    params: &HashMap<String, String>,
) -> Result<serde_json::Value, String> {
    let tol = param(params, "tol")?.unwrap_or(report.threshold);
    let over: Vec<StationSummary> = ranking::stations_over_threshold(stations, tol)
        .into_iter()
        .map(|(station, _)| StationSummary::from(station))
        .collect();
    Ok(json!({ "tol": tol, "stations": over }))
}

fn handle_near(
    stations: &[Station],
    params: &HashMap<String, String>,
) -> Result<serde_json::Value, String> {
    let origin = Coord::new(required(params, "lat")?, required(params, "lon")?);

    match param::<f64>(params, "radius")? {
        Some(radius) => {
            let within: Vec<StationSummary> = geo::stations_within_radius(stations, origin, radius)
                .into_iter()
                .map(StationSummary::from)
                .collect();
            Ok(json!({ "radius_km": radius, "stations": within }))
        }
        None => {
            let by_distance: Vec<DistanceEntry> = geo::stations_by_distance(stations, origin)
                .into_iter()
                .map(|(name, town, distance_km)| DistanceEntry {
                    name,
                    town,
                    distance_km,
                })
                .collect();
            Ok(json!({ "stations": by_distance }))
        }
    }
}

fn handle_rivers(
    stations: &[Station],
    report: &ReportConfig,
    params: &HashMap<String, String>,
) -> Result<serde_json::Value, String> {
    let n = param(params, "n")?.unwrap_or(report.river_count);
    let rivers: Vec<RiverCount> = groupings::rivers_by_station_count(stations, n)
        .into_iter()
        .map(|(river, station_count)| RiverCount {
            river,
            station_count,
        })
        .collect();
    Ok(json!({ "n": n, "rivers": rivers }))
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Serves `stations` until the process exits. The snapshot is never
/// modified while serving.
pub fn start_endpoint_server(
    port: u16,
    stations: Vec<Station>,
    report: ReportConfig,
) -> Result<(), EndpointError> {
    let address = format!("0.0.0.0:{}", port);
    let server = tiny_http::Server::http(&address).map_err(|e| EndpointError::Bind {
        port,
        reason: e.to_string(),
    })?;

    let target = DataSource::Endpoint.target();
    log::info!(
        target: target,
        "listening on http://{} ({} stations)",
        address,
        stations.len()
    );

    for request in server.incoming_requests() {
        let (status, body) = route(&stations, &report, request.url());
        log::debug!(target: target, "{} {} -> {}", request.method(), request.url(), status);

        if let Err(e) = request.respond(create_response(status, &body)) {
            log::warn!(target: target, "failed to send response: {}", e);
        }
    }

    Ok(())
}

fn create_response(
    status_code: u16,
    json: &serde_json::Value,
) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    // Serialising a Value cannot fail: every map key is a string.
    let body = serde_json::to_string_pretty(json).unwrap_or_default();

    let response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ea;
    use crate::ingest::fixtures::*;
    use crate::stations::apply_latest_levels;

    fn snapshot() -> Vec<Station> {
        let data = ea::parse_json(fixture_station_list_json()).expect("valid JSON");
        let mut stations = ea::parse_station_list(&data).expect("fixture should parse");
        let levels = ea::parse_json(fixture_latest_levels_json()).expect("valid JSON");
        let levels = ea::parse_latest_levels(&levels).expect("fixture should parse");
        apply_latest_levels(&mut stations, &levels);
        stations
    }

    fn get(url: &str) -> (u16, serde_json::Value) {
        route(&snapshot(), &ReportConfig::default(), url)
    }

    fn names(body: &serde_json::Value, key: &str) -> Vec<String> {
        body[key]
            .as_array()
            .expect("array body")
            .iter()
            .map(|s| s["name"].as_str().expect("name").to_string())
            .collect()
    }

    #[test]
    fn test_split_url_decodes_parameters() {
        let (path, params) = split_url("/stations/near?lat=52.2&lon=0.12&name=River%20Cam");
        assert_eq!(path, "/stations/near");
        assert_eq!(params.get("lat").map(String::as_str), Some("52.2"));
        assert_eq!(params.get("name").map(String::as_str), Some("River Cam"));
    }

    #[test]
    fn test_health() {
        let (status, body) = get("/health");
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["station_count"], 8);
    }

    #[test]
    fn test_high_risk_orders_by_relative_level() {
        let (status, body) = get("/stations/high-risk?n=2");
        assert_eq!(status, 200);
        assert_eq!(
            names(&body, "stations"),
            vec!["Cam", "Cambridge Jesus Lock"]
        );
    }

    #[test]
    fn test_over_threshold_excludes_equal_to_tol() {
        let (_, body) = get("/stations/over-threshold?tol=1.0");
        assert_eq!(
            names(&body, "stations"),
            vec!["Cam", "Cambridge Jesus Lock"]
        );

        let (_, body) = get("/stations/over-threshold");
        assert_eq!(
            names(&body, "stations"),
            vec!["Cam", "Cambridge Jesus Lock", "Hemingford"]
        );
    }

    #[test]
    fn test_missing_parameters_use_report_config() {
        let report = ReportConfig {
            threshold: 1.2,
            high_risk_count: 1,
            river_count: 1,
            ..ReportConfig::default()
        };
        let stations = snapshot();

        let (_, body) = route(&stations, &report, "/stations/over-threshold");
        assert_eq!(body["tol"], 1.2);
        assert_eq!(names(&body, "stations"), vec!["Cam"]);

        let (_, body) = route(&stations, &report, "/stations/high-risk");
        assert_eq!(names(&body, "stations"), vec!["Cam"]);

        let (_, body) = route(&stations, &report, "/rivers");
        assert_eq!(body["n"], 1);
        assert_eq!(body["rivers"].as_array().map(Vec::len), Some(1));

        // An explicit parameter still wins over the configured value.
        let (_, body) = route(&stations, &report, "/stations/over-threshold?tol=1.0");
        assert_eq!(
            names(&body, "stations"),
            vec!["Cam", "Cambridge Jesus Lock"]
        );
    }

    #[test]
    fn test_near_with_radius() {
        let (status, body) = get("/stations/near?lat=52.2053&lon=0.1218&radius=10");
        assert_eq!(status, 200);
        assert_eq!(
            names(&body, "stations"),
            vec!["Cam", "Cambridge Jesus Lock", "Haslingfield Burnt Mill"]
        );
    }

    #[test]
    fn test_near_without_radius_lists_all_by_distance() {
        let (_, body) = get("/stations/near?lat=52.2053&lon=0.1218");
        let stations = body["stations"].as_array().expect("array");
        assert_eq!(stations.len(), 8);
        assert_eq!(stations[0]["name"], "Cambridge Jesus Lock");
        let distances: Vec<f64> = stations
            .iter()
            .map(|s| s["distance_km"].as_f64().expect("distance"))
            .collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_near_requires_coordinates() {
        let (status, body) = get("/stations/near?lat=52.2");
        assert_eq!(status, 400);
        assert!(body["error"].as_str().expect("message").contains("lon"));
    }

    #[test]
    fn test_malformed_parameter_is_bad_request() {
        let (status, _) = get("/stations/high-risk?n=-3");
        assert_eq!(status, 400);
        let (status, _) = get("/rivers?n=lots");
        assert_eq!(status, 400);
    }

    #[test]
    fn test_rivers_unknown_river_is_null() {
        let (status, body) = get("/rivers?n=2");
        assert_eq!(status, 200);
        let rivers = body["rivers"].as_array().expect("array");
        // River Cam (3), then a five-way tie at 1 which includes the unknown group
        assert_eq!(rivers.len(), 6);
        assert_eq!(rivers[0]["river"], "River Cam");
        assert_eq!(rivers[0]["station_count"], 3);
        assert!(
            rivers[1]["river"].is_null(),
            "unknown river sorts first among ties"
        );
    }

    #[test]
    fn test_inconsistent() {
        let (_, body) = get("/stations/inconsistent");
        assert_eq!(
            body["stations"],
            json!([
                "Bourton Dickler",
                "Gaw Bridge",
                "Surfleet Sluice",
                "Swindon",
            ])
        );
    }

    #[test]
    fn test_undefined_relative_level_is_null_not_zero() {
        let (_, body) = get("/stations/near?lat=51.874767&lon=-1.740083&radius=1");
        let stations = body["stations"].as_array().expect("array");
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0]["name"], "Bourton Dickler");
        assert_eq!(stations[0]["latest_level"], 0.7);
        assert!(stations[0]["relative_level"].is_null());
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let (status, body) = get("/site/05568500");
        assert_eq!(status, 404);
        assert!(body["available_endpoints"].is_array());
    }
}
