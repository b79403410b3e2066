//! Environment Agency flood-monitoring API client.
//!
//! Handles URL construction, HTTP retrieval and JSON parsing for:
//!   http://environment.data.gov.uk/flood-monitoring/doc/reference
//!
//! Every response is an `items[]` envelope. Parsing is lenient per item: a
//! station record that lacks a required field is skipped, not fatal, because
//! the feed routinely carries a few incomplete stations. See `fixtures.rs`
//! for annotated examples of each response.

use std::collections::HashMap;
use std::sync::mpsc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;
use threadpool::ThreadPool;

use crate::config::{CacheConfig, SourceConfig};
use crate::ingest::cache;
use crate::logging::DataSource;
use crate::model::{FetchError, Label, Reading, Station, StationError, TypicalRange};

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// Active river-level stations with stage monitoring, full view.
pub const STATION_URL: &str = concat!(
    "http://environment.data.gov.uk/flood-monitoring/id/stations",
    "?status=Active&parameter=level&qualifier=Stage&_view=full"
);

/// Latest readings for every stage-level measure.
pub const LEVEL_URL: &str = concat!(
    "http://environment.data.gov.uk/flood-monitoring/id/measures",
    "?parameter=level&qualifier=Stage&qualifier=level"
);

/// Builds the readings URL for a measure, covering everything since `since`.
///
/// The measure id is itself a URL, so the path is appended to it directly.
pub fn build_readings_url(measure_id: &str, since: DateTime<Utc>) -> String {
    format!(
        "{}/readings/?_sorted&since={}Z",
        measure_id,
        since.format("%Y-%m-%dT%H:%M:%S")
    )
}

// ---------------------------------------------------------------------------
// Serde structures for station records
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawStation {
    #[serde(rename = "@id")]
    id: String,
    label: Label,
    lat: f64,
    long: f64,
    measures: Vec<RawMeasure>,
    #[serde(default)]
    town: Option<Value>,
    #[serde(default, rename = "riverName")]
    river_name: Option<Value>,
    #[serde(default, rename = "stageScale")]
    stage_scale: Option<Value>,
}

#[derive(Deserialize)]
struct RawMeasure {
    #[serde(rename = "@id")]
    id: String,
}

#[derive(Deserialize)]
struct StageScale {
    #[serde(rename = "typicalRangeLow")]
    low: f64,
    #[serde(rename = "typicalRangeHigh")]
    high: f64,
}

/// Optional string attribute; anything that is not a JSON string is absent.
fn string_field(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

impl RawStation {
    fn into_station(self) -> Result<Option<Station>, StationError> {
        // The last listed measure is the one used for readings.
        let Some(measure) = self.measures.into_iter().last() else {
            return Ok(None);
        };

        let typical_range = self
            .stage_scale
            .and_then(|v| StageScale::deserialize(v).ok())
            .map(|s| TypicalRange::new(s.low, s.high));

        Station::new(
            self.id,
            measure.id,
            self.label,
            (self.lat, self.long),
            typical_range,
            string_field(self.river_name),
            string_field(self.town),
        )
        .map(Some)
    }
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// The `items` array of a response envelope.
fn items(data: &Value) -> Result<&Vec<Value>, FetchError> {
    data.get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| FetchError::Parse("response has no items array".to_string()))
}

/// Parses a raw response body.
pub fn parse_json(body: &str) -> Result<Value, FetchError> {
    serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("JSON deserialization failed: {}", e)))
}

/// Builds stations from a station-list response.
///
/// Records missing an id, label, coordinates or measures, or whose label is
/// an empty list, are skipped and logged at debug.
///
/// # Errors
/// `FetchError::Parse` if the body has no `items` array.
pub fn parse_station_list(data: &Value) -> Result<Vec<Station>, FetchError> {
    let target = DataSource::Ea.target();
    let mut stations = Vec::new();

    for item in items(data)? {
        let id = item.get("@id").and_then(Value::as_str).unwrap_or("<no id>");

        let raw = match RawStation::deserialize(item) {
            Ok(raw) => raw,
            Err(e) => {
                log::debug!(target: target, "[{}] skipping station record: {}", id, e);
                continue;
            }
        };

        match raw.into_station() {
            Ok(Some(station)) => stations.push(station),
            Ok(None) => log::debug!(target: target, "[{}] skipping station with no measures", id),
            Err(e) => log::debug!(target: target, "[{}] skipping station: {}", id, e),
        }
    }

    Ok(stations)
}

/// Maps measure id to latest level from a measures response.
///
/// Only object-shaped `latestReading`s with a numeric `value` count; list or
/// string values are ignored.
pub fn parse_latest_levels(data: &Value) -> Result<HashMap<String, f64>, FetchError> {
    let mut levels = HashMap::new();

    for item in items(data)? {
        let Some(reading) = item.get("latestReading").filter(|r| r.is_object()) else {
            continue;
        };
        let measure = reading.get("measure").and_then(Value::as_str);
        let value = reading.get("value").and_then(Value::as_f64);

        if let (Some(measure), Some(value)) = (measure, value) {
            levels.insert(measure.to_string(), value);
        }
    }

    Ok(levels)
}

/// Parses a readings response, in response order. Entries without an
/// RFC 3339 `dateTime` or a numeric `value` are skipped.
pub fn parse_readings(data: &Value) -> Result<Vec<Reading>, FetchError> {
    let readings = items(data)?
        .iter()
        .filter_map(|item| {
            let time = item
                .get("dateTime")
                .and_then(Value::as_str)
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())?
                .with_timezone(&Utc);
            let level = item.get("value").and_then(Value::as_f64)?;
            Some(Reading { time, level })
        })
        .collect();

    Ok(readings)
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Blocking client for the flood-monitoring API. Cheap to clone.
#[derive(Clone)]
pub struct EaClient {
    http: reqwest::blocking::Client,
    station_url: String,
    level_url: String,
}

impl EaClient {
    pub fn new(source: &SourceConfig) -> Result<Self, FetchError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(StdDuration::from_secs(source.request_timeout_secs))
            .user_agent(concat!("floodwatch_service/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            station_url: source.station_url.clone(),
            level_url: source.level_url.clone(),
        })
    }

    /// GET a URL and decode the JSON body.
    pub fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        log::debug!(target: DataSource::Ea.target(), "GET {}", url);

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.text()?;
        parse_json(&body)
    }

    /// Station-list response, from cache when configured.
    pub fn fetch_station_data(&self, cache: &CacheConfig) -> Result<Value, FetchError> {
        cache::cached_or_fetch(&cache.station_path(), cache.use_station_cache, || {
            self.fetch_json(&self.station_url)
        })
    }

    /// Latest-level response, from cache when configured.
    pub fn fetch_latest_water_level_data(&self, cache: &CacheConfig) -> Result<Value, FetchError> {
        cache::cached_or_fetch(&cache.level_path(), cache.use_level_cache, || {
            self.fetch_json(&self.level_url)
        })
    }

    /// Readings for `measure_id` over the last `dt`, oldest first.
    ///
    /// # Errors
    /// `FetchError::NoData` if the window holds no usable readings.
    pub fn fetch_measure_levels(
        &self,
        measure_id: &str,
        dt: Duration,
    ) -> Result<Vec<Reading>, FetchError> {
        let url = build_readings_url(measure_id, Utc::now() - dt);
        let mut readings = parse_readings(&self.fetch_json(&url)?)?;

        if readings.is_empty() {
            return Err(FetchError::NoData(format!("no readings for {} in window", measure_id)));
        }

        readings.sort_by_key(|r| r.time);
        Ok(readings)
    }
}

/// Fetches reading histories for several measures in parallel.
///
/// Results come back in the order of `measure_ids`, each paired with its
/// measure id. One measure failing does not affect the others.
pub fn fetch_histories(
    client: &EaClient,
    measure_ids: &[String],
    dt: Duration,
    workers: usize,
) -> Vec<(String, Result<Vec<Reading>, FetchError>)> {
    let pool = ThreadPool::new(workers.max(1));
    let (tx, rx) = mpsc::channel();

    for (index, measure_id) in measure_ids.iter().enumerate() {
        let tx = tx.clone();
        let client = client.clone();
        let measure_id = measure_id.clone();

        pool.execute(move || {
            let result = client.fetch_measure_levels(&measure_id, dt);
            // The receiver outlives every job; a send error means it was dropped early.
            let _ = tx.send((index, measure_id, result));
        });
    }
    drop(tx);

    let mut results: Vec<_> = rx.iter().collect();
    results.sort_by_key(|(index, _, _)| *index);
    results
        .into_iter()
        .map(|(_, id, result)| (id, result))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
