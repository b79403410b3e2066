//! Core data types for the flood warning service.
//!
//! Station, its coordinate and typical range, the label normalisation used
//! at construction time, reading history samples, and the error types
//! shared by the ingest layer. Derived values (`relative_water_level`) are
//! computed live from the current `latest_level`; nothing here does I/O.

use chrono::{DateTime, Utc};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coord {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coord {
            latitude,
            longitude,
        }
    }
}

impl From<(f64, f64)> for Coord {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Coord::new(latitude, longitude)
    }
}

// ---------------------------------------------------------------------------
// Typical range
// ---------------------------------------------------------------------------

/// Historically expected low/high stage band for a station, in metres.
///
/// Stored exactly as supplied; whether it can be used as a normalisation
/// reference is decided by `Station::typical_range_consistent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypicalRange {
    pub low: f64,
    pub high: f64,
}

impl TypicalRange {
    pub fn new(low: f64, high: f64) -> Self {
        TypicalRange { low, high }
    }

    /// `(0, 0)` is what the feed reports when it has no real range.
    pub fn is_sentinel(&self) -> bool {
        self.low == 0.0 && self.high == 0.0
    }

    pub fn is_consistent(&self) -> bool {
        !self.is_sentinel() && self.low < self.high
    }
}

impl From<(f64, f64)> for TypicalRange {
    fn from((low, high): (f64, f64)) -> Self {
        TypicalRange { low, high }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// A station label as the feed delivers it.
///
/// Some records carry `["Name", "Name"]` instead of `"Name"`. The list form
/// never leaves construction: `Station::new` keeps only the first element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Single(String),
    Many(Vec<String>),
}

impl Label {
    /// The canonical name, or `None` for an empty list.
    pub fn into_name(self) -> Option<String> {
        match self {
            Label::Single(name) => Some(name),
            Label::Many(names) => names.into_iter().next(),
        }
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::Single(name.to_string())
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Label::Single(name)
    }
}

impl From<Vec<String>> for Label {
    fn from(names: Vec<String>) -> Self {
        Label::Many(names)
    }
}

impl From<Vec<&str>> for Label {
    fn from(names: Vec<&str>) -> Self {
        Label::Many(names.into_iter().map(String::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Station
// ---------------------------------------------------------------------------

/// One river-level monitoring station.
///
/// Everything except `latest_level` is fixed at construction. `latest_level`
/// is reset and repopulated by `stations::apply_latest_levels` on each
/// refresh; stations without a matching feed entry stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    station_id: String,
    measure_id: String,
    name: String,
    coord: Coord,
    typical_range: Option<TypicalRange>,
    river: Option<String>,
    town: Option<String>,
    /// Latest stage reading in metres.
    pub latest_level: Option<f64>,
}

impl Station {
    /// Builds a station, normalising a list label to its first element.
    ///
    /// # Errors
    /// `StationError::EmptyLabel` if the label is an empty list.
    pub fn new(
        station_id: impl Into<String>,
        measure_id: impl Into<String>,
        label: impl Into<Label>,
        coord: impl Into<Coord>,
        typical_range: Option<TypicalRange>,
        river: Option<String>,
        town: Option<String>,
    ) -> Result<Self, StationError> {
        let station_id = station_id.into();
        let name = label
            .into()
            .into_name()
            .ok_or_else(|| StationError::EmptyLabel(station_id.clone()))?;

        Ok(Station {
            station_id,
            measure_id: measure_id.into(),
            name,
            coord: coord.into(),
            typical_range,
            river,
            town,
            latest_level: None,
        })
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn measure_id(&self) -> &str {
        &self.measure_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn typical_range(&self) -> Option<TypicalRange> {
        self.typical_range
    }

    pub fn river(&self) -> Option<&str> {
        self.river.as_deref()
    }

    pub fn town(&self) -> Option<&str> {
        self.town.as_deref()
    }

    /// True iff a range is present, is not the `(0, 0)` sentinel, and
    /// `low < high`.
    pub fn typical_range_consistent(&self) -> bool {
        self.typical_range.is_some_and(|r| r.is_consistent())
    }

    /// Latest level as a fraction of the typical band.
    ///
    /// `None` when there is no latest level or the typical range is not
    /// consistent. Unclamped: above the typical high gives > 1, below the
    /// typical low gives < 0.
    pub fn relative_water_level(&self) -> Option<f64> {
        let level = self.latest_level?;
        let range = self.typical_range.filter(|r| r.is_consistent())?;
        Some((level - range.low) / (range.high - range.low))
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let or_unknown = |v: Option<&str>| v.unwrap_or("unknown").to_string();
        writeln!(f, "Station name:     {}", self.name)?;
        writeln!(f, "   id:            {}", self.station_id)?;
        writeln!(f, "   measure id:    {}", self.measure_id)?;
        writeln!(
            f,
            "   coordinate:    ({}, {})",
            self.coord.latitude, self.coord.longitude
        )?;
        writeln!(f, "   town:          {}", or_unknown(self.town()))?;
        writeln!(f, "   river:         {}", or_unknown(self.river()))?;
        match self.typical_range {
            Some(r) => write!(f, "   typical range: ({}, {})", r.low, r.high),
            None => write!(f, "   typical range: none"),
        }
    }
}

/// Names of every station whose typical range is absent or inconsistent,
/// sorted ascending.
pub fn inconsistent_typical_range_stations(stations: &[Station]) -> Vec<&str> {
    let mut names: Vec<&str> = stations
        .iter()
        .filter(|s| !s.typical_range_consistent())
        .map(|s| s.name())
        .collect();
    names.sort();
    names
}

// ---------------------------------------------------------------------------
// Reading history
// ---------------------------------------------------------------------------

/// One timestamped stage sample from a measure's reading history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub time: DateTime<Utc>,
    pub level: f64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors from constructing a `Station`.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum StationError {
    /// The label was an empty list, so the station has no name.
    #[error("station {0} has an empty label")]
    EmptyLabel(String),
}

/// Errors that can arise when fetching, caching or parsing feed data.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx response from the API.
    #[error("HTTP status: {0}")]
    Status(u16),
    /// The body could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),
    /// Reading or writing a cache file failed.
    #[error("Cache error at {path}: {source}")]
    Cache {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The response parsed but held nothing usable.
    #[error("No data available: {0}")]
    NoData(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
