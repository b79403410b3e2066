//! floodwatch_service: river flood-warning risk ranking over the
//! Environment Agency real-time monitoring feed.
//!
//! # Module structure
//!
//! ```text
//! floodwatch_service
//! ├── model       : shared data types (Station, TypicalRange, Reading, FetchError, …)
//! ├── geo         : haversine distance, distance sort and radius filter
//! ├── config      : service configuration loader (floodwatch.toml)
//! ├── logging     : logger setup, per-source log targets, failure classification
//! ├── stations    : station list assembly, latest-level updates, name lookup
//! ├── endpoint    : read-only JSON HTTP API over the station snapshot
//! ├── ingest
//! │   ├── ea      : flood-monitoring API: URL construction, client, JSON parsing
//! │   ├── cache   : local JSON copies of feed responses
//! │   └── fixtures (test only) : representative API response payloads
//! └── analysis
//!     ├── ranking   : threshold filter and top-N by relative level
//!     ├── groupings : per-river grouping and rivers ranked by station count
//!     └── polyfit   : least-squares trend over a reading history
//! ```

pub mod analysis;
pub mod config;
pub mod endpoint;
pub mod geo;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod stations;
