//! Test fixtures: representative JSON payloads from the Environment Agency
//! flood-monitoring API.
//!
//! These fixtures are structurally faithful but truncated to the fields the
//! parsers read. They reflect the envelopes returned by:
//!   http://environment.data.gov.uk/flood-monitoring/id/stations?_view=full
//!   http://environment.data.gov.uk/flood-monitoring/id/measures
//!   {measure}/readings
//!
//! Response shape (all three):
//!   response.items[]
//!
//! Station items:
//!   .@id, .label (string, or a list of duplicate labels), .lat, .long,
//!   .town?, .riverName?, .measures[].@id, .stageScale?.typicalRangeLow/High
//!
//! Measure items:
//!   .latestReading?.measure, .latestReading?.value (a number, occasionally
//!   a list), and latestReading itself is sometimes just a URL string.
//!
//! Reading items:
//!   .dateTime (RFC 3339), .value

/// Eight usable stations plus three records the parser must skip.
///
/// Usable:
/// - Cam, Cambridge Jesus Lock (label list, two measures), Haslingfield
///   Burnt Mill: River Cam, consistent ranges
/// - Bourton Dickler: no stageScale
/// - Surfleet Sluice: inverted range (0.895, 0.15)
/// - Gaw Bridge: sentinel range (0, 0)
/// - Hemingford: River Great Ouse, range (2.4, 3.0)
/// - Swindon: no river, no town, stageScale given as a URL string
///
/// Skipped: missing `lat`, empty label list, missing `measures`.
#[cfg(test)]
pub(crate) fn fixture_station_list_json() -> &'static str {
    r#"{
      "@context": "http://environment.data.gov.uk/flood-monitoring/meta/context.jsonld",
      "items": [
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/E21136",
          "label": "Cam",
          "lat": 52.19625,
          "long": 0.11918,
          "town": "Cambridge",
          "riverName": "River Cam",
          "measures": [
            { "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/E21136-level-stage-i-15_min-mASD", "parameter": "level" }
          ],
          "stageScale": {
            "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/E21136/stageScale",
            "typicalRangeHigh": 0.52,
            "typicalRangeLow": 0.06
          }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/L1104",
          "label": ["Cambridge Jesus Lock", "Cambridge Jesus Lock"],
          "lat": 52.21141,
          "long": 0.12279,
          "town": "Cambridge",
          "riverName": "River Cam",
          "measures": [
            { "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/1104-level-downstage-i-15_min-mASD", "parameter": "level" },
            { "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/1104-level-stage-i-15_min-mASD", "parameter": "level" }
          ],
          "stageScale": { "typicalRangeHigh": 0.274, "typicalRangeLow": 0.076 }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/E60101",
          "label": "Haslingfield Burnt Mill",
          "lat": 52.14323,
          "long": 0.06106,
          "town": "Haslingfield",
          "riverName": "River Cam",
          "measures": [
            { "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/E60101-level-stage-i-15_min-m" }
          ],
          "stageScale": { "typicalRangeHigh": 0.29, "typicalRangeLow": 0.089 }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/1029TH",
          "label": "Bourton Dickler",
          "lat": 51.874767,
          "long": -1.740083,
          "town": "Little Rissington",
          "riverName": "River Dikler",
          "measures": [
            { "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/1029TH-level-stage-i-15_min-mASD" }
          ]
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/E8498",
          "label": "Surfleet Sluice",
          "lat": 52.845991,
          "long": -0.100848,
          "town": "Surfleet Seas End",
          "riverName": "River Glen",
          "measures": [
            { "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/E8498-level-stage-i-15_min-mASD" }
          ],
          "stageScale": { "typicalRangeHigh": 0.15, "typicalRangeLow": 0.895 }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/52119",
          "label": "Gaw Bridge",
          "lat": 50.976043,
          "long": -2.793549,
          "town": "Kingsbury Episcopi",
          "riverName": "River Parrett",
          "measures": [
            { "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/52119-level-stage-i-15_min-mASD" }
          ],
          "stageScale": { "typicalRangeHigh": 0.0, "typicalRangeLow": 0.0 }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/E22000",
          "label": "Hemingford",
          "lat": 52.32419,
          "long": -0.10185,
          "town": "Hemingford Abbots",
          "riverName": "River Great Ouse",
          "measures": [
            { "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/E22000-level-stage-i-15_min-mASD" }
          ],
          "stageScale": { "typicalRangeHigh": 3.0, "typicalRangeLow": 2.4 }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/2001",
          "label": "Swindon",
          "lat": 51.55,
          "long": -1.78,
          "measures": [
            { "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/2001-level-stage-i-15_min-mASD" }
          ],
          "stageScale": "http://environment.data.gov.uk/flood-monitoring/id/stations/2001/stageScale"
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/BAD1",
          "label": "Broken Lat",
          "long": 0.5,
          "measures": [{ "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/BAD1-level" }]
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/BAD2",
          "label": [],
          "lat": 52.0,
          "long": 0.5,
          "measures": [{ "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/BAD2-level" }]
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/stations/BAD3",
          "label": "No Measures",
          "lat": 52.0,
          "long": 0.5
        }
      ]
    }"#
}

/// Latest readings keyed by measure for the stations above.
///
/// - Cam 0.62, Jesus Lock 0.29 (on its second measure), Haslingfield 0.2,
///   Bourton 0.7, Surfleet 0.5, Hemingford 3 (an integer)
/// - Gaw Bridge: value is a list, must be ignored
/// - Swindon: latestReading is a URL string, must be ignored
/// - one measure without a latestReading, one for a station not in the list
#[cfg(test)]
pub(crate) fn fixture_latest_levels_json() -> &'static str {
    r#"{
      "items": [
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/E21136-level-stage-i-15_min-mASD",
          "latestReading": {
            "dateTime": "2024-01-10T10:00:00Z",
            "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/E21136-level-stage-i-15_min-mASD",
            "value": 0.62
          }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/1104-level-downstage-i-15_min-mASD",
          "latestReading": {
            "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/1104-level-downstage-i-15_min-mASD",
            "value": 9.99
          }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/1104-level-stage-i-15_min-mASD",
          "latestReading": {
            "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/1104-level-stage-i-15_min-mASD",
            "value": 0.29
          }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/E60101-level-stage-i-15_min-m",
          "latestReading": {
            "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/E60101-level-stage-i-15_min-m",
            "value": 0.2
          }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/1029TH-level-stage-i-15_min-mASD",
          "latestReading": {
            "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/1029TH-level-stage-i-15_min-mASD",
            "value": 0.7
          }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/E8498-level-stage-i-15_min-mASD",
          "latestReading": {
            "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/E8498-level-stage-i-15_min-mASD",
            "value": 0.5
          }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/52119-level-stage-i-15_min-mASD",
          "latestReading": {
            "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/52119-level-stage-i-15_min-mASD",
            "value": [0.5, 0.6]
          }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/E22000-level-stage-i-15_min-mASD",
          "latestReading": {
            "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/E22000-level-stage-i-15_min-mASD",
            "value": 3
          }
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/2001-level-stage-i-15_min-mASD",
          "latestReading": "http://environment.data.gov.uk/flood-monitoring/data/readings/2001-level-stage-i-15_min-mASD/2024-01-10T10-00-00Z"
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/3333-level-stage-i-15_min-mASD"
        },
        {
          "@id": "http://environment.data.gov.uk/flood-monitoring/id/measures/9999-level-stage-i-15_min-mASD",
          "latestReading": {
            "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/9999-level-stage-i-15_min-mASD",
            "value": 1.0
          }
        }
      ]
    }"#
}

/// Reading history for the Cam measure, newest first as `_sorted` returns it.
/// Contains one list-valued entry and one bad timestamp, both to be skipped.
#[cfg(test)]
pub(crate) fn fixture_readings_json() -> &'static str {
    r#"{
      "items": [
        { "dateTime": "2024-01-10T10:00:00Z", "measure": "E21136-level-stage-i-15_min-mASD", "value": 0.61 },
        { "dateTime": "2024-01-10T09:45:00Z", "measure": "E21136-level-stage-i-15_min-mASD", "value": 0.60 },
        { "dateTime": "2024-01-10T09:30:00Z", "measure": "E21136-level-stage-i-15_min-mASD", "value": [0.59, 0.58] },
        { "dateTime": "not a timestamp", "measure": "E21136-level-stage-i-15_min-mASD", "value": 0.5 },
        { "dateTime": "2024-01-10T09:15:00+00:00", "measure": "E21136-level-stage-i-15_min-mASD", "value": 0.58 }
      ]
    }"#
}

/// A body with no `items` array at all.
#[cfg(test)]
pub(crate) fn fixture_missing_items_json() -> &'static str {
    r#"{ "meta": { "publisher": "Environment Agency" } }"#
}
