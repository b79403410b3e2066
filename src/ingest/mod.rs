//! Data retrieval from the Environment Agency flood-monitoring feed.
//!
//! - `ea`    : URL construction, HTTP client and JSON parsing
//! - `cache` : local JSON copies of feed responses
//! - `fixtures` (test only) : representative API response payloads

pub mod cache;
pub mod ea;

#[cfg(test)]
pub(crate) mod fixtures;
