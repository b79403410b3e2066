//! Local JSON cache for feed responses.
//!
//! The station list changes rarely and is large, so it is normally served
//! from disk. Latest levels are fetched fresh unless configured otherwise.
//! A fresh fetch always rewrites the cache file.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::ingest::ea::parse_json;
use crate::logging::DataSource;
use crate::model::FetchError;

fn cache_error(path: &Path, source: std::io::Error) -> FetchError {
    FetchError::Cache {
        path: path.display().to_string(),
        source,
    }
}

/// Reads a cached response.
pub fn load(path: &Path) -> Result<Value, FetchError> {
    let body = fs::read_to_string(path).map_err(|e| cache_error(path, e))?;
    parse_json(&body)
}

/// Writes a response to the cache, creating the directory if needed.
pub fn dump(path: &Path, data: &Value) -> Result<(), FetchError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| cache_error(dir, e))?;
    }
    let body = serde_json::to_string(data).map_err(|e| FetchError::Parse(e.to_string()))?;
    fs::write(path, body).map_err(|e| cache_error(path, e))
}

/// Serves `path` when `use_cache` is set and the file loads; otherwise
/// calls `fetch` and refreshes the cache with its result.
///
/// An unreadable cache falls through to `fetch`. A failed cache write is
/// logged and the fetched data is still returned.
pub fn cached_or_fetch<F>(path: &Path, use_cache: bool, fetch: F) -> Result<Value, FetchError>
where
    F: FnOnce() -> Result<Value, FetchError>,
{
    let target = DataSource::Cache.target();

    if use_cache {
        match load(path) {
            Ok(data) => {
                log::debug!(target: target, "hit {}", path.display());
                return Ok(data);
            }
            Err(e) => log::debug!(target: target, "miss {}: {}", path.display(), e),
        }
    }

    let data = fetch()?;

    if let Err(e) = dump(path, &data) {
        log::warn!(target: target, "could not write cache: {}", e);
    }

    Ok(data)
}
