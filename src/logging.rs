//! Structured logging for the flood warning service.
//!
//! All modules log through the `log` facade. Each message carries a target
//! naming the data source it concerns (`EA`, `CACHE`, …) so fetch noise can
//! be filtered separately from reports, e.g. `RUST_LOG=EA=debug`.
//! The pure analysis modules never log.

use std::fmt;

use log::LevelFilter;

use crate::model::FetchError;

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Environment Agency flood-monitoring API
    Ea,
    Cache,
    Config,
    Endpoint,
    System,
}

impl DataSource {
    /// Log target for this source.
    pub const fn target(self) -> &'static str {
        match self {
            DataSource::Ea => "EA",
            DataSource::Cache => "CACHE",
            DataSource::Config => "CFG",
            DataSource::Endpoint => "HTTP",
            DataSource::System => "SYS",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target())
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// The feed legitimately has nothing for this measure right now
    Expected,
    /// Service degradation, API change or local misconfiguration
    Unexpected,
    /// Cannot tell which
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Classify a fetch-layer failure.
pub fn classify_fetch_failure(err: &FetchError) -> FailureType {
    match err {
        FetchError::NoData(_) => FailureType::Expected,
        // 404 on a readings URL usually means a retired measure
        FetchError::Status(404) => FailureType::Expected,
        FetchError::Status(_) | FetchError::Parse(_) | FetchError::Cache { .. } => {
            FailureType::Unexpected
        }
        FetchError::Http(e) if e.is_timeout() || e.is_connect() => FailureType::Unexpected,
        FetchError::Http(_) => FailureType::Unknown,
    }
}

// ---------------------------------------------------------------------------
// Initialisation
// ---------------------------------------------------------------------------

/// Parses a configured level name; unknown names fall back to `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or(LevelFilter::Info)
}

/// Initialise the global logger. `RUST_LOG`, when set, takes precedence
/// over `level`. Calling this twice is harmless.
pub fn init_logger(level: LevelFilter) {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    let _ = builder.try_init();
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a fetch failure with automatic classification.
pub fn log_fetch_failure(subject: &str, operation: &str, err: &FetchError) {
    let failure_type = classify_fetch_failure(err);
    let target = DataSource::Ea.target();

    let message = format!(
        "[{}] {} failed [{}]: {}",
        subject, operation, failure_type, err
    );

    match failure_type {
        FailureType::Expected => log::debug!(target: target, "{}", message),
        FailureType::Unexpected => log::error!(target: target, "{}", message),
        FailureType::Unknown => log::warn!(target: target, "{}", message),
    }
}

/// Log a summary of a batch of fetches.
pub fn log_batch_summary(source: DataSource, what: &str, total: usize, failed: usize) {
    let successful = total - failed.min(total);
    let target = source.target();

    if failed == 0 {
        log::info!(
            target: target,
            "{}: {}/{} successful",
            what,
            successful,
            total
        );
    } else if successful == 0 {
        log::error!(target: target, "{}: all {} failed", what, total);
    } else {
        log::warn!(
            target: target,
            "{}: {}/{} successful, {} failed",
            what,
            successful,
            total,
            failed
        );
    }
}
