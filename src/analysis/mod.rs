//! Data analysis for the flood warning service.
//!
//! Submodules:
//! - `ranking`   : threshold filter and top-N selection by relative level.
//! - `groupings` : organises flat station lists into per-river structures
//!   and ranks rivers by station count.
//! - `polyfit`   : least-squares trend over a reading history.

pub mod groupings;
pub mod polyfit;
pub mod ranking;
