//! Data models for Drawing Supporter
//!
//! Defines the core data structures: region maps, records, and search hits.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Region name → region text
///
/// Sorted so that encoding and search output are deterministic.
pub type RegionMap = BTreeMap<String, String>;

/// Region holding the creation date rather than free text
pub const DATE_REGION: &str = "Date";

/// Format of the `Date` region (e.g. `2017/03/11`)
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Regions the editor shows by default
pub const DEFAULT_REGIONS: [&str; 4] = ["Exp", "Memo", "Tips", "Other"];

/// Format a date the way the `Date` region stores it
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Creation date of an annotation
///
/// Returns the stored `Date` region, or `today` formatted as a `Date` value
/// when the annotation has none yet.
pub fn creation_date(regions: &RegionMap, today: NaiveDate) -> String {
    regions
        .get(DATE_REGION)
        .cloned()
        .unwrap_or_else(|| format_date(today))
}

/// Whether a region map carries any text worth persisting
///
/// The `Date` region alone does not count.
pub fn has_content(regions: &RegionMap) -> bool {
    regions
        .iter()
        .any(|(name, text)| name != DATE_REGION && !text.is_empty())
}

/// One annotation record as stored in the backing file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub identity: Identity,
    pub regions: RegionMap,
}

/// A single search match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Identity of the record the match came from
    pub identity: Identity,
    /// Region the match was found in
    pub region: String,
    /// Up to 20 characters starting at the match
    pub snippet: String,
}

/// Summary of the backing file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub records: usize,
    pub size_bytes: u64,
}
