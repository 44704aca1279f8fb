#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Statistics and hotspot result types.
//!
//! These are the aggregation results computed by `litter_map_analytics`
//! and serialized to JSON by the stats endpoint. They are derived values
//! with no independent lifecycle: recomputed from the current entry set
//! on every request, never persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic cluster of entries, reported as a single aggregate
/// point for map display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    /// Centroid latitude of the clustered entries.
    pub latitude: f64,
    /// Centroid longitude of the clustered entries.
    pub longitude: f64,
    /// Number of entries in the cluster.
    pub count: u64,
    /// Display radius in meters. A flat constant, not derived from the
    /// spread of the cluster.
    pub radius: f64,
}

/// Minimum and maximum timestamp among the aggregated entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest entry timestamp.
    pub start: DateTime<Utc>,
    /// Latest entry timestamp.
    pub end: DateTime<Utc>,
}

/// Aggregate statistics over a (possibly filtered) set of entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    /// Number of entries aggregated.
    pub total_count: u64,
    /// Wire name of the most frequent trash type, or the empty string
    /// when no entries were aggregated.
    pub most_common_type: String,
    /// Hotspot clusters, highest count first, at most five.
    pub hotspots: Vec<Hotspot>,
    /// Entry count per trash type wire name.
    pub type_breakdown: BTreeMap<String, u64>,
    /// Timestamp range of the aggregated entries. Defaults to the
    /// current instant on both ends when no entries were aggregated, so
    /// the field is never absent.
    pub date_range: DateRange,
}
