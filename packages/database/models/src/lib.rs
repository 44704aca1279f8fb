#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types and query filter definitions.
//!
//! These types represent the shapes of data as stored in and retrieved
//! from the `SQLite` database. They are distinct from the API response
//! types in `litter_map_server_models` so the wire contract can evolve
//! independently of the storage layout.

use chrono::{DateTime, Utc};
use litter_map_trash_models::TrashType;
use serde::{Deserialize, Serialize};

/// A logged litter sighting as stored in the `trash_entries` table.
///
/// Entries are write-once: they are created by a submission and never
/// updated or deleted afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrashEntry {
    /// UUID primary key, generated at creation.
    pub id: String,
    /// When the sighting was logged, set at creation (UTC, millisecond
    /// precision).
    pub timestamp: DateTime<Utc>,
    /// Trash category from the canonical taxonomy.
    pub trash_type: TrashType,
    /// Latitude (WGS84), in [-90, 90].
    pub latitude: f64,
    /// Longitude (WGS84), in [-180, 180].
    pub longitude: f64,
    /// Relative URL of the attached photo, if one was uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Submitter name, `None` for anonymous reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

/// Fields for a new entry, before the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrashEntry {
    /// Trash category from the canonical taxonomy.
    pub trash_type: TrashType,
    /// Latitude (WGS84), in [-90, 90].
    pub latitude: f64,
    /// Longitude (WGS84), in [-180, 180].
    pub longitude: f64,
    /// Relative URL of the attached photo, if one was uploaded.
    pub photo_url: Option<String>,
    /// Submitter name, `None` for anonymous reports.
    pub user_name: Option<String>,
}

/// Optional filters for querying entries.
///
/// Date bounds are inclusive and compared against the stored RFC 3339
/// timestamp text, so a bare date like `2025-06-01` matches everything
/// from midnight of that day onward.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryFilter {
    /// Minimum timestamp (inclusive, ISO 8601).
    pub start_date: Option<String>,
    /// Maximum timestamp (inclusive, ISO 8601).
    pub end_date: Option<String>,
    /// Restrict results to a single trash type.
    pub trash_type: Option<TrashType>,
}

impl EntryFilter {
    /// Returns whether no filter criteria are set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.trash_type.is_none()
    }
}
