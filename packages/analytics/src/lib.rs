#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pure statistics aggregation and hotspot clustering.
//!
//! Turns an unordered slice of entries (already filtered by the caller)
//! into [`Statistics`]: total count, per-type breakdown, most common
//! type, timestamp range, and geographic hotspot clusters. The
//! computation is synchronous, performs no I/O, holds no state across
//! calls, and never fails for well-formed input, so it is safe to
//! invoke concurrently from any number of request handlers.
//!
//! Clustering snaps each entry to a fixed 0.01-degree grid cell
//! (roughly 1.1 km at the equator) and keeps a running centroid per
//! cell. The running mean is algebraically equal to the batch mean, so
//! the result is independent of input order.

use std::collections::BTreeMap;

use chrono::Utc;
use litter_map_analytics_models::{DateRange, Hotspot, Statistics};
use litter_map_database_models::TrashEntry;

/// Edge length of a cluster grid cell, in degrees of latitude and
/// longitude independently.
pub const CLUSTER_CELL_DEGREES: f64 = 0.01;

/// Flat display radius reported for every hotspot, in meters.
pub const HOTSPOT_RADIUS_METERS: f64 = 1000.0;

/// Maximum number of hotspots reported.
pub const MAX_HOTSPOTS: usize = 5;

/// Running per-cluster state: member count and online centroid.
struct ClusterAccumulator {
    latitude: f64,
    longitude: f64,
    count: u64,
}

/// Snaps a coordinate pair to its cluster cell key.
///
/// Uses `f64::round`, which rounds half away from zero, so an entry
/// exactly on a cell boundary is deterministically assigned to the cell
/// further from the origin.
#[allow(clippy::cast_possible_truncation)]
fn cell_key(latitude: f64, longitude: f64) -> (i64, i64) {
    (
        (latitude / CLUSTER_CELL_DEGREES).round() as i64,
        (longitude / CLUSTER_CELL_DEGREES).round() as i64,
    )
}

/// Computes aggregate statistics over the given entries.
///
/// `entries` is expected to already be filtered (by date range or type)
/// by the caller; no ordering is assumed. The input is not mutated.
///
/// When `entries` is empty, `most_common_type` is the empty string, the
/// breakdown and hotspot list are empty, and both ends of `date_range`
/// fall back to the current instant so the field is never absent.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn compute_statistics(entries: &[TrashEntry]) -> Statistics {
    let total_count = entries.len() as u64;

    let mut type_breakdown: BTreeMap<String, u64> = BTreeMap::new();
    for entry in entries {
        *type_breakdown
            .entry(entry.trash_type.to_string())
            .or_insert(0) += 1;
    }

    // Ties resolve to the lexicographically smallest type name: the
    // map iterates in ascending key order and only a strictly greater
    // count displaces the current winner.
    let mut most_common_type = String::new();
    let mut max_count = 0;
    for (type_name, &count) in &type_breakdown {
        if count > max_count {
            max_count = count;
            most_common_type = type_name.clone();
        }
    }

    let now = Utc::now();
    let date_range = DateRange {
        start: entries.iter().map(|e| e.timestamp).min().unwrap_or(now),
        end: entries.iter().map(|e| e.timestamp).max().unwrap_or(now),
    };

    Statistics {
        total_count,
        most_common_type,
        hotspots: cluster_hotspots(entries),
        type_breakdown,
        date_range,
    }
}

/// Clusters entries into geographic hotspots.
///
/// Entries sharing a grid cell form one cluster whose center is the
/// arithmetic mean of its members' coordinates, maintained as an online
/// running mean. Singleton clusters are included. The result is sorted
/// by count descending — ties keep ascending cell-key order, since the
/// accumulator map iterates in key order and the sort is stable — and
/// truncated to [`MAX_HOTSPOTS`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cluster_hotspots(entries: &[TrashEntry]) -> Vec<Hotspot> {
    let mut clusters: BTreeMap<(i64, i64), ClusterAccumulator> = BTreeMap::new();

    for entry in entries {
        let acc = clusters
            .entry(cell_key(entry.latitude, entry.longitude))
            .or_insert(ClusterAccumulator {
                latitude: 0.0,
                longitude: 0.0,
                count: 0,
            });

        acc.count += 1;
        let n = acc.count as f64;
        acc.latitude = acc.latitude.mul_add(n - 1.0, entry.latitude) / n;
        acc.longitude = acc.longitude.mul_add(n - 1.0, entry.longitude) / n;
    }

    let mut hotspots: Vec<Hotspot> = clusters
        .into_values()
        .map(|acc| Hotspot {
            latitude: acc.latitude,
            longitude: acc.longitude,
            count: acc.count,
            radius: HOTSPOT_RADIUS_METERS,
        })
        .collect();

    hotspots.sort_by(|a, b| b.count.cmp(&a.count));
    hotspots.truncate(MAX_HOTSPOTS);

    hotspots
}
