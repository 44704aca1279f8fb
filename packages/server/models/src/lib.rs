#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the litter-map server.
//!
//! These types are serialized to JSON for the REST API. They are
//! separate from the database row types to allow independent evolution
//! of the API contract.

use litter_map_database_models::TrashEntry;
use serde::{Deserialize, Serialize};

/// Default page size for the entries listing.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Query parameters for the entries listing endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryQueryParams {
    /// Minimum timestamp (inclusive, ISO 8601).
    pub start_date: Option<String>,
    /// Maximum timestamp (inclusive, ISO 8601).
    pub end_date: Option<String>,
    /// Trash type wire name to filter by.
    pub trash_type: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Maximum entries per page.
    pub limit: Option<u32>,
}

impl EntryQueryParams {
    /// Effective page number: defaults to 1, and 0 is treated as
    /// unset.
    #[must_use]
    pub fn page_or_default(&self) -> u32 {
        match self.page {
            None | Some(0) => 1,
            Some(page) => page,
        }
    }

    /// Effective page size: defaults to [`DEFAULT_PAGE_LIMIT`], and 0
    /// is treated as unset.
    #[must_use]
    pub fn limit_or_default(&self) -> u32 {
        match self.limit {
            None | Some(0) => DEFAULT_PAGE_LIMIT,
            Some(limit) => limit,
        }
    }
}

/// Query parameters for the statistics endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQueryParams {
    /// Minimum timestamp (inclusive, ISO 8601).
    pub start_date: Option<String>,
    /// Maximum timestamp (inclusive, ISO 8601).
    pub end_date: Option<String>,
}

/// Paginated response from the entries listing endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntriesResponse {
    /// The requested page of entries, newest first.
    pub entries: Vec<TrashEntry>,
    /// Total entries matching the filter, before pagination.
    pub total: u64,
    /// 1-based page number that was served.
    pub page: u32,
    /// Page size that was applied.
    pub limit: u32,
    /// Total number of pages for this filter and limit.
    pub total_pages: u64,
}

/// Computes the page count for a listing: `ceil(total / limit)`.
#[must_use]
pub fn total_pages(total: u64, limit: u32) -> u64 {
    total.div_ceil(u64::from(limit))
}

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime: u64,
}

/// Machine-readable error body: `{"error": {"code", "message"}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// The error payload.
    pub error: ApiErrorDetail,
}

/// Code and message for a single error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    /// Stable machine-readable code (e.g. `INVALID_INPUT`).
    pub code: String,
    /// Human-readable description. Never contains internal detail.
    pub message: String,
}

impl ApiErrorBody {
    /// Builds an error body from a code and message.
    #[must_use]
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}
