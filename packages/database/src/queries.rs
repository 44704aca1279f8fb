//! Database query functions for litter entries.
//!
//! All queries use `query_raw_params()` with `$n` placeholders and
//! decode rows via `moosicbox_json_utils`. Timestamps are stored as
//! RFC 3339 text with millisecond precision, which makes lexicographic
//! comparison chronological, so date filters compare directly against
//! the column.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use litter_map_database_models::{EntryFilter, NewTrashEntry, TrashEntry};
use litter_map_trash_models::TrashType;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};
use uuid::Uuid;

use crate::DbError;

/// Formats a timestamp the way it is stored: RFC 3339 UTC with
/// millisecond precision (e.g. `2025-06-01T12:30:00.000Z`).
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Conversion {
            message: format!("Invalid stored timestamp '{text}': {e}"),
        })
}

fn decode_entry(row: &switchy_database::Row) -> Result<TrashEntry, DbError> {
    let id: String = row.to_value("id").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse entry id: {e}"),
    })?;

    let timestamp_text: String = row.to_value("timestamp").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse entry timestamp: {e}"),
    })?;
    let timestamp = parse_timestamp(&timestamp_text)?;

    let type_name: String = row.to_value("trash_type").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse trash_type: {e}"),
    })?;
    let trash_type = type_name
        .parse::<TrashType>()
        .map_err(|_| DbError::Conversion {
            message: format!("Unknown trash_type in database: {type_name}"),
        })?;

    let latitude: f64 = row.to_value("latitude").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse latitude: {e}"),
    })?;
    let longitude: f64 = row.to_value("longitude").map_err(|e| DbError::Conversion {
        message: format!("Failed to parse longitude: {e}"),
    })?;

    Ok(TrashEntry {
        id,
        timestamp,
        trash_type,
        latitude,
        longitude,
        photo_url: row.to_value("photo_url").unwrap_or(None),
        user_name: row.to_value("user_name").unwrap_or(None),
    })
}

/// Appends the filter conditions shared by [`query_entries`] and
/// [`count_entries`] to `sql`, pushing the matching parameters.
fn push_filter(sql: &mut String, params: &mut Vec<DatabaseValue>, filter: &EntryFilter) {
    let mut param_idx = u32::try_from(params.len()).unwrap_or(0) + 1;

    if let Some(start) = &filter.start_date {
        write!(sql, " AND timestamp >= ${param_idx}").unwrap();
        params.push(DatabaseValue::String(start.clone()));
        param_idx += 1;
    }

    if let Some(end) = &filter.end_date {
        write!(sql, " AND timestamp <= ${param_idx}").unwrap();
        params.push(DatabaseValue::String(end.clone()));
        param_idx += 1;
    }

    if let Some(trash_type) = filter.trash_type {
        write!(sql, " AND trash_type = ${param_idx}").unwrap();
        params.push(DatabaseValue::String(trash_type.to_string()));
    }
}

/// Inserts a new entry, assigning a generated UUID and the current UTC
/// timestamp (truncated to millisecond precision), and returns the
/// stored entry.
///
/// # Errors
///
/// Returns [`DbError`] if the insert fails, including `CHECK`
/// constraint violations for out-of-range coordinates.
pub async fn insert_entry(
    db: &dyn Database,
    new_entry: &NewTrashEntry,
) -> Result<TrashEntry, DbError> {
    let entry = TrashEntry {
        id: Uuid::new_v4().to_string(),
        timestamp: Utc::now().trunc_subsecs(3),
        trash_type: new_entry.trash_type,
        latitude: new_entry.latitude,
        longitude: new_entry.longitude,
        photo_url: new_entry.photo_url.clone(),
        user_name: new_entry.user_name.clone(),
    };

    db.exec_raw_params(
        "INSERT INTO trash_entries (
            id, timestamp, trash_type, latitude, longitude, photo_url, user_name
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        &[
            DatabaseValue::String(entry.id.clone()),
            DatabaseValue::String(format_timestamp(&entry.timestamp)),
            DatabaseValue::String(entry.trash_type.to_string()),
            DatabaseValue::Real64(entry.latitude),
            DatabaseValue::Real64(entry.longitude),
            entry
                .photo_url
                .as_ref()
                .map_or(DatabaseValue::Null, |u| DatabaseValue::String(u.clone())),
            entry
                .user_name
                .as_ref()
                .map_or(DatabaseValue::Null, |n| DatabaseValue::String(n.clone())),
        ],
    )
    .await?;

    Ok(entry)
}

/// Queries entries matching the filter, ordered newest-first.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a row cannot be decoded.
pub async fn query_entries(
    db: &dyn Database,
    filter: &EntryFilter,
) -> Result<Vec<TrashEntry>, DbError> {
    let mut sql = String::from(
        "SELECT id, timestamp, trash_type, latitude, longitude, photo_url, user_name
         FROM trash_entries
         WHERE 1=1",
    );
    let mut params: Vec<DatabaseValue> = Vec::new();

    push_filter(&mut sql, &mut params, filter);
    sql.push_str(" ORDER BY timestamp DESC");

    let rows = db.query_raw_params(&sql, &params).await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in &rows {
        entries.push(decode_entry(row)?);
    }

    Ok(entries)
}

/// Fetches a single entry by its UUID, or `None` if it doesn't exist.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or the row cannot be decoded.
pub async fn query_entry_by_id(
    db: &dyn Database,
    id: &str,
) -> Result<Option<TrashEntry>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT id, timestamp, trash_type, latitude, longitude, photo_url, user_name
             FROM trash_entries
             WHERE id = $1",
            &[DatabaseValue::String(id.to_string())],
        )
        .await?;

    rows.first().map(decode_entry).transpose()
}

/// Counts entries matching the filter (before any pagination).
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub async fn count_entries(db: &dyn Database, filter: &EntryFilter) -> Result<u64, DbError> {
    let mut sql = String::from("SELECT COUNT(*) as total FROM trash_entries WHERE 1=1");
    let mut params: Vec<DatabaseValue> = Vec::new();

    push_filter(&mut sql, &mut params, filter);

    let rows = db.query_raw_params(&sql, &params).await?;

    let total: i64 = rows.first().map_or(0, |r| r.to_value("total").unwrap_or(0));

    Ok(u64::try_from(total).unwrap_or(0))
}
