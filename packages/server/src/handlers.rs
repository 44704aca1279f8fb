//! HTTP handler functions for the litter map API.

use std::sync::LazyLock;

use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use litter_map_analytics::compute_statistics;
use litter_map_database::queries;
use litter_map_database_models::{EntryFilter, NewTrashEntry};
use litter_map_server_models::{
    ApiHealth, EntriesResponse, EntryQueryParams, StatsQueryParams, total_pages,
};
use litter_map_trash_models::{TrashType, ValidationError, validate_entry_input};
use regex::Regex;
use uuid::Uuid;

use crate::AppState;
use crate::error::ApiError;
use crate::upload::{self, CreateEntryForm};

/// Allowed photo filenames: a single path segment of alphanumerics,
/// hyphens, and underscores, ending in a jpg/jpeg/png extension.
static SAFE_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z0-9_-]+\.(jpg|jpeg|png)$").expect("valid regex"));

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.started_at.elapsed().as_secs(),
    })
}

/// `POST /api/trash`
///
/// Validates and persists a new entry from a multipart submission. A
/// rejected submission never reaches the database, and any uploaded
/// photo is cleaned up (the temp file on validation failure, the
/// stored file on insert failure).
pub async fn create_trash(
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<CreateEntryForm>,
) -> Result<HttpResponse, ApiError> {
    let input = upload::raw_entry_input(&form);
    let valid = validate_entry_input(&input).map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let photo_url = form
        .photo
        .as_ref()
        .map(|file| store_photo(&state, file))
        .transpose()?;

    let new_entry = NewTrashEntry {
        trash_type: valid.trash_type,
        latitude: valid.latitude,
        longitude: valid.longitude,
        photo_url: photo_url.clone(),
        user_name: valid.user_name,
    };

    match queries::insert_entry(state.db.as_ref(), &new_entry).await {
        Ok(entry) => Ok(HttpResponse::Created().json(entry)),
        Err(e) => {
            log::error!(
                "Failed to create trash entry (type: {}): {e}",
                new_entry.trash_type
            );
            if let Some(url) = &photo_url {
                remove_stored_photo(&state, url);
            }
            Err(ApiError::Internal("Failed to create trash entry".to_string()))
        }
    }
}

/// Validates the uploaded photo and copies it into the upload
/// directory under a generated filename, returning the relative URL.
fn store_photo(state: &AppState, file: &TempFile) -> Result<String, ApiError> {
    let extension = upload::validate_photo(
        file.content_type.as_ref().map(|m| m.essence_str()),
        file.size,
        state.max_file_size,
    )?;

    let filename = format!("{}.{extension}", Uuid::new_v4());
    let dest = state.upload_dir.join(&filename);

    std::fs::copy(file.file.path(), &dest).map_err(|e| {
        log::error!("Failed to store photo at {}: {e}", dest.display());
        ApiError::Internal("Failed to store photo".to_string())
    })?;

    Ok(format!("/photos/{filename}"))
}

/// Removes a photo previously stored by [`store_photo`], after a
/// failed insert.
fn remove_stored_photo(state: &AppState, photo_url: &str) {
    let Some(filename) = photo_url.strip_prefix("/photos/") else {
        return;
    };
    if let Err(e) = std::fs::remove_file(state.upload_dir.join(filename)) {
        log::error!("Failed to delete photo after failed insert ({filename}): {e}");
    }
}

/// Builds an [`EntryFilter`] from query parameters, rejecting a
/// `trash_type` outside the taxonomy.
fn entry_filter(
    start_date: Option<String>,
    end_date: Option<String>,
    trash_type: Option<&str>,
) -> Result<EntryFilter, ApiError> {
    let trash_type = trash_type
        .map(|t| {
            t.parse::<TrashType>().map_err(|_| {
                ApiError::InvalidInput(
                    ValidationError::InvalidTrashType {
                        value: t.to_string(),
                    }
                    .to_string(),
                )
            })
        })
        .transpose()?;

    Ok(EntryFilter {
        start_date,
        end_date,
        trash_type,
    })
}

/// `GET /api/trash`
///
/// Lists entries matching the filter, newest first, with pagination
/// applied over the filtered set. `total` is the count before
/// pagination.
#[allow(clippy::cast_possible_truncation)]
pub async fn list_trash(
    state: web::Data<AppState>,
    web::Query(params): web::Query<EntryQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let filter = entry_filter(
        params.start_date.clone(),
        params.end_date.clone(),
        params.trash_type.as_deref(),
    )?;

    let all_entries = queries::query_entries(state.db.as_ref(), &filter)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch trash entries: {e}");
            ApiError::Internal("Failed to fetch trash entries".to_string())
        })?;

    let total = all_entries.len() as u64;
    let page = params.page_or_default();
    let limit = params.limit_or_default();
    let start = (page as usize - 1) * limit as usize;

    let entries: Vec<_> = all_entries
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();

    Ok(HttpResponse::Ok().json(EntriesResponse {
        entries,
        total,
        page,
        limit,
        total_pages: total_pages(total, limit),
    }))
}

/// `GET /api/stats`
///
/// Computes aggregate statistics over the entries matching the date
/// filter.
pub async fn get_stats(
    state: web::Data<AppState>,
    web::Query(params): web::Query<StatsQueryParams>,
) -> Result<HttpResponse, ApiError> {
    let filter = EntryFilter {
        start_date: params.start_date,
        end_date: params.end_date,
        trash_type: None,
    };

    let entries = queries::query_entries(state.db.as_ref(), &filter)
        .await
        .map_err(|e| {
            log::error!("Failed to calculate statistics: {e}");
            ApiError::Internal("Failed to calculate statistics".to_string())
        })?;

    Ok(HttpResponse::Ok().json(compute_statistics(&entries)))
}

/// `GET /api/photos/{filename}`
///
/// Serves an uploaded photo. The filename must match the safe pattern
/// before any filesystem access is attempted.
pub async fn get_photo(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let filename = path.into_inner();

    if !SAFE_FILENAME_RE.is_match(&filename) {
        return Err(ApiError::InvalidFilename);
    }

    let file_path = state.upload_dir.join(&filename);
    let file = actix_files::NamedFile::open_async(&file_path)
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ApiError::PhotoNotFound
            } else {
                log::error!("Failed to serve photo {filename}: {e}");
                ApiError::Internal("Failed to serve photo".to_string())
            }
        })?;

    let mut response = file.into_response(&req);
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=31536000"),
    );

    Ok(response)
}
