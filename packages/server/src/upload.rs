//! Multipart submission form and photo upload validation.
//!
//! Submissions arrive as `multipart/form-data` so a photo can ride
//! along with the text fields. The uploaded file lands in a temp file
//! that is deleted on drop, so a submission rejected during validation
//! leaves nothing behind on disk.

use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::text::Text;
use litter_map_trash_models::RawEntryInput;

use crate::error::ApiError;

/// A trash entry submission as received by `POST /api/trash`.
///
/// All fields are optional at this layer; presence and validity are
/// checked by `validate_entry_input` so the response can name the
/// specific missing or malformed field.
#[derive(MultipartForm)]
pub struct CreateEntryForm {
    /// Optional photo attachment.
    pub photo: Option<TempFile>,
    /// Trash type wire name.
    pub trash_type: Option<Text<String>>,
    /// Latitude as a decimal string.
    pub latitude: Option<Text<String>>,
    /// Longitude as a decimal string.
    pub longitude: Option<Text<String>>,
    /// Optional submitter name.
    pub user_name: Option<Text<String>>,
}

/// Converts the multipart fields into a [`RawEntryInput`] for
/// validation.
///
/// Coordinates that are present but unparseable become NaN so they are
/// rejected by the range check rather than reported as missing. An
/// empty `user_name` is treated as anonymous.
#[must_use]
pub fn raw_entry_input(form: &CreateEntryForm) -> RawEntryInput {
    RawEntryInput {
        trash_type: form.trash_type.as_ref().map(|t| t.0.clone()),
        latitude: form
            .latitude
            .as_ref()
            .map(|t| t.0.trim().parse().unwrap_or(f64::NAN)),
        longitude: form
            .longitude
            .as_ref()
            .map(|t| t.0.trim().parse().unwrap_or(f64::NAN)),
        user_name: form
            .user_name
            .as_ref()
            .map(|t| t.0.clone())
            .filter(|name| !name.is_empty()),
    }
}

/// Checks an uploaded photo's media type and size, returning the file
/// extension to store it under.
///
/// # Errors
///
/// Returns [`ApiError::UnsupportedMedia`] if the content type is not
/// JPEG/PNG or the file exceeds `max_size` bytes.
pub fn validate_photo(
    content_type: Option<&str>,
    size: usize,
    max_size: usize,
) -> Result<&'static str, ApiError> {
    let extension = match content_type {
        Some("image/jpeg" | "image/jpg") => "jpg",
        Some("image/png") => "png",
        _ => {
            return Err(ApiError::UnsupportedMedia(
                "Invalid file type. Only JPEG and PNG are allowed.".to_string(),
            ));
        }
    };

    if size > max_size {
        return Err(ApiError::UnsupportedMedia(format!(
            "File exceeds the maximum size of {max_size} bytes"
        )));
    }

    Ok(extension)
}
