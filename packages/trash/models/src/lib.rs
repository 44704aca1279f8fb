#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Trash type taxonomy and submission validation.
//!
//! This crate defines the canonical set of trash categories used across
//! the entire litter-map system, along with the coordinate and input
//! validation applied at the submission boundary. Validation produces a
//! tagged result (valid input or a specific rejection reason) so the HTTP
//! layer never persists a malformed entry.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Category of a logged litter sighting.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrashType {
    /// Plastic waste (bottles, bags, packaging)
    Plastic,
    /// Glass waste (bottles, broken glass)
    Glass,
    /// Paper and cardboard waste
    Paper,
    /// Large discarded items (furniture, appliances)
    BulkyItem,
    /// Hazardous materials (batteries, chemicals, medical waste)
    Hazardous,
    /// Waste not fitting any other category
    Other,
}

impl TrashType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Plastic,
            Self::Glass,
            Self::Paper,
            Self::BulkyItem,
            Self::Hazardous,
            Self::Other,
        ]
    }
}

/// Reasons a submission can be rejected at the validation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No `trash_type` field was supplied.
    MissingTrashType,
    /// The supplied `trash_type` is not in the taxonomy.
    InvalidTrashType {
        /// The rejected value.
        value: String,
    },
    /// No `latitude` field was supplied.
    MissingLatitude,
    /// No `longitude` field was supplied.
    MissingLongitude,
    /// Latitude is non-finite or outside [-90, 90].
    LatitudeOutOfRange,
    /// Longitude is non-finite or outside [-180, 180].
    LongitudeOutOfRange,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTrashType => write!(f, "trash_type is required"),
            Self::InvalidTrashType { value } => {
                write!(f, "Invalid trash_type '{value}'. Must be one of: ")?;
                for (i, trash_type) in TrashType::all().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{trash_type}")?;
                }
                Ok(())
            }
            Self::MissingLatitude => write!(f, "latitude is required"),
            Self::MissingLongitude => write!(f, "longitude is required"),
            Self::LatitudeOutOfRange => write!(f, "latitude must be between -90 and 90"),
            Self::LongitudeOutOfRange => write!(f, "longitude must be between -180 and 180"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// An unvalidated entry submission as received at the HTTP boundary.
///
/// Fields are optional because multipart form fields may simply be
/// absent. Coordinates that were present but unparseable should be
/// passed through as NaN so they fail the range check rather than the
/// presence check.
#[derive(Debug, Clone, Default)]
pub struct RawEntryInput {
    /// Raw `trash_type` form value.
    pub trash_type: Option<String>,
    /// Parsed latitude, NaN if unparseable.
    pub latitude: Option<f64>,
    /// Parsed longitude, NaN if unparseable.
    pub longitude: Option<f64>,
    /// Optional submitter name.
    pub user_name: Option<String>,
}

/// A submission that passed validation and is safe to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidEntryInput {
    /// Validated trash type.
    pub trash_type: TrashType,
    /// Validated latitude in [-90, 90].
    pub latitude: f64,
    /// Validated longitude in [-180, 180].
    pub longitude: f64,
    /// Optional submitter name, `None` for anonymous.
    pub user_name: Option<String>,
}

/// Returns whether `lat` is a finite latitude in [-90, 90].
#[must_use]
pub fn is_valid_latitude(lat: f64) -> bool {
    lat.is_finite() && (-90.0..=90.0).contains(&lat)
}

/// Returns whether `lng` is a finite longitude in [-180, 180].
#[must_use]
pub fn is_valid_longitude(lng: f64) -> bool {
    lng.is_finite() && (-180.0..=180.0).contains(&lng)
}

/// Validates a raw submission, producing either a [`ValidEntryInput`]
/// ready for persistence or the first [`ValidationError`] encountered.
///
/// Checks are ordered to match the API contract: presence of
/// `trash_type`, taxonomy membership, presence of both coordinates,
/// then coordinate ranges.
///
/// # Errors
///
/// Returns [`ValidationError`] describing the first failed check.
pub fn validate_entry_input(input: &RawEntryInput) -> Result<ValidEntryInput, ValidationError> {
    let Some(raw_type) = input.trash_type.as_deref() else {
        return Err(ValidationError::MissingTrashType);
    };

    let trash_type: TrashType =
        raw_type
            .parse()
            .map_err(|_| ValidationError::InvalidTrashType {
                value: raw_type.to_string(),
            })?;

    let Some(latitude) = input.latitude else {
        return Err(ValidationError::MissingLatitude);
    };

    let Some(longitude) = input.longitude else {
        return Err(ValidationError::MissingLongitude);
    };

    if !is_valid_latitude(latitude) {
        return Err(ValidationError::LatitudeOutOfRange);
    }

    if !is_valid_longitude(longitude) {
        return Err(ValidationError::LongitudeOutOfRange);
    }

    Ok(ValidEntryInput {
        trash_type,
        latitude,
        longitude,
        user_name: input.user_name.clone(),
    })
}
