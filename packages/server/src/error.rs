//! API error taxonomy and HTTP response mapping.
//!
//! Every error surfaced by the API carries a stable machine-readable
//! code and a human-readable message, serialized as
//! `{"error": {"code", "message"}}`. Storage and filesystem failures
//! are logged with context at the call site and reach the client only
//! as a generic `INTERNAL_ERROR` — internal details never appear in a
//! response body.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use litter_map_server_models::ApiErrorBody;

/// Errors surfaced by the litter-map API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing, mistyped, or out-of-range request field.
    #[error("{0}")]
    InvalidInput(String),

    /// Photo lookup filename failed the safe-pattern check.
    #[error("Invalid filename format")]
    InvalidFilename,

    /// Requested photo does not exist on disk.
    #[error("Photo not found")]
    PhotoNotFound,

    /// Uploaded file is not a JPEG/PNG or exceeds the size limit.
    #[error("{0}")]
    UnsupportedMedia(String),

    /// Caller exceeded the request quota.
    #[error("Too many requests. Please try again later.")]
    RateLimitExceeded,

    /// Persistence or filesystem failure. The message is a generic
    /// operation description; the underlying cause is only logged.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Stable machine-readable code for this error kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::InvalidFilename => "INVALID_FILENAME",
            Self::PhotoNotFound => "FILE_NOT_FOUND",
            Self::UnsupportedMedia(_) => "UNSUPPORTED_MEDIA",
            Self::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::InvalidFilename => StatusCode::BAD_REQUEST,
            Self::PhotoNotFound => StatusCode::NOT_FOUND,
            Self::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(ApiErrorBody::new(self.code(), self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError as _;

    #[test]
    fn codes_map_to_expected_statuses() {
        let cases = [
            (ApiError::InvalidInput("x".into()), 400, "INVALID_INPUT"),
            (ApiError::InvalidFilename, 400, "INVALID_FILENAME"),
            (ApiError::PhotoNotFound, 404, "FILE_NOT_FOUND"),
            (ApiError::UnsupportedMedia("x".into()), 415, "UNSUPPORTED_MEDIA"),
            (ApiError::RateLimitExceeded, 429, "RATE_LIMIT_EXCEEDED"),
            (ApiError::Internal("x".into()), 500, "INTERNAL_ERROR"),
        ];

        for (error, status, code) in cases {
            assert_eq!(error.status_code().as_u16(), status);
            assert_eq!(error.code(), code);
        }
    }
}
