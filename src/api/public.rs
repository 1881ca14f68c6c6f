//! Public API types

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use axum_extra::extract::QueryRejection;
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarError;

const CONFIGURATION_DETAIL: &str =
    "Server configuration error: unable to connect to the Google Calendar service.";
const NOT_FOUND_DETAIL: &str = "Calendar not found. Check the calendar ID.";
const PERMISSION_DETAIL: &str =
    "No access to the calendar. Make sure it is shared with the service account.";
const INTERNAL_DETAIL: &str = "Internal server error.";
const TIMEOUT_DETAIL: &str = "Request timed out.";

// Errors

/// Body of every error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

pub enum ApiError {
    Calendar(CalendarError),
    /// Query parameters missing or not coercible to their types
    BadRequest(String),
    Timeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let err = match self {
            ApiError::Calendar(err) => err,
            ApiError::BadRequest(_) => return StatusCode::BAD_REQUEST,
            ApiError::Timeout => return StatusCode::REQUEST_TIMEOUT,
        };
        match err {
            CalendarError::NotFound { .. } => StatusCode::NOT_FOUND,
            CalendarError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            CalendarError::Authentication { status, .. } | CalendarError::Provider { status, .. }
                if status.is_client_error() || status.is_server_error() =>
            {
                *status
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller. Internal causes stay in the logs.
    pub fn detail(&self) -> String {
        let err = match self {
            ApiError::Calendar(err) => err,
            ApiError::BadRequest(msg) => return msg.clone(),
            ApiError::Timeout => return TIMEOUT_DETAIL.to_string(),
        };
        match err {
            CalendarError::Configuration(_) => CONFIGURATION_DETAIL.to_string(),
            CalendarError::Authentication { reason, .. } => {
                format!("Google authentication error: {}", reason)
            }
            CalendarError::NotFound { .. } => {
                format!("Google Calendar API error: {}", NOT_FOUND_DETAIL)
            }
            CalendarError::PermissionDenied { .. } => {
                format!("Google Calendar API error: {}", PERMISSION_DETAIL)
            }
            CalendarError::Provider { reason, .. } => {
                format!("Google Calendar API error: {}", reason)
            }
            CalendarError::InvalidWindow { .. } | CalendarError::Internal(_) => {
                INTERNAL_DETAIL.to_string()
            }
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Always log the error
        match &self {
            ApiError::Calendar(err) if status.is_server_error() => tracing::error!("{:#}", err),
            ApiError::Calendar(err) => tracing::warn!("{}", err),
            ApiError::BadRequest(msg) => tracing::warn!("Rejected query: {}", msg),
            ApiError::Timeout => tracing::error!("Request timed out"),
        }

        (
            status,
            Json(ErrorDetail {
                detail: self.detail(),
            }),
        )
            .into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// CalendarError>` to turn them into `Result<_, ApiError>`
impl From<CalendarError> for ApiError {
    fn from(err: CalendarError) -> Self {
        ApiError::Calendar(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.to_string())
    }
}

// Re-export public types from each route

pub mod events {
    pub use crate::api::routes::events::public::*;
}
