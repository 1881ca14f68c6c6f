use http::StatusCode;
use thiserror::Error;

/// Failures of a single events lookup, from loading credentials to the
/// provider's answer
#[derive(Debug, Error)]
pub enum CalendarError {
    /// Credential missing or unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The provider refused the service account during token exchange
    #[error("Authentication failed ({status}): {reason}")]
    Authentication { status: StatusCode, reason: String },

    #[error("No calendar month for year {year} month {month}")]
    InvalidWindow { year: i32, month: i32 },

    #[error("Calendar not found: {reason}")]
    NotFound { reason: String },

    #[error("Calendar access denied: {reason}")]
    PermissionDenied { reason: String },

    /// Any other error status reported by the Calendar API
    #[error("Calendar API error ({status}): {reason}")]
    Provider { status: StatusCode, reason: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CalendarError {
    /// Classify a non-success response from the Calendar API
    pub fn from_provider(status: StatusCode, reason: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => CalendarError::NotFound { reason },
            StatusCode::FORBIDDEN => CalendarError::PermissionDenied { reason },
            _ => CalendarError::Provider { status, reason },
        }
    }
}

impl From<reqwest::Error> for CalendarError {
    fn from(err: reqwest::Error) -> Self {
        CalendarError::Internal(err.into())
    }
}

impl From<serde_json::Error> for CalendarError {
    fn from(err: serde_json::Error) -> Self {
        CalendarError::Internal(err.into())
    }
}
