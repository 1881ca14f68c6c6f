pub mod credentials;
pub mod gcal;
pub mod oauth;

pub use gcal::CalendarClient;

use crate::calendar::CalendarError;
use crate::core::AppConfig;

/// Build an authenticated Calendar API client from the service account in
/// `config`. A credential the provider would reject is only discovered on
/// first use.
pub fn connect(config: &AppConfig) -> Result<CalendarClient, CalendarError> {
    let account = credentials::load_service_account(config.google_credentials_json.as_deref())?;
    CalendarClient::new(account, &config.calendar_api_url, config.request_timeout)
}
