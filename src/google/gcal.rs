//! Google Calendar v3 events API
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use super::credentials::ServiceAccount;
use super::oauth::TokenProvider;
use crate::calendar::{CalendarError, TimeWindow};

#[derive(Debug, Deserialize)]
pub struct ListEventsResponse {
    #[serde(default)]
    pub items: Vec<Value>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

// {"error": {"code": 404, "message": "Not Found", "errors": [...]}}
#[derive(Debug, Deserialize)]
struct GoogleErrorResponse {
    error: GoogleErrorBody,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    message: Option<String>,
}

/// Reason text for a failed call: the API's own message when the body
/// carries one, otherwise the HTTP reason phrase.
fn error_reason(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<GoogleErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(String::from)
                .unwrap_or_else(|| status.as_str().to_string())
        })
}

/// Authenticated Calendar API client for one service account
pub struct CalendarClient {
    client: Client,
    api_url: String,
    tokens: TokenProvider,
}

impl CalendarClient {
    pub fn new(
        account: ServiceAccount,
        api_url: &str,
        timeout: Duration,
    ) -> Result<Self, CalendarError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            tokens: TokenProvider::new(client.clone(), account),
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn client_email(&self) -> &str {
        self.tokens.account().client_email()
    }

    /// List the events of a calendar inside `window` with recurring events
    /// expanded into single instances, ordered by start time. Makes exactly
    /// one request to the events endpoint.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<Value>, CalendarError> {
        let access_token = self.tokens.access_token().await?;
        let url = format!(
            "{}/calendars/{}/events",
            self.api_url,
            urlencoding::encode(calendar_id)
        );
        let res = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", window.time_min()),
                ("timeMax", window.time_max()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            let reason = error_reason(status, &text);
            tracing::warn!(
                calendar_id,
                client_email = self.client_email(),
                %status,
                reason = %reason,
                "Calendar API request failed"
            );
            return Err(CalendarError::from_provider(status, reason));
        }

        let events: ListEventsResponse = serde_json::from_str(&text)?;
        if events.next_page_token.is_some() {
            tracing::debug!(calendar_id, "Returning first page of events only");
        }
        Ok(events.items)
    }
}
