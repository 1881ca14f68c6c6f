use anyhow::{Result, bail};

use crate::api::public::ApiError;
use crate::api::public::events::EventsResponse;
use crate::calendar::month_events;
use crate::core::AppConfig;
use crate::google;

/// Same lookup as `GET /api/events`, printed to stdout
pub async fn run(calendar_id: &str, year: i32, month: i32, config: AppConfig) -> Result<()> {
    let result = match google::connect(&config) {
        Ok(client) => month_events(&client, calendar_id, year, month).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(items) => {
            let resp = EventsResponse { items };
            println!("{}", serde_json::to_string_pretty(&resp)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            let api_error = ApiError::from(e);
            bail!("{} {}", api_error.status(), api_error.detail())
        }
    }
}
