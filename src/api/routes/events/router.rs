//! Router for the events API

use axum::{Router, extract::State, response::Json};
use axum_extra::extract::{Query, QueryRejection};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::SharedState;
use crate::calendar::{CalendarError, month_events};

async fn events_handler(
    State(state): State<SharedState>,
    query: Result<Query<public::EventsQuery>, QueryRejection>,
) -> Result<Json<public::EventsResponse>, ApiError> {
    let Query(params) = query?;

    // No outbound call without a usable credential
    let client = state
        .calendar
        .as_ref()
        .map_err(|reason| CalendarError::Configuration(reason.clone()))?;

    let items = month_events(client, &params.calendar_id, params.year, params.month).await?;
    tracing::debug!(
        calendar_id = %params.calendar_id,
        count = items.len(),
        "Returning events"
    );

    Ok(Json(public::EventsResponse { items }))
}

/// Create the events router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", axum::routing::get(events_handler))
}
