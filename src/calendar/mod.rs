//! Month-scoped event lookups against the calendar provider

mod error;
mod window;

pub use error::CalendarError;
pub use window::TimeWindow;

use serde_json::Value;

use crate::google::CalendarClient;

/// Fetch every event of `calendar_id` that falls within the given month,
/// in the provider's start-time order.
pub async fn month_events(
    client: &CalendarClient,
    calendar_id: &str,
    year: i32,
    month: i32,
) -> Result<Vec<Value>, CalendarError> {
    let window = TimeWindow::for_month(year, month)?;
    tracing::debug!(
        calendar_id,
        time_min = %window.time_min(),
        time_max = %window.time_max(),
        "Listing calendar events"
    );
    client.list_events(calendar_id, &window).await
}
