//! Month-aligned query windows

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use super::CalendarError;

/// Half-open interval `[start, end)` covering one calendar month in UTC
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window from the first instant of `month` to the first instant of
    /// the following month. December rolls over into January of `year + 1`.
    pub fn for_month(year: i32, month: i32) -> Result<Self, CalendarError> {
        let invalid = || CalendarError::InvalidWindow { year, month };
        let calendar_month = u32::try_from(month).map_err(|_| invalid())?;
        let end_year = year.checked_add(month / 12);
        let end_month = calendar_month % 12 + 1;

        let start = first_instant(year, calendar_month);
        let end = end_year.and_then(|end_year| first_instant(end_year, end_month));
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(invalid()),
        }
    }

    /// `timeMin` query value, e.g. `2024-02-01T00:00:00Z`
    pub fn time_min(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `timeMax` query value
    pub fn time_max(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

fn first_instant(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}
