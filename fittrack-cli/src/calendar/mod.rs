//! Calendar day-bucketing.
//!
//! Turns a reference month and a flat list of dated items into the
//! fixed 6-week grid (or a single week strip) rendered by the calendar
//! screens. Everything here is pure: the same month, items, `today` and
//! selection always produce the same cells.

mod grid;
mod month;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

pub use grid::{
    build_month_grid, build_week, completion_percentage, find_day, month_completion,
    month_grid_range, selected_day, week_range, CalendarDay, GRID_CELLS,
};
pub use month::MonthRef;

/// Anything that can be placed on a calendar day
pub trait CalendarItem {
    /// Date of the item as sent by the backend
    fn date_str(&self) -> &str;

    fn is_completed(&self) -> bool;
}

/// Parse the calendar date of an item, ignoring any time-of-day part.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and naive
/// `YYYY-MM-DDTHH:MM:SS`. The date is taken as written, without
/// converting between time zones. Anything else yields `None`.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().date());
    }

    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}
