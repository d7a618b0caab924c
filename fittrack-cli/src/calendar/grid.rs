use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::{parse_event_date, CalendarItem, MonthRef};

/// Six full weeks, so every month renders with the same height
pub const GRID_CELLS: usize = 42;

/// One day of the calendar grid
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay<E> {
    pub date: NaiveDate,
    pub events: Vec<E>,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub completion_percentage: u8,
}

impl<E: CalendarItem> CalendarDay<E> {
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_completed()).count()
    }
}

/// `round(100 * completed / total)`, 0 when there is nothing to complete
pub fn completion_percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    // Integer form of round-half-up
    ((200 * completed + total) / (2 * total)) as u8
}

/// Build the 42-cell grid for `month`.
///
/// The grid starts on the Monday on or before the 1st and runs for six
/// weeks. Items whose date cannot be parsed are left out.
pub fn build_month_grid<E: CalendarItem + Clone>(
    month: MonthRef,
    events: &[E],
    today: NaiveDate,
    selected: Option<NaiveDate>,
) -> Vec<CalendarDay<E>> {
    let (start, _) = month_grid_range(month);
    build_days(start, GRID_CELLS, month, events, today, selected)
}

/// First and last date of the grid for `month`. Both ends usually fall
/// outside the month itself.
pub fn month_grid_range(month: MonthRef) -> (NaiveDate, NaiveDate) {
    let first = month.first_day();
    let offset = first.weekday().num_days_from_monday() as i64;
    let start = first - Duration::days(offset);
    (start, start + Duration::days(GRID_CELLS as i64 - 1))
}

/// Monday and Sunday of the week containing `reference`
pub fn week_range(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = reference.weekday().num_days_from_monday() as i64;
    let start = reference - Duration::days(offset);
    (start, start + Duration::days(6))
}

/// Build the Monday..Sunday strip for the week containing `reference`.
/// `is_current_month` is relative to the month of `reference`.
pub fn build_week<E: CalendarItem + Clone>(
    reference: NaiveDate,
    events: &[E],
    today: NaiveDate,
    selected: Option<NaiveDate>,
) -> Vec<CalendarDay<E>> {
    let (start, _) = week_range(reference);
    build_days(
        start,
        7,
        MonthRef::containing(reference),
        events,
        today,
        selected,
    )
}

/// Cell for `date`, if the grid covers it
pub fn find_day<E>(days: &[CalendarDay<E>], date: NaiveDate) -> Option<&CalendarDay<E>> {
    days.iter().find(|d| d.date == date)
}

/// The selected cell, if any
pub fn selected_day<E>(days: &[CalendarDay<E>]) -> Option<&CalendarDay<E>> {
    days.iter().find(|d| d.is_selected)
}

/// Completion over every in-month item of a grid
pub fn month_completion<E: CalendarItem>(days: &[CalendarDay<E>]) -> u8 {
    let (completed, total) = days
        .iter()
        .filter(|d| d.is_current_month)
        .fold((0, 0), |(c, t), d| (c + d.completed_count(), t + d.events.len()));
    completion_percentage(completed, total)
}

fn build_days<E: CalendarItem + Clone>(
    start: NaiveDate,
    count: usize,
    month: MonthRef,
    events: &[E],
    today: NaiveDate,
    selected: Option<NaiveDate>,
) -> Vec<CalendarDay<E>> {
    let mut by_date = bucket_by_date(events);

    start
        .iter_days()
        .take(count)
        .map(|date| {
            let events = by_date.remove(&date).unwrap_or_default();
            let completed = events.iter().filter(|e| e.is_completed()).count();

            CalendarDay {
                date,
                completion_percentage: completion_percentage(completed, events.len()),
                is_current_month: month.contains(date),
                is_today: date == today,
                is_selected: selected == Some(date),
                events,
            }
        })
        .collect()
}

/// Group items by calendar date, keeping input order within a day
fn bucket_by_date<E: CalendarItem + Clone>(events: &[E]) -> HashMap<NaiveDate, Vec<E>> {
    let mut by_date: HashMap<NaiveDate, Vec<E>> = HashMap::new();

    for event in events {
        match parse_event_date(event.date_str()) {
            Some(date) => by_date.entry(date).or_default().push(event.clone()),
            None => {
                tracing::debug!("Skipping calendar item with unparseable date '{}'", event.date_str())
            }
        }
    }

    by_date
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str, bool);

    impl CalendarItem for Item {
        fn date_str(&self) -> &str {
            self.0
        }

        fn is_completed(&self) -> bool {
            self.1
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn march_2024() -> MonthRef {
        MonthRef::new(2024, 3).unwrap()
    }

    #[test]
    fn test_march_2024_bounds() {
        let grid = build_month_grid::<Item>(march_2024(), &[], ymd(2024, 3, 15), None);

        assert_eq!(grid.len(), GRID_CELLS);
        assert_eq!(grid[0].date, ymd(2024, 2, 26));
        assert_eq!(grid[41].date, ymd(2024, 4, 7));
        assert_eq!(grid[0].date.weekday(), Weekday::Mon);
        assert_eq!(grid[41].date.weekday(), Weekday::Sun);
    }

    #[test]
    fn test_month_starting_on_monday_has_no_leading_days() {
        // April 2024 starts on a Monday
        let grid = build_month_grid::<Item>(
            MonthRef::new(2024, 4).unwrap(),
            &[],
            ymd(2024, 4, 1),
            None,
        );

        assert_eq!(grid.len(), GRID_CELLS);
        assert_eq!(grid[0].date, ymd(2024, 4, 1));
        assert!(grid[0].is_current_month);
        // Two trailing weeks of May keep the grid at six rows
        assert_eq!(grid[41].date, ymd(2024, 5, 12));
        assert!(!grid[41].is_current_month);
    }

    #[test]
    fn test_ranges_match_the_cells() {
        let grid = build_month_grid::<Item>(march_2024(), &[], ymd(2024, 3, 15), None);
        assert_eq!(month_grid_range(march_2024()), (grid[0].date, grid[41].date));

        // Monday 2024-04-29 to Sunday 2024-05-05
        assert_eq!(week_range(ymd(2024, 5, 2)), (ymd(2024, 4, 29), ymd(2024, 5, 5)));
        assert_eq!(week_range(ymd(2024, 4, 29)).0, ymd(2024, 4, 29));
    }

    #[test]
    fn test_neighbouring_month_items_fill_outer_cells() {
        let events = vec![Item("2024-02-26", true), Item("2024-04-07", false)];
        let grid = build_month_grid(march_2024(), &events, ymd(2024, 3, 1), None);

        assert_eq!(grid[0].events.len(), 1);
        assert_eq!(grid[41].events.len(), 1);
        // Outer cells never count towards the month
        assert_eq!(month_completion(&grid), 0);
    }

    #[test]
    fn test_half_completed_day() {
        let events = vec![Item("2024-03-05", true), Item("2024-03-05", false)];
        let grid = build_month_grid(march_2024(), &events, ymd(2024, 3, 1), None);

        let day = grid.iter().find(|d| d.date == ymd(2024, 3, 5)).unwrap();
        assert_eq!(day.events.len(), 2);
        assert_eq!(day.completion_percentage, 50);
        assert_eq!(day.completed_count(), 1);
    }

    #[test]
    fn test_find_and_selected_day() {
        let events = vec![Item("2024-03-20", false)];
        let selected = ymd(2024, 3, 20);
        let grid = build_month_grid(march_2024(), &events, ymd(2024, 3, 1), Some(selected));

        assert_eq!(selected_day(&grid).map(|d| d.date), Some(selected));
        assert_eq!(find_day(&grid, selected).map(|d| d.events.len()), Some(1));
        assert!(find_day(&grid, ymd(2024, 5, 1)).is_none());
    }

    #[test]
    fn test_empty_event_list() {
        let grid = build_month_grid::<Item>(march_2024(), &[], ymd(2024, 3, 1), None);
        assert!(grid
            .iter()
            .all(|d| d.completion_percentage == 0 && d.events.is_empty()));
    }

    #[test]
    fn test_today_and_selected_are_independent() {
        let today = ymd(2024, 3, 12);
        let grid = build_month_grid::<Item>(march_2024(), &[], today, Some(today));

        let day = grid.iter().find(|d| d.date == today).unwrap();
        assert!(day.is_today);
        assert!(day.is_selected);
        assert_eq!(grid.iter().filter(|d| d.is_today).count(), 1);
        assert_eq!(grid.iter().filter(|d| d.is_selected).count(), 1);
    }

    #[test]
    fn test_events_in_adjacent_months_are_placed() {
        let events = vec![Item("2024-02-27", true), Item("2024-04-06T10:00:00Z", false)];
        let grid = build_month_grid(march_2024(), &events, ymd(2024, 3, 1), None);

        assert_eq!(grid[1].events.len(), 1);
        assert_eq!(grid[1].completion_percentage, 100);
        assert_eq!(grid[40].events.len(), 1);
    }

    #[test]
    fn test_malformed_dates_are_excluded() {
        let events = vec![Item("not-a-date", true), Item("2024-03-05", false)];
        let grid = build_month_grid(march_2024(), &events, ymd(2024, 3, 1), None);

        let placed: usize = grid.iter().map(|d| d.events.len()).sum();
        assert_eq!(placed, 1);
    }

    #[test]
    fn test_completion_rounding() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(1, 8), 13); // 12.5 rounds up
        assert_eq!(completion_percentage(3, 3), 100);
    }

    #[test]
    fn test_week_view() {
        let events = vec![Item("2024-03-31", true)];
        // Friday 29 March 2024
        let week = build_week(ymd(2024, 3, 29), &events, ymd(2024, 3, 29), None);

        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, ymd(2024, 3, 25));
        assert_eq!(week[6].date, ymd(2024, 3, 31));
        assert_eq!(week[6].completion_percentage, 100);
        assert!(week.iter().all(|d| d.is_current_month));
    }

    #[test]
    fn test_month_completion_ignores_adjacent_months() {
        let events = vec![
            Item("2024-02-27", false),
            Item("2024-03-05", true),
            Item("2024-03-06", false),
        ];
        let grid = build_month_grid(march_2024(), &events, ymd(2024, 3, 1), None);
        assert_eq!(month_completion(&grid), 50);
    }
}
