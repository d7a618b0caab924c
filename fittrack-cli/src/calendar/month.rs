use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A calendar month, the reference point of the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthRef {
    pub year: i32,
    pub month: u32,
}

impl MonthRef {
    /// Returns `None` for months outside 1..=12 or years chrono cannot represent
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// Month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse `YYYY-MM`
    pub fn parse(raw: &str) -> Result<Self> {
        let (year, month) = raw
            .trim()
            .split_once('-')
            .with_context(|| format!("Invalid month '{}', expected YYYY-MM", raw))?;
        let year: i32 = year
            .parse()
            .with_context(|| format!("Invalid year in '{}'", raw))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("Invalid month in '{}'", raw))?;

        Self::new(year, month).with_context(|| format!("Month out of range: '{}'", raw))
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next()
            .first_day()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Every month touched by `first..=last`, oldest first
    pub fn spanning(first: NaiveDate, last: NaiveDate) -> Vec<Self> {
        let end = Self::containing(last);
        let mut months = vec![Self::containing(first)];
        while let Some(&month) = months.last() {
            if month >= end {
                break;
            }
            months.push(month.next());
        }
        months
    }

    /// Heading such as "March 2024"
    pub fn title(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl std::fmt::Display for MonthRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_wraps_years() {
        let dec = MonthRef::new(2023, 12).unwrap();
        assert_eq!(dec.next(), MonthRef::new(2024, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
    }

    #[test]
    fn test_spanning() {
        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(
            MonthRef::spanning(day(2023, 11, 27), day(2024, 1, 7)),
            vec![
                MonthRef::new(2023, 11).unwrap(),
                MonthRef::new(2023, 12).unwrap(),
                MonthRef::new(2024, 1).unwrap(),
            ]
        );
        assert_eq!(
            MonthRef::spanning(day(2024, 4, 1), day(2024, 4, 7)),
            vec![MonthRef::new(2024, 4).unwrap()]
        );
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(MonthRef::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(MonthRef::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthRef::new(2024, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn test_parse() {
        assert_eq!(MonthRef::parse("2024-03").unwrap(), MonthRef::new(2024, 3).unwrap());
        assert!(MonthRef::parse("2024-13").is_err());
        assert!(MonthRef::parse("march").is_err());
    }

    #[test]
    fn test_display_and_title() {
        let m = MonthRef::new(2024, 3).unwrap();
        assert_eq!(m.to_string(), "2024-03");
        assert_eq!(m.title(), "March 2024");
    }
}
