use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Time-boxed goal shared across users
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target_value: f64,
    pub unit: String,
    #[serde(default)]
    pub participants: u32,
    #[serde(default)]
    pub reward_points: u32,
    #[serde(default)]
    pub joined: bool,
    #[serde(default)]
    pub progress: f64,
}

impl Challenge {
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }

    pub fn has_ended(&self, today: NaiveDate) -> bool {
        today > self.end_date
    }

    /// Days left including today, 0 once the challenge is over
    pub fn days_left(&self, today: NaiveDate) -> i64 {
        ((self.end_date - today).num_days() + 1).max(0)
    }

    pub fn progress_percentage(&self) -> f64 {
        if self.target_value > 0.0 {
            (self.progress / self.target_value * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge() -> Challenge {
        Challenge {
            id: "c1".to_string(),
            title: "March plank".to_string(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            target_value: 60.0,
            unit: "minutes".to_string(),
            participants: 12,
            reward_points: 500,
            joined: true,
            progress: 15.0,
        }
    }

    #[test]
    fn test_challenge_window() {
        let c = challenge();
        assert!(c.is_active(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert!(c.is_active(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!c.is_active(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
        assert!(c.has_ended(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }

    #[test]
    fn test_days_left() {
        let c = challenge();
        assert_eq!(c.days_left(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()), 1);
        assert_eq!(c.days_left(NaiveDate::from_ymd_opt(2024, 4, 5).unwrap()), 0);
    }

    #[test]
    fn test_progress() {
        assert_eq!(challenge().progress_percentage(), 25.0);
    }
}
