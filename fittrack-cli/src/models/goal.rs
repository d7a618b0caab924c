use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Goal data model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_value: f64,
    #[serde(default)]
    pub current_value: f64,
    pub unit: String, // kg, km, workouts, minutes...
    pub deadline: NaiveDate,
    #[serde(default)]
    pub status: GoalStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Weight,
    Strength,
    Endurance,
    Frequency,
    Custom,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Paused,
    Abandoned,
}

/// Payload for `POST /api/goals`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub title: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_value: f64,
    pub unit: String,
    pub deadline: NaiveDate,
}

impl Goal {
    /// Mark goal as complete
    pub fn mark_complete(&mut self) {
        self.status = GoalStatus::Completed;
        self.updated_at = Some(Utc::now());
    }

    /// Calculate progress percentage
    pub fn progress_percentage(&self) -> f64 {
        if self.target_value > 0.0 {
            return (self.current_value / self.target_value * 100.0).clamp(0.0, 100.0);
        }
        0.0
    }

    /// Days remaining until the deadline, negative once it has passed
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == GoalStatus::Active && self.deadline < today
    }

    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }

    /// Update current progress value
    pub fn update_progress(&mut self, value: f64) {
        self.current_value = value;
        self.updated_at = Some(Utc::now());
    }
}

impl std::fmt::Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalType::Weight => write!(f, "Weight"),
            GoalType::Strength => write!(f, "Strength"),
            GoalType::Endurance => write!(f, "Endurance"),
            GoalType::Frequency => write!(f, "Frequency"),
            GoalType::Custom => write!(f, "Custom"),
        }
    }
}

impl std::str::FromStr for GoalType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weight" => Ok(GoalType::Weight),
            "strength" => Ok(GoalType::Strength),
            "endurance" => Ok(GoalType::Endurance),
            "frequency" => Ok(GoalType::Frequency),
            "custom" => Ok(GoalType::Custom),
            _ => Err(anyhow::anyhow!("Invalid goal type: {}", s)),
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalStatus::Active => write!(f, "Active"),
            GoalStatus::Completed => write!(f, "Completed"),
            GoalStatus::Paused => write!(f, "Paused"),
            GoalStatus::Abandoned => write!(f, "Abandoned"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(target: f64) -> Goal {
        Goal {
            id: "g1".to_string(),
            user_id: None,
            title: "Run 100km".to_string(),
            description: None,
            goal_type: GoalType::Endurance,
            target_value: target,
            current_value: 0.0,
            unit: "km".to_string(),
            deadline: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            status: GoalStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_goal_progress_calculation() {
        let mut g = goal(100.0);
        assert_eq!(g.progress_percentage(), 0.0);

        g.update_progress(50.0);
        assert_eq!(g.progress_percentage(), 50.0);

        // Over target caps at 100
        g.update_progress(150.0);
        assert_eq!(g.progress_percentage(), 100.0);
    }

    #[test]
    fn test_zero_target_has_no_progress() {
        let mut g = goal(0.0);
        g.update_progress(10.0);
        assert_eq!(g.progress_percentage(), 0.0);
    }

    #[test]
    fn test_days_remaining_and_overdue() {
        let g = goal(10.0);
        let before = NaiveDate::from_ymd_opt(2024, 6, 23).unwrap();
        let after = NaiveDate::from_ymd_opt(2024, 7, 2).unwrap();

        assert_eq!(g.days_remaining(before), 7);
        assert!(!g.is_overdue(before));
        assert_eq!(g.days_remaining(after), -2);
        assert!(g.is_overdue(after));
    }

    #[test]
    fn test_completed_goal_is_never_overdue() {
        let mut g = goal(10.0);
        g.mark_complete();
        assert!(!g.is_overdue(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert!(!g.is_active());
    }
}
