use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Workout session or reusable template as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub workout_type: WorkoutType,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub calories_burned: Option<u32>,
    #[serde(default)]
    pub exercises: Vec<WorkoutExercise>,
    #[serde(default)]
    pub is_template: bool,
    #[serde(default)]
    pub status: WorkoutStatus,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One exercise slot inside a workout, in execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub exercise_id: String,
    pub name: String,
    pub sets: u32,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub rest_seconds: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Strength,
    Cardio,
    Hiit,
    Flexibility,
    Mixed,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Skipped,
}

/// Payload for `POST /api/workouts`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkout {
    pub name: String,
    pub description: Option<String>,
    pub workout_type: WorkoutType,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub calories_burned: Option<u32>,
    pub exercises: Vec<WorkoutExercise>,
    pub is_template: bool,
    pub scheduled_date: Option<NaiveDate>,
}

impl Workout {
    /// Date the workout belongs to on the calendar
    pub fn calendar_date(&self) -> NaiveDate {
        self.scheduled_date
            .or_else(|| self.completed_at.map(|at| at.date_naive()))
            .unwrap_or_else(|| self.created_at.date_naive())
    }

    pub fn is_completed(&self) -> bool {
        self.status == WorkoutStatus::Completed
    }

    /// Mark workout as completed now
    pub fn mark_completed(&mut self) {
        let now = Utc::now();
        self.status = WorkoutStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = Some(now);
    }

    /// Sets summed over every exercise slot
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}

/// Filter criteria for listing workouts
#[derive(Debug, Default)]
pub struct WorkoutFilter {
    pub workout_type: Option<WorkoutType>,
    pub status: Option<WorkoutStatus>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub templates: Option<bool>,
}

impl WorkoutFilter {
    pub fn matches(&self, workout: &Workout) -> bool {
        if let Some(wt) = self.workout_type {
            if workout.workout_type != wt {
                return false;
            }
        }

        if let Some(status) = self.status {
            if workout.status != status {
                return false;
            }
        }

        let date = workout.calendar_date();

        if let Some(from) = self.from_date {
            if date < from {
                return false;
            }
        }

        if let Some(to) = self.to_date {
            if date > to {
                return false;
            }
        }

        if let Some(templates) = self.templates {
            if workout.is_template != templates {
                return false;
            }
        }

        true
    }
}

impl std::fmt::Display for WorkoutType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkoutType::Strength => write!(f, "Strength"),
            WorkoutType::Cardio => write!(f, "Cardio"),
            WorkoutType::Hiit => write!(f, "HIIT"),
            WorkoutType::Flexibility => write!(f, "Flexibility"),
            WorkoutType::Mixed => write!(f, "Mixed"),
        }
    }
}

impl std::str::FromStr for WorkoutType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strength" => Ok(WorkoutType::Strength),
            "cardio" => Ok(WorkoutType::Cardio),
            "hiit" => Ok(WorkoutType::Hiit),
            "flexibility" => Ok(WorkoutType::Flexibility),
            "mixed" => Ok(WorkoutType::Mixed),
            _ => Err(anyhow::anyhow!("Invalid workout type: {}", s)),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Beginner => write!(f, "Beginner"),
            Difficulty::Intermediate => write!(f, "Intermediate"),
            Difficulty::Advanced => write!(f, "Advanced"),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(anyhow::anyhow!("Invalid difficulty: {}", s)),
        }
    }
}

impl std::fmt::Display for WorkoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkoutStatus::Planned => write!(f, "Planned"),
            WorkoutStatus::InProgress => write!(f, "In progress"),
            WorkoutStatus::Completed => write!(f, "Completed"),
            WorkoutStatus::Skipped => write!(f, "Skipped"),
        }
    }
}

impl std::str::FromStr for WorkoutStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "planned" => Ok(WorkoutStatus::Planned),
            "in_progress" => Ok(WorkoutStatus::InProgress),
            "completed" => Ok(WorkoutStatus::Completed),
            "skipped" => Ok(WorkoutStatus::Skipped),
            _ => Err(anyhow::anyhow!("Invalid workout status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn workout(status: WorkoutStatus, scheduled: Option<NaiveDate>) -> Workout {
        Workout {
            id: "w1".to_string(),
            user_id: None,
            name: "Leg day".to_string(),
            description: None,
            workout_type: WorkoutType::Strength,
            difficulty: Difficulty::Intermediate,
            duration_minutes: 45,
            calories_burned: Some(320),
            exercises: vec![],
            is_template: false,
            status,
            scheduled_date: scheduled,
            completed_at: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_calendar_date_prefers_schedule() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 12).unwrap();
        assert_eq!(workout(WorkoutStatus::Planned, Some(date)).calendar_date(), date);
        assert_eq!(
            workout(WorkoutStatus::Planned, None).calendar_date(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_mark_completed() {
        let mut w = workout(WorkoutStatus::InProgress, None);
        w.mark_completed();
        assert!(w.is_completed());
        assert!(w.completed_at.is_some());
    }

    #[test]
    fn test_filter_matches() {
        let w = workout(
            WorkoutStatus::Completed,
            NaiveDate::from_ymd_opt(2024, 3, 10),
        );

        let filter = WorkoutFilter {
            workout_type: Some(WorkoutType::Strength),
            from_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            to_date: NaiveDate::from_ymd_opt(2024, 3, 31),
            ..Default::default()
        };
        assert!(filter.matches(&w));

        let filter = WorkoutFilter {
            status: Some(WorkoutStatus::Planned),
            ..Default::default()
        };
        assert!(!filter.matches(&w));

        let filter = WorkoutFilter {
            to_date: NaiveDate::from_ymd_opt(2024, 3, 9),
            ..Default::default()
        };
        assert!(!filter.matches(&w));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("in-progress".parse::<WorkoutStatus>().unwrap(), WorkoutStatus::InProgress);
        assert!("done".parse::<WorkoutStatus>().is_err());
    }
}
