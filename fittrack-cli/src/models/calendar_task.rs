use serde::{Deserialize, Serialize};

use crate::calendar::CalendarItem;

/// Dated item shown on the calendar (workout, goal reminder, rest day, nutrition note)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarTask {
    pub id: String,
    pub title: String,
    pub task_type: TaskType,
    /// Date-only string as sent by the backend (`YYYY-MM-DD`)
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub workout_id: Option<String>,
    #[serde(default)]
    pub goal_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Workout,
    GoalReminder,
    RestDay,
    Nutrition,
}

/// Payload for `POST /api/calendar/tasks`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendarTask {
    pub title: String,
    pub task_type: TaskType,
    pub date: String,
    pub time: Option<String>,
    pub workout_id: Option<String>,
    pub goal_id: Option<String>,
    pub notes: Option<String>,
}

impl CalendarItem for CalendarTask {
    fn date_str(&self) -> &str {
        &self.date
    }

    fn is_completed(&self) -> bool {
        self.completed
    }
}

impl TaskType {
    /// Single-character marker used in the terminal calendar
    pub fn marker(&self) -> char {
        match self {
            TaskType::Workout => 'W',
            TaskType::GoalReminder => 'G',
            TaskType::RestDay => 'R',
            TaskType::Nutrition => 'N',
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskType::Workout => write!(f, "Workout"),
            TaskType::GoalReminder => write!(f, "Goal reminder"),
            TaskType::RestDay => write!(f, "Rest day"),
            TaskType::Nutrition => write!(f, "Nutrition"),
        }
    }
}

impl std::str::FromStr for TaskType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "workout" => Ok(TaskType::Workout),
            "goal_reminder" | "goal" => Ok(TaskType::GoalReminder),
            "rest_day" | "rest" => Ok(TaskType::RestDay),
            "nutrition" => Ok(TaskType::Nutrition),
            _ => Err(anyhow::anyhow!("Invalid task type: {}", s)),
        }
    }
}
