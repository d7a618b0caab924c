//! Data behind the dashboard screen.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};

use crate::api::{find_api_error, ApiClient};
use crate::calendar::{month_grid_range, parse_event_date, MonthRef};
use crate::models::{Achievement, CalendarTask, Goal, User, UserScore, Workout};

/// Where the dashboard data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Server,
    /// Server unreachable; values are local placeholders
    Placeholder,
}

/// Totals for the Monday-based week containing a reference day
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    pub total_workouts: usize,
    pub total_duration_min: u32,
    pub total_calories: u32,
    pub workouts_by_day: [usize; 7], // Monday to Sunday
}

impl WeeklySummary {
    pub fn empty(today: NaiveDate) -> Self {
        Self {
            week_start: week_start(today),
            total_workouts: 0,
            total_duration_min: 0,
            total_calories: 0,
            workouts_by_day: [0; 7],
        }
    }

    /// Summarize completed workouts falling in the week of `today`
    pub fn calculate(workouts: &[Workout], today: NaiveDate) -> Self {
        let mut summary = Self::empty(today);
        let week_end = summary.week_start + Duration::days(6);

        for workout in workouts.iter().filter(|w| w.is_completed()) {
            let date = workout.calendar_date();
            if date < summary.week_start || date > week_end {
                continue;
            }

            summary.total_workouts += 1;
            summary.total_duration_min += workout.duration_minutes;
            summary.total_calories += workout.calories_burned.unwrap_or(0);

            // Calculate day of week (0 = Monday, 6 = Sunday)
            let day_of_week = date.weekday().num_days_from_monday() as usize;
            summary.workouts_by_day[day_of_week] += 1;
        }

        summary
    }
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

#[derive(Debug, Clone)]
pub struct DashboardData {
    pub source: DataSource,
    pub user: Option<User>,
    pub score: UserScore,
    pub active_goals: Vec<Goal>,
    pub recent_workouts: Vec<Workout>,
    pub weekly_summary: WeeklySummary,
    pub achievements: Vec<Achievement>,
    /// Tasks from today onwards in the current month, soonest first
    pub upcoming_tasks: Vec<CalendarTask>,
    /// Every task on the current month's grid, for the calendar panel
    pub month_tasks: Vec<CalendarTask>,
}

impl DashboardData {
    /// Local stand-in used when the server cannot be reached
    pub fn placeholder(user: Option<User>, today: NaiveDate) -> Self {
        Self {
            source: DataSource::Placeholder,
            user,
            score: UserScore::default(),
            active_goals: Vec::new(),
            recent_workouts: Vec::new(),
            weekly_summary: WeeklySummary::empty(today),
            achievements: Vec::new(),
            upcoming_tasks: Vec::new(),
            month_tasks: Vec::new(),
        }
    }

    pub fn unlocked_achievements(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.is_unlocked())
    }

    /// Mean progress over active goals, 0 when there are none
    pub fn average_goal_progress(&self) -> f64 {
        if self.active_goals.is_empty() {
            return 0.0;
        }
        self.active_goals
            .iter()
            .map(Goal::progress_percentage)
            .sum::<f64>()
            / self.active_goals.len() as f64
    }
}

/// Loads dashboard data with the configured offline policy
pub struct DashboardLoader {
    client: ApiClient,
    offline_fallback: bool,
    recent_limit: usize,
}

impl DashboardLoader {
    pub fn new(client: ApiClient, offline_fallback: bool, recent_limit: usize) -> Self {
        Self {
            client,
            offline_fallback,
            recent_limit,
        }
    }

    /// Fetch everything concurrently.
    ///
    /// Falls back to [`DashboardData::placeholder`] only when the server is
    /// unreachable and the fallback is enabled; any other failure is returned.
    pub async fn load(&self, user: Option<User>, today: NaiveDate) -> Result<DashboardData> {
        match self.fetch(user.clone(), today).await {
            Ok(data) => Ok(data),
            Err(e) => {
                let offline = find_api_error(&e).map_or(false, |api| api.is_network());
                if offline && self.offline_fallback {
                    tracing::info!("Dashboard offline, showing placeholder data: {}", e);
                    Ok(DashboardData::placeholder(user, today))
                } else {
                    Err(e)
                }
            }
        }
    }

    async fn fetch(&self, user: Option<User>, today: NaiveDate) -> Result<DashboardData> {
        let month = MonthRef::containing(today);
        let (first, last) = month_grid_range(month);

        let (score, goals, workouts, achievements, tasks) = tokio::try_join!(
            self.client.score(),
            self.client.goals(),
            self.client.workouts(),
            self.client.achievements(),
            self.client.calendar_tasks_between(first, last),
        )?;

        let active_goals: Vec<Goal> = goals.into_iter().filter(Goal::is_active).collect();

        let weekly_summary = WeeklySummary::calculate(&workouts, today);

        let mut recent_workouts: Vec<Workout> =
            workouts.into_iter().filter(|w| !w.is_template).collect();
        // Most recent first
        recent_workouts.sort_by(|a, b| b.calendar_date().cmp(&a.calendar_date()));
        recent_workouts.truncate(self.recent_limit);

        let mut upcoming: Vec<(NaiveDate, CalendarTask)> = tasks
            .iter()
            .filter(|t| !t.completed)
            .filter_map(|t| parse_event_date(&t.date).map(|d| (d, t.clone())))
            .filter(|(d, _)| *d >= today && month.contains(*d))
            .collect();
        upcoming.sort_by_key(|(d, _)| *d);

        Ok(DashboardData {
            source: DataSource::Server,
            user,
            score,
            active_goals,
            recent_workouts,
            weekly_summary,
            achievements,
            upcoming_tasks: upcoming.into_iter().map(|(_, t)| t).collect(),
            month_tasks: tasks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, WorkoutStatus, WorkoutType};
    use chrono::{TimeZone, Utc};

    fn workout(day: u32, status: WorkoutStatus, minutes: u32) -> Workout {
        Workout {
            id: format!("w{}", day),
            user_id: None,
            name: "Session".to_string(),
            description: None,
            workout_type: WorkoutType::Cardio,
            difficulty: Difficulty::Beginner,
            duration_minutes: minutes,
            calories_burned: Some(minutes * 10),
            exercises: vec![],
            is_template: false,
            status,
            scheduled_date: NaiveDate::from_ymd_opt(2024, 3, day),
            completed_at: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    #[test]
    fn test_weekly_summary() {
        // Wednesday 13 March 2024; week is 11..=17
        let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let workouts = vec![
            workout(10, WorkoutStatus::Completed, 30), // previous Sunday
            workout(11, WorkoutStatus::Completed, 45),
            workout(13, WorkoutStatus::Completed, 20),
            workout(13, WorkoutStatus::Planned, 60),
            workout(17, WorkoutStatus::Completed, 15),
        ];

        let summary = WeeklySummary::calculate(&workouts, today);
        assert_eq!(summary.week_start, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
        assert_eq!(summary.total_workouts, 3);
        assert_eq!(summary.total_duration_min, 80);
        assert_eq!(summary.total_calories, 800);
        assert_eq!(summary.workouts_by_day, [1, 0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_placeholder_is_labelled() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let data = DashboardData::placeholder(None, today);
        assert_eq!(data.source, DataSource::Placeholder);
        assert_eq!(data.average_goal_progress(), 0.0);
        assert_eq!(data.weekly_summary.total_workouts, 0);
    }
}
