//! Resource endpoints of the FitTrack REST API.
//!
//! Reads go through the response cache under the keys below; writes
//! invalidate the keys they affect.

use anyhow::Result;
use chrono::NaiveDate;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::calendar::{parse_event_date, MonthRef};
use crate::models::{
    Achievement, CalendarTask, Challenge, Exercise, ExerciseFilter, Goal, GoalStatus,
    NewCalendarTask, NewGoal, NewWorkout, UserScore, Workout, WorkoutStatus,
};

const GOALS_KEY: &str = "goals";
const WORKOUTS_KEY: &str = "workouts";
const TEMPLATES_KEY: &str = "workouts:templates";
const CALENDAR_PREFIX: &str = "calendar:";
const EXERCISE_PREFIX: &str = "exercise:";
const ACHIEVEMENTS_KEY: &str = "achievements";
const SCORE_KEY: &str = "score";
const CHALLENGES_KEY: &str = "challenges";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoalProgressUpdate {
    current_value: f64,
}

#[derive(Debug, Serialize)]
struct StatusUpdate<S> {
    status: S,
}

#[derive(Debug, Serialize)]
struct CompletionUpdate {
    completed: bool,
}

/// Response of `POST /api/challenges/:id/join`
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedChallenge {
    pub challenge: Challenge,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiClient {
    // Goals

    pub async fn goals(&self) -> Result<Vec<Goal>> {
        self.get("/api/goals", Some(GOALS_KEY)).await
    }

    pub async fn create_goal(&self, goal: &NewGoal) -> Result<Goal> {
        let created: Goal = self.post("/api/goals", goal).await?;
        self.cache.invalidate(GOALS_KEY);
        Ok(created)
    }

    pub async fn update_goal_progress(&self, id: &str, current_value: f64) -> Result<Goal> {
        let updated: Goal = self
            .patch(
                &format!("/api/goals/{}/progress", id),
                &GoalProgressUpdate { current_value },
            )
            .await?;
        self.cache.invalidate(GOALS_KEY);
        Ok(updated)
    }

    pub async fn update_goal_status(&self, id: &str, status: GoalStatus) -> Result<Goal> {
        let updated: Goal = self
            .patch(&format!("/api/goals/{}", id), &StatusUpdate { status })
            .await?;
        self.cache.invalidate(GOALS_KEY);
        Ok(updated)
    }

    pub async fn delete_goal(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/goals/{}", id)).await?;
        self.cache.invalidate(GOALS_KEY);
        Ok(())
    }

    // Workouts

    pub async fn workouts(&self) -> Result<Vec<Workout>> {
        self.get("/api/workouts", Some(WORKOUTS_KEY)).await
    }

    pub async fn workout_templates(&self) -> Result<Vec<Workout>> {
        self.get("/api/workouts?template=true", Some(TEMPLATES_KEY))
            .await
    }

    pub async fn workout(&self, id: &str) -> Result<Workout> {
        self.get(&format!("/api/workouts/{}", id), None).await
    }

    pub async fn create_workout(&self, workout: &NewWorkout) -> Result<Workout> {
        let created: Workout = self.post("/api/workouts", workout).await?;
        self.invalidate_workouts();
        Ok(created)
    }

    pub async fn update_workout_status(&self, id: &str, status: WorkoutStatus) -> Result<Workout> {
        let updated: Workout = self
            .put(
                &format!("/api/workouts/{}/status", id),
                &StatusUpdate { status },
            )
            .await?;
        self.invalidate_workouts();
        Ok(updated)
    }

    pub async fn delete_workout(&self, id: &str) -> Result<()> {
        self.delete(&format!("/api/workouts/{}", id)).await?;
        self.invalidate_workouts();
        Ok(())
    }

    fn invalidate_workouts(&self) {
        self.cache.invalidate_prefix(WORKOUTS_KEY);
        // Scheduled workouts show up on the calendar
        self.cache.invalidate_prefix(CALENDAR_PREFIX);
    }

    // Calendar

    pub async fn calendar_tasks(&self, month: MonthRef) -> Result<Vec<CalendarTask>> {
        let path = format!(
            "/api/calendar/tasks?from={}&to={}",
            month.first_day(),
            month.last_day()
        );
        let key = format!("{}{}", CALENDAR_PREFIX, month);
        self.get(&path, Some(&key)).await
    }

    /// Tasks dated `first..=last`, fetched month by month so each month
    /// stays a single cache entry
    pub async fn calendar_tasks_between(
        &self,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<CalendarTask>> {
        let months = MonthRef::spanning(first, last);
        let fetched = try_join_all(months.into_iter().map(|m| self.calendar_tasks(m))).await?;

        Ok(fetched
            .into_iter()
            .flatten()
            .filter(|t| parse_event_date(&t.date).map_or(false, |d| d >= first && d <= last))
            .collect())
    }

    pub async fn create_calendar_task(&self, task: &NewCalendarTask) -> Result<CalendarTask> {
        let created: CalendarTask = self.post("/api/calendar/tasks", task).await?;
        self.cache.invalidate_prefix(CALENDAR_PREFIX);
        Ok(created)
    }

    pub async fn set_task_completed(&self, id: &str, completed: bool) -> Result<CalendarTask> {
        let updated: CalendarTask = self
            .patch(
                &format!("/api/calendar/tasks/{}", id),
                &CompletionUpdate { completed },
            )
            .await?;
        self.cache.invalidate_prefix(CALENDAR_PREFIX);
        Ok(updated)
    }

    // Exercise library

    pub async fn exercises(&self, filter: &ExerciseFilter) -> Result<Vec<Exercise>> {
        let exercises: Vec<Exercise> = self
            .get_with_query("/api/exercises", &filter.query_pairs())
            .await?;
        // The server filter is advisory; apply it locally as well
        Ok(exercises.into_iter().filter(|e| filter.matches(e)).collect())
    }

    pub async fn exercise(&self, id: &str) -> Result<Exercise> {
        let key = format!("{}{}", EXERCISE_PREFIX, id);
        self.get(&format!("/api/exercises/{}", id), Some(&key)).await
    }

    // Gamification

    pub async fn achievements(&self) -> Result<Vec<Achievement>> {
        self.get("/api/achievements", Some(ACHIEVEMENTS_KEY)).await
    }

    pub async fn score(&self) -> Result<UserScore> {
        self.get("/api/user/score", Some(SCORE_KEY)).await
    }

    pub async fn challenges(&self) -> Result<Vec<Challenge>> {
        self.get("/api/challenges", Some(CHALLENGES_KEY)).await
    }

    pub async fn join_challenge(&self, id: &str) -> Result<JoinedChallenge> {
        let joined: JoinedChallenge = self
            .post(
                &format!("/api/challenges/{}/join", id),
                &serde_json::json!({}),
            )
            .await?;
        self.cache.invalidate(CHALLENGES_KEY);
        self.cache.invalidate(SCORE_KEY);
        Ok(joined)
    }
}
