//! Workout-builder wizard.
//!
//! A [`WorkoutDraft`] moves through Details → Exercises → Schedule → Review.
//! Moving forward validates the current step; moving back never does. The
//! draft is serializable so an unfinished build survives between runs.

mod estimate;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use estimate::{estimate_calories, estimate_duration_seconds, DEFAULT_CALORIES_PER_MINUTE};

use crate::models::{Difficulty, NewWorkout, WorkoutExercise, WorkoutType};
use crate::validation::ValidationErrors;

/// Upper bounds for one exercise slot
pub const MAX_SETS: u32 = 50;
pub const MAX_REPS: u32 = 500;
pub const MAX_SET_SECONDS: u32 = 3_600;
pub const MAX_REST_SECONDS: u32 = 1_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuilderStep {
    Details,
    Exercises,
    Schedule,
    Review,
}

impl BuilderStep {
    pub fn next(self) -> Option<Self> {
        match self {
            BuilderStep::Details => Some(BuilderStep::Exercises),
            BuilderStep::Exercises => Some(BuilderStep::Schedule),
            BuilderStep::Schedule => Some(BuilderStep::Review),
            BuilderStep::Review => None,
        }
    }

    pub fn prev(self) -> Option<Self> {
        match self {
            BuilderStep::Details => None,
            BuilderStep::Exercises => Some(BuilderStep::Details),
            BuilderStep::Schedule => Some(BuilderStep::Exercises),
            BuilderStep::Review => Some(BuilderStep::Schedule),
        }
    }

    /// 1-based position for "Step 2 of 4"
    pub fn number(self) -> usize {
        match self {
            BuilderStep::Details => 1,
            BuilderStep::Exercises => 2,
            BuilderStep::Schedule => 3,
            BuilderStep::Review => 4,
        }
    }

    pub const COUNT: usize = 4;
}

impl std::fmt::Display for BuilderStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuilderStep::Details => write!(f, "Details"),
            BuilderStep::Exercises => write!(f, "Exercises"),
            BuilderStep::Schedule => write!(f, "Schedule"),
            BuilderStep::Review => write!(f, "Review"),
        }
    }
}

/// Workout under construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDraft {
    pub step: BuilderStep,
    pub name: String,
    pub description: Option<String>,
    pub workout_type: WorkoutType,
    pub difficulty: Difficulty,
    pub exercises: Vec<WorkoutExercise>,
    /// Calories per minute for exercises with a known rate, by exercise id
    #[serde(default)]
    pub calorie_rates: Vec<(String, f64)>,
    pub scheduled_date: Option<NaiveDate>,
    pub is_template: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for WorkoutDraft {
    fn default() -> Self {
        Self {
            step: BuilderStep::Details,
            name: String::new(),
            description: None,
            workout_type: WorkoutType::Strength,
            difficulty: Difficulty::Beginner,
            exercises: Vec::new(),
            calorie_rates: Vec::new(),
            scheduled_date: None,
            is_template: false,
            updated_at: Utc::now(),
        }
    }
}

impl WorkoutDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate one step without moving
    pub fn validate_step(&self, step: BuilderStep, today: NaiveDate) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        match step {
            BuilderStep::Details => {
                let name = self.name.trim();
                if name.is_empty() {
                    errors.add("name", "Workout name is required");
                } else if name.chars().count() < 3 {
                    errors.add("name", "Workout name must be at least 3 characters");
                } else if name.chars().count() > 80 {
                    errors.add("name", "Workout name must be at most 80 characters");
                }
            }
            BuilderStep::Exercises => {
                if self.exercises.is_empty() {
                    errors.add("exercises", "Add at least one exercise");
                }
                for (i, ex) in self.exercises.iter().enumerate() {
                    if ex.sets == 0 {
                        errors.add("exercises", format!("{} (#{}) needs at least one set", ex.name, i + 1));
                    }
                    let has_reps = ex.reps.map_or(false, |r| r > 0);
                    let has_time = ex.duration_seconds.map_or(false, |d| d > 0);
                    if !has_reps && !has_time {
                        errors.add(
                            "exercises",
                            format!("{} (#{}) needs reps or a duration", ex.name, i + 1),
                        );
                    }
                    let limits = [
                        (ex.sets, MAX_SETS, "sets"),
                        (ex.reps.unwrap_or(0), MAX_REPS, "reps per set"),
                        (ex.duration_seconds.unwrap_or(0), MAX_SET_SECONDS, "seconds per set"),
                        (ex.rest_seconds, MAX_REST_SECONDS, "seconds of rest"),
                    ];
                    for (value, max, what) in limits {
                        if value > max {
                            errors.add(
                                "exercises",
                                format!("{} (#{}) allows at most {} {}", ex.name, i + 1, max, what),
                            );
                        }
                    }
                }
            }
            BuilderStep::Schedule => {
                if let Some(date) = self.scheduled_date {
                    if date < today {
                        errors.add("scheduled_date", "Scheduled date cannot be in the past");
                    }
                } else if !self.is_template {
                    errors.add(
                        "scheduled_date",
                        "Pick a date or save the workout as a template",
                    );
                }
            }
            BuilderStep::Review => {
                for earlier in [BuilderStep::Details, BuilderStep::Exercises, BuilderStep::Schedule] {
                    errors.merge(self.validate_step(earlier, today));
                }
            }
        }

        errors
    }

    /// Advance one step if the current one is valid
    pub fn next(&mut self, today: NaiveDate) -> Result<BuilderStep, ValidationErrors> {
        self.validate_step(self.step, today).into_result()?;
        if let Some(next) = self.step.next() {
            self.step = next;
            self.touch();
        }
        Ok(self.step)
    }

    /// Go back one step; no validation
    pub fn back(&mut self) -> BuilderStep {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
            self.touch();
        }
        self.step
    }

    pub fn add_exercise(&mut self, exercise: WorkoutExercise, calories_per_minute: Option<f64>) {
        if let Some(rate) = calories_per_minute {
            self.calorie_rates.retain(|(id, _)| id != &exercise.exercise_id);
            self.calorie_rates.push((exercise.exercise_id.clone(), rate));
        }
        self.exercises.push(exercise);
        self.touch();
    }

    pub fn remove_exercise(&mut self, index: usize) -> Option<WorkoutExercise> {
        if index >= self.exercises.len() {
            return None;
        }
        let removed = self.exercises.remove(index);
        self.touch();
        Some(removed)
    }

    /// Move the exercise at `from` to position `to`
    pub fn move_exercise(&mut self, from: usize, to: usize) -> bool {
        if from >= self.exercises.len() || to >= self.exercises.len() {
            return false;
        }
        let ex = self.exercises.remove(from);
        self.exercises.insert(to, ex);
        self.touch();
        true
    }

    pub fn estimated_duration_minutes(&self) -> u32 {
        self.exercises
            .iter()
            .map(estimate_duration_seconds)
            .fold(0u32, u32::saturating_add)
            .div_ceil(60)
    }

    pub fn estimated_calories(&self) -> u32 {
        self.exercises
            .iter()
            .map(|ex| {
                let rate = self
                    .calorie_rates
                    .iter()
                    .find(|(id, _)| id == &ex.exercise_id)
                    .map(|(_, r)| *r);
                estimate_calories(ex, rate)
            })
            .sum::<f64>()
            .round() as u32
    }

    /// Payload for creating the workout; validates every step
    pub fn to_request(&self, today: NaiveDate) -> Result<NewWorkout, ValidationErrors> {
        self.validate_step(BuilderStep::Review, today).into_result()?;

        Ok(NewWorkout {
            name: self.name.trim().to_string(),
            description: self.description.clone().filter(|d| !d.trim().is_empty()),
            workout_type: self.workout_type,
            difficulty: self.difficulty,
            duration_minutes: self.estimated_duration_minutes(),
            calories_burned: Some(self.estimated_calories()),
            exercises: self.exercises.clone(),
            is_template: self.is_template,
            scheduled_date: self.scheduled_date,
        })
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
