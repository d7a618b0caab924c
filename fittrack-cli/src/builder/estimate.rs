use crate::models::WorkoutExercise;

/// Seconds per repetition when an exercise is rep-based
const SECONDS_PER_REP: u32 = 3;

/// Burn rate used when the exercise library has none
pub const DEFAULT_CALORIES_PER_MINUTE: f64 = 5.0;

fn work_seconds(exercise: &WorkoutExercise) -> u32 {
    let per_set = match exercise.duration_seconds {
        Some(d) if d > 0 => d,
        _ => exercise.reps.unwrap_or(0).saturating_mul(SECONDS_PER_REP),
    };
    exercise.sets.saturating_mul(per_set)
}

/// Working time plus rest between sets (none after the last set)
pub fn estimate_duration_seconds(exercise: &WorkoutExercise) -> u32 {
    let rests = exercise.sets.saturating_sub(1).saturating_mul(exercise.rest_seconds);
    work_seconds(exercise).saturating_add(rests)
}

/// Calories over working time only
pub fn estimate_calories(exercise: &WorkoutExercise, calories_per_minute: Option<f64>) -> f64 {
    let rate = calories_per_minute
        .filter(|r| *r > 0.0)
        .unwrap_or(DEFAULT_CALORIES_PER_MINUTE);
    work_seconds(exercise) as f64 / 60.0 * rate
}
