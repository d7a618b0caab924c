pub mod achievement;
pub mod calendar_task;
pub mod challenge;
pub mod exercise;
pub mod goal;
pub mod user;
pub mod workout;

pub use achievement::{Achievement, UserScore};
pub use calendar_task::{CalendarTask, NewCalendarTask, TaskType};
pub use challenge::Challenge;
pub use exercise::{Exercise, ExerciseFilter, ExerciseProgress};
pub use goal::{Goal, GoalStatus, GoalType, NewGoal};
pub use user::{AuthSession, User};
pub use workout::{Difficulty, NewWorkout, Workout, WorkoutExercise, WorkoutFilter, WorkoutStatus, WorkoutType};
