//! Interactive front end of the workout builder. The draft is saved after
//! every step so an interrupted build can be resumed.

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};

use super::{spinner, AppContext};
use crate::builder::{
    estimate_duration_seconds, BuilderStep, WorkoutDraft, MAX_REPS, MAX_REST_SECONDS,
    MAX_SETS, MAX_SET_SECONDS,
};
use crate::models::{Difficulty, ExerciseFilter, WorkoutExercise, WorkoutType};
use crate::validation::ValidationErrors;

const WORKOUT_TYPES: [WorkoutType; 5] = [
    WorkoutType::Strength,
    WorkoutType::Cardio,
    WorkoutType::Hiit,
    WorkoutType::Flexibility,
    WorkoutType::Mixed,
];

const DIFFICULTIES: [Difficulty; 3] = [
    Difficulty::Beginner,
    Difficulty::Intermediate,
    Difficulty::Advanced,
];

enum Flow {
    Continue,
    SaveAndQuit,
    Done,
}

pub async fn run_wizard(ctx: &AppContext, fresh: bool) -> Result<()> {
    let today = AppContext::today();

    if fresh && ctx.storage().clear_draft()? {
        println!("Discarded saved draft.");
    }

    let mut draft = match ctx.storage().load_draft()? {
        Some(saved) => {
            let label = if saved.name.is_empty() { "untitled" } else { saved.name.as_str() };
            let resume = Confirm::new()
                .with_prompt(format!(
                    "Resume draft '{}' (step {}, saved {})?",
                    label,
                    saved.step,
                    saved.updated_at.format("%Y-%m-%d %H:%M")
                ))
                .default(true)
                .interact()?;
            if resume {
                saved
            } else {
                WorkoutDraft::new()
            }
        }
        None => WorkoutDraft::new(),
    };

    loop {
        println!();
        println!(
            "{}",
            format!("Step {} of {}: {}", draft.step.number(), BuilderStep::COUNT, draft.step).bold()
        );

        let flow = match draft.step {
            BuilderStep::Details => {
                edit_details(&mut draft)?;
                navigate(&mut draft, today)?
            }
            BuilderStep::Exercises => {
                edit_exercises(ctx, &mut draft).await?;
                navigate(&mut draft, today)?
            }
            BuilderStep::Schedule => {
                edit_schedule(&mut draft, today)?;
                navigate(&mut draft, today)?
            }
            BuilderStep::Review => review(ctx, &mut draft, today).await?,
        };

        match flow {
            Flow::Continue => ctx.storage().save_draft(&draft)?,
            Flow::SaveAndQuit => {
                ctx.storage().save_draft(&draft)?;
                println!("Draft saved. Run 'fittrack workouts build' to continue.");
                return Ok(());
            }
            Flow::Done => return Ok(()),
        }
    }
}

fn print_errors(errors: &ValidationErrors) {
    for message in errors.messages() {
        println!("  {} {}", "✗".red(), message);
    }
}

/// Next / back / save-and-quit menu shown after each editing step
fn navigate(draft: &mut WorkoutDraft, today: NaiveDate) -> Result<Flow> {
    let mut options = vec!["Next"];
    if draft.step.prev().is_some() {
        options.push("Back");
    }
    options.push("Save draft and quit");

    let choice = Select::new()
        .with_prompt("Continue")
        .items(&options)
        .default(0)
        .interact()?;

    match options[choice] {
        "Next" => {
            if let Err(errors) = draft.next(today) {
                print_errors(&errors);
            }
            Ok(Flow::Continue)
        }
        "Back" => {
            draft.back();
            Ok(Flow::Continue)
        }
        _ => Ok(Flow::SaveAndQuit),
    }
}

fn edit_details(draft: &mut WorkoutDraft) -> Result<()> {
    draft.name = Input::new()
        .with_prompt("Name")
        .with_initial_text(draft.name.clone())
        .allow_empty(true)
        .interact_text()?;

    let description: String = Input::new()
        .with_prompt("Description (optional)")
        .with_initial_text(draft.description.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    draft.description = Some(description).filter(|d| !d.trim().is_empty());

    let current = WORKOUT_TYPES
        .iter()
        .position(|t| *t == draft.workout_type)
        .unwrap_or(0);
    let idx = Select::new()
        .with_prompt("Type")
        .items(&WORKOUT_TYPES)
        .default(current)
        .interact()?;
    draft.workout_type = WORKOUT_TYPES[idx];

    let current = DIFFICULTIES
        .iter()
        .position(|d| *d == draft.difficulty)
        .unwrap_or(0);
    let idx = Select::new()
        .with_prompt("Difficulty")
        .items(&DIFFICULTIES)
        .default(current)
        .interact()?;
    draft.difficulty = DIFFICULTIES[idx];

    Ok(())
}

fn print_exercises(draft: &WorkoutDraft) {
    if draft.exercises.is_empty() {
        println!("  (no exercises yet)");
        return;
    }
    for (i, ex) in draft.exercises.iter().enumerate() {
        let volume = match (ex.reps, ex.duration_seconds) {
            (_, Some(secs)) if secs > 0 => format!("{} x {}s", ex.sets, secs),
            (Some(reps), _) => format!("{} x {}", ex.sets, reps),
            _ => format!("{} sets", ex.sets),
        };
        println!(
            "  {}. {:<24} {:<10} ~{}s",
            i + 1,
            ex.name,
            volume,
            estimate_duration_seconds(ex)
        );
    }
    println!(
        "  Estimated: {} min, {} kcal",
        draft.estimated_duration_minutes(),
        draft.estimated_calories()
    );
}

async fn edit_exercises(ctx: &AppContext, draft: &mut WorkoutDraft) -> Result<()> {
    loop {
        print_exercises(draft);

        let choice = Select::new()
            .with_prompt("Exercises")
            .items(&["Add from library", "Remove", "Move", "Done"])
            .default(if draft.exercises.is_empty() { 0 } else { 3 })
            .interact()?;

        match choice {
            0 => add_exercise(ctx, draft).await?,
            1 if !draft.exercises.is_empty() => {
                let idx = pick_exercise(draft, "Remove which?")?;
                draft.remove_exercise(idx);
            }
            2 if draft.exercises.len() > 1 => {
                let from = pick_exercise(draft, "Move which?")?;
                let to: usize = Input::new()
                    .with_prompt(format!("New position (1-{})", draft.exercises.len()))
                    .interact_text()?;
                if !draft.move_exercise(from, to.saturating_sub(1)) {
                    println!("  {} No such position", "✗".red());
                }
            }
            3 => return Ok(()),
            _ => {}
        }
    }
}

fn at_most(max: u32) -> impl FnMut(&u32) -> Result<(), String> {
    move |value: &u32| {
        if *value <= max {
            Ok(())
        } else {
            Err(format!("Must be at most {}", max))
        }
    }
}

fn pick_exercise(draft: &WorkoutDraft, prompt: &str) -> Result<usize> {
    let names: Vec<&str> = draft.exercises.iter().map(|e| e.name.as_str()).collect();
    Ok(Select::new().with_prompt(prompt).items(&names).default(0).interact()?)
}

async fn add_exercise(ctx: &AppContext, draft: &mut WorkoutDraft) -> Result<()> {
    let search: String = Input::new()
        .with_prompt("Search library (empty for all)")
        .allow_empty(true)
        .interact_text()?;

    let filter = ExerciseFilter {
        search: Some(search).filter(|s| !s.trim().is_empty()),
        ..Default::default()
    };
    let pb = spinner("Searching exercises...");
    let found = ctx.client().exercises(&filter).await;
    pb.finish_and_clear();
    let found = found?;

    if found.is_empty() {
        println!("  No exercises match.");
        return Ok(());
    }

    let labels: Vec<String> = found
        .iter()
        .map(|e| format!("{} ({})", e.name, e.category))
        .collect();
    let idx = Select::new()
        .with_prompt("Exercise")
        .items(&labels)
        .default(0)
        .interact()?;
    let exercise = &found[idx];

    let sets: u32 = Input::new()
        .with_prompt("Sets")
        .default(3)
        .validate_with(at_most(MAX_SETS))
        .interact_text()?;
    let timed = Select::new()
        .with_prompt("Measured in")
        .items(&["Reps", "Seconds"])
        .default(0)
        .interact()?
        == 1;

    let (reps, duration_seconds) = if timed {
        let secs: u32 = Input::new()
            .with_prompt("Seconds per set")
            .default(30)
            .validate_with(at_most(MAX_SET_SECONDS))
            .interact_text()?;
        (None, Some(secs))
    } else {
        let reps: u32 = Input::new()
            .with_prompt("Reps per set")
            .default(10)
            .validate_with(at_most(MAX_REPS))
            .interact_text()?;
        (Some(reps), None)
    };

    let weight: String = Input::new()
        .with_prompt("Weight in kg (optional)")
        .allow_empty(true)
        .interact_text()?;
    let weight_kg = weight.trim().parse::<f64>().ok().filter(|w| *w > 0.0);

    let rest_seconds: u32 = Input::new()
        .with_prompt("Rest between sets (s)")
        .default(60)
        .validate_with(at_most(MAX_REST_SECONDS))
        .interact_text()?;

    draft.add_exercise(
        WorkoutExercise {
            exercise_id: exercise.id.clone(),
            name: exercise.name.clone(),
            sets,
            reps,
            weight_kg,
            duration_seconds,
            rest_seconds,
        },
        exercise.calories_per_minute,
    );

    Ok(())
}

fn edit_schedule(draft: &mut WorkoutDraft, today: NaiveDate) -> Result<()> {
    draft.is_template = Confirm::new()
        .with_prompt("Save as a reusable template?")
        .default(draft.is_template)
        .interact()?;

    let initial = draft
        .scheduled_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| if draft.is_template { String::new() } else { today.to_string() });

    let raw: String = Input::new()
        .with_prompt("Date (YYYY-MM-DD, empty for none)")
        .with_initial_text(initial)
        .allow_empty(true)
        .interact_text()?;

    draft.scheduled_date = if raw.trim().is_empty() {
        None
    } else {
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                println!("  {} '{}' is not a date, keeping the previous one", "✗".red(), raw.trim());
                draft.scheduled_date
            }
        }
    };

    Ok(())
}

async fn review(ctx: &AppContext, draft: &mut WorkoutDraft, today: NaiveDate) -> Result<Flow> {
    println!("  Name:       {}", draft.name.trim());
    if let Some(description) = &draft.description {
        println!("  About:      {}", description);
    }
    println!("  Type:       {}", draft.workout_type);
    println!("  Difficulty: {}", draft.difficulty);
    match draft.scheduled_date {
        Some(date) => println!("  Date:       {}", ctx.format_date(date)),
        None => println!("  Date:       -"),
    }
    if draft.is_template {
        println!("  Template:   yes");
    }
    print_exercises(draft);

    let choice = Select::new()
        .with_prompt("Ready?")
        .items(&["Create workout", "Back", "Save draft and quit", "Discard draft"])
        .default(0)
        .interact()?;

    match choice {
        0 => {
            let request = match draft.to_request(today) {
                Ok(request) => request,
                Err(errors) => {
                    print_errors(&errors);
                    return Ok(Flow::Continue);
                }
            };

            let pb = spinner("Creating workout...");
            let created = ctx.client().create_workout(&request).await;
            pb.finish_and_clear();
            // On failure the draft stays saved for another attempt
            let workout = created?;

            ctx.storage().clear_draft()?;
            println!(
                "{} Workout '{}' created ({} min, ~{} kcal)  {}",
                "✓".green(),
                workout.name,
                workout.duration_minutes,
                workout.calories_burned.unwrap_or(0),
                workout.id.dimmed()
            );
            Ok(Flow::Done)
        }
        1 => {
            draft.back();
            Ok(Flow::Continue)
        }
        2 => Ok(Flow::SaveAndQuit),
        _ => {
            ctx.storage().clear_draft()?;
            println!("Draft discarded.");
            Ok(Flow::Done)
        }
    }
}
