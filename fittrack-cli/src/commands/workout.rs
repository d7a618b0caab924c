use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use super::{parse_date_arg, spinner, AppContext};
use crate::models::{Workout, WorkoutFilter, WorkoutStatus, WorkoutType};

/// Turn the `workouts list` flags into a filter
pub fn build_filter(
    workout_type: Option<&str>,
    status: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    templates: bool,
) -> Result<WorkoutFilter> {
    let filter = WorkoutFilter {
        workout_type: workout_type.map(str::parse::<WorkoutType>).transpose()?,
        status: status.map(str::parse::<WorkoutStatus>).transpose()?,
        from_date: parse_date_arg(from, "from")?,
        to_date: parse_date_arg(to, "to")?,
        templates: Some(templates),
    };

    if let (Some(from), Some(to)) = (filter.from_date, filter.to_date) {
        if from > to {
            anyhow::bail!("--from ({}) is after --to ({})", from, to);
        }
    }

    Ok(filter)
}

pub async fn list_workouts(ctx: &AppContext, filter: &WorkoutFilter, limit: usize) -> Result<()> {
    let templates = filter.templates == Some(true);

    let pb = spinner("Loading workouts...");
    let result = if templates {
        ctx.client().workout_templates().await
    } else {
        ctx.client().workouts().await
    };
    pb.finish_and_clear();

    let mut workouts: Vec<Workout> = result?.into_iter().filter(|w| filter.matches(w)).collect();
    workouts.sort_by(|a, b| b.calendar_date().cmp(&a.calendar_date()));
    workouts.truncate(limit);

    println!("{}", if templates { "Workout Templates" } else { "Workouts" }.bold());
    println!();

    if workouts.is_empty() {
        println!("No workouts found. Build one with 'fittrack workouts build'.");
        return Ok(());
    }

    for workout in &workouts {
        let icon = match workout.status {
            WorkoutStatus::Completed => "✓".green(),
            WorkoutStatus::Skipped => "✗".red(),
            WorkoutStatus::InProgress => "▶".yellow(),
            WorkoutStatus::Planned => "○".normal(),
        };

        println!(
            "{} {}  {:<12} {:>4} min  {:<12} {}  {}",
            icon,
            ctx.format_date(workout.calendar_date()),
            workout.workout_type.to_string(),
            workout.duration_minutes,
            workout.difficulty.to_string(),
            workout.name.bold(),
            workout.id.dimmed()
        );
    }

    Ok(())
}

pub async fn show_workout(ctx: &AppContext, id: &str) -> Result<()> {
    let workout = ctx.client().workout(id).await?;

    println!("{}", workout.name.bold());
    if let Some(description) = &workout.description {
        println!("{}", description);
    }
    println!();
    println!("  ID:         {}", workout.id);
    println!("  Type:       {}", workout.workout_type);
    println!("  Difficulty: {}", workout.difficulty);
    println!("  Status:     {}", workout.status);
    println!("  Date:       {}", ctx.format_date(workout.calendar_date()));
    println!("  Duration:   {} min", workout.duration_minutes);
    if let Some(calories) = workout.calories_burned {
        println!("  Calories:   {} kcal", calories);
    }
    if workout.is_template {
        println!("  Template:   yes");
    }

    println!();
    println!("{} ({} sets total)", "Exercises".bold(), workout.total_sets());
    for (i, ex) in workout.exercises.iter().enumerate() {
        let volume = match (ex.reps, ex.duration_seconds) {
            (_, Some(secs)) if secs > 0 => format!("{} x {}s", ex.sets, secs),
            (Some(reps), _) => format!("{} x {}", ex.sets, reps),
            _ => format!("{} sets", ex.sets),
        };
        let weight = ex
            .weight_kg
            .map(|w| format!(" @ {}kg", w))
            .unwrap_or_default();
        println!(
            "  {}. {:<24} {}{}  (rest {}s)",
            i + 1,
            ex.name,
            volume,
            weight,
            ex.rest_seconds
        );
    }

    Ok(())
}

pub async fn complete_workout(ctx: &AppContext, id: &str) -> Result<()> {
    let workout = ctx
        .client()
        .update_workout_status(id, WorkoutStatus::Completed)
        .await?;

    println!("{} Workout '{}' marked as completed!", "✓".green(), workout.name);
    if let Some(calories) = workout.calories_burned {
        println!("  {} min, ~{} kcal", workout.duration_minutes, calories);
    }

    Ok(())
}

pub async fn delete_workout(ctx: &AppContext, id: &str, force: bool) -> Result<()> {
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete workout {}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    ctx.client().delete_workout(id).await?;

    println!("{} Workout deleted.", "✓".green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter() {
        let filter = build_filter(Some("hiit"), Some("completed"), Some("2024-03-01"), None, false)
            .unwrap();
        assert_eq!(filter.workout_type, Some(WorkoutType::Hiit));
        assert_eq!(filter.status, Some(WorkoutStatus::Completed));
        assert_eq!(filter.templates, Some(false));
    }

    #[test]
    fn test_build_filter_rejects_bad_input() {
        assert!(build_filter(Some("yoga"), None, None, None, false).is_err());
        assert!(build_filter(None, None, Some("2024-03-10"), Some("2024-03-01"), false).is_err());
    }
}
