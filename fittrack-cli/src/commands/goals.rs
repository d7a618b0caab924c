use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};

use super::{spinner, AppContext};
use crate::models::{Goal, GoalStatus, GoalType};
use crate::ui::progress_bar;
use crate::validation::GoalForm;

const GOAL_TYPES: [GoalType; 5] = [
    GoalType::Weight,
    GoalType::Strength,
    GoalType::Endurance,
    GoalType::Frequency,
    GoalType::Custom,
];

pub async fn list_goals(ctx: &AppContext, show_all: bool) -> Result<()> {
    let pb = spinner("Loading goals...");
    let goals = ctx.client().goals().await;
    pb.finish_and_clear();

    let today = AppContext::today();
    let goals: Vec<Goal> = goals?
        .into_iter()
        .filter(|g| show_all || g.is_active())
        .collect();

    println!("{}", "Goals".bold());
    println!();

    if goals.is_empty() {
        println!("No goals yet. Create one with 'fittrack goals create'.");
        return Ok(());
    }

    for goal in &goals {
        let pct = goal.progress_percentage();
        let deadline = if goal.is_overdue(today) {
            "overdue".red().to_string()
        } else if goal.is_active() {
            format!("{} days left", goal.days_remaining(today))
        } else {
            goal.status.to_string()
        };

        println!("{}  {}", goal.title.bold(), goal.id.dimmed());
        println!(
            "  {} {:>5.1}%  {} / {} {}  ({}, due {}, {})",
            progress_bar(pct, 20).green(),
            pct,
            goal.current_value,
            goal.target_value,
            goal.unit,
            goal.goal_type,
            ctx.format_date(goal.deadline),
            deadline
        );
    }

    Ok(())
}

pub async fn create_goal(ctx: &AppContext) -> Result<()> {
    println!("{}", "Create Goal".bold());
    println!();

    let title: String = Input::new().with_prompt("Title").interact_text()?;
    let description: String = Input::new()
        .with_prompt("Description (optional)")
        .allow_empty(true)
        .interact_text()?;
    let type_index = Select::new()
        .with_prompt("Goal type")
        .items(&GOAL_TYPES)
        .default(0)
        .interact()?;
    let target_value: f64 = Input::new().with_prompt("Target value").interact_text()?;
    let unit: String = Input::new().with_prompt("Unit (kg, km, workouts...)").interact_text()?;
    let deadline: String = Input::new()
        .with_prompt("Deadline (YYYY-MM-DD)")
        .interact_text()?;

    let form = GoalForm {
        title,
        description: Some(description),
        goal_type: GOAL_TYPES[type_index],
        target_value,
        unit,
        deadline,
    };
    let new_goal = form.to_new_goal(AppContext::today())?;

    let pb = spinner("Creating goal...");
    let created = ctx.client().create_goal(&new_goal).await;
    pb.finish_and_clear();
    let goal = created?;

    println!("{} Goal '{}' created ({})", "✓".green(), goal.title, goal.id);

    Ok(())
}

pub async fn update_progress(ctx: &AppContext, id: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        anyhow::bail!("Progress value must be a non-negative number");
    }

    let goal = ctx.client().update_goal_progress(id, value).await?;

    println!(
        "{} {}: {} / {} {} ({:.0}%)",
        "✓".green(),
        goal.title,
        goal.current_value,
        goal.target_value,
        goal.unit,
        goal.progress_percentage()
    );

    if goal.progress_percentage() >= 100.0 && goal.is_active() {
        println!("Target reached! Mark it done with 'fittrack goals complete {}'.", goal.id);
    }

    Ok(())
}

pub async fn complete_goal(ctx: &AppContext, id: &str) -> Result<()> {
    let goal = ctx
        .client()
        .update_goal_status(id, GoalStatus::Completed)
        .await?;

    println!("{} Goal '{}' completed. Well done!", "✓".green(), goal.title);

    Ok(())
}

pub async fn delete_goal(ctx: &AppContext, id: &str, force: bool) -> Result<()> {
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete goal {}?", id))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    ctx.client().delete_goal(id).await?;

    println!("{} Goal deleted.", "✓".green());

    Ok(())
}
