use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Input;
use std::collections::HashMap;

use super::{spinner, AppContext};
use crate::models::{Difficulty, ExerciseFilter, ExerciseProgress};
use crate::notifications::message_for;
use crate::video::PlaybackController;

pub async fn list_exercises(
    ctx: &AppContext,
    search: Option<String>,
    category: Option<String>,
    difficulty: Option<String>,
) -> Result<()> {
    let filter = ExerciseFilter {
        search: search.filter(|s| !s.trim().is_empty()),
        category,
        difficulty: difficulty.as_deref().map(str::parse::<Difficulty>).transpose()?,
    };

    let pb = spinner("Searching exercises...");
    let exercises = ctx.client().exercises(&filter).await;
    pb.finish_and_clear();
    let exercises = exercises?;

    let progress: HashMap<String, ExerciseProgress> = ctx
        .storage()
        .all_exercise_progress()?
        .into_iter()
        .map(|p| (p.exercise_id.clone(), p))
        .collect();

    println!("{} ({} found)", "Exercise Library".bold(), exercises.len());
    println!();

    for exercise in &exercises {
        let watched = match progress.get(&exercise.id) {
            Some(p) if p.completed => " ✓ watched".green().to_string(),
            Some(p) => format!(" ▶ {}", format_position(p.position_seconds)).yellow().to_string(),
            None => String::new(),
        };
        let video = if exercise.video_sources().is_empty() { " " } else { "🎬" };

        println!(
            "{} {:<28} {:<12} {:<12} {}{}  {}",
            video,
            exercise.name.bold(),
            exercise.category,
            exercise.difficulty.to_string(),
            exercise.muscle_groups.join(", "),
            watched,
            exercise.id.dimmed()
        );
    }

    Ok(())
}

pub async fn show_exercise(ctx: &AppContext, id: &str) -> Result<()> {
    let exercise = ctx.client().exercise(id).await?;

    println!("{}", exercise.name.bold());
    if let Some(description) = &exercise.description {
        println!("{}", description);
    }
    println!();
    println!("  Category:   {}", exercise.category);
    println!("  Difficulty: {}", exercise.difficulty);
    if !exercise.muscle_groups.is_empty() {
        println!("  Muscles:    {}", exercise.muscle_groups.join(", "));
    }
    if !exercise.equipment.is_empty() {
        println!("  Equipment:  {}", exercise.equipment.join(", "));
    }
    if let Some(rate) = exercise.calories_per_minute {
        println!("  Burn rate:  {:.1} kcal/min", rate);
    }

    if !exercise.instructions.is_empty() {
        println!();
        println!("{}", "Instructions".bold());
        for (i, step) in exercise.instructions.iter().enumerate() {
            println!("  {}. {}", i + 1, step);
        }
    }

    let sources = exercise.video_sources();
    if !sources.is_empty() {
        println!();
        println!(
            "Video available ({} source{}). Watch with 'fittrack exercises watch {}'.",
            sources.len(),
            if sources.len() == 1 { "" } else { "s" },
            exercise.id
        );
        if let Some(p) = ctx.storage().exercise_progress(&exercise.id)? {
            if p.completed {
                println!("You have watched this video.");
            } else {
                println!("Saved position: {}", format_position(p.position_seconds));
            }
        }
    }

    Ok(())
}

/// Open the first reachable video source in the system player and record
/// how far the user got
pub async fn watch_exercise(ctx: &AppContext, id: &str, restart: bool) -> Result<()> {
    let exercise = ctx.client().exercise(id).await?;
    let mut player = PlaybackController::new(&exercise.id, exercise.video_sources());

    if player.current_source().is_none() {
        anyhow::bail!("'{}' has no video", exercise.name);
    }

    if !restart {
        if let Some(saved) = ctx.storage().exercise_progress(&exercise.id)? {
            player.resume_from(&saved);
        }
    }
    player.play();

    let url = loop {
        let Some(candidate) = player.current_source().map(str::to_string) else {
            break None;
        };

        let pb = spinner(format!("Checking {}...", candidate));
        let reachable = ctx.client().check_reachable(&candidate).await;
        pb.finish_and_clear();

        match reachable {
            Ok(()) => break Some(candidate),
            Err(e) => {
                println!("{} {} unavailable: {}", "✗".red(), candidate, message_for(&e));
                if let Some(next) = player.on_error(&format!("{:#}", e)) {
                    println!("  Trying fallback {}", next);
                }
            }
        }
    };

    let Some(url) = url else {
        anyhow::bail!(
            "No playable video for '{}' ({} source(s) failed)",
            exercise.name,
            player.failed_sources().len()
        );
    };

    // Length is not known until the external player reports it
    player.on_loaded(f64::NAN);

    let target = with_start_time(&url, player.position());
    println!("{} Opening {}", "▶".green(), target);
    if player.position() > 0.0 {
        println!("  Resuming at {}", format_position(player.position()));
    }
    open::that(&target).with_context(|| format!("Failed to open {}", target))?;

    let answer: String = Input::new()
        .with_prompt("Where did you stop? (mm:ss, empty if you finished)")
        .allow_empty(true)
        .interact_text()?;

    match parse_position(&answer) {
        None if answer.trim().is_empty() => player.on_ended(),
        None => anyhow::bail!("Could not read '{}' as mm:ss", answer.trim()),
        Some(seconds) => {
            player.pause();
            player.seek(seconds);
        }
    }

    let progress = player.progress();
    ctx.storage().save_exercise_progress(&progress)?;

    if progress.completed {
        println!("{} Marked '{}' as watched.", "✓".green(), exercise.name);
    } else {
        println!(
            "{} Saved position {} for next time.",
            "✓".green(),
            format_position(progress.position_seconds)
        );
    }

    Ok(())
}

/// Append a `#t=` media fragment so players start at `seconds`
fn with_start_time(url: &str, seconds: f64) -> String {
    if seconds < 1.0 || url.contains('#') {
        url.to_string()
    } else {
        format!("{}#t={}", url, seconds.floor() as u64)
    }
}

fn format_position(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Parse `mm:ss` or plain seconds
fn parse_position(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    match raw.split_once(':') {
        Some((m, s)) => {
            let minutes: u64 = m.parse().ok()?;
            let seconds: u64 = s.parse().ok()?;
            (seconds < 60).then(|| (minutes * 60 + seconds) as f64)
        }
        None => raw.parse::<u64>().ok().map(|s| s as f64),
    }
}
