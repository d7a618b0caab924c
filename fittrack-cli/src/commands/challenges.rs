use anyhow::Result;
use colored::Colorize;

use super::{spinner, AppContext};
use crate::ui::progress_bar;

pub async fn list_challenges(ctx: &AppContext) -> Result<()> {
    let pb = spinner("Loading challenges...");
    let challenges = ctx.client().challenges().await;
    pb.finish_and_clear();

    let today = AppContext::today();
    let mut challenges = challenges?;
    challenges.retain(|c| !c.has_ended(today));
    challenges.sort_by_key(|c| c.start_date);

    println!("{}", "Challenges".bold());
    println!();

    if challenges.is_empty() {
        println!("No open challenges right now.");
        return Ok(());
    }

    for challenge in &challenges {
        let when = if challenge.is_active(today) {
            format!("{} days left", challenge.days_left(today))
        } else {
            format!("starts {}", ctx.format_date(challenge.start_date))
        };
        let joined = if challenge.joined {
            " [joined]".green().to_string()
        } else {
            String::new()
        };

        println!("{}{}  {}", challenge.title.bold(), joined, challenge.id.dimmed());
        if let Some(description) = &challenge.description {
            println!("  {}", description);
        }
        println!(
            "  Target {} {}, {} participants, {} pts, {}",
            challenge.target_value,
            challenge.unit,
            challenge.participants,
            challenge.reward_points,
            when
        );
        if challenge.joined {
            println!(
                "  {} {:.0}%",
                progress_bar(challenge.progress_percentage(), 20).green(),
                challenge.progress_percentage()
            );
        }
    }

    Ok(())
}

pub async fn join_challenge(ctx: &AppContext, id: &str) -> Result<()> {
    let joined = ctx.client().join_challenge(id).await?;

    let message = joined
        .message
        .unwrap_or_else(|| format!("You joined '{}'", joined.challenge.title));
    println!("{} {}", "✓".green(), message);
    println!(
        "  {} participants, ends {}",
        joined.challenge.participants,
        ctx.format_date(joined.challenge.end_date)
    );

    Ok(())
}

pub async fn show_achievements(ctx: &AppContext) -> Result<()> {
    let pb = spinner("Loading achievements...");
    let result = tokio::try_join!(ctx.client().score(), ctx.client().achievements());
    pb.finish_and_clear();
    let (score, achievements) = result?;

    println!("{}", "Score".bold());
    println!(
        "  Level {}  {} pts  {} {}% ({} pts to next level)",
        score.level,
        score.total_points,
        progress_bar(score.level_progress_percentage() as f64, 20).green(),
        score.level_progress_percentage(),
        score.points_to_next_level
    );
    if let Some(rank) = score.rank {
        println!("  Rank #{}", rank);
    }

    let (unlocked, locked): (Vec<_>, Vec<_>) =
        achievements.iter().partition(|a| a.is_unlocked());

    println!();
    println!("{} ({}/{})", "Achievements".bold(), unlocked.len(), achievements.len());
    for achievement in unlocked {
        let when = achievement
            .unlocked_at
            .map(|at| ctx.format_date(at.date_naive()))
            .unwrap_or_default();
        println!(
            "  {} {:<28} {:>4} pts  {}",
            "🏆".green(),
            achievement.title,
            achievement.points,
            when.dimmed()
        );
    }
    for achievement in locked {
        println!(
            "  {} {:<28} {:>4} pts  {}",
            "🔒",
            achievement.title.dimmed(),
            achievement.points,
            achievement.description.as_deref().unwrap_or("").dimmed()
        );
    }

    Ok(())
}
