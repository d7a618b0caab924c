use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Args;
use colored::Colorize;

use super::{parse_date_arg, spinner, AppContext};
use crate::calendar::{
    build_month_grid, build_week, month_completion, month_grid_range, selected_day, week_range,
    CalendarDay, MonthRef,
};
use crate::models::CalendarTask;

#[derive(Args)]
pub struct CalendarCommand {
    /// Month to show (YYYY-MM); defaults to the current month
    #[arg(short, long)]
    month: Option<String>,

    /// Show only the week of the selected day
    #[arg(short, long)]
    week: bool,

    /// Day to highlight and list tasks for (YYYY-MM-DD)
    #[arg(short, long)]
    select: Option<String>,

    /// Print the grid as JSON
    #[arg(long)]
    json: bool,
}

impl CalendarCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        ctx.auth.require_auth().await?;

        let today = AppContext::today();
        let selected = parse_date_arg(self.select.as_deref(), "selected")?;
        let month = match &self.month {
            Some(raw) => MonthRef::parse(raw)?,
            None => MonthRef::containing(selected.unwrap_or(today)),
        };

        let pb = spinner("Loading calendar...");
        let days = if self.week {
            let reference = selected.unwrap_or_else(|| {
                if month.contains(today) {
                    today
                } else {
                    month.first_day()
                }
            });
            let (first, last) = week_range(reference);
            let tasks = ctx.client().calendar_tasks_between(first, last).await;
            pb.finish_and_clear();
            build_week(reference, &tasks?, today, selected)
        } else {
            // Leading and trailing cells belong to the neighbouring months
            let (first, last) = month_grid_range(month);
            let tasks = ctx.client().calendar_tasks_between(first, last).await;
            pb.finish_and_clear();
            build_month_grid(month, &tasks?, today, selected)
        };

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&days).context("Failed to serialize calendar")?
            );
            return Ok(());
        }

        let title = if self.week {
            format!("Week of {}", ctx.format_date(days[0].date))
        } else {
            month.title()
        };
        println!("{}", title.bold());
        println!();
        print_grid(&days);
        println!();
        println!(
            "Completion: {}%   {}",
            month_completion(&days),
            "✓ all done  • pending  [dd] selected".dimmed()
        );

        if let Some(day) = selected_day(&days) {
            println!();
            print_day(ctx, day);
        }

        Ok(())
    }
}

/// Plain text of one grid cell, five columns wide
pub(crate) fn cell_text(day: &CalendarDay<CalendarTask>) -> String {
    let mark = if !day.has_events() {
        ' '
    } else if day.completion_percentage == 100 {
        '✓'
    } else {
        '•'
    };

    if day.is_selected {
        format!("[{:>2}]{}", day.date.day(), mark)
    } else {
        format!(" {:>2} {}", day.date.day(), mark)
    }
}

fn print_grid(days: &[CalendarDay<CalendarTask>]) {
    println!("{}", "  Mon   Tue   Wed   Thu   Fri   Sat   Sun".bold());

    for week in days.chunks(7) {
        let cells: Vec<String> = week
            .iter()
            .map(|day| {
                let text = cell_text(day);
                let styled = if !day.is_current_month {
                    text.dimmed()
                } else if day.is_today {
                    text.yellow().bold()
                } else if day.has_events() && day.completion_percentage == 100 {
                    text.green()
                } else if day.has_events() {
                    text.cyan()
                } else {
                    text.normal()
                };
                styled.to_string()
            })
            .collect();
        println!("{}", cells.join(" "));
    }
}

fn print_day(ctx: &AppContext, day: &CalendarDay<CalendarTask>) {
    println!(
        "{} ({}/{} done)",
        ctx.format_date(day.date).bold(),
        day.completed_count(),
        day.events.len()
    );

    if day.events.is_empty() {
        println!("  Nothing scheduled.");
        return;
    }

    for task in &day.events {
        let check = if task.completed { "✓".green() } else { "○".normal() };
        let time = task.time.as_deref().unwrap_or("");
        println!(
            "  {} [{}] {:<5} {}  {}",
            check,
            task.task_type.marker(),
            time,
            task.title,
            task.id.dimmed()
        );
    }
}
