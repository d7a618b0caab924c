use chrono::{Datelike, NaiveDate};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, List, ListItem, Paragraph, Widget},
};

use crate::calendar::{month_completion, CalendarDay, MonthRef};
use crate::dashboard::{DataSource, WeeklySummary};
use crate::models::{CalendarTask, Goal, User, Workout};
use crate::notifications::{Level, Notification};

fn border_style(is_selected: bool) -> Style {
    if is_selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    }
}

/// Render the month grid
pub fn render_calendar(
    area: Rect,
    buf: &mut Buffer,
    month: MonthRef,
    days: &[CalendarDay<CalendarTask>],
    is_selected: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" 📅 {} ", month.title()))
        .title_alignment(Alignment::Center)
        .border_style(border_style(is_selected));

    let inner = block.inner(area);
    block.render(area, buf);

    let mut lines = vec![
        Line::from(Span::styled(
            " Mon  Tue  Wed  Thu  Fri  Sat  Sun",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for week in days.chunks(7) {
        let spans: Vec<Span> = week.iter().map(day_cell).collect();
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Month completion: ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("{}%", month_completion(days)),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        "✓ all done  • pending  [ ] prev/next month",
        Style::default().fg(Color::DarkGray),
    )));

    Paragraph::new(lines).render(inner, buf);
}

fn day_cell(day: &CalendarDay<CalendarTask>) -> Span<'static> {
    let mark = if !day.has_events() {
        ' '
    } else if day.completion_percentage == 100 {
        '✓'
    } else {
        '•'
    };

    let mut style = if !day.is_current_month {
        Style::default().fg(Color::DarkGray)
    } else if day.has_events() && day.completion_percentage == 100 {
        Style::default().fg(Color::Green)
    } else if day.has_events() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    };

    if day.is_today {
        style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
    }
    if day.is_selected {
        style = style.add_modifier(Modifier::REVERSED);
    }

    Span::styled(format!(" {:>2}{} ", day.date.day(), mark), style)
}

/// Render the task list of the selected day
pub fn render_day_detail(
    area: Rect,
    buf: &mut Buffer,
    date: NaiveDate,
    tasks: &[&CalendarTask],
    selected_index: usize,
    is_selected: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" 📋 {} ", date.format("%A %d %B")))
        .border_style(border_style(is_selected));

    let inner = block.inner(area);
    block.render(area, buf);

    if tasks.is_empty() {
        Paragraph::new("Nothing scheduled for this day.")
            .style(Style::default().fg(Color::Gray))
            .render(inner, buf);
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let check = if task.completed { "[x]" } else { "[ ]" };
            let time = task.time.as_deref().unwrap_or("     ");

            let line_style = if is_selected && idx == selected_index {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if task.completed {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };

            let content = format!(
                "{} {} {:>5} {}",
                check,
                task.task_type.marker(),
                time,
                task.title
            );

            ListItem::new(Line::from(Span::styled(content, line_style)))
        })
        .collect();

    List::new(items).render(inner, buf);
}

/// Render weekly summary widget
pub fn render_weekly_summary(area: Rect, buf: &mut Buffer, summary: &WeeklySummary) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            " 📊 Week of {} ",
            summary.week_start.format("%b %d")
        ))
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    block.render(area, buf);

    let lines = vec![
        Line::from(vec![
            Span::styled("Workouts: ", Style::default().fg(Color::Gray)),
            Span::styled(
                summary.total_workouts.to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Duration: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} min", summary.total_duration_min),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Calories: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} kcal", summary.total_calories),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        ]),
    ];

    Paragraph::new(lines).render(inner, buf);
}

/// Render weekly bar chart
pub fn render_weekly_chart(area: Rect, buf: &mut Buffer, summary: &WeeklySummary) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 📈 Workouts per day ")
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    block.render(area, buf);

    let days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let data: Vec<(&str, u64)> = days
        .iter()
        .zip(summary.workouts_by_day.iter())
        .map(|(day, count)| (*day, *count as u64))
        .collect();

    let barchart = BarChart::default()
        .data(&data)
        .bar_width(4)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Green))
        .value_style(Style::default().fg(Color::White).bg(Color::Green));

    barchart.render(inner, buf);
}

/// Text progress bar, `width` cells wide
pub fn progress_bar(percentage: f64, width: usize) -> String {
    let filled = ((percentage.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

/// Render goals panel
pub fn render_goals(
    area: Rect,
    buf: &mut Buffer,
    goals: &[Goal],
    today: NaiveDate,
    selected_index: usize,
    is_selected: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 🎯 Active Goals ")
        .border_style(border_style(is_selected));

    let inner = block.inner(area);
    block.render(area, buf);

    if goals.is_empty() {
        let lines = vec![
            Line::from(Span::styled("No active goals", Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(Span::styled(
                "Create one with 'fittrack goals create'",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        Paragraph::new(lines).render(inner, buf);
        return;
    }

    let items: Vec<ListItem> = goals
        .iter()
        .enumerate()
        .map(|(idx, goal)| {
            let pct = goal.progress_percentage();
            let days = goal.days_remaining(today);
            let (deadline, deadline_style) = if goal.is_overdue(today) {
                ("overdue".to_string(), Style::default().fg(Color::Red))
            } else {
                (format!("{}d left", days), Style::default().fg(Color::Gray))
            };

            let title_style = if is_selected && idx == selected_index {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(vec![
                Line::from(Span::styled(goal.title.clone(), title_style)),
                Line::from(vec![
                    Span::styled(progress_bar(pct, 12), Style::default().fg(Color::Green)),
                    Span::raw(format!(" {:>3.0}% ", pct)),
                    Span::styled(deadline, deadline_style),
                ]),
            ])
        })
        .collect();

    List::new(items).render(inner, buf);
}

/// Render recent workouts list
pub fn render_recent_workouts(
    area: Rect,
    buf: &mut Buffer,
    workouts: &[Workout],
    selected_index: usize,
    is_selected: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 🏋 Recent Workouts ")
        .border_style(border_style(is_selected));

    let inner = block.inner(area);
    block.render(area, buf);

    if workouts.is_empty() {
        let empty_text = Paragraph::new("No workouts yet.\nBuild one with 'fittrack workouts build'")
            .style(Style::default().fg(Color::Gray));
        empty_text.render(inner, buf);
        return;
    }

    let items: Vec<ListItem> = workouts
        .iter()
        .enumerate()
        .map(|(idx, workout)| {
            let status_icon = if workout.is_completed() { "✓" } else { "○" };
            let date_str = workout.calendar_date().format("%m/%d").to_string();

            let line_style = if is_selected && idx == selected_index {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            let content = format!(
                "{} {} {:<10} {:>4}min {}",
                status_icon,
                date_str,
                workout.workout_type.to_string(),
                workout.duration_minutes,
                workout.name
            );

            ListItem::new(Line::from(Span::styled(content, line_style)))
        })
        .collect();

    List::new(items).render(inner, buf);
}

/// Render help overlay
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" ❓ Help ")
        .border_style(Style::default().fg(Color::Cyan))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(area);
    block.render(area, buf);

    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Cyan)));

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading("Calendar:"),
        Line::from("  ←/→ h/l   - Previous / next day"),
        Line::from("  ↑/↓ k/j   - Previous / next week"),
        Line::from("  [ ] p/n   - Previous / next month"),
        Line::from("  t         - Jump to today"),
        Line::from("  Enter     - Open day detail"),
        Line::from(""),
        heading("Panels:"),
        Line::from("  Tab       - Next panel"),
        Line::from("  Shift+Tab - Previous panel"),
        Line::from("  ↑/↓ k/j   - Move selection"),
        Line::from("  Space/x   - Toggle task done (day detail)"),
        Line::from(""),
        heading("Other:"),
        Line::from("  r         - Refresh data"),
        Line::from("  ?         - Toggle this help"),
        Line::from("  q         - Quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or ESC to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    Paragraph::new(help_text).render(inner, buf);
}

/// Render status bar at bottom
pub fn render_status_bar(
    area: Rect,
    buf: &mut Buffer,
    user: Option<&User>,
    source: Option<DataSource>,
    loading: bool,
    toast: Option<&Notification>,
) {
    let bar = Style::default().bg(Color::DarkGray);
    let mut spans = Vec::new();

    let who = user
        .map(|u| format!(" 👤 {} ", u.display_name()))
        .unwrap_or_else(|| " 👤 guest ".to_string());
    spans.push(Span::styled(who, bar.fg(Color::White)));

    spans.push(match source {
        Some(DataSource::Server) => Span::styled(" ● live ", bar.fg(Color::Green)),
        Some(DataSource::Placeholder) => Span::styled(" ● offline ", bar.fg(Color::Yellow)),
        None => Span::styled(" ○ no data ", bar.fg(Color::Gray)),
    });

    if loading {
        spans.push(Span::styled(" ⟳ loading ", bar.fg(Color::Cyan)));
    }

    if let Some(toast) = toast {
        let color = match toast.level {
            Level::Info => Color::White,
            Level::Success => Color::Green,
            Level::Warning => Color::Yellow,
            Level::Error => Color::Red,
        };
        // Multi-line validation messages are shown on one line
        let message = toast.message.replace('\n', "; ");
        spans.push(Span::styled(format!(" {} ", message), bar.fg(color)));
    }

    spans.push(Span::styled(" Press ? for help ", bar.fg(Color::Gray)));

    Paragraph::new(Line::from(spans)).style(bar).render(area, buf);
}
