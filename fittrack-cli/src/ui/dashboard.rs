use anyhow::{Context, Result};
use chrono::NaiveDate;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use super::app::{Action, App, Panel, Update};
use super::widgets;
use crate::auth::AuthService;
use crate::calendar::month_grid_range;
use crate::dashboard::DashboardLoader;
use crate::lifecycle::TaskScope;
use crate::models::User;
use crate::notifications::NotificationCenter;

/// Dashboard manages the TUI lifecycle
pub struct Dashboard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    app: App,
    auth: AuthService,
    loader: Arc<DashboardLoader>,
    user: Option<User>,
    /// Requests started by this screen; cancelled when it closes
    scope: TaskScope,
    tx: mpsc::UnboundedSender<Update>,
    rx: mpsc::UnboundedReceiver<Update>,
    tick: Duration,
}

impl Dashboard {
    /// Create new dashboard instance
    pub fn new(
        auth: AuthService,
        loader: DashboardLoader,
        user: Option<User>,
        today: NaiveDate,
        notifications: NotificationCenter,
        tick: Duration,
    ) -> Result<Self> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to setup terminal")?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;

        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            app: App::new(today, notifications),
            auth,
            loader: Arc::new(loader),
            user,
            scope: TaskScope::new(),
            tx,
            rx,
            tick,
        })
    }

    /// Run the dashboard event loop
    pub async fn run(&mut self) -> Result<()> {
        self.app.loading = true;
        self.dispatch(Action::Refresh);

        loop {
            while let Ok(update) = self.rx.try_recv() {
                self.app.apply(update);
            }
            self.app.tick();

            let app = &self.app;
            let user = self.user.as_ref();
            self.terminal.draw(|f| ui(f, app, user))?;

            if event::poll(self.tick)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == event::KeyEventKind::Press {
                        if let Some(action) = self.app.handle_key(key.code) {
                            self.dispatch(action);
                        }
                    }
                }
            }

            if self.app.should_quit {
                break;
            }
        }

        let scope = std::mem::take(&mut self.scope);
        tracing::debug!("Closing dashboard with {} request(s) in flight", scope.active());
        scope.shutdown().await;
        Ok(())
    }

    /// Start the request behind `action`; its result comes back as an [`Update`]
    fn dispatch(&mut self, action: Action) {
        let tx = self.tx.clone();
        let auth = self.auth.clone();

        match action {
            Action::Refresh => {
                let purged = auth.client().cache().purge_expired();
                if purged > 0 {
                    tracing::debug!("Dropped {} expired cache entries", purged);
                }
                let loader = self.loader.clone();
                let user = self.user.clone();
                let today = self.app.today;
                self.scope.spawn("dashboard-refresh", async move {
                    let result = loader.load(user, today).await;
                    if let Err(e) = &result {
                        auth.handle_error(e).await;
                    }
                    let _ = tx.send(Update::Dashboard(result));
                });
            }
            Action::LoadMonth(month) => {
                self.scope.spawn("calendar-month", async move {
                    let (first, last) = month_grid_range(month);
                    let result = auth.client().calendar_tasks_between(first, last).await;
                    if let Err(e) = &result {
                        auth.handle_error(e).await;
                    }
                    let _ = tx.send(Update::Month { month, result });
                });
            }
            Action::SetTaskCompleted { id, completed } => {
                self.scope.spawn("task-toggle", async move {
                    let result = auth.client().set_task_completed(&id, completed).await;
                    if let Err(e) = &result {
                        auth.handle_error(e).await;
                    }
                    let _ = tx.send(Update::TaskUpdated(result));
                });
            }
        }
    }

    /// Cleanup terminal on exit
    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )
        .context("Failed to restore terminal")?;
        self.terminal.show_cursor().context("Failed to show cursor")?;

        Ok(())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render the UI
fn ui(f: &mut Frame, app: &App, user: Option<&User>) {
    let size = f.area();

    // Main layout: top area + status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(size);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_chunks[0]);

    // Left column: calendar (top) + selected day (bottom)
    let left_panels = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Min(0)])
        .split(columns[0]);

    // Right column: weekly stats, chart, goals, recent workouts
    let right_panels = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(8),
            Constraint::Percentage(50),
            Constraint::Min(0),
        ])
        .split(columns[1]);

    widgets::render_calendar(
        left_panels[0],
        f.buffer_mut(),
        app.month,
        &app.calendar_days(),
        app.selected_panel == Panel::Calendar,
    );

    widgets::render_day_detail(
        left_panels[1],
        f.buffer_mut(),
        app.selected_date,
        &app.selected_day_tasks(),
        app.selected_index,
        app.selected_panel == Panel::DayDetail,
    );

    let empty = crate::dashboard::WeeklySummary::empty(app.today);
    let summary = app.data.as_ref().map_or(&empty, |d| &d.weekly_summary);
    widgets::render_weekly_summary(right_panels[0], f.buffer_mut(), summary);
    widgets::render_weekly_chart(right_panels[1], f.buffer_mut(), summary);

    widgets::render_goals(
        right_panels[2],
        f.buffer_mut(),
        app.data.as_ref().map(|d| d.active_goals.as_slice()).unwrap_or(&[]),
        app.today,
        app.selected_index,
        app.selected_panel == Panel::Goals,
    );

    widgets::render_recent_workouts(
        right_panels[3],
        f.buffer_mut(),
        app.data.as_ref().map(|d| d.recent_workouts.as_slice()).unwrap_or(&[]),
        app.selected_index,
        app.selected_panel == Panel::RecentWorkouts,
    );

    // Render status bar
    widgets::render_status_bar(
        main_chunks[1],
        f.buffer_mut(),
        user,
        app.data.as_ref().map(|d| d.source),
        app.loading,
        app.toast.as_ref(),
    );

    // Render help overlay if active
    if app.show_help {
        let help_area = centered_rect(60, 80, size);
        widgets::render_help_overlay(help_area, f.buffer_mut());
    }
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
