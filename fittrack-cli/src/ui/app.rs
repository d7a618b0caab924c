use anyhow::Result;
use chrono::{Duration, NaiveDate};
use crossterm::event::KeyCode;

use crate::calendar::{build_month_grid, parse_event_date, CalendarDay, MonthRef};
use crate::dashboard::{DashboardData, DataSource};
use crate::models::CalendarTask;
use crate::notifications::{Notification, NotificationCenter};

/// Application state for the TUI dashboard
pub struct App {
    /// Should the application quit?
    pub should_quit: bool,
    /// Currently selected panel
    pub selected_panel: Panel,
    /// Selected index in the current panel
    pub selected_index: usize,
    /// Show help overlay
    pub show_help: bool,
    pub today: NaiveDate,
    /// Month shown in the calendar panel
    pub month: MonthRef,
    pub selected_date: NaiveDate,
    /// Last dashboard load, if any arrived yet
    pub data: Option<DashboardData>,
    /// Calendar tasks of `month`
    pub tasks: Vec<CalendarTask>,
    /// A request is in flight
    pub loading: bool,
    pub notifications: NotificationCenter,
    /// Toast shown in the status bar this frame
    pub toast: Option<Notification>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Calendar,
    DayDetail,
    Goals,
    RecentWorkouts,
}

/// Work the event loop has to start on behalf of the app
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Refresh,
    LoadMonth(MonthRef),
    SetTaskCompleted { id: String, completed: bool },
}

/// Result of a background request
pub enum Update {
    Dashboard(Result<DashboardData>),
    Month {
        month: MonthRef,
        result: Result<Vec<CalendarTask>>,
    },
    TaskUpdated(Result<CalendarTask>),
}

impl App {
    pub fn new(today: NaiveDate, notifications: NotificationCenter) -> Self {
        Self {
            should_quit: false,
            selected_panel: Panel::Calendar,
            selected_index: 0,
            show_help: false,
            today,
            month: MonthRef::containing(today),
            selected_date: today,
            data: None,
            tasks: Vec::new(),
            loading: false,
            notifications,
            toast: None,
        }
    }

    /// The 42 cells of the visible month
    pub fn calendar_days(&self) -> Vec<CalendarDay<CalendarTask>> {
        build_month_grid(self.month, &self.tasks, self.today, Some(self.selected_date))
    }

    /// Tasks on the selected day, in list order
    pub fn selected_day_tasks(&self) -> Vec<&CalendarTask> {
        self.tasks
            .iter()
            .filter(|t| parse_event_date(&t.date) == Some(self.selected_date))
            .collect()
    }

    /// Drop expired toasts and pick the one to display
    pub fn tick(&mut self) {
        self.toast = self.notifications.active().last().cloned();
    }

    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyCode) -> Option<Action> {
        // Help overlay takes precedence
        if self.show_help {
            match key {
                KeyCode::Char('?') | KeyCode::Esc => self.show_help = false,
                _ => {}
            }
            return None;
        }

        match key {
            // Quit
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                None
            }

            // Help
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }

            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.loading = true;
                Some(Action::Refresh)
            }

            // Month navigation
            KeyCode::Char('n') | KeyCode::Char(']') | KeyCode::PageDown => {
                Some(self.show_month(self.month.next()))
            }
            KeyCode::Char('p') | KeyCode::Char('[') | KeyCode::PageUp => {
                Some(self.show_month(self.month.prev()))
            }
            KeyCode::Char('t') | KeyCode::Char('T') => self.select_date(self.today),

            // Tab to switch panels
            KeyCode::Tab => {
                self.next_panel();
                None
            }

            KeyCode::BackTab => {
                self.prev_panel();
                None
            }

            _ if self.selected_panel == Panel::Calendar => self.handle_calendar_key(key),

            KeyCode::Char(' ') | KeyCode::Char('x') | KeyCode::Enter
                if self.selected_panel == Panel::DayDetail =>
            {
                self.toggle_selected_task()
            }

            // Navigation within panel
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection_up();
                None
            }

            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection_down();
                None
            }

            _ => None,
        }
    }

    fn handle_calendar_key(&mut self, key: KeyCode) -> Option<Action> {
        let step = match key {
            KeyCode::Left | KeyCode::Char('h') => -1,
            KeyCode::Right | KeyCode::Char('l') => 1,
            KeyCode::Up | KeyCode::Char('k') => -7,
            KeyCode::Down | KeyCode::Char('j') => 7,
            KeyCode::Enter => {
                self.selected_panel = Panel::DayDetail;
                self.selected_index = 0;
                return None;
            }
            _ => return None,
        };
        self.select_date(self.selected_date + Duration::days(step))
    }

    /// Select a day, switching month when it lies outside the visible one
    pub fn select_date(&mut self, date: NaiveDate) -> Option<Action> {
        self.selected_date = date;
        if self.selected_panel == Panel::DayDetail {
            self.selected_index = 0;
        }
        if self.month.contains(date) {
            None
        } else {
            Some(self.switch_month(MonthRef::containing(date)))
        }
    }

    /// Show another month; today is selected if it is in it, else the 1st
    pub fn show_month(&mut self, month: MonthRef) -> Action {
        self.selected_date = if month.contains(self.today) {
            self.today
        } else {
            month.first_day()
        };
        self.switch_month(month)
    }

    fn switch_month(&mut self, month: MonthRef) -> Action {
        self.month = month;
        self.tasks.clear();
        self.loading = true;
        Action::LoadMonth(month)
    }

    fn toggle_selected_task(&mut self) -> Option<Action> {
        let task = self.selected_day_tasks().get(self.selected_index).copied()?;
        Some(Action::SetTaskCompleted {
            id: task.id.clone(),
            completed: !task.completed,
        })
    }

    /// Fold a finished request into the state
    pub fn apply(&mut self, update: Update) {
        match update {
            Update::Dashboard(Ok(data)) => {
                self.loading = false;
                if data.source == DataSource::Placeholder {
                    self.notifications
                        .warning("Server unreachable, showing placeholder data");
                }
                if self.month == MonthRef::containing(self.today) {
                    self.tasks = data.month_tasks.clone();
                }
                self.data = Some(data);
            }
            Update::Dashboard(Err(e)) => {
                self.loading = false;
                self.notifications.error(&e);
            }
            Update::Month { month, result } => {
                // Only the month on screen matters
                if month != self.month {
                    tracing::debug!(%month, "Dropping stale calendar response");
                    return;
                }
                self.loading = false;
                match result {
                    Ok(tasks) => self.tasks = tasks,
                    Err(e) => {
                        self.notifications.error(&e);
                    }
                }
            }
            Update::TaskUpdated(Ok(task)) => {
                let message = if task.completed {
                    format!("Marked '{}' as done", task.title)
                } else {
                    format!("Marked '{}' as not done", task.title)
                };
                if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == task.id) {
                    *existing = task;
                }
                self.notifications.success(message);
            }
            Update::TaskUpdated(Err(e)) => {
                self.notifications.error(&e);
            }
        }
    }

    /// Move to next panel
    fn next_panel(&mut self) {
        self.selected_panel = match self.selected_panel {
            Panel::Calendar => Panel::DayDetail,
            Panel::DayDetail => Panel::Goals,
            Panel::Goals => Panel::RecentWorkouts,
            Panel::RecentWorkouts => Panel::Calendar,
        };
        self.selected_index = 0;
    }

    /// Move to previous panel
    fn prev_panel(&mut self) {
        self.selected_panel = match self.selected_panel {
            Panel::Calendar => Panel::RecentWorkouts,
            Panel::DayDetail => Panel::Calendar,
            Panel::Goals => Panel::DayDetail,
            Panel::RecentWorkouts => Panel::Goals,
        };
        self.selected_index = 0;
    }

    /// Move selection up within current panel
    fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    /// Move selection down within current panel
    fn move_selection_down(&mut self) {
        let len = match self.selected_panel {
            Panel::DayDetail => self.selected_day_tasks().len(),
            Panel::Goals => self.data.as_ref().map_or(0, |d| d.active_goals.len()),
            Panel::RecentWorkouts => self.data.as_ref().map_or(0, |d| d.recent_workouts.len()),
            Panel::Calendar => 0,
        };
        let max_index = len.saturating_sub(1);

        if self.selected_index < max_index {
            self.selected_index += 1;
        }
    }
}
