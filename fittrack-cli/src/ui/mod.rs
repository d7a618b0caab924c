// Terminal UI module using ratatui

mod app;
mod dashboard;
mod widgets;

pub use app::{Action, App, Panel, Update};
pub use dashboard::Dashboard;
pub use widgets::progress_bar;
