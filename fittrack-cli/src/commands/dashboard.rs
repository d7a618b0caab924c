use anyhow::Result;
use clap::Args;
use std::time::Duration;

use super::AppContext;
use crate::dashboard::DashboardLoader;
use crate::notifications::NotificationCenter;
use crate::ui::Dashboard;

#[derive(Args)]
pub struct DashboardCommand {}

impl DashboardCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        ctx.auth.require_auth().await?;

        let user = ctx.auth.current_user().await?;
        let loader = DashboardLoader::new(
            ctx.client().clone(),
            ctx.config.dashboard.offline_fallback,
            ctx.config.dashboard.recent_workouts,
        );
        let notifications =
            NotificationCenter::new(chrono::Duration::seconds(ctx.config.ui.toast_seconds as i64));

        let mut dashboard = Dashboard::new(
            ctx.auth.clone(),
            loader,
            user,
            AppContext::today(),
            notifications,
            Duration::from_millis(ctx.config.ui.tick_ms),
        )?;
        // Terminal is restored when the dashboard is dropped
        dashboard.run().await
    }
}
