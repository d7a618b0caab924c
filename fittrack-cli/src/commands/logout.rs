use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::AppContext;

#[derive(Args)]
pub struct LogoutCommand {}

impl LogoutCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        if !ctx.auth.is_authenticated().await {
            println!("You are not logged in.");
            return Ok(());
        }

        ctx.auth.logout().await?;

        println!("{} Logged out successfully!", "✓".green());

        Ok(())
    }
}
