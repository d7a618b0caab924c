use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::AppContext;

#[derive(Args)]
pub struct WhoamiCommand {}

impl WhoamiCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let user = match ctx.auth.current_user().await? {
            Some(user) => user,
            None => {
                println!("You are not logged in.");
                println!();
                println!("Use 'fittrack login' to authenticate.");
                return Ok(());
            }
        };

        println!("{} Authenticated as:", "✓".green());
        println!();
        println!("  Name:     {}", user.display_name());
        println!("  Username: {}", user.username);
        println!("  Email:    {}", user.email);
        println!("  User ID:  {}", user.id);
        if let Some(created) = user.created_at {
            println!("  Member since: {}", ctx.format_date(created.date_naive()));
        }

        Ok(())
    }
}
