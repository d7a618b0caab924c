use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::{Input, Password};

use super::{spinner, AppContext};
use crate::validation::{LoginForm, ResetPasswordForm};

#[derive(Args)]
pub struct LoginCommand {
    /// Account email (prompted when omitted)
    #[arg(short, long)]
    email: Option<String>,
}

impl LoginCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        println!("FitTrack - Login");
        println!();

        let email = match self.email {
            Some(email) => email,
            None => Input::new().with_prompt("Email").interact_text()?,
        };
        let password = Password::new().with_prompt("Password").interact()?;

        println!();
        let pb = spinner(format!("Logging in as {}...", email));
        let result = ctx.auth.login(&LoginForm { email, password }).await;
        pb.finish_and_clear();

        let user = result?;
        println!("{} Login successful!", "✓".green());
        println!();
        println!("Welcome, {}!", user.display_name().bold());
        println!("Email: {}", user.email);
        println!();
        println!("You can now use FitTrack CLI commands.");

        Ok(())
    }
}

#[derive(Args)]
pub struct ResetPasswordCommand {
    /// Account email (prompted when omitted)
    #[arg(short, long)]
    email: Option<String>,
}

impl ResetPasswordCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let email = match self.email {
            Some(email) => email,
            None => Input::new().with_prompt("Email").interact_text()?,
        };

        let pb = spinner("Requesting password reset...");
        let result = ctx.auth.reset_password(&ResetPasswordForm { email: email.clone() }).await;
        pb.finish_and_clear();
        result?;

        println!(
            "{} If an account exists for {}, a reset link is on its way.",
            "✓".green(),
            email
        );

        Ok(())
    }
}
