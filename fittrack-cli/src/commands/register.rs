use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::{Input, Password};

use super::{spinner, AppContext};
use crate::validation::RegisterForm;

#[derive(Args)]
pub struct RegisterCommand {}

impl RegisterCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        println!("FitTrack - Create account");
        println!();

        let username: String = Input::new().with_prompt("Username").interact_text()?;
        let email: String = Input::new().with_prompt("Email").interact_text()?;
        let first_name: String = Input::new()
            .with_prompt("First name (optional)")
            .allow_empty(true)
            .interact_text()?;
        let last_name: String = Input::new()
            .with_prompt("Last name (optional)")
            .allow_empty(true)
            .interact_text()?;
        let password = Password::new().with_prompt("Password").interact()?;
        let confirm_password = Password::new().with_prompt("Confirm password").interact()?;

        let form = RegisterForm {
            username,
            email,
            password,
            confirm_password,
            first_name: Some(first_name),
            last_name: Some(last_name),
        };

        println!();
        let pb = spinner("Creating account...");
        let result = ctx.auth.register(&form).await;
        pb.finish_and_clear();

        let user = result?;
        println!("{} Account created!", "✓".green());
        println!();
        println!("Welcome to FitTrack, {}!", user.display_name().bold());

        Ok(())
    }
}
