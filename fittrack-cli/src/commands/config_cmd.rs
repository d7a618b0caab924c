use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::Command;

use super::ConfigSubcommands;
use crate::config::Config;

pub(crate) fn execute(subcmd: &ConfigSubcommands, path: &Path) -> Result<()> {
    match subcmd {
        ConfigSubcommands::Show => show_config(path),
        ConfigSubcommands::Edit => edit_config(path),
        ConfigSubcommands::Init { force } => init_config(path, *force),
    }
}

fn show_config(path: &Path) -> Result<()> {
    let config = Config::load_from(path)?;
    let config_str = toml::to_string_pretty(&config)?;

    println!("Current Configuration ({})", path.display());
    println!("────────────────────────────────");
    println!();
    println!("{}", config_str);
    println!("Data directory: {}", config.data_dir()?.display());

    Ok(())
}

fn edit_config(path: &Path) -> Result<()> {
    // Ensure config file exists
    if !path.exists() {
        Config::default().save_to(path)?;
    }

    // Open in default editor
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

    let status = Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to launch editor '{}'", editor))?;
    if !status.success() {
        anyhow::bail!("Editor exited with {}", status);
    }

    // Reject edits that no longer parse
    Config::load_from(path).context("Configuration is invalid after editing")?;

    println!("{} Configuration saved!", "✓".green());

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!("Configuration file already exists at: {}", path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    Config::default().save_to(path)?;

    println!("{} Configuration initialized at: {}", "✓".green(), path.display());
    println!();
    println!("You can edit it with: fittrack config edit");

    Ok(())
}
