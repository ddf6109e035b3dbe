use std::io::{self, IsTerminal};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, InquireError, Password, PasswordDisplayMode, Text};
use weather_core::{Config, WeatherService};

use crate::{
    menu::{Menu, Outcome},
    render,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for wherever you are")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the weather panel with a refresh/exit menu (default).
    Watch,

    /// Look up the weather once and print it.
    Show {
        /// Print the result as JSON instead of a panel.
        #[arg(long)]
        json: bool,
    },

    /// Store the OpenWeather API key and retry settings.
    Configure,

    /// Print the location of the config file.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Watch) {
            Command::Watch => watch().await,
            Command::Show { json } => show(json).await,
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

async fn watch() -> anyhow::Result<()> {
    let config = Config::load()?;
    let service = WeatherService::from_config(&config)?;

    let clear_screen = io::stdout().is_terminal();
    let outcome = Menu::new(&service, io::stdout(), clear_screen).run(prompt_choice).await?;

    tracing::debug!(?outcome, "menu closed");
    if outcome == Outcome::Cancelled {
        println!();
    }
    Ok(())
}

async fn show(json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let service = WeatherService::from_config(&config)?;

    let weather = service.current().await?;

    if json {
        let out = serde_json::to_string_pretty(&weather).context("Failed to serialize weather")?;
        println!("{out}");
    } else {
        println!("{}", render::weather_panel(&weather));
    }

    Ok(())
}

fn prompt_choice() -> anyhow::Result<Option<String>> {
    match Text::new("Select an option:").prompt() {
        Ok(choice) => Ok(Some(choice)),
        Err(
            InquireError::OperationCanceled
            | InquireError::OperationInterrupted
            | InquireError::NotTTY,
        ) => Ok(None),
        Err(err) => Err(err).context("Failed to read menu choice"),
    }
}

fn configure() -> anyhow::Result<()> {
    // Start from the file only, so an env override never gets written to disk.
    let mut config = Config::load_from(&Config::config_file_path()?)?;

    let has_key = config.api_key().is_some();
    let help = if has_key {
        "Leave empty to keep the current key"
    } else {
        "Get one at openweathermap.org"
    };

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message(help)
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if !api_key.is_empty() {
        config.set_api_key(api_key.to_string());
    } else if !has_key {
        anyhow::bail!("An API key is required");
    }

    config.location.retries = CustomType::<u32>::new("Location lookup attempts:")
        .with_default(config.location.retries)
        .with_error_message("Please enter a whole number")
        .prompt()
        .context("Failed to read retry count")?
        .max(1);

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}
