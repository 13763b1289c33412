use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Password, PasswordDisplayMode};
use weatherly_core::{Config, ViewStateController};

use crate::{
    app,
    render::{self, Screen},
    theme::Palette,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "weatherly",
    version,
    about = "Current weather and a 5-day forecast for your city"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse Home, Forecast and Settings interactively (the default).
    App,

    /// Store your OpenWeatherMap API key.
    Configure,

    /// Print current conditions once.
    Show {
        /// City name; defaults to the selected city. Does not change the selection.
        city: Option<String>,
    },

    /// Print the 5-day forecast once.
    Forecast {
        /// City name; defaults to the selected city. Does not change the selection.
        city: Option<String>,
    },

    /// Switch between dark and light colours.
    Theme {
        #[arg(value_enum)]
        mode: ThemeMode,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeMode {
    Dark,
    Light,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::App) {
            Command::App => app::run().await,
            Command::Configure => configure().await,
            Command::Show { city } => print_once(Screen::Home, city).await,
            Command::Forecast { city } => print_once(Screen::Forecast, city).await,
            Command::Theme { mode } => {
                let prefs = app::open_preferences().await?;
                prefs
                    .write_theme(mode == ThemeMode::Dark)
                    .wait()
                    .await
                    .context("Failed to save theme preference")?;
                println!("Dark mode {}.", if mode == ThemeMode::Dark { "on" } else { "off" });
                Ok(())
            }
        }
    }
}

async fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = tokio::task::spawn_blocking(|| {
        Password::new("OpenWeatherMap API key:")
            .with_display_mode(PasswordDisplayMode::Masked)
            .without_confirmation()
            .with_help_message("Get one at https://home.openweathermap.org/api_keys")
            .prompt()
    })
    .await??;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        bail!("API key cannot be empty");
    }

    config.set_api_key(api_key);
    config.save()?;

    println!("Saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn print_once(screen: Screen, city: Option<String>) -> anyhow::Result<()> {
    let provider = app::build_provider()?;
    let prefs = app::open_preferences().await?;

    let city = city
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| prefs.city());
    let dark_mode = prefs.dark_mode();

    let mut controller = ViewStateController::new(provider, prefs);
    controller.refresh(&city).await;
    let state = controller.state();

    if state.is_loading() {
        let notice = state
            .notice
            .unwrap_or_else(|| format!("Couldn't load weather for \"{city}\""));
        bail!("{notice}\nHint: check the city name, your connection and `weatherly configure`.");
    }

    let palette = Palette::for_stdout(dark_mode);
    print!("{}", render::screen(screen, &state, dark_mode, &palette));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["weatherly"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn show_takes_optional_city() {
        let cli = Cli::try_parse_from(["weatherly", "show", "New York"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Show { city: Some(ref c) }) if c == "New York"));

        let cli = Cli::try_parse_from(["weatherly", "forecast"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Forecast { city: None })));
    }

    #[test]
    fn theme_requires_known_mode() {
        let cli = Cli::try_parse_from(["weatherly", "theme", "light"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Theme { mode: ThemeMode::Light })));

        assert!(Cli::try_parse_from(["weatherly", "theme", "sepia"]).is_err());
    }
}
