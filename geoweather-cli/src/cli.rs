use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use geoweather_core::{
    Config, Coordinates, FetchOrchestrator, StaticLocationSource, StoredPermission, UnitSystem,
};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use std::{process::ExitCode, sync::Arc};

use crate::terminal::{PromptPermissions, TerminalSink};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for where you are")]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the API key, units, locale and location.
    Configure,

    /// Locate, fetch and print the current weather once.
    Show(ShowArgs),

    /// Manage the remembered location permission.
    Permissions {
        #[command(subcommand)]
        action: PermissionsAction,
    },
}

#[derive(Debug, clap::Args)]
pub struct ShowArgs {
    /// Latitude of the location to use instead of the configured one.
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude of the location to use instead of the configured one.
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// OpenWeather API key overriding the configured one.
    #[arg(long)]
    pub api_key: Option<String>,

    /// Unit system sent to the API: metric, imperial or standard.
    #[arg(long, value_parser = parse_units)]
    pub units: Option<UnitSystem>,

    /// Locale used to pick the temperature symbol, e.g. en-US.
    #[arg(long)]
    pub locale: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum PermissionsAction {
    /// Forget the stored answer so the prompt is shown again.
    Reset,
    /// Print the stored answer.
    Status,
}

fn parse_units(value: &str) -> Result<UnitSystem> {
    UnitSystem::try_from(value)
}

impl ShowArgs {
    /// Applies command-line overrides on top of the loaded config.
    fn apply(self, config: &mut Config) {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            config.set_fixed_location(lat, lon);
        }
        if let Some(key) = self.api_key {
            config.set_api_key(key);
        }
        if let Some(units) = self.units {
            config.units = units;
        }
        if let Some(locale) = self.locale {
            config.locale = Some(locale);
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        match self.command {
            Command::Configure => {
                configure()?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show(args) => show(args).await,
            Command::Permissions { action } => {
                permissions(action)?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

async fn show(args: ShowArgs) -> Result<ExitCode> {
    let mut config = Config::load()?;
    args.apply(&mut config);

    let coords = match (config.location.latitude, config.location.longitude) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
        _ => None,
    };

    let orchestrator = FetchOrchestrator::from_config(
        &config,
        Arc::new(StaticLocationSource::new(coords)),
        Arc::new(PromptPermissions::new(config.permission.location)),
        Arc::new(TerminalSink::default()),
    )?;

    let report = orchestrator.run().await;
    tracing::debug!(transitions = ?report.transitions, "run finished");

    Ok(if report.result.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let starting = UnitSystem::all().iter().position(|u| *u == config.units).unwrap_or(0);
    config.units = Select::new("Unit system:", UnitSystem::all().to_vec())
        .with_starting_cursor(starting)
        .prompt()
        .context("Failed to read unit system")?;

    let locale = Text::new("Locale (empty = from environment):")
        .with_default(config.locale.as_deref().unwrap_or(""))
        .prompt()
        .context("Failed to read locale")?;
    config.locale = Some(locale.trim().to_string()).filter(|l| !l.is_empty());

    let latitude = prompt_coordinate("Latitude", config.location.latitude, 90.0)?;
    let longitude = prompt_coordinate("Longitude", config.location.longitude, 180.0)?;
    config.location.latitude = latitude;
    config.location.longitude = longitude;

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());

    Ok(())
}

fn prompt_coordinate(label: &str, current: Option<f64>, bound: f64) -> Result<Option<f64>> {
    let current = current.map(|v| v.to_string()).unwrap_or_default();
    let input = Text::new(&format!("{label} (empty = none):"))
        .with_default(&current)
        .prompt()
        .with_context(|| format!("Failed to read {label}"))?;

    parse_coordinate(&input, bound).with_context(|| format!("Invalid {label}"))
}

fn parse_coordinate(input: &str, bound: f64) -> Result<Option<f64>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let value: f64 = input.parse().with_context(|| format!("'{input}' is not a number"))?;
    if !(-bound..=bound).contains(&value) {
        return Err(anyhow!("{value} is outside -{bound}..={bound}"));
    }

    Ok(Some(value))
}

fn permissions(action: PermissionsAction) -> Result<()> {
    let mut config = Config::load()?;

    match action {
        PermissionsAction::Reset => {
            config.permission.location = StoredPermission::NotAsked;
            config.save()?;
            println!("Location permission reset; you will be asked again.");
        }
        PermissionsAction::Status => {
            println!("Location permission: {:?}", config.permission.location);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_overrides() {
        let cli = Cli::try_parse_from([
            "weather", "show", "--lat", "37.7", "--lon", "-122.4", "--units", "imperial",
        ])
        .expect("arguments should parse");

        let Command::Show(args) = cli.command else {
            panic!("expected show command");
        };
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.location.latitude, Some(37.7));
        assert_eq!(config.location.longitude, Some(-122.4));
        assert_eq!(config.units, UnitSystem::Imperial);
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["weather", "show", "--lat", "1.0"]).is_err());
    }

    #[test]
    fn rejects_unknown_units() {
        assert!(Cli::try_parse_from(["weather", "show", "--units", "kelvin"]).is_err());
    }

    #[test]
    fn coordinate_parsing() {
        assert_eq!(parse_coordinate("", 90.0).unwrap(), None);
        assert_eq!(parse_coordinate(" -33.9 ", 90.0).unwrap(), Some(-33.9));
        assert!(parse_coordinate("91", 90.0).is_err());
        assert!(parse_coordinate("north", 90.0).is_err());
    }
}
