use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use weathervane_core::{
    Config, HttpTransport, OrchestratorState, SystemClock, TemperatureUnit, WeatherOrchestrator,
    units,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathervane", version, about = "Weather orchestrator CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and the city rotation.
    Configure,

    /// Show current weather for a city.
    Show {
        /// City name; defaults to the configured starting city.
        city: Option<String>,

        /// Display temperatures in Fahrenheit.
        #[arg(long)]
        fahrenheit: bool,
    },

    /// Interactively cycle through the configured cities.
    Cycle,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, fahrenheit } => show(city, fahrenheit).await,
            Command::Cycle => cycle().await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("OpenWeather API key:").prompt()?;
    let cities = inquire::Text::new("Cities (comma-separated):")
        .with_default(&config.cities.join(", "))
        .prompt()?;

    config.api_key = Some(api_key.trim().to_string());
    config.cities = cities
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    config.validate()?;
    config.save()?;

    println!("Configuration written to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_orchestrator(config: &Config) -> Result<WeatherOrchestrator> {
    WeatherOrchestrator::new(config, Arc::new(SystemClock), Arc::new(HttpTransport::new()))
}

async fn show(city: Option<String>, fahrenheit: bool) -> Result<()> {
    let config = Config::load()?;
    let orchestrator = build_orchestrator(&config)?;

    if fahrenheit {
        orchestrator.set_unit(TemperatureUnit::Fahrenheit);
    }

    let city = city.unwrap_or_else(|| config.starting_city());
    orchestrator.request(&city).await;
    render(&orchestrator);

    Ok(())
}

async fn cycle() -> Result<()> {
    let config = Config::load()?;
    let orchestrator = build_orchestrator(&config)?;

    orchestrator.request(&config.starting_city()).await;
    render(&orchestrator);

    loop {
        let choice = inquire::Select::new(
            "Next:",
            vec!["Refresh", "Next city", "Toggle unit", "Quit"],
        )
        .prompt()?;

        match choice {
            "Refresh" => orchestrator.retry().await,
            "Next city" => orchestrator.select_next_key().await,
            "Toggle unit" => orchestrator.set_unit(orchestrator.unit().toggled()),
            _ => break,
        }

        render(&orchestrator);
    }

    Ok(())
}

fn render(orchestrator: &WeatherOrchestrator) {
    match orchestrator.state() {
        OrchestratorState::Success { record } => {
            let unit = orchestrator.unit();
            let feels_like = units::format(units::convert(record.feels_like_c, unit), unit);

            println!("{}  {}", record.key, orchestrator.formatted_temperature());
            println!("  {}", record.description);
            println!("  feels like {feels_like}");
            println!(
                "  humidity {}%  wind {:.1} m/s  pressure {} hPa",
                record.humidity_pct, record.wind_speed_mps, record.pressure_hpa
            );
            println!("  fetched at {}", record.fetched_at.format("%H:%M:%S UTC"));
        }
        OrchestratorState::Error { message, .. } => println!("{message}"),
        OrchestratorState::Loading { key } => println!("Loading {key}..."),
        OrchestratorState::Idle => println!("{}", units::NOT_AVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_parses_city_and_unit_flag() {
        let cli = Cli::try_parse_from(["weathervane", "show", "London", "--fahrenheit"]).unwrap();
        match cli.command {
            Command::Show { city, fahrenheit } => {
                assert_eq!(city.as_deref(), Some("London"));
                assert!(fahrenheit);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_city_is_optional() {
        let cli = Cli::try_parse_from(["weathervane", "show"]).unwrap();
        assert!(matches!(cli.command, Command::Show { city: None, .. }));
    }
}
