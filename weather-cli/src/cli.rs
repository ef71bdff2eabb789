use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use weather_core::{
    Config, ConfiguredLocator, Coordinates, DashboardApp, FileStore, HttpBackend, KeyValueStore,
    LookupOutcome, MemoryStore,
};

use crate::{configure, interactive, render::Screen};

pub type App = DashboardApp<HttpBackend, Box<dyn KeyValueStore>>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// Base URL of the weather backend; overrides the configured one.
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Keep search history in memory for this run only.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Defaults to `interactive`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the backend URL and location access.
    Configure,

    /// Show weather for a city.
    Show {
        /// City name; several words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        city: Vec<String>,
    },

    /// Show weather for your location.
    Here {
        /// Latitude; falls back to the configured location when absent.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude; falls back to the configured location when absent.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },

    /// List recent searches.
    History {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Search repeatedly, starting from your location when available.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let Cli { backend, ephemeral, command } = self;
        let mut config = Config::load()?;

        match command.unwrap_or(Command::Interactive) {
            Command::Configure => {
                configure::run(&mut config)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Show { city } => {
                let mut app = build_app(backend.as_deref(), ephemeral, &config)?;
                app.render_history();
                let outcome = app.fetch_weather(&city.join(" ")).await;
                print!("{}", Screen(app.view()));
                Ok(exit_code(outcome))
            }
            Command::Here { lat, lon } => {
                let mut app = build_app(backend.as_deref(), ephemeral, &config)?;
                let locator = match (lat, lon) {
                    (Some(lat), Some(lon)) => ConfiguredLocator::fixed(Coordinates::new(lat, lon)),
                    _ => ConfiguredLocator::from_config(&config.geolocation),
                };

                match app.start(&locator).await {
                    Some(outcome) => {
                        print!("{}", Screen(app.view()));
                        Ok(exit_code(outcome))
                    }
                    None => {
                        eprintln!(
                            "Your location is not available.\n\
                             Hint: pass --lat/--lon, run `weather-dashboard configure`, \
                             or search with `weather-dashboard show <city>`."
                        );
                        Ok(ExitCode::FAILURE)
                    }
                }
            }
            Command::History { clear } => {
                let mut app = build_app(backend.as_deref(), ephemeral, &config)?;
                if clear {
                    app.clear_history().context("Failed to clear search history")?;
                    println!("Search history cleared.");
                } else {
                    app.render_history();
                    for button in &app.view().history {
                        println!("{}", button.label);
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
            Command::Interactive => {
                let mut app = build_app(backend.as_deref(), ephemeral, &config)?;
                let locator = ConfiguredLocator::from_config(&config.geolocation);
                interactive::run(&mut app, &locator).await?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn build_app(backend_url: Option<&str>, ephemeral: bool, config: &Config) -> anyhow::Result<App> {
    let url = backend_url.unwrap_or_else(|| config.backend_url());
    let backend = HttpBackend::new(url).context("Failed to set up the weather backend client")?;

    let store: Box<dyn KeyValueStore> = if ephemeral {
        Box::new(MemoryStore::new())
    } else {
        Box::new(FileStore::new(config.storage_file_path()?))
    };

    tracing::debug!("Using weather backend at {}", backend.base_url());
    Ok(DashboardApp::new(backend, store))
}

fn exit_code(outcome: LookupOutcome) -> ExitCode {
    match outcome {
        LookupOutcome::Displayed => ExitCode::SUCCESS,
        LookupOutcome::Failed => ExitCode::FAILURE,
    }
}
