use anyhow::Context;
use inquire::{Confirm, CustomType, Text};
use weather_core::{Config, Coordinates};

/// Interactive configuration: backend URL and location access.
pub fn run(config: &mut Config) -> anyhow::Result<()> {
    let url = Text::new("Weather backend URL:")
        .with_default(config.backend_url())
        .prompt()
        .context("Failed to read backend URL")?;
    config.set_backend_url(url.trim());

    let enabled = Confirm::new("Allow the dashboard to use your location?")
        .with_default(config.geolocation.enabled)
        .prompt()
        .context("Failed to read location permission")?;

    let position = if enabled {
        let current = config.geolocation.coordinates();

        let mut lat = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number, e.g. 15.36");
        if let Some(pos) = current {
            lat = lat.with_default(pos.latitude);
        }
        let latitude = lat.prompt().context("Failed to read latitude")?;

        let mut lon = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number, e.g. 75.12");
        if let Some(pos) = current {
            lon = lon.with_default(pos.longitude);
        }
        let longitude = lon.prompt().context("Failed to read longitude")?;

        Some(Coordinates::new(latitude, longitude))
    } else {
        None
    };

    config.set_geolocation(enabled, position);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
