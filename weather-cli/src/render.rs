//! Plain-text drawing of the dashboard.

use std::fmt;

use weather_core::Dashboard;

/// Terminal rendering of a [`Dashboard`].
pub struct Screen<'a>(pub &'a Dashboard);

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;

        if !view.loader_hidden {
            writeln!(f, "Loading...")?;
        }

        if !view.error.hidden {
            writeln!(f, "{}", view.error.text)?;
        }

        if view.has_weather() {
            writeln!(f, "{}", view.city_name_date)?;
            writeln!(f, "  Temp: {} °C", view.temperature)?;
            writeln!(f, "  Wind: {} m/s", view.wind_speed)?;
            writeln!(f, "  Humidity: {}%", view.humidity)?;
        }

        if !view.forecast.is_empty() {
            writeln!(f)?;
            writeln!(f, "Forecast")?;
            for card in &view.forecast {
                let condition = card.icon_alt.as_deref().unwrap_or("-");
                writeln!(
                    f,
                    "  {:<10}  {:<20}  {:<14}  {}",
                    card.date, condition, card.temperature, card.humidity
                )?;
            }
        }

        if !view.history.is_empty() {
            writeln!(f)?;
            let buttons: Vec<String> = view
                .history
                .iter()
                .map(|b| format!("[{}]", b.label))
                .collect();
            writeln!(f, "Recent: {}", buttons.join(" "))?;
        }

        Ok(())
    }
}
