//! Dashboard view model.
//!
//! [`Dashboard`] holds the fixed output slots of the dashboard: the current
//! conditions fields, the forecast and history containers, the loader and the
//! error banner. Front-ends draw whatever the slots currently contain.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{ForecastEntry, WeatherSnapshot};

/// The backend returns one forecast sample every 3 hours; every 8th sample
/// lands on the same time of day.
pub const FORECAST_STRIDE: usize = 8;

const DATE_FORMAT: &str = "%-m/%-d/%Y";
const DT_TXT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}

/// Round half up to a whole number, the way `Math.round` does.
pub fn round_temp(value: f64) -> i64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_dt_txt(dt_txt: &str) -> String {
    NaiveDateTime::parse_from_str(dt_txt, DT_TXT_FORMAT)
        .map(|dt| format_date(dt.date()))
        .unwrap_or_else(|_| dt_txt.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastCard {
    pub date: String,
    pub icon_url: Option<String>,
    pub icon_alt: Option<String>,
    pub temperature: String,
    pub humidity: String,
}

impl ForecastCard {
    fn from_entry(entry: &ForecastEntry) -> Self {
        let condition = entry.weather.first();

        Self {
            date: format_dt_txt(&entry.dt_txt),
            icon_url: condition.map(|c| icon_url(&c.icon)),
            icon_alt: condition.map(|c| c.description.clone()),
            temperature: format!("Temp: {} °C", round_temp(entry.main.temp)),
            humidity: format!("Humidity: {}%", entry.main.humidity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryButton {
    pub label: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub text: String,
    pub hidden: bool,
}

impl Default for ErrorBanner {
    fn default() -> Self {
        Self { text: String::new(), hidden: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub city_name_date: String,
    pub temperature: String,
    pub humidity: String,
    pub wind_speed: String,
    pub forecast: Vec<ForecastCard>,
    pub history: Vec<HistoryButton>,
    pub loader_hidden: bool,
    pub error: ErrorBanner,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            city_name_date: String::new(),
            temperature: String::new(),
            humidity: String::new(),
            wind_speed: String::new(),
            forecast: Vec::new(),
            history: Vec::new(),
            loader_hidden: true,
            error: ErrorBanner::default(),
        }
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_current_weather(&mut self, snapshot: &WeatherSnapshot, today: NaiveDate) {
        self.city_name_date = format!("{} ({})", snapshot.name, format_date(today));
        self.temperature = round_temp(snapshot.main.temp).to_string();
        self.humidity = snapshot.main.humidity.to_string();
        self.wind_speed = snapshot.wind.speed.to_string();
    }

    /// Append one card per day. Existing cards are kept; call [`Dashboard::reset`] first.
    pub fn display_forecast(&mut self, entries: &[ForecastEntry]) {
        self.forecast.extend(
            entries
                .iter()
                .step_by(FORECAST_STRIDE)
                .map(ForecastCard::from_entry),
        );
    }

    pub fn reset(&mut self) {
        self.city_name_date.clear();
        self.temperature.clear();
        self.humidity.clear();
        self.wind_speed.clear();
        self.forecast.clear();
    }

    pub fn render_history(&mut self, history: &[String]) {
        self.history = history
            .iter()
            .map(|city| HistoryButton { label: city.clone(), city: city.clone() })
            .collect();
    }

    pub fn show_loader(&mut self) {
        self.loader_hidden = false;
    }

    pub fn hide_loader(&mut self) {
        self.loader_hidden = true;
    }

    pub fn show_error(&mut self, text: &str) {
        self.error.text = text.to_string();
        self.error.hidden = false;
    }

    pub fn hide_error(&mut self) {
        self.error.hidden = true;
    }

    /// Whether the current-conditions slots hold a result.
    pub fn has_weather(&self) -> bool {
        !self.city_name_date.is_empty()
    }
}
