//! Request orchestration for the dashboard.
//!
//! Every lookup follows the same sequence: hide the error banner, clear the
//! previous result, show the loader, issue one backend request, render the
//! result and record the city in history. Any failure ends in a fixed
//! user-facing message. The loader is hidden again whatever the outcome.

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::{
    backend::{FetchError, WeatherBackend},
    geolocation::Geolocator,
    history::HistoryStore,
    model::Coordinates,
    storage::{KeyValueStore, StorageError},
    view::Dashboard,
};

pub const CITY_NOT_FOUND_MESSAGE: &str =
    "Sorry, the city could not be found. Please check your spelling and try again.";

pub const LOCATION_FAILED_MESSAGE: &str =
    "Could not fetch weather for your location. Please try searching for a city manually.";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to record search history: {0}")]
    History(#[from] StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOutcome {
    Displayed,
    Failed,
}

#[derive(Debug, Clone, Copy)]
enum Lookup<'a> {
    City(&'a str),
    Coords(Coordinates),
}

impl Lookup<'_> {
    fn failure_message(&self) -> &'static str {
        match self {
            Lookup::City(_) => CITY_NOT_FOUND_MESSAGE,
            Lookup::Coords(_) => LOCATION_FAILED_MESSAGE,
        }
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug)]
pub struct DashboardApp<B, S> {
    backend: B,
    history: HistoryStore<S>,
    view: Dashboard,
    today: fn() -> NaiveDate,
}

impl<B: WeatherBackend, S: KeyValueStore> DashboardApp<B, S> {
    pub fn new(backend: B, store: S) -> Self {
        Self {
            backend,
            history: HistoryStore::new(store),
            view: Dashboard::new(),
            today: local_today,
        }
    }

    /// Replace the source of "today" shown next to the city name.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn view(&self) -> &Dashboard {
        &self.view
    }

    /// Rebuild the history buttons from storage.
    pub fn render_history(&mut self) {
        let history = self.history.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to read search history: {}", e);
            Vec::new()
        });
        self.view.render_history(&history);
    }

    pub fn clear_history(&mut self) -> Result<(), StorageError> {
        self.history.clear()?;
        self.view.render_history(&[]);
        Ok(())
    }

    /// Initial page load: show saved history, then try the user's position once.
    ///
    /// Returns `None` when no position was available; manual search keeps working.
    pub async fn start<G>(&mut self, locator: &G) -> Option<LookupOutcome>
    where
        G: Geolocator + ?Sized,
    {
        self.render_history();

        match locator.current_position().await {
            Ok(pos) => {
                tracing::info!(
                    "User location found: lat={} lon={}",
                    pos.latitude,
                    pos.longitude
                );
                Some(self.fetch_weather_by_coords(pos.latitude, pos.longitude).await)
            }
            Err(e) => {
                tracing::info!("Skipping location lookup: {}", e);
                None
            }
        }
    }

    /// Search form submission. Blank input is ignored.
    pub async fn submit_search(&mut self, input: &str) -> Option<LookupOutcome> {
        let city = input.trim();
        if city.is_empty() {
            tracing::debug!("Input is empty, nothing to search for");
            return None;
        }

        tracing::debug!("User searched for: {:?}", city);
        Some(self.fetch_weather(city).await)
    }

    /// A click on one of the history buttons.
    pub async fn select_history(&mut self, city: &str) -> LookupOutcome {
        self.fetch_weather(city).await
    }

    pub async fn fetch_weather(&mut self, city: &str) -> LookupOutcome {
        self.run_lookup(Lookup::City(city)).await
    }

    pub async fn fetch_weather_by_coords(&mut self, lat: f64, lon: f64) -> LookupOutcome {
        self.run_lookup(Lookup::Coords(Coordinates::new(lat, lon))).await
    }

    async fn run_lookup(&mut self, lookup: Lookup<'_>) -> LookupOutcome {
        self.view.hide_error();
        self.view.reset();
        self.view.show_loader();

        let outcome = match self.try_lookup(lookup).await {
            Ok(()) => LookupOutcome::Displayed,
            Err(e) => {
                tracing::error!("Failed to fetch weather data: {}", e);
                self.view.show_error(lookup.failure_message());
                LookupOutcome::Failed
            }
        };

        self.view.hide_loader();
        outcome
    }

    async fn try_lookup(&mut self, lookup: Lookup<'_>) -> Result<(), LookupError> {
        let payload = match lookup {
            Lookup::City(city) => self.backend.by_city(city).await?,
            Lookup::Coords(coords) => self.backend.by_coords(coords).await?,
        };

        self.view
            .display_current_weather(&payload.current_weather, (self.today)());
        self.view.display_forecast(&payload.forecast.list);

        let history = self.history.save_city(&payload.current_weather.name)?;
        self.view.render_history(&history);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::HttpBackend,
        geolocation::ConfiguredLocator,
        history::HISTORY_KEY,
        model::{
            Condition, Forecast, ForecastEntry, ForecastMain, SnapshotMain, WeatherPayload,
            WeatherSnapshot, Wind,
        },
        storage::{FileStore, MemoryStore, ReadOnlyStore},
    };
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Answers every request with the same canned result and records what was asked.
    #[derive(Debug)]
    struct FakeBackend {
        reply: Option<WeatherPayload>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn ok(name: &str) -> Self {
            Self { reply: Some(payload(name)), calls: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { reply: None, calls: Mutex::new(Vec::new()) }
        }

        fn respond(&self, call: String) -> Result<WeatherPayload, FetchError> {
            self.calls.lock().expect("calls lock").push(call);
            self.reply.clone().ok_or_else(|| FetchError::Backend {
                status: StatusCode::NOT_FOUND,
                message: "city not found".to_string(),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl WeatherBackend for FakeBackend {
        async fn by_city(&self, city: &str) -> Result<WeatherPayload, FetchError> {
            self.respond(format!("city:{city}"))
        }

        async fn by_coords(&self, coords: Coordinates) -> Result<WeatherPayload, FetchError> {
            self.respond(format!("coords:{},{}", coords.latitude, coords.longitude))
        }
    }

    fn payload(name: &str) -> WeatherPayload {
        let list = (0..24)
            .map(|i| ForecastEntry {
                dt_txt: format!("2024-05-{:02} {:02}:00:00", 1 + i * 3 / 24, i * 3 % 24),
                weather: vec![Condition {
                    icon: "01d".to_string(),
                    description: "clear sky".to_string(),
                }],
                main: ForecastMain { temp: 25.0, humidity: 50 },
            })
            .collect();

        WeatherPayload {
            current_weather: WeatherSnapshot {
                name: name.to_string(),
                main: SnapshotMain { temp: 18.7, humidity: 64 },
                wind: Wind { speed: 2.57 },
            },
            forecast: Forecast { list },
        }
    }

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date")
    }

    fn app(backend: FakeBackend) -> DashboardApp<FakeBackend, MemoryStore> {
        DashboardApp::new(backend, MemoryStore::new()).with_clock(fixed_today)
    }

    #[tokio::test]
    async fn successful_lookup_renders_and_records_history() {
        let mut app = app(FakeBackend::ok("Paris"));

        let outcome = app.fetch_weather("paris").await;

        assert_eq!(outcome, LookupOutcome::Displayed);
        let view = app.view();
        assert_eq!(view.city_name_date, "Paris (5/1/2024)");
        assert_eq!(view.temperature, "19");
        assert_eq!(view.humidity, "64");
        assert_eq!(view.wind_speed, "2.57");
        assert_eq!(view.forecast.len(), 3);
        assert!(view.loader_hidden);
        assert!(view.error.hidden);
        // The backend's canonical name is stored, not the typed query.
        assert_eq!(view.history[0].city, "Paris");
    }

    #[tokio::test]
    async fn repeated_lookup_does_not_duplicate_forecast() {
        let mut app = app(FakeBackend::ok("Paris"));

        app.fetch_weather("Paris").await;
        app.fetch_weather("Paris").await;

        assert_eq!(app.view().forecast.len(), 3);
        assert_eq!(app.view().history.len(), 1);
    }

    #[tokio::test]
    async fn failed_city_lookup_shows_manual_search_message() {
        let mut app = app(FakeBackend::failing());

        let outcome = app.fetch_weather("Atlantis").await;

        assert_eq!(outcome, LookupOutcome::Failed);
        let view = app.view();
        assert!(!view.error.hidden);
        assert_eq!(view.error.text, CITY_NOT_FOUND_MESSAGE);
        assert!(view.loader_hidden);
        assert!(!view.has_weather());
        assert!(view.history.is_empty());
    }

    #[tokio::test]
    async fn failed_coords_lookup_shows_location_message() {
        let mut app = app(FakeBackend::failing());

        let outcome = app.fetch_weather_by_coords(1.0, 2.0).await;

        assert_eq!(outcome, LookupOutcome::Failed);
        assert_eq!(app.view().error.text, LOCATION_FAILED_MESSAGE);
        assert!(app.view().loader_hidden);
    }

    #[tokio::test]
    async fn failure_clears_previous_result() {
        let mut app = app(FakeBackend::ok("Paris"));
        app.fetch_weather("Paris").await;
        app.backend.reply = None;

        app.fetch_weather("Atlantis").await;

        assert!(!app.view().has_weather());
        assert!(app.view().forecast.is_empty());
        // History survives a failed lookup.
        assert_eq!(app.view().history.len(), 1);
    }

    #[tokio::test]
    async fn success_after_failure_hides_error() {
        let mut app = app(FakeBackend::failing());
        app.fetch_weather("Atlantis").await;
        app.backend.reply = Some(payload("Lima"));

        app.fetch_weather("Lima").await;

        assert!(app.view().error.hidden);
        assert!(app.view().has_weather());
    }

    #[tokio::test]
    async fn blank_search_is_ignored() {
        let mut app = app(FakeBackend::ok("Paris"));

        assert_eq!(app.submit_search("   ").await, None);
        assert!(app.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn search_input_is_trimmed() {
        let mut app = app(FakeBackend::ok("Rome"));

        let outcome = app.submit_search("  Rome \n").await;

        assert_eq!(outcome, Some(LookupOutcome::Displayed));
        assert_eq!(app.backend.calls(), vec!["city:Rome".to_string()]);
    }

    #[tokio::test]
    async fn history_click_searches_that_city() {
        let mut app = app(FakeBackend::ok("Oslo"));

        app.select_history("Oslo").await;

        assert_eq!(app.backend.calls(), vec!["city:Oslo".to_string()]);
    }

    #[tokio::test]
    async fn start_renders_saved_history() {
        let mut store = MemoryStore::new();
        store
            .set_item(HISTORY_KEY, r#"["Lima","Oslo"]"#.to_string())
            .expect("seed history");
        let mut app = DashboardApp::new(FakeBackend::ok("Paris"), store).with_clock(fixed_today);

        let outcome = app.start(&ConfiguredLocator::unavailable()).await;

        assert_eq!(outcome, None);
        let cities: Vec<_> = app.view().history.iter().map(|b| b.city.as_str()).collect();
        assert_eq!(cities, ["Lima", "Oslo"]);
    }

    #[tokio::test]
    async fn start_with_position_looks_up_coordinates() {
        let mut app = app(FakeBackend::ok("Hubli"));
        let locator = ConfiguredLocator::fixed(Coordinates::new(15.36, 75.12));

        let outcome = app.start(&locator).await;

        assert_eq!(outcome, Some(LookupOutcome::Displayed));
        assert_eq!(app.backend.calls(), vec!["coords:15.36,75.12".to_string()]);
        assert_eq!(app.view().history[0].city, "Hubli");
    }

    #[tokio::test]
    async fn denied_geolocation_leaves_manual_search_working() {
        let mut app = app(FakeBackend::ok("Paris"));
        let locator = ConfiguredLocator::new(false, Some(Coordinates::new(1.0, 2.0)));

        assert_eq!(app.start(&locator).await, None);
        assert!(app.view().loader_hidden);
        assert!(app.view().error.hidden);
        assert!(app.backend.calls().is_empty());

        let outcome = app.submit_search("Paris").await;
        assert_eq!(outcome, Some(LookupOutcome::Displayed));
        assert!(app.view().has_weather());
    }

    #[tokio::test]
    async fn history_write_failure_reports_error_but_keeps_weather() {
        let mut app = DashboardApp::new(FakeBackend::ok("Paris"), ReadOnlyStore::default())
            .with_clock(fixed_today);

        let outcome = app.fetch_weather("Paris").await;

        assert_eq!(outcome, LookupOutcome::Failed);
        let view = app.view();
        assert!(view.has_weather());
        assert_eq!(view.forecast.len(), 3);
        assert!(!view.error.hidden);
        assert_eq!(view.error.text, CITY_NOT_FOUND_MESSAGE);
        assert!(view.loader_hidden);
    }

    #[tokio::test]
    async fn corrupt_storage_file_starts_with_empty_history() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ not json").expect("write storage");
        let mut app = DashboardApp::new(FakeBackend::ok("Paris"), FileStore::new(&path))
            .with_clock(fixed_today);

        let outcome = app.start(&ConfiguredLocator::unavailable()).await;

        assert_eq!(outcome, None);
        assert!(app.view().history.is_empty());
        assert!(app.view().error.hidden);
        assert!(app.view().loader_hidden);
    }

    #[tokio::test]
    async fn clear_history_empties_buttons() {
        let mut app = app(FakeBackend::ok("Paris"));
        app.fetch_weather("Paris").await;

        app.clear_history().expect("clear");

        assert!(app.view().history.is_empty());
        app.render_history();
        assert!(app.view().history.is_empty());
    }

    #[tokio::test]
    async fn backend_not_found_over_http_shows_error_and_hides_loader() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weather/Atlantis"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({ "error": "city not found" })),
            )
            .mount(&server)
            .await;

        let backend = HttpBackend::new(&server.uri()).expect("backend");
        let mut app = DashboardApp::new(backend, MemoryStore::new()).with_clock(fixed_today);

        let outcome = app.fetch_weather("Atlantis").await;

        assert_eq!(outcome, LookupOutcome::Failed);
        assert!(!app.view().error.hidden);
        assert_eq!(app.view().error.text, CITY_NOT_FOUND_MESSAGE);
        assert!(app.view().loader_hidden);
    }

    #[tokio::test]
    async fn unreachable_backend_is_reported_not_fatal() {
        // Nothing listens on port 9 on loopback in test environments.
        let backend = HttpBackend::new("http://127.0.0.1:9").expect("backend");
        let mut app = DashboardApp::new(backend, MemoryStore::new()).with_clock(fixed_today);

        let outcome = app.fetch_weather_by_coords(0.0, 0.0).await;

        assert_eq!(outcome, LookupOutcome::Failed);
        assert_eq!(app.view().error.text, LOCATION_FAILED_MESSAGE);
        assert!(app.view().loader_hidden);
    }
}
