//! Core library for the `weather-dashboard` client.
//!
//! This crate defines:
//! - Configuration handling
//! - The backend proxy client and geolocation sources
//! - Persistent search history on top of a key-value store
//! - The dashboard view model and the request orchestrator driving it
//!
//! It is used by `weather-dashboard`, but any front-end can drive
//! [`DashboardApp`] and draw its [`Dashboard`].

pub mod app;
pub mod backend;
pub mod config;
pub mod geolocation;
pub mod history;
pub mod model;
pub mod storage;
pub mod view;

pub use app::{DashboardApp, LookupError, LookupOutcome};
pub use backend::{FetchError, HttpBackend, WeatherBackend};
pub use config::Config;
pub use geolocation::{ConfiguredLocator, GeolocationError, Geolocator};
pub use history::HistoryStore;
pub use model::{Coordinates, WeatherPayload};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use view::Dashboard;
