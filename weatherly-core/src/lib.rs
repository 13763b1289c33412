//! Core library for the `weatherly` weather display.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The weather provider abstraction and its OpenWeatherMap implementation
//! - Snapshot data contracts and the display state derived from them
//! - Persisted, observable user preferences
//! - The view-state controller driving refreshes and fallback
//!
//! It is used by `weatherly-cli`, but any other front end can drive the same
//! controller and render its [`ViewState`].

pub mod config;
pub mod controller;
pub mod display;
pub mod icon;
pub mod model;
pub mod preferences;
pub mod provider;

pub use config::{Config, OpenWeatherConfig, Units};
pub use controller::{
    ControllerHandle, RefreshOutcome, RefreshPhase, Shown, ViewState, ViewStateController,
};
pub use display::{DaySummary, DisplayState};
pub use icon::IconId;
pub use model::{Condition, ForecastEntry, ForecastSnapshot, Temperatures, WeatherSnapshot, Wind};
pub use preferences::{PreferenceError, PreferenceStore, Preferences, WriteTicket};
pub use provider::{FetchError, WeatherProvider, provider_from_config};
