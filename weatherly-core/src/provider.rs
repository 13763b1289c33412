use crate::{
    Config, ForecastSnapshot, WeatherSnapshot, config::Units,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;

pub mod openweather;

/// Why a fetch produced no usable data.
///
/// Callers treat every variant the same way; the detail is for logs and notices.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("city not found: {0}")]
    CityNotFound(String),

    #[error("weather service answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed weather payload: {0}")]
    Malformed(String),
}

/// Source of current conditions and 5-day forecasts, keyed by city name.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, FetchError>;

    async fn fetch_forecast(&self, city: &str) -> Result<ForecastSnapshot, FetchError>;
}

/// Construct the weather provider described by the config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
                 Hint: run `weatherly configure` and enter your API key."
        )
    })?;

    let units = config.units().unwrap_or(Units::Metric);
    let provider = match config.base_url() {
        Some(base_url) => OpenWeatherProvider::with_base_url(api_key.to_owned(), base_url),
        None => OpenWeatherProvider::new(api_key.to_owned()),
    }
    .units(units);

    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("No OpenWeather API key configured"));
        assert!(msg.contains("Hint: run `weatherly configure`"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }

    #[test]
    fn fetch_error_messages_name_the_cause() {
        let err = FetchError::CityNotFound("Atlantis".into());
        assert_eq!(err.to_string(), "city not found: Atlantis");

        let err = FetchError::Status {
            status: 401,
            body: "Invalid API key".into(),
        };
        assert!(err.to_string().contains("401"));
    }
}
