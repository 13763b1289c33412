use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::Units,
    model::{
        Condition, ForecastEntry, ForecastSnapshot, Temperatures, WeatherSnapshot, Wind,
    },
};

use super::{FetchError, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: Units,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            units: Units::Metric,
            http: Client::new(),
        }
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, city: &str) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        tracing::debug!(%url, city, "requesting OpenWeather data");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::CityNotFound(city.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| FetchError::Malformed(format!("{endpoint} response: {e}")))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_current(&self, city: &str) -> Result<WeatherSnapshot, FetchError> {
        let parsed: OwCurrentResponse = self.get("weather", city).await?;

        if parsed.weather.is_empty() {
            return Err(FetchError::Malformed(
                "current conditions contained no weather entries".to_string(),
            ));
        }

        Ok(WeatherSnapshot {
            city: parsed.name,
            conditions: parsed.weather.into_iter().map(Condition::from).collect(),
            temperature: parsed.main.temperatures(),
            humidity: parsed.main.humidity,
            pressure: parsed.main.pressure,
            visibility: parsed.visibility,
            wind: parsed.wind.into(),
            sunrise: parsed.sys.sunrise,
            sunset: parsed.sys.sunset,
            observed_at: parsed.dt,
            timezone: parsed.timezone,
        })
    }

    async fn fetch_forecast(&self, city: &str) -> Result<ForecastSnapshot, FetchError> {
        let parsed: OwForecastResponse = self.get("forecast", city).await?;

        let entries = parsed
            .list
            .into_iter()
            .map(|e| ForecastEntry {
                timestamp: e.dt,
                conditions: e.weather.into_iter().map(Condition::from).collect(),
                temperature: e.main.temperatures(),
                humidity: e.main.humidity,
                pressure: e.main.pressure,
                visibility: e.visibility,
                wind: e.wind.into(),
            })
            .collect();

        Ok(ForecastSnapshot {
            city: parsed.city.name,
            entries,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

impl OwMain {
    fn temperatures(&self) -> Temperatures {
        Temperatures {
            current: self.temp,
            min: self.temp_min,
            max: self.temp_max,
            feels_like: self.feels_like,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    icon: String,
}

impl From<OwWeather> for Condition {
    fn from(w: OwWeather) -> Self {
        Condition {
            main: w.main,
            icon: w.icon,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: u16,
}

impl From<OwWind> for Wind {
    fn from(w: OwWind) -> Self {
        Wind {
            speed: w.speed,
            direction: w.deg,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OwSys {
    sunrise: i64,
    sunset: i64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    timezone: i32,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
    #[serde(default)]
    visibility: u32,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    #[serde(default)]
    visibility: u32,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
