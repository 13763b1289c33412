use serde::{Deserialize, Serialize};

/// Number of daily summaries built from a forecast.
pub const FORECAST_DAYS: usize = 5;

/// Forecast entries come in 3-hour steps, so eight of them make a day.
pub const SLOTS_PER_DAY: usize = 8;

/// One weather condition as reported by the provider, e.g. `Clouds` / `04d`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub icon: String,
}

/// Temperatures in the configured unit (Celsius by default).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Temperatures {
    pub current: f64,
    pub min: f64,
    pub max: f64,
    pub feels_like: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Wind {
    /// Metres per second.
    pub speed: f64,
    /// Meteorological degrees.
    pub direction: u16,
}

/// Current conditions for one city.
///
/// Replaced wholesale on every successful refresh; never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    /// Non-empty for any snapshot returned by a provider.
    pub conditions: Vec<Condition>,
    pub temperature: Temperatures,
    pub humidity: u8,
    /// hPa.
    pub pressure: u32,
    /// Metres.
    pub visibility: u32,
    pub wind: Wind,
    /// Epoch seconds, UTC.
    pub sunrise: i64,
    /// Epoch seconds, UTC.
    pub sunset: i64,
    /// Epoch seconds, UTC.
    pub observed_at: i64,
    /// Seconds east of UTC.
    pub timezone: i32,
}

impl WeatherSnapshot {
    /// The condition that drives the headline icon and label.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }

    /// A fixed, reproducible stand-in value, handy for previews.
    ///
    /// Fetch failures are reported through `FetchError`, not through this value.
    pub fn placeholder() -> Self {
        Self {
            city: "Error".to_string(),
            conditions: vec![Condition {
                main: "Clear".to_string(),
                icon: "01d".to_string(),
            }],
            temperature: Temperatures::default(),
            humidity: 0,
            pressure: 0,
            visibility: 0,
            wind: Wind::default(),
            sunrise: 0,
            sunset: 0,
            observed_at: 0,
            timezone: 0,
        }
    }
}

/// One 3-hour forecast slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Epoch seconds, UTC.
    pub timestamp: i64,
    pub conditions: Vec<Condition>,
    pub temperature: Temperatures,
    pub humidity: u8,
    pub pressure: u32,
    pub visibility: u32,
    pub wind: Wind,
}

impl ForecastEntry {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastSnapshot {
    pub city: String,
    /// Ordered by time, fixed 3-hour cadence.
    pub entries: Vec<ForecastEntry>,
}

impl ForecastSnapshot {
    /// Indices approximating "same time, N days ahead": `0, 8, 16, 24, 32`.
    ///
    /// Days the sequence is too short to cover are skipped.
    pub fn daily_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..FORECAST_DAYS)
            .map(|day| day * SLOTS_PER_DAY)
            .take_while(|&index| index < self.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn condition(main: &str, icon: &str) -> Condition {
        Condition {
            main: main.to_string(),
            icon: icon.to_string(),
        }
    }

    pub fn athens() -> WeatherSnapshot {
        WeatherSnapshot {
            city: "Athens".to_string(),
            conditions: vec![condition("Clouds", "04d")],
            temperature: Temperatures {
                current: 18.6,
                min: 17.2,
                max: 20.1,
                feels_like: 18.0,
            },
            humidity: 64,
            pressure: 1014,
            visibility: 10_000,
            wind: Wind {
                speed: 3.6,
                direction: 210,
            },
            sunrise: 1_700_000_000,
            sunset: 1_700_036_000,
            observed_at: 1_700_020_000,
            timezone: 10_800,
        }
    }

    pub fn forecast(len: usize) -> ForecastSnapshot {
        let icons = ["01d", "02n", "03d", "04n", "09d", "10n", "11d", "13n", "50d"];
        let entries = (0..len)
            .map(|i| ForecastEntry {
                timestamp: 1_700_006_400 + (i as i64) * 3 * 3600,
                conditions: vec![condition("Clouds", icons[i % icons.len()])],
                temperature: Temperatures {
                    current: 15.0 + i as f64 * 0.1,
                    min: 14.0,
                    max: 16.0,
                    feels_like: 14.5,
                },
                humidity: 70,
                pressure: 1012,
                visibility: 10_000,
                wind: Wind {
                    speed: 2.4,
                    direction: 180,
                },
            })
            .collect();

        ForecastSnapshot {
            city: "Athens".to_string(),
            entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::forecast;
    use super::*;

    #[test]
    fn daily_indices_for_full_forecast() {
        let fc = forecast(40);
        let indices: Vec<usize> = fc.daily_indices().collect();
        assert_eq!(indices, vec![0, 8, 16, 24, 32]);
    }

    #[test]
    fn daily_indices_for_minimal_full_forecast() {
        let fc = forecast(33);
        let indices: Vec<usize> = fc.daily_indices().collect();
        assert_eq!(indices, vec![0, 8, 16, 24, 32]);
    }

    #[test]
    fn daily_indices_skip_missing_days() {
        let fc = forecast(20);
        let indices: Vec<usize> = fc.daily_indices().collect();
        assert_eq!(indices, vec![0, 8, 16]);

        assert_eq!(ForecastSnapshot::default().daily_indices().count(), 0);
    }

    #[test]
    fn placeholder_is_reproducible() {
        assert_eq!(WeatherSnapshot::placeholder(), WeatherSnapshot::placeholder());
        assert_eq!(WeatherSnapshot::placeholder().city, "Error");
    }
}
