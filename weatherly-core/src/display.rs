//! Presentation-ready values derived from weather snapshots.
//!
//! Everything here is a pure function of its inputs: deriving twice from the
//! same snapshots yields identical values.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    icon::IconId,
    model::{ForecastSnapshot, WeatherSnapshot},
};

const CLOCK_FORMAT: &str = "%H:%M";

/// One row of the 5-day view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    /// Position of the source entry in the forecast sequence.
    pub index: usize,
    /// English weekday name, e.g. "Friday".
    pub weekday: String,
    pub icon: IconId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub icon: IconId,
    /// Sunrise in the location's own offset.
    pub sunrise: DateTime<FixedOffset>,
    /// Sunset in the location's own offset.
    pub sunset: DateTime<FixedOffset>,
    /// Observation time in the viewer's zone.
    pub updated_on: DateTime<FixedOffset>,
    /// Weekday of the first forecast entry, if any.
    pub today: Option<String>,
    pub days: Vec<DaySummary>,
}

impl DisplayState {
    pub fn derive(
        current: &WeatherSnapshot,
        forecast: &ForecastSnapshot,
        viewer: FixedOffset,
    ) -> Self {
        let location = location_offset(current.timezone);

        let icon = current
            .primary_condition()
            .map(|c| IconId::resolve(&c.icon))
            .unwrap_or(IconId::FALLBACK);

        let days = forecast
            .daily_indices()
            .map(|index| {
                let entry = &forecast.entries[index];
                DaySummary {
                    index,
                    weekday: weekday_name(entry.timestamp),
                    icon: entry
                        .primary_condition()
                        .map(|c| IconId::resolve(&c.icon))
                        .unwrap_or(IconId::FALLBACK),
                }
            })
            .collect();

        Self {
            icon,
            sunrise: epoch_utc(current.sunrise).with_timezone(&location),
            sunset: epoch_utc(current.sunset).with_timezone(&location),
            updated_on: epoch_utc(current.observed_at).with_timezone(&viewer),
            today: forecast.entries.first().map(|e| weekday_name(e.timestamp)),
            days,
        }
    }

    pub fn sunrise_hhmm(&self) -> String {
        self.sunrise.format(CLOCK_FORMAT).to_string()
    }

    pub fn sunset_hhmm(&self) -> String {
        self.sunset.format(CLOCK_FORMAT).to_string()
    }

    pub fn updated_on_hhmm(&self) -> String {
        self.updated_on.format(CLOCK_FORMAT).to_string()
    }
}

/// Offset of the location, truncated to whole hours.
pub fn location_offset(timezone_secs: i32) -> FixedOffset {
    let hours = timezone_secs / 3600;
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}

/// The offset of the machine we're running on, right now.
pub fn viewer_offset() -> FixedOffset {
    chrono::Local::now().offset().fix()
}

/// English weekday name of an epoch timestamp, evaluated in UTC.
pub fn weekday_name(epoch_secs: i64) -> String {
    epoch_utc(epoch_secs).format("%A").to_string()
}

fn epoch_utc(epoch_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch_secs, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{athens, condition, forecast};

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    #[test]
    fn sunrise_rendered_in_location_offset() {
        let state = DisplayState::derive(&athens(), &forecast(40), utc());

        // 1_700_000_000 is 22:13:20 UTC, 01:13 in UTC+3.
        assert_eq!(state.sunrise_hhmm(), "01:13");
        assert_eq!(state.sunrise.offset().local_minus_utc(), 10_800);
        assert_eq!(state.sunset_hhmm(), "11:13");
    }

    #[test]
    fn updated_on_uses_viewer_zone() {
        let snapshot = athens();
        let in_utc = DisplayState::derive(&snapshot, &forecast(0), utc());
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        let in_east = DisplayState::derive(&snapshot, &forecast(0), east);

        // 1_700_020_000 is 03:46:40 UTC.
        assert_eq!(in_utc.updated_on_hhmm(), "03:46");
        assert_eq!(in_east.updated_on_hhmm(), "05:46");
        assert_eq!(in_utc.updated_on, in_east.updated_on);
    }

    #[test]
    fn half_hour_zones_truncate_to_whole_hours() {
        let mut snapshot = athens();
        snapshot.timezone = 19_800; // UTC+5:30

        let state = DisplayState::derive(&snapshot, &forecast(0), utc());
        assert_eq!(state.sunrise.offset().local_minus_utc(), 5 * 3600);
    }

    #[test]
    fn derivation_is_idempotent() {
        let current = athens();
        let fc = forecast(40);

        let first = DisplayState::derive(&current, &fc, utc());
        let second = DisplayState::derive(&current, &fc, utc());
        assert_eq!(first, second);
    }

    #[test]
    fn days_follow_daily_indices() {
        let state = DisplayState::derive(&athens(), &forecast(40), utc());

        let indices: Vec<usize> = state.days.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![0, 8, 16, 24, 32]);

        // Entries start at 1_700_006_400 (Wed 2023-11-15 00:00 UTC), one day apart.
        let names: Vec<&str> = state.days.iter().map(|d| d.weekday.as_str()).collect();
        assert_eq!(
            names,
            vec!["Wednesday", "Thursday", "Friday", "Saturday", "Sunday"]
        );
        assert_eq!(state.today.as_deref(), Some("Wednesday"));
    }

    #[test]
    fn short_forecast_yields_fewer_days() {
        let state = DisplayState::derive(&athens(), &forecast(9), utc());
        assert_eq!(state.days.len(), 2);

        let empty = DisplayState::derive(&athens(), &ForecastSnapshot::default(), utc());
        assert!(empty.days.is_empty());
        assert_eq!(empty.today, None);
    }

    #[test]
    fn icon_resolved_from_first_condition() {
        let mut snapshot = athens();
        snapshot.conditions = vec![condition("Rain", "10n"), condition("Mist", "50d")];

        let state = DisplayState::derive(&snapshot, &forecast(0), utc());
        assert_eq!(state.icon, IconId::Rain);
    }

    #[test]
    fn missing_conditions_use_fallback_icon() {
        let mut snapshot = athens();
        snapshot.conditions.clear();

        let state = DisplayState::derive(&snapshot, &forecast(0), utc());
        assert_eq!(state.icon, IconId::FALLBACK);
    }

    #[test]
    fn weekday_of_known_timestamp() {
        assert_eq!(weekday_name(1_700_000_000), "Tuesday");
        assert_eq!(weekday_name(0), "Thursday");
    }
}
