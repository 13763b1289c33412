//! Screens as text. Every function here is pure: view state in, string out.

use std::fmt::Write as _;

use weatherly_core::{Shown, ViewState};

use crate::theme::{Palette, Role};

const APP_NAME: &str = "Weatherly";
const ATTRIBUTION: &str = "Data provided by OpenWeatherMap.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Forecast,
    Settings,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Screen::Home, Screen::Forecast, Screen::Settings];

    pub fn label(&self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Forecast => "Forecast",
            Screen::Settings => "Settings",
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Full screen: top bar, body, navigation bar.
pub fn screen(screen: Screen, state: &ViewState, dark_mode: bool, palette: &Palette) -> String {
    let body = match screen {
        Screen::Home => home(state, palette),
        Screen::Forecast => forecast(state, palette),
        Screen::Settings => settings(dark_mode, palette),
    };

    format!(
        "{}\n\n{}\n{}\n",
        top_bar(screen, state, palette),
        body,
        bottom_bar(screen, palette)
    )
}

pub fn top_bar(screen: Screen, state: &ViewState, palette: &Palette) -> String {
    let title = match (screen, &state.shown) {
        (Screen::Settings, _) => "Settings",
        (_, Some(shown)) => shown.current.city.as_str(),
        (_, None) => APP_NAME,
    };
    palette.paint(title, Role::Title)
}

pub fn bottom_bar(current: Screen, palette: &Palette) -> String {
    Screen::ALL
        .iter()
        .map(|s| {
            if *s == current {
                palette.paint(&format!("[{s}]"), Role::Primary)
            } else {
                palette.paint(&format!(" {s} "), Role::Muted)
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn home(state: &ViewState, palette: &Palette) -> String {
    let mut out = status_lines(state, palette);

    let Some(shown) = &state.shown else {
        if !state.is_refreshing() && state.notice.is_some() {
            out.push_str(&palette.paint("Nothing to show yet. Try searching for a city.", Role::Muted));
        } else {
            out.push_str(&palette.paint("Loading weather…", Role::Muted));
        }
        out.push('\n');
        return out;
    };

    out.push_str(&primary_stats(shown, palette));
    out.push('\n');
    out.push_str(&secondary_stats(shown, palette));
    out
}

fn status_lines(state: &ViewState, palette: &Palette) -> String {
    let mut out = String::new();
    if state.is_refreshing() {
        let _ = writeln!(out, "{}", palette.paint("↻ Refreshing…", Role::Primary));
    }
    if let Some(notice) = &state.notice {
        let _ = writeln!(out, "{}", palette.paint(notice, Role::Error));
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

fn primary_stats(shown: &Shown, palette: &Palette) -> String {
    let current = &shown.current;
    let display = &shown.display;
    let condition = current
        .primary_condition()
        .map(|c| c.main.as_str())
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  {}",
        display.icon.glyph(),
        palette.paint("Today", Role::Title)
    );
    if let Some(today) = &display.today {
        let _ = writeln!(out, "    {}", palette.paint(today, Role::Secondary));
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "   {}",
        palette.paint(&format!("{}°C", round(current.temperature.current)), Role::Primary)
    );
    let _ = writeln!(
        out,
        "{}  {}° | {}°",
        condition,
        round(current.temperature.min),
        round(current.temperature.max)
    );
    let _ = writeln!(
        out,
        "Sunrise {} • Sunset {}",
        display.sunrise_hhmm(),
        display.sunset_hhmm()
    );
    out
}

fn secondary_stats(shown: &Shown, palette: &Palette) -> String {
    let current = &shown.current;

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Feels like {}°    Wind direction {}°",
        round(current.temperature.feels_like),
        current.wind.direction
    );

    let rows = [
        ("Humidity", format!("{}%", current.humidity)),
        ("Wind speed", format!("{}m/s", current.wind.speed as i64)),
        ("Pressure", format!("{}hPa", current.pressure)),
        ("Visibility", format!("{}km", current.visibility / 1000)),
        ("Updated on", shown.display.updated_on_hhmm()),
    ];
    for (label, value) in rows {
        let _ = writeln!(
            out,
            "{}{:>10}",
            palette.paint(&format!("{label:<12}"), Role::Secondary),
            value
        );
    }
    out
}

pub fn forecast(state: &ViewState, palette: &Palette) -> String {
    let mut out = status_lines(state, palette);

    let Some(shown) = &state.shown else {
        out.push_str(&palette.paint("Loading forecast…", Role::Muted));
        out.push('\n');
        return out;
    };

    let _ = writeln!(out, "{}\n", palette.paint("5 Day forecast", Role::Title));

    if shown.display.days.is_empty() {
        let _ = writeln!(out, "{}", palette.paint("No forecast available.", Role::Muted));
        return out;
    }

    for day in &shown.display.days {
        let Some(entry) = shown.forecast.entries.get(day.index) else {
            continue;
        };
        let _ = writeln!(
            out,
            "{}  {:<10} {}",
            day.icon.glyph(),
            palette.paint(&day.weekday, Role::Primary),
            palette.paint(&format!("{}°C", round(entry.temperature.current)), Role::Tertiary)
        );
        let _ = writeln!(
            out,
            "    feels {}°  humidity {}%  wind {}° {}m/s\n",
            round(entry.temperature.feels_like),
            entry.humidity,
            entry.wind.direction,
            entry.wind.speed as i64
        );
    }
    out
}

pub fn settings(dark_mode: bool, palette: &Palette) -> String {
    let toggle = if dark_mode { "[on ]" } else { "[off]" };

    let mut out = String::new();
    let _ = writeln!(out, "Dark Mode   {}", palette.paint(toggle, Role::Tertiary));
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", palette.paint(APP_NAME, Role::Title));
    let _ = writeln!(out, "{}", palette.paint(ATTRIBUTION, Role::Muted));
    out
}

fn round(value: f64) -> i64 {
    value.round() as i64
}
