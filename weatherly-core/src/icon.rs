use serde::{Deserialize, Serialize};

/// Artwork families shipped with the app.
///
/// Day and night codes of the same family share one icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconId {
    ClearSky,
    FewClouds,
    ScatteredClouds,
    BrokenClouds,
    ShowerRain,
    Rain,
    Thunderstorm,
    Snow,
    Mist,
}

impl IconId {
    /// Shown for condition codes with no artwork.
    pub const FALLBACK: IconId = IconId::ClearSky;

    pub const fn all() -> &'static [IconId] {
        &[
            IconId::ClearSky,
            IconId::FewClouds,
            IconId::ScatteredClouds,
            IconId::BrokenClouds,
            IconId::ShowerRain,
            IconId::Rain,
            IconId::Thunderstorm,
            IconId::Snow,
            IconId::Mist,
        ]
    }

    /// Map a provider condition code (`"01d"`, `"10n"`, ...) to an icon.
    ///
    /// Unknown codes resolve to [`IconId::FALLBACK`] and are logged.
    pub fn resolve(code: &str) -> IconId {
        Self::lookup(code).unwrap_or_else(|| {
            tracing::warn!(code, "no icon for weather condition code, using fallback");
            Self::FALLBACK
        })
    }

    fn lookup(code: &str) -> Option<IconId> {
        let family = code
            .strip_suffix('d')
            .or_else(|| code.strip_suffix('n'))?;

        let icon = match family {
            "01" => IconId::ClearSky,
            "02" => IconId::FewClouds,
            "03" => IconId::ScatteredClouds,
            "04" => IconId::BrokenClouds,
            "09" => IconId::ShowerRain,
            "10" => IconId::Rain,
            "11" => IconId::Thunderstorm,
            "13" => IconId::Snow,
            "50" => IconId::Mist,
            _ => return None,
        };
        Some(icon)
    }

    /// Asset name of the (day) artwork.
    pub fn asset_name(&self) -> &'static str {
        match self {
            IconId::ClearSky => "01d",
            IconId::FewClouds => "02d",
            IconId::ScatteredClouds => "03d",
            IconId::BrokenClouds => "04d",
            IconId::ShowerRain => "09d",
            IconId::Rain => "10d",
            IconId::Thunderstorm => "11d",
            IconId::Snow => "13d",
            IconId::Mist => "50d",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IconId::ClearSky => "Clear sky",
            IconId::FewClouds => "Few clouds",
            IconId::ScatteredClouds => "Scattered clouds",
            IconId::BrokenClouds => "Broken clouds",
            IconId::ShowerRain => "Shower rain",
            IconId::Rain => "Rain",
            IconId::Thunderstorm => "Thunderstorm",
            IconId::Snow => "Snow",
            IconId::Mist => "Mist",
        }
    }

    /// Terminal rendition of the artwork.
    pub fn glyph(&self) -> &'static str {
        match self {
            IconId::ClearSky => "☀",
            IconId::FewClouds => "🌤",
            IconId::ScatteredClouds => "⛅",
            IconId::BrokenClouds => "☁",
            IconId::ShowerRain => "🌧",
            IconId::Rain => "🌦",
            IconId::Thunderstorm => "⛈",
            IconId::Snow => "❄",
            IconId::Mist => "🌫",
        }
    }
}

impl std::fmt::Display for IconId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAMILIES: [&str; 9] = ["01", "02", "03", "04", "09", "10", "11", "13", "50"];

    #[test]
    fn day_and_night_share_an_icon() {
        for family in FAMILIES {
            let day = IconId::resolve(&format!("{family}d"));
            let night = IconId::resolve(&format!("{family}n"));
            assert_eq!(day, night, "family {family}");
        }
    }

    #[test]
    fn every_family_has_its_own_icon() {
        let resolved: Vec<IconId> = FAMILIES
            .iter()
            .map(|f| IconId::resolve(&format!("{f}d")))
            .collect();
        assert_eq!(resolved, IconId::all());
    }

    #[test]
    fn asset_name_resolves_back_to_same_icon() {
        for icon in IconId::all() {
            assert_eq!(IconId::resolve(icon.asset_name()), *icon);
        }
    }

    #[test]
    fn unknown_codes_fall_back() {
        for code in ["", "01", "99d", "01x", "d", "thunder"] {
            assert_eq!(IconId::resolve(code), IconId::FALLBACK, "code {code:?}");
        }
    }
}
