use crossterm::style::{Color, Stylize};
use std::io::IsTerminal;

/// What a piece of text is, so the palette can pick a colour for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Title,
    Primary,
    Secondary,
    Tertiary,
    Muted,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    title: Color,
    primary: Color,
    secondary: Color,
    tertiary: Color,
    muted: Color,
    error: Color,
    colored: bool,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            title: Color::White,
            primary: Color::Rgb { r: 0x9e, g: 0xca, b: 0xff },
            secondary: Color::Rgb { r: 0xbb, g: 0xc7, b: 0xdb },
            tertiary: Color::Rgb { r: 0xd6, g: 0xbe, b: 0xe4 },
            muted: Color::Grey,
            error: Color::Rgb { r: 0xff, g: 0xb4, b: 0xab },
            colored: true,
        }
    }

    pub fn light() -> Self {
        Self {
            title: Color::Black,
            primary: Color::Rgb { r: 0x00, g: 0x61, b: 0xa4 },
            secondary: Color::Rgb { r: 0x53, g: 0x5f, b: 0x70 },
            tertiary: Color::Rgb { r: 0x6b, g: 0x57, b: 0x78 },
            muted: Color::DarkGrey,
            error: Color::Rgb { r: 0xba, g: 0x1a, b: 0x1a },
            colored: true,
        }
    }

    /// No escape codes at all.
    pub fn plain() -> Self {
        Self {
            colored: false,
            ..Self::dark()
        }
    }

    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode { Self::dark() } else { Self::light() }
    }

    /// Like [`Palette::for_mode`], but plain when stdout is not a terminal.
    pub fn for_stdout(dark_mode: bool) -> Self {
        if std::io::stdout().is_terminal() {
            Self::for_mode(dark_mode)
        } else {
            Self::plain()
        }
    }

    pub fn paint(&self, text: &str, role: Role) -> String {
        if !self.colored {
            return text.to_string();
        }

        let color = match role {
            Role::Title => self.title,
            Role::Primary => self.primary,
            Role::Secondary => self.secondary,
            Role::Tertiary => self.tertiary,
            Role::Muted => self.muted,
            Role::Error => self.error,
        };

        match role {
            Role::Title | Role::Primary => text.with(color).bold().to_string(),
            _ => text.with(color).to_string(),
        }
    }
}

/// Best guess at whether the terminal uses a dark background.
///
/// Reads `COLORFGBG` ("fg;bg"); assumes dark when it is absent or unreadable.
pub fn system_prefers_dark() -> bool {
    prefers_dark_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

fn prefers_dark_from_colorfgbg(value: Option<&str>) -> bool {
    let background = value
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok());

    !matches!(background, Some(7 | 9..=15))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colorfgbg_background_decides_theme() {
        assert!(prefers_dark_from_colorfgbg(Some("15;0")));
        assert!(prefers_dark_from_colorfgbg(Some("7;default;8")));
        assert!(!prefers_dark_from_colorfgbg(Some("0;15")));
        assert!(!prefers_dark_from_colorfgbg(Some("0;7")));
    }

    #[test]
    fn unknown_background_defaults_to_dark() {
        assert!(prefers_dark_from_colorfgbg(None));
        assert!(prefers_dark_from_colorfgbg(Some("")));
        assert!(prefers_dark_from_colorfgbg(Some("15;default")));
    }

    #[test]
    fn plain_palette_emits_no_escapes() {
        assert_eq!(Palette::plain().paint("Athens", Role::Title), "Athens");
    }

    #[test]
    fn colored_palette_keeps_text() {
        let painted = Palette::dark().paint("Athens", Role::Primary);
        assert!(painted.contains("Athens"));
    }

    #[test]
    fn modes_pick_different_palettes() {
        assert_ne!(Palette::for_mode(true), Palette::for_mode(false));
    }
}
