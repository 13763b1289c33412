//! The interactive session: Home, Forecast and Settings with a navigation menu.

use anyhow::{Context, Result};
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use inquire::{InquireError, Select, Text};
use std::{future::Future, io::stdout, sync::Arc, time::Duration};
use weatherly_core::{
    Config, ControllerHandle, PreferenceStore, ViewStateController, WeatherProvider,
    provider_from_config,
};

use crate::{
    render::{self, Screen},
    theme::{self, Palette},
};

/// Upper bound on how long the UI waits for a refresh to land.
const REFRESH_WAIT: Duration = Duration::from_secs(30);

pub fn build_provider() -> Result<Arc<dyn WeatherProvider>> {
    let config = Config::load()?;
    Ok(Arc::from(provider_from_config(&config)?))
}

pub async fn open_preferences() -> Result<PreferenceStore> {
    let path = Config::preferences_file_path()?;
    PreferenceStore::open(&path, theme::system_prefers_dark())
        .await
        .with_context(|| format!("Failed to open preferences: {}", path.display()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Go(Screen),
    Search,
    Refresh,
    ToggleDarkMode,
    Quit,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Go(screen) => write!(f, "{screen}"),
            Action::Search => f.write_str("Search a city"),
            Action::Refresh => f.write_str("Refresh"),
            Action::ToggleDarkMode => f.write_str("Toggle dark mode"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}

fn actions_for(screen: Screen) -> Vec<Action> {
    let mut actions: Vec<Action> = Screen::ALL.iter().copied().map(Action::Go).collect();
    match screen {
        Screen::Home => actions.extend([Action::Search, Action::Refresh]),
        Screen::Forecast => actions.push(Action::Refresh),
        Screen::Settings => actions.push(Action::ToggleDarkMode),
    }
    actions.push(Action::Quit);
    actions
}

pub async fn run() -> Result<()> {
    let provider = build_provider()?;
    let prefs = open_preferences().await?;
    let handle = ViewStateController::new(provider, prefs.clone()).spawn();

    let mut screen = Screen::Home;
    draw(screen, &handle, &prefs)?;
    redraw_until(handle.settled_after(0), screen, &handle, &prefs).await?;

    loop {
        draw(screen, &handle, &prefs)?;

        let Some(action) = prompt_action(screen).await? else {
            break;
        };

        match action {
            Action::Go(next) => screen = next,
            Action::Search => search(&handle, &prefs, screen).await?,
            Action::Refresh => {
                redraw_until(handle.reload(), screen, &handle, &prefs).await?;
            }
            Action::ToggleDarkMode => {
                prefs.write_theme(!prefs.dark_mode()).wait().await?;
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

fn draw(screen: Screen, handle: &ControllerHandle, prefs: &PreferenceStore) -> Result<()> {
    let dark_mode = prefs.dark_mode();
    let palette = Palette::for_stdout(dark_mode);
    let text = render::screen(screen, &handle.state(), dark_mode, &palette);

    execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    println!("{text}");
    Ok(())
}

/// `None` when the user backs out of the menu.
async fn prompt_action(screen: Screen) -> Result<Option<Action>> {
    let actions = actions_for(screen);
    let cursor = actions
        .iter()
        .position(|a| *a == Action::Go(screen))
        .unwrap_or(0);

    let answer = tokio::task::spawn_blocking(move || {
        Select::new("Go to", actions)
            .with_starting_cursor(cursor)
            .prompt()
    })
    .await?;

    match answer {
        Ok(action) => Ok(Some(action)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Ask for a city and, when one is given, make it the selected city.
async fn search(handle: &ControllerHandle, prefs: &PreferenceStore, screen: Screen) -> Result<()> {
    let input = tokio::task::spawn_blocking(|| Text::new("Search a city..").prompt_skippable())
        .await??;

    let Some(city) = input.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    if city == prefs.city() {
        // Same selection; nothing will fire, so ask for a reload instead.
        return redraw_until(handle.reload(), screen, handle, prefs).await;
    }

    let generation = handle.state().generation;
    prefs.write_city(city).wait().await?;
    redraw_until(handle.settled_after(generation), screen, handle, prefs).await
}

/// Keep the screen in sync with the view state until `done` resolves, so the
/// refresh indicator shows while a fetch is in flight.
async fn redraw_until<F: Future>(
    done: F,
    screen: Screen,
    handle: &ControllerHandle,
    prefs: &PreferenceStore,
) -> Result<()> {
    let mut view = handle.view();
    view.borrow_and_update();

    let deadline = tokio::time::sleep(REFRESH_WAIT);
    tokio::pin!(done, deadline);

    loop {
        tokio::select! {
            _ = &mut done => break,
            changed = view.changed() => {
                if changed.is_err() {
                    tracing::error!("view state controller stopped unexpectedly");
                    break;
                }
                view.borrow_and_update();
                draw(screen, handle, prefs)?;
            }
            () = &mut deadline => {
                tracing::warn!("refresh is taking too long, not waiting any more");
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_screen_can_navigate_everywhere() {
        for screen in Screen::ALL {
            let actions = actions_for(screen);
            for target in Screen::ALL {
                assert!(actions.contains(&Action::Go(target)));
            }
            assert_eq!(actions.last(), Some(&Action::Quit));
        }
    }

    #[test]
    fn search_only_offered_on_home() {
        assert!(actions_for(Screen::Home).contains(&Action::Search));
        assert!(!actions_for(Screen::Forecast).contains(&Action::Search));
        assert!(!actions_for(Screen::Settings).contains(&Action::Search));
    }

    #[test]
    fn theme_toggle_lives_in_settings() {
        assert!(actions_for(Screen::Settings).contains(&Action::ToggleDarkMode));
        assert!(!actions_for(Screen::Home).contains(&Action::ToggleDarkMode));
    }
}
