//! The refresh pipeline tying a city selection to what's on screen.
//!
//! The controller owns the displayed snapshots and their derived
//! [`DisplayState`]. A refresh either replaces the whole bundle or, when the
//! current-conditions fetch fails, puts the previous bundle back and reverts
//! the persisted city to the last one that worked.

use chrono::FixedOffset;
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};

use crate::{
    display::{self, DisplayState},
    model::{ForecastSnapshot, WeatherSnapshot},
    preferences::PreferenceStore,
    provider::{FetchError, WeatherProvider},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPhase {
    #[default]
    Idle,
    Refreshing,
}

/// Everything the screens need for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct Shown {
    /// The city as it was requested.
    pub city: String,
    pub current: Arc<WeatherSnapshot>,
    pub forecast: Arc<ForecastSnapshot>,
    pub display: DisplayState,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub phase: RefreshPhase,
    /// `None` until the first refresh succeeds.
    pub shown: Option<Shown>,
    /// Message about the most recent failed refresh, cleared on success.
    pub notice: Option<String>,
    /// Bumped each time a refresh attempt completes.
    pub generation: u64,
}

impl ViewState {
    pub fn is_refreshing(&self) -> bool {
        self.phase == RefreshPhase::Refreshing
    }

    pub fn is_loading(&self) -> bool {
        self.shown.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New snapshots are on display.
    Accepted,
    /// The fetch failed; the previous snapshots are on display.
    FellBack,
    /// The trigger was our own revert of the persisted city.
    Skipped,
}

type ReloadRequest = oneshot::Sender<RefreshOutcome>;

pub struct ViewStateController {
    provider: Arc<dyn WeatherProvider>,
    preferences: PreferenceStore,
    viewer: FixedOffset,
    state: watch::Sender<ViewState>,
    last_good_city: Option<String>,
    pending_revert: Option<String>,
}

impl ViewStateController {
    pub fn new(provider: Arc<dyn WeatherProvider>, preferences: PreferenceStore) -> Self {
        Self::with_viewer_offset(provider, preferences, display::viewer_offset())
    }

    /// Like [`ViewStateController::new`], rendering "updated on" in `viewer`.
    pub fn with_viewer_offset(
        provider: Arc<dyn WeatherProvider>,
        preferences: PreferenceStore,
        viewer: FixedOffset,
    ) -> Self {
        Self {
            provider,
            preferences,
            viewer,
            state: watch::Sender::new(ViewState::default()),
            last_good_city: None,
            pending_revert: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn last_good_city(&self) -> Option<&str> {
        self.last_good_city.as_deref()
    }

    /// Fetch both endpoints for `city` and update the displayed state.
    pub async fn refresh(&mut self, city: &str) -> RefreshOutcome {
        let previous = self.state.borrow().shown.clone();
        self.state.send_modify(|s| s.phase = RefreshPhase::Refreshing);

        let (current, forecast) = tokio::join!(
            self.provider.fetch_current(city),
            self.provider.fetch_forecast(city),
        );

        match current {
            Ok(current) => {
                let forecast = forecast.unwrap_or_else(|e| {
                    tracing::warn!(city, error = %e, "forecast unavailable, showing current conditions only");
                    ForecastSnapshot::default()
                });
                self.accept(city, current, forecast);
                RefreshOutcome::Accepted
            }
            Err(e) => {
                self.fall_back(city, previous, &e).await;
                RefreshOutcome::FellBack
            }
        }
    }

    /// Pull-to-refresh: fetch the city currently on display again.
    pub async fn reload(&mut self) -> RefreshOutcome {
        let city = self
            .last_good_city
            .clone()
            .unwrap_or_else(|| self.preferences.city());
        self.refresh(&city).await
    }

    /// React to a new persisted city value.
    ///
    /// A pending revert is consumed by the next notification, whichever city
    /// it carries.
    pub async fn on_city_changed(&mut self, city: &str) -> RefreshOutcome {
        if self.pending_revert.take().as_deref() == Some(city) {
            tracing::debug!(city, "city reverted after failed refresh, nothing to fetch");
            return RefreshOutcome::Skipped;
        }
        self.refresh(city).await
    }

    fn accept(&mut self, city: &str, current: WeatherSnapshot, forecast: ForecastSnapshot) {
        let derived = DisplayState::derive(&current, &forecast, self.viewer);
        tracing::debug!(city, icon = ?derived.icon, days = derived.days.len(), "refresh accepted");

        let shown = Shown {
            city: city.to_string(),
            current: Arc::new(current),
            forecast: Arc::new(forecast),
            display: derived,
        };

        self.last_good_city = Some(city.to_string());

        self.state.send_modify(|s| {
            s.phase = RefreshPhase::Idle;
            s.shown = Some(shown);
            s.notice = None;
            s.generation += 1;
        });
    }

    async fn fall_back(&mut self, city: &str, previous: Option<Shown>, error: &FetchError) {
        tracing::warn!(city, %error, "refresh failed, keeping previous weather");

        let restored = previous.map(|mut shown| {
            shown.display = DisplayState::derive(&shown.current, &shown.forecast, self.viewer);
            shown
        });
        let notice = format!("Couldn't load weather for \"{city}\"");

        self.state.send_modify(|s| {
            s.phase = RefreshPhase::Idle;
            s.shown = restored;
            s.notice = Some(notice);
            s.generation += 1;
        });

        let Some(last_good) = self.last_good_city.clone() else {
            return;
        };
        // A newer selection has already replaced the failed one; the run loop fetches it next.
        let persisted = self.preferences.city();
        if persisted != city || persisted == last_good {
            return;
        }

        self.pending_revert = Some(last_good.clone());
        if let Err(e) = self.preferences.write_city(last_good).wait().await {
            tracing::error!(error = %e, "failed to restore previous city");
            self.pending_revert = None;
        }
    }

    /// Run the controller on its own task, following the persisted city.
    pub fn spawn(self) -> ControllerHandle {
        let view = self.subscribe();
        let (reloads, rx) = mpsc::channel(8);
        let task = tokio::spawn(self.run(rx));

        ControllerHandle {
            view,
            reloads,
            task,
        }
    }

    async fn run(mut self, mut reloads: mpsc::Receiver<ReloadRequest>) {
        let mut city = self.preferences.subscribe_city();

        let initial = city.borrow_and_update().clone();
        self.on_city_changed(&initial).await;

        loop {
            tokio::select! {
                changed = city.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    // Values written while the last refresh ran collapse into the latest one.
                    let next = city.borrow_and_update().clone();
                    self.on_city_changed(&next).await;
                }
                request = reloads.recv() => {
                    let Some(done) = request else {
                        break;
                    };
                    let outcome = self.reload().await;
                    let _ = done.send(outcome);
                }
            }
        }

        tracing::debug!("view state controller stopped");
    }
}

/// Handle to a controller running on a background task.
///
/// Dropping the handle stops the controller.
#[derive(Debug)]
pub struct ControllerHandle {
    view: watch::Receiver<ViewState>,
    reloads: mpsc::Sender<ReloadRequest>,
    task: JoinHandle<()>,
}

impl ControllerHandle {
    pub fn view(&self) -> watch::Receiver<ViewState> {
        self.view.clone()
    }

    pub fn state(&self) -> ViewState {
        self.view.borrow().clone()
    }

    /// Re-fetch the displayed city and wait for the result.
    pub async fn reload(&self) -> Option<RefreshOutcome> {
        let (done, rx) = oneshot::channel();
        self.reloads.send(done).await.ok()?;
        rx.await.ok()
    }

    /// Wait until a refresh attempt newer than `generation` has completed.
    pub async fn settled_after(&self, generation: u64) -> Option<ViewState> {
        let mut view = self.view.clone();
        view.wait_for(|s| s.generation > generation && !s.is_refreshing())
            .await
            .ok()
            .map(|s| s.clone())
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl std::fmt::Debug for ViewStateController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewStateController")
            .field("provider", &self.provider)
            .field("last_good_city", &self.last_good_city)
            .field("pending_revert", &self.pending_revert)
            .finish_non_exhaustive()
    }
}
