//! Durable user preferences: the selected city and the dark-mode flag.
//!
//! Both values are observable through `watch` channels. Writes go through a
//! single background task so they are applied and persisted in the order
//! they were issued.

use serde::{Deserialize, Serialize};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};

pub const DEFAULT_CITY: &str = "Athens";

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse preferences: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("preference writer is no longer running")]
    Closed,
}

/// Resolved preference values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub city: String,
    pub dark_mode: bool,
}

impl Preferences {
    /// First-run values: the default city and the host's theme.
    pub fn first_run(system_dark_mode: bool) -> Self {
        Self {
            city: DEFAULT_CITY.to_string(),
            dark_mode: system_dark_mode,
        }
    }
}

/// On-disk shape. Absent fields fall back to first-run values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dark_mode: Option<bool>,
}

impl StoredPreferences {
    fn resolve(&self, system_dark_mode: bool) -> Preferences {
        Preferences {
            city: self
                .city
                .clone()
                .unwrap_or_else(|| DEFAULT_CITY.to_string()),
            dark_mode: self.dark_mode.unwrap_or(system_dark_mode),
        }
    }
}

#[derive(Debug)]
enum Backend {
    File(PathBuf),
    Memory,
}

impl Backend {
    async fn load(&self) -> Result<StoredPreferences, PreferenceError> {
        let Backend::File(path) = self else {
            return Ok(StoredPreferences::default());
        };

        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoredPreferences::default()),
            Err(source) => Err(io_error(path, source)),
        }
    }

    async fn persist(&self, stored: &StoredPreferences) -> Result<(), PreferenceError> {
        let Backend::File(path) = self else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        let contents = toml::to_string_pretty(stored)?;

        // Write-then-rename so a crash never leaves a half-written file behind.
        let tmp = path.with_extension("toml.tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| io_error(path, e))?;

        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PreferenceError {
    PreferenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug)]
enum Change {
    City(String),
    Theme(bool),
}

#[derive(Debug)]
struct WriteRequest {
    change: Change,
    done: oneshot::Sender<Result<(), PreferenceError>>,
}

/// Completion handle of a preference write.
///
/// Await [`WriteTicket::wait`] to learn whether the value was persisted, or
/// drop it to fire and forget.
#[derive(Debug)]
#[must_use = "drop the ticket explicitly to ignore the outcome of the write"]
pub struct WriteTicket {
    done: oneshot::Receiver<Result<(), PreferenceError>>,
}

impl WriteTicket {
    pub async fn wait(self) -> Result<(), PreferenceError> {
        self.done.await.map_err(|_| PreferenceError::Closed)?
    }
}

#[derive(Debug)]
struct Channels {
    city: watch::Sender<String>,
    dark_mode: watch::Sender<bool>,
}

/// Cheaply cloneable handle to the preference store.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    channels: Arc<Channels>,
    writes: mpsc::UnboundedSender<WriteRequest>,
}

impl PreferenceStore {
    /// Load preferences from `path` (missing file means first run) and start
    /// the writer task. Must be called from within a Tokio runtime.
    pub async fn open(
        path: impl Into<PathBuf>,
        system_dark_mode: bool,
    ) -> Result<Self, PreferenceError> {
        let backend = Backend::File(path.into());
        let stored = backend.load().await?;
        Ok(Self::start(backend, stored, system_dark_mode))
    }

    /// A store that keeps values in memory only. Must be called from within
    /// a Tokio runtime.
    pub fn in_memory(initial: Preferences) -> Self {
        let stored = StoredPreferences {
            city: Some(initial.city),
            dark_mode: Some(initial.dark_mode),
        };
        Self::start(Backend::Memory, stored, initial.dark_mode)
    }

    fn start(backend: Backend, stored: StoredPreferences, system_dark_mode: bool) -> Self {
        let resolved = stored.resolve(system_dark_mode);
        tracing::debug!(city = %resolved.city, dark_mode = resolved.dark_mode, "preferences loaded");

        let channels = Arc::new(Channels {
            city: watch::Sender::new(resolved.city),
            dark_mode: watch::Sender::new(resolved.dark_mode),
        });
        let (writes, rx) = mpsc::unbounded_channel();

        let writer = Writer {
            backend,
            stored,
            system_dark_mode,
            channels: Arc::clone(&channels),
        };
        tokio::spawn(writer.run(rx));

        Self { channels, writes }
    }

    pub fn city(&self) -> String {
        self.channels.city.borrow().clone()
    }

    pub fn dark_mode(&self) -> bool {
        *self.channels.dark_mode.borrow()
    }

    pub fn current(&self) -> Preferences {
        Preferences {
            city: self.city(),
            dark_mode: self.dark_mode(),
        }
    }

    /// Observe the selected city. Only actual changes are signalled.
    pub fn subscribe_city(&self) -> watch::Receiver<String> {
        self.channels.city.subscribe()
    }

    /// Observe the dark-mode flag. Only actual changes are signalled.
    pub fn subscribe_dark_mode(&self) -> watch::Receiver<bool> {
        self.channels.dark_mode.subscribe()
    }

    pub fn write_city(&self, city: impl Into<String>) -> WriteTicket {
        self.enqueue(Change::City(city.into()))
    }

    pub fn write_theme(&self, dark_mode: bool) -> WriteTicket {
        self.enqueue(Change::Theme(dark_mode))
    }

    fn enqueue(&self, change: Change) -> WriteTicket {
        let (done, rx) = oneshot::channel();
        // A closed queue drops `done`, which the ticket reports as `Closed`.
        let _ = self.writes.send(WriteRequest { change, done });
        WriteTicket { done: rx }
    }
}

struct Writer {
    backend: Backend,
    stored: StoredPreferences,
    system_dark_mode: bool,
    channels: Arc<Channels>,
}

impl Writer {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<WriteRequest>) {
        while let Some(WriteRequest { change, done }) = rx.recv().await {
            let result = self.apply(change).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "failed to persist preferences");
            }
            let _ = done.send(result);
        }
    }

    async fn apply(&mut self, change: Change) -> Result<(), PreferenceError> {
        let mut next = self.stored.clone();
        match &change {
            Change::City(city) => next.city = Some(city.clone()),
            Change::Theme(dark) => next.dark_mode = Some(*dark),
        }

        self.backend.persist(&next).await?;
        self.stored = next;

        let resolved = self.stored.resolve(self.system_dark_mode);
        match change {
            Change::City(_) => publish(&self.channels.city, resolved.city),
            Change::Theme(_) => publish(&self.channels.dark_mode, resolved.dark_mode),
        }
        Ok(())
    }
}

fn publish<T: PartialEq>(tx: &watch::Sender<T>, value: T) {
    tx.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_run_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("preferences.toml"), true)
            .await
            .unwrap();

        assert_eq!(store.city(), "Athens");
        assert!(store.dark_mode());
    }

    #[tokio::test]
    async fn writes_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.toml");

        let store = PreferenceStore::open(&path, false).await.unwrap();
        store.write_city("Lisbon").wait().await.unwrap();
        store.write_theme(true).wait().await.unwrap();

        let reopened = PreferenceStore::open(&path, false).await.unwrap();
        assert_eq!(
            reopened.current(),
            Preferences {
                city: "Lisbon".to_string(),
                dark_mode: true,
            }
        );
    }

    #[tokio::test]
    async fn unset_theme_keeps_following_system() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");

        let store = PreferenceStore::open(&path, false).await.unwrap();
        store.write_city("Oslo").wait().await.unwrap();

        let reopened = PreferenceStore::open(&path, true).await.unwrap();
        assert_eq!(reopened.city(), "Oslo");
        assert!(reopened.dark_mode());
    }

    #[tokio::test]
    async fn writes_apply_in_order() {
        let store = PreferenceStore::in_memory(Preferences::first_run(false));

        let _ = store.write_city("Rome");
        let _ = store.write_city("Madrid");
        store.write_city("Berlin").wait().await.unwrap();

        assert_eq!(store.city(), "Berlin");
    }

    #[tokio::test]
    async fn observers_see_changes_only() {
        let store = PreferenceStore::in_memory(Preferences::first_run(false));
        let mut city = store.subscribe_city();

        store.write_city("Athens").wait().await.unwrap();
        assert!(!city.has_changed().unwrap());

        store.write_city("Paris").wait().await.unwrap();
        assert!(city.has_changed().unwrap());
        assert_eq!(*city.borrow_and_update(), "Paris");

        let mut dark = store.subscribe_dark_mode();
        store.write_theme(true).wait().await.unwrap();
        assert!(dark.has_changed().unwrap());
        assert!(*dark.borrow_and_update());
    }

    #[tokio::test]
    async fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "city = [").unwrap();

        let err = PreferenceStore::open(&path, false).await.unwrap_err();
        assert!(matches!(err, PreferenceError::Parse(_)));
    }

    #[tokio::test]
    async fn failed_persist_leaves_value_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("prefs");

        let store = PreferenceStore::open(parent.join("preferences.toml"), false)
            .await
            .unwrap();

        // The parent "directory" is now a regular file, so writes must fail.
        std::fs::write(&parent, "").unwrap();
        let err = store.write_city("Vienna").wait().await.unwrap_err();

        assert!(matches!(err, PreferenceError::Io { .. }));
        assert_eq!(store.city(), "Athens");
    }
}
