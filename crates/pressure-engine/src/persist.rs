//! Snapshot persistence.
//!
//! The store only raises a dirty flag. [`SnapshotSaver`] turns that flag
//! into at most one write per debounce window.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use pressure_events::{PressureSnapshot, Tick};

use crate::store::EventStore;

/// Errors that can occur while saving or loading snapshots.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes a snapshot next to `path` first, then moves it into place.
pub fn write_snapshot(path: &Path, snapshot: &PressureSnapshot) -> Result<(), PersistError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = snapshot.to_json()?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads a snapshot, defaulting any missing or malformed field.
pub fn read_snapshot(path: &Path) -> Result<PressureSnapshot, PersistError> {
    let content = fs::read_to_string(path)?;
    Ok(PressureSnapshot::from_json_lenient(&content)?)
}

/// Like [`read_snapshot`], but a missing file is an empty snapshot.
pub fn read_snapshot_or_default(path: &Path) -> Result<PressureSnapshot, PersistError> {
    match read_snapshot(path) {
        Err(PersistError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("No snapshot at {}, starting empty", path.display());
            Ok(PressureSnapshot::default())
        }
        other => other,
    }
}

/// Debounced writer of the store's snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotSaver {
    path: PathBuf,
    debounce: Tick,
    last_save: Option<Tick>,
    saves: u64,
}

impl SnapshotSaver {
    pub fn new(path: impl Into<PathBuf>, debounce: Tick) -> Self {
        Self {
            path: path.into(),
            debounce,
            last_save: None,
            saves: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save_count(&self) -> u64 {
        self.saves
    }

    /// True once the debounce window since the last save has passed.
    pub fn is_due(&self, now: Tick) -> bool {
        self.last_save
            .map_or(true, |last| now >= last.saturating_add(self.debounce))
    }

    /// Saves a dirty store if the debounce window allows it.
    ///
    /// Returns whether a write happened. The dirty flag is cleared only on
    /// success.
    pub fn save_if_due(&mut self, store: &mut EventStore, now: Tick) -> Result<bool, PersistError> {
        if !store.is_dirty() || !self.is_due(now) {
            return Ok(false);
        }
        self.save_now(store, now)?;
        Ok(true)
    }

    /// Saves unconditionally.
    pub fn save_now(&mut self, store: &mut EventStore, now: Tick) -> Result<(), PersistError> {
        let snapshot = store.snapshot();
        write_snapshot(&self.path, &snapshot)?;
        store.clear_dirty();
        self.last_save = Some(now);
        self.saves += 1;
        tracing::info!(
            "Saved {} events to {} at tick {}",
            snapshot.event_count(),
            self.path.display(),
            now
        );
        Ok(())
    }
}
