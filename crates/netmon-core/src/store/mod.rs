// ── Persistent store ──
//
// Three independently addressable JSON documents under one data
// directory. Reads never fail: a missing or corrupt document yields its
// default. Writes replace the whole document via temp file + rename.

mod retention;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use strum::{Display, EnumIter, IntoEnumIterator};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{Alert, AlertKind, HistoryEntry, Settings, SettingsPatch};

pub use retention::retain_recent;

/// One independently persisted document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Partition {
    History,
    Settings,
    Alerts,
}

impl Partition {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::History => "history.json",
            Self::Settings => "settings.json",
            Self::Alerts => "alerts.json",
        }
    }

    fn default_document(self) -> serde_json::Value {
        match self {
            Self::History | Self::Alerts => serde_json::Value::Array(Vec::new()),
            Self::Settings => {
                serde_json::to_value(Settings::default()).unwrap_or(serde_json::Value::Null)
            }
        }
    }
}

/// File-backed store for history, settings and alerts.
///
/// Read-modify-write sequences within one process are serialized; there
/// is no locking across processes.
#[derive(Debug)]
pub struct Store {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl Store {
    /// Open (and bootstrap) a store rooted at `dir`.
    ///
    /// Creates the directory and writes the default document for every
    /// partition whose file is absent.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CoreError::StorageInit {
            path: dir.clone(),
            source,
        })?;

        let store = Self {
            dir,
            write_lock: Mutex::new(()),
        };

        for partition in Partition::iter() {
            let path = store.path(partition);
            if path.exists() {
                continue;
            }
            debug!(%partition, path = %path.display(), "bootstrapping partition");
            store
                .write(partition, &partition.default_document())
                .map_err(|e| match e {
                    CoreError::StorageWrite { path, source, .. } => {
                        CoreError::StorageInit { path, source }
                    }
                    other => other,
                })?;
        }

        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, partition: Partition) -> PathBuf {
        self.dir.join(partition.file_name())
    }

    // ── Raw document access ──────────────────────────────────────────

    /// Read and decode a partition. `None` if it is missing or unparseable.
    pub fn read<T: DeserializeOwned>(&self, partition: Partition) -> Option<T> {
        let path = self.path(partition);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(%partition, error = %e, "partition unreadable, using default");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%partition, path = %path.display(), error = %e,
                    "partition is corrupt, falling back to default");
                None
            }
        }
    }

    /// Replace a partition's content atomically.
    pub fn write<T: Serialize + ?Sized>(
        &self,
        partition: Partition,
        data: &T,
    ) -> Result<(), CoreError> {
        let path = self.path(partition);
        let body = serde_json::to_vec_pretty(data)
            .map_err(|source| CoreError::Encode { partition, source })?;

        let write_err = |source: std::io::Error| CoreError::StorageWrite {
            partition,
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(&body).map_err(write_err)?;
        tmp.write_all(b"\n").map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        debug!(%partition, bytes = body.len(), "partition written");
        Ok(())
    }

    // ── History ──────────────────────────────────────────────────────

    /// All stored history entries, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.read(Partition::History).unwrap_or_default()
    }

    /// Append an entry and prune everything older than the retention window.
    pub fn append_history(&self, entry: HistoryEntry) -> Result<HistoryEntry, CoreError> {
        let _guard = self.lock();
        let max_days = self.settings().max_history_days;

        let mut history = self.history();
        history.push(entry.clone());
        let before = history.len();
        let history = retain_recent(history, Utc::now(), max_days);
        if history.len() < before {
            debug!(pruned = before - history.len(), "expired history entries pruned");
        }

        self.write(Partition::History, &history)?;
        Ok(entry)
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn settings(&self) -> Settings {
        self.read(Partition::Settings).unwrap_or_default()
    }

    /// Shallow-merge `patch` into the stored settings and persist the result.
    pub fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings, CoreError> {
        let _guard = self.lock();
        let next = self.settings().merged(patch);
        next.validate()?;
        self.write(Partition::Settings, &next)?;
        Ok(next)
    }

    // ── Alerts ───────────────────────────────────────────────────────

    pub fn alerts(&self) -> Vec<Alert> {
        self.read(Partition::Alerts).unwrap_or_default()
    }

    pub fn add_alert(&self, kind: AlertKind, message: &str) -> Result<Alert, CoreError> {
        let _guard = self.lock();
        let alert = Alert::new(kind, message);
        let mut alerts = self.alerts();
        alerts.push(alert.clone());
        self.write(Partition::Alerts, &alerts)?;
        Ok(alert)
    }

    /// Flag one alert as read. Returns `false` (and writes nothing) when no
    /// alert has that id.
    pub fn mark_alert_read(&self, id: &str) -> Result<bool, CoreError> {
        let _guard = self.lock();
        let mut alerts = self.alerts();
        let Some(alert) = alerts.iter_mut().find(|a| a.id == id) else {
            return Ok(false);
        };
        alert.read = true;
        self.write(Partition::Alerts, &alerts)?;
        Ok(true)
    }

    pub fn clear_alerts(&self) -> Result<(), CoreError> {
        let _guard = self.lock();
        self.write(Partition::Alerts, &Vec::<Alert>::new())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::model::{AlertThresholds, Counters};

    fn open_temp() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::open(dir.path().join("data")).unwrap();
        (dir, store)
    }

    fn entry_days_ago(days: i64, bytes_in: u64) -> HistoryEntry {
        HistoryEntry::at(
            Utc::now() - ChronoDuration::days(days),
            Counters::new(bytes_in, 0),
            30,
        )
    }

    #[test]
    fn open_bootstraps_defaults() {
        let (_dir, store) = open_temp();
        for partition in Partition::iter() {
            assert!(store.path(partition).exists(), "{partition} not created");
        }
        assert!(store.history().is_empty());
        assert!(store.alerts().is_empty());
        assert_eq!(store.settings(), Settings::default());
    }

    #[test]
    fn open_keeps_existing_documents() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("settings.json"),
            r#"{"refreshIntervalMs": 750}"#,
        )
        .unwrap();

        let store = Store::open(dir.path()).unwrap();
        assert_eq!(store.settings().refresh_interval_ms, 750);
    }

    #[test]
    fn corrupt_partition_reads_as_default() {
        let (_dir, store) = open_temp();
        fs::write(store.path(Partition::History), "[{\"id\": ").unwrap();
        fs::write(store.path(Partition::Settings), "not json").unwrap();

        assert!(store.history().is_empty());
        assert_eq!(store.settings(), Settings::default());
    }

    #[test]
    fn missing_partition_reads_as_default() {
        let (_dir, store) = open_temp();
        fs::remove_file(store.path(Partition::Alerts)).unwrap();
        assert!(store.alerts().is_empty());
        assert!(store.read::<Vec<Alert>>(Partition::Alerts).is_none());
    }

    #[test]
    fn append_prunes_entries_past_retention() {
        let (_dir, store) = open_temp();
        let stale = entry_days_ago(31, 1);
        let recent = entry_days_ago(29, 2);
        store
            .write(Partition::History, &vec![stale.clone(), recent.clone()])
            .unwrap();

        let fresh = store
            .append_history(HistoryEntry::record(Counters::new(3, 0), 30))
            .unwrap();

        let ids: Vec<String> = store.history().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![recent.id, fresh.id]);
        assert!(!ids.contains(&stale.id));
    }

    #[test]
    fn retention_follows_max_history_days() {
        let (_dir, store) = open_temp();
        store
            .update_settings(&SettingsPatch {
                max_history_days: Some(7),
                ..SettingsPatch::default()
            })
            .unwrap();
        store
            .write(Partition::History, &vec![entry_days_ago(8, 1)])
            .unwrap();

        store
            .append_history(HistoryEntry::record(Counters::default(), 1))
            .unwrap();
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn write_leaves_no_temp_files() {
        let (_dir, store) = open_temp();
        store
            .append_history(HistoryEntry::record(Counters::new(1, 1), 1))
            .unwrap();

        let names: Vec<String> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 3, "unexpected files: {names:?}");
    }

    #[test]
    fn write_failure_is_surfaced() {
        let (_dir, store) = open_temp();
        let path = store.path(Partition::History);
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let err = store
            .append_history(HistoryEntry::record(Counters::new(1, 1), 1))
            .unwrap_err();
        assert!(err.is_storage_write(), "unexpected error: {err}");
    }

    #[test]
    fn settings_merge_keeps_unspecified_and_unknown_keys() {
        let (_dir, store) = open_temp();
        fs::write(
            store.path(Partition::Settings),
            r#"{"refreshIntervalMs": 1000, "maxHistoryDays": 10, "theme": "dark"}"#,
        )
        .unwrap();

        let updated = store
            .update_settings(&SettingsPatch {
                alert_thresholds: Some(AlertThresholds {
                    warning_pct: 50,
                    critical_pct: 70,
                }),
                ..SettingsPatch::default()
            })
            .unwrap();

        assert_eq!(updated.refresh_interval_ms, 1000);
        assert_eq!(updated.max_history_days, 10);
        assert_eq!(updated.alert_thresholds.warning_pct, 50);

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path(Partition::Settings)).unwrap())
                .unwrap();
        assert_eq!(raw["theme"], "dark");
    }

    #[test]
    fn invalid_settings_are_not_written() {
        let (_dir, store) = open_temp();
        let before = fs::read(store.path(Partition::Settings)).unwrap();

        let err = store
            .update_settings(&SettingsPatch {
                refresh_interval_ms: Some(0),
                ..SettingsPatch::default()
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidSettings { .. }));
        assert_eq!(fs::read(store.path(Partition::Settings)).unwrap(), before);
    }

    #[test]
    fn mark_read_unknown_id_leaves_file_untouched() {
        let (_dir, store) = open_temp();
        store.add_alert(AlertKind::Warning, "first").unwrap();
        let before = fs::read(store.path(Partition::Alerts)).unwrap();

        assert!(!store.mark_alert_read("a-missing").unwrap());
        assert_eq!(fs::read(store.path(Partition::Alerts)).unwrap(), before);
    }

    #[test]
    fn mark_read_flips_only_matching_alert() {
        let (_dir, store) = open_temp();
        let first = store.add_alert(AlertKind::Warning, "first").unwrap();
        let second = store.add_alert(AlertKind::Critical, "second").unwrap();

        assert!(store.mark_alert_read(&second.id).unwrap());

        let alerts = store.alerts();
        assert_eq!(alerts.len(), 2);
        assert!(!alerts.iter().find(|a| a.id == first.id).unwrap().read);
        assert!(alerts.iter().find(|a| a.id == second.id).unwrap().read);
    }

    #[test]
    fn clear_empties_alerts() {
        let (_dir, store) = open_temp();
        store.add_alert(AlertKind::Warning, "x").unwrap();
        store.clear_alerts().unwrap();
        assert!(store.alerts().is_empty());
    }
}
