//! Transactional state store and backup pipeline
//!
//! The store is the single choke point for all application-state mutation:
//! every change runs inside [`Store::modify`], which snapshots, persists and
//! schedules the debounced backup in one transaction. Collaborators hold the
//! state read-only via [`Store::state`].

pub mod archive;
pub mod backup;
pub mod history;
pub mod storage;

use chrono::{SecondsFormat, Utc};

use crate::core::config::CoreConfig;
use crate::core::error::{CoreError, Result};
use crate::core::state::{AppState, Snapshot};
use backup::BackupScheduler;
use storage::StateStorage;

/// Collaborator hooks fired after the store changes.
///
/// All methods default to no-ops; the UI layer implements the ones it needs
/// (typically a re-render on `on_state_changed`).
pub trait StoreObserver {
    /// The state changed through `modify` (or a fired backup).
    fn on_state_changed(&mut self, _state: &AppState) {}

    /// A snapshot was recorded into the backup history.
    fn on_backup(&mut self, _timestamp: &str) {}
}

/// Options for a [`Store::modify`] transaction.
#[derive(Debug, Clone, Copy)]
pub struct ModifyOptions {
    /// Arm the debounced post-settle snapshot. `false` signals that
    /// snapshotting already happened (e.g. bulk import) and only refreshes
    /// the last-backup indicator.
    pub schedule_backup: bool,
    /// Record an immediate snapshot into the backup history.
    pub log_to_history: bool,
}

impl Default for ModifyOptions {
    fn default() -> Self {
        Self {
            schedule_backup: true,
            log_to_history: true,
        }
    }
}

impl ModifyOptions {
    /// Persist only: no history entry, no scheduled backup.
    pub fn quiet() -> Self {
        Self {
            schedule_backup: false,
            log_to_history: false,
        }
    }
}

/// Owner of the application state.
///
/// Write path per mutation: run the mutation, optionally record a history
/// snapshot, persist the full state to durable storage (never skipped),
/// then arm the debounce. The host loop drives the armed deadline through
/// [`Store::poll_backup`].
pub struct Store {
    state: AppState,
    storage: Box<dyn StateStorage>,
    scheduler: BackupScheduler,
    observers: Vec<Box<dyn StoreObserver>>,
}

impl Store {
    /// Open a store over the given backend, loading any persisted state.
    ///
    /// A missing payload starts from an empty state; an unparseable one is
    /// reported as [`CoreError::CorruptData`] rather than silently discarded.
    pub fn open(storage: Box<dyn StateStorage>, config: &CoreConfig) -> Result<Self> {
        let state = match storage.load().map_err(CoreError::Storage)? {
            Some(payload) => serde_json::from_str(&payload)
                .map_err(|e| CoreError::corrupt(e.to_string()))?,
            None => AppState::default(),
        };

        Ok(Self {
            state,
            storage,
            scheduler: BackupScheduler::new(config.backup_debounce()),
            observers: Vec::new(),
        })
    }

    /// Read-only view of the live state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Register a collaborator to be notified after changes.
    pub fn add_observer(&mut self, observer: Box<dyn StoreObserver>) {
        self.observers.push(observer);
    }

    /// Run a mutation transactionally.
    ///
    /// The mutation executes synchronously against the live state; the
    /// durable write happens before `modify` returns, so a crash right after
    /// a completed call can never lose the mutation. A failed write surfaces
    /// as [`CoreError::Storage`] while the in-memory mutation stands.
    pub fn modify<R>(
        &mut self,
        options: ModifyOptions,
        mutation: impl FnOnce(&mut AppState) -> R,
    ) -> Result<R> {
        let out = mutation(&mut self.state);

        if options.log_to_history {
            self.record_snapshot();
        }

        self.persist()?;

        if options.schedule_backup {
            self.scheduler.arm();
        }

        // Observers re-read the state (including the last-backup indicator)
        // whether or not a backup was scheduled.
        self.notify_changed();
        Ok(out)
    }

    /// Fire the pending backup snapshot if its quiet period has elapsed.
    ///
    /// The host event loop calls this periodically (or after
    /// [`Store::backup_due_in`]). Returns `true` when a snapshot was taken.
    pub fn poll_backup(&mut self) -> Result<bool> {
        if !self.scheduler.poll() {
            return Ok(false);
        }

        let timestamp = self.record_snapshot();
        self.persist()?;

        for observer in &mut self.observers {
            observer.on_backup(&timestamp);
        }
        self.notify_changed();
        tracing::info!("Backup snapshot recorded at {timestamp}");
        Ok(true)
    }

    /// Time left until the armed backup fires; `None` when nothing is armed.
    pub fn backup_due_in(&self) -> Option<std::time::Duration> {
        self.scheduler.due_in()
    }

    /// The snapshot history, most recent first.
    pub fn history(&self) -> &[Snapshot] {
        &self.state.backup_history
    }

    /// Materialize the snapshot with the given timestamp.
    ///
    /// Returns a deep copy of the snapshot's state for the caller to install
    /// through a subsequent `modify`; restoring never logs a history entry
    /// by itself.
    pub fn restore_from_history(&self, timestamp: &str) -> Result<AppState> {
        let snapshot = history::find_by_timestamp(&self.state.backup_history, timestamp)
            .ok_or_else(|| CoreError::SnapshotNotFound {
                timestamp: timestamp.to_string(),
            })?;
        let restored = snapshot.restore()?;
        tracing::info!("Restored backup from {timestamp}");
        Ok(restored)
    }

    /// Serialize the full state (history included) to a downloadable
    /// artifact, independent of the backup pipeline.
    pub fn export_snapshot(&self) -> Vec<u8> {
        serde_json::to_vec_pretty(&self.state)
            .expect("application state always serializes to JSON")
    }

    /// Stamp the state and prepend a snapshot to the bounded history.
    fn record_snapshot(&mut self) -> String {
        let timestamp = now_iso();
        self.state.last_backup_timestamp = Some(timestamp.clone());
        let snapshot = Snapshot::capture(&self.state, timestamp.clone());
        history::record(&mut self.state.backup_history, snapshot);
        timestamp
    }

    fn persist(&mut self) -> Result<()> {
        let payload = serde_json::to_string(&self.state)
            .expect("application state always serializes to JSON");
        self.storage.save(&payload).map_err(|e| {
            tracing::error!("Durable state write failed: {e:#}");
            CoreError::Storage(e)
        })
    }

    fn notify_changed(&mut self) {
        for observer in &mut self.observers {
            observer.on_state_changed(&self.state);
        }
    }
}

/// Current instant as an ISO-8601 string.
///
/// Microsecond precision keeps timestamps unique enough for exact-match
/// lookup in the history.
fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{Rule, MAX_HISTORY_ITEMS};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::thread;
    use std::time::Duration;

    fn test_config(debounce_ms: u64) -> CoreConfig {
        CoreConfig {
            backup_debounce_ms: debounce_ms,
            ..CoreConfig::default()
        }
    }

    fn open_store(debounce_ms: u64) -> Store {
        Store::open(
            Box::new(storage::MemoryStorage::new()),
            &test_config(debounce_ms),
        )
        .unwrap()
    }

    struct FailingStorage;

    impl StateStorage for FailingStorage {
        fn save(&mut self, _payload: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }

        fn load(&self) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
    }

    #[test]
    fn modify_persists_synchronously() {
        let mut storage = storage::MemoryStorage::new();
        let mut store =
            Store::open(Box::new(storage.clone()), &test_config(3000)).unwrap();
        // MemoryStorage clones are independent; share through the store only.
        store
            .modify(ModifyOptions::quiet(), |s| {
                s.replacements.push(Rule::new("*id", "Identidade"))
            })
            .unwrap();

        let payload = store.export_snapshot();
        let reloaded: AppState = serde_json::from_slice(&payload).unwrap();
        assert_eq!(reloaded.replacements[0].find, "*id");

        // a fresh store over the same payload sees the mutation
        storage.save(std::str::from_utf8(&payload).unwrap()).unwrap();
        let store2 = Store::open(Box::new(storage), &test_config(3000)).unwrap();
        assert_eq!(store2.state().replacements.len(), 1);
    }

    #[test]
    fn history_stays_bounded() {
        let mut store = open_store(3000);
        for i in 0..6 {
            store
                .modify(ModifyOptions::default(), |s| {
                    s.add_model(format!("Modelo {i}"), "texto", None)
                })
                .unwrap();
        }

        assert_eq!(store.history().len(), MAX_HISTORY_ITEMS);
        // newest entry reflects all six models
        let newest = store.history()[0].restore().unwrap();
        assert_eq!(newest.models.len(), 6);
        // oldest surviving entry reflects the second mutation
        let oldest = store.history().last().unwrap().restore().unwrap();
        assert_eq!(oldest.models.len(), 2);
    }

    #[test]
    fn debounce_coalesces_rapid_mutations() {
        let mut store = open_store(30);
        let opts = ModifyOptions {
            schedule_backup: true,
            log_to_history: false,
        };
        for i in 0..4 {
            store
                .modify(opts, |s| s.add_model(format!("m{i}"), "", None))
                .unwrap();
            assert!(!store.poll_backup().unwrap());
        }
        assert!(store.history().is_empty());

        thread::sleep(Duration::from_millis(45));
        assert!(store.poll_backup().unwrap());
        // exactly one post-settle snapshot, reflecting the last state
        assert_eq!(store.history().len(), 1);
        assert_eq!(store.history()[0].restore().unwrap().models.len(), 4);
        assert!(!store.poll_backup().unwrap());
    }

    #[test]
    fn restore_round_trip_survives_later_mutations() {
        let mut store = open_store(3000);
        store
            .modify(ModifyOptions::default(), |s| {
                s.replacements.push(Rule::new("*end", "Endereço"))
            })
            .unwrap();
        let timestamp = store.history()[0].timestamp.clone();

        store
            .modify(ModifyOptions::default(), |s| s.replacements.clear())
            .unwrap();
        assert!(store.state().replacements.is_empty());

        let restored = store.restore_from_history(&timestamp).unwrap();
        assert_eq!(restored.replacements[0].replace, "Endereço");

        store
            .modify(ModifyOptions::quiet(), |s| {
                let history = std::mem::take(&mut s.backup_history);
                *s = restored.clone();
                s.backup_history = history;
            })
            .unwrap();
        assert_eq!(store.state().replacements.len(), 1);
    }

    #[test]
    fn restore_unknown_timestamp_is_not_found() {
        let store = open_store(3000);
        let err = store.restore_from_history("2001-01-01T00:00:00Z").unwrap_err();
        assert!(matches!(err, CoreError::SnapshotNotFound { .. }));
    }

    #[test]
    fn restore_corrupted_snapshot_fails_without_state_change() {
        let mut store = open_store(3000);
        store
            .modify(ModifyOptions::default(), |s| s.add_tab("Contratos"))
            .unwrap();
        let timestamp = store.history()[0].timestamp.clone();

        store
            .modify(ModifyOptions::quiet(), |s| {
                s.backup_history[0].data = serde_json::json!({"tabs": 42});
            })
            .unwrap();

        let err = store.restore_from_history(&timestamp).unwrap_err();
        assert!(matches!(err, CoreError::CorruptData { .. }));
        assert_eq!(store.state().tabs.len(), 1);
    }

    #[test]
    fn storage_failure_surfaces_but_mutation_stands() {
        let mut store =
            Store::open(Box::new(FailingStorage), &test_config(3000)).unwrap();
        let err = store
            .modify(ModifyOptions::quiet(), |s| s.add_tab("Prazos"))
            .unwrap_err();

        assert!(matches!(err, CoreError::Storage(_)));
        assert_eq!(store.state().tabs.len(), 1);
    }

    #[test]
    fn observers_see_changes_and_backups() {
        struct Recorder(Rc<RefCell<Vec<String>>>);
        impl StoreObserver for Recorder {
            fn on_state_changed(&mut self, state: &AppState) {
                self.0
                    .borrow_mut()
                    .push(format!("changed:{}", state.models.len()));
            }
            fn on_backup(&mut self, _timestamp: &str) {
                self.0.borrow_mut().push("backup".to_string());
            }
        }

        let events = Rc::new(RefCell::new(Vec::new()));
        let mut store = open_store(10);
        store.add_observer(Box::new(Recorder(Rc::clone(&events))));

        store
            .modify(ModifyOptions::default(), |s| s.add_model("m", "", None))
            .unwrap();
        thread::sleep(Duration::from_millis(20));
        store.poll_backup().unwrap();

        let events = events.borrow();
        assert_eq!(events[0], "changed:1");
        assert!(events.contains(&"backup".to_string()));
    }
}
