//! Durable record of which merged pull requests have already been announced.
//!
//! The store keeps every seen [`PrId`] in memory for membership checks and
//! mirrors the whole set to a JSON file (see [`seen_file`](super::seen_file))
//! after each insertion. Records carry the time they were first seen so the
//! file can be pruned once they fall outside the retention window.
//!
//! # Failure Policy
//!
//! Storage problems never stop notification delivery:
//! - An absent file is the first-run state and yields an empty store.
//! - An unreadable or corrupt file is logged and yields an empty store.
//! - A malformed record is logged and skipped.
//! - A failed write is logged; the identifier stays seen in memory.
//!
//! A crash after a notification is sent but before the file is written can
//! therefore cause one duplicate notification after restart.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, error, info, warn};

use super::error::StoreError;
use super::seen_file::{
    self, DecodedSeenFile, FORMAT_VERSION, SeenRecord, read_seen_file, temp_path,
};
use crate::types::PrId;

/// Default retention window in days.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Default location of the backing file.
pub const DEFAULT_STORE_FILE: &str = "seen_prs.json";

/// Seen pull requests with their first-seen timestamps.
///
/// `None` marks a legacy record that has no timestamp and never expires.
type Entries = HashMap<PrId, Option<DateTime<Utc>>>;

/// The set of pull requests that have already been announced.
///
/// One instance owns its backing file; running two stores against the same
/// path is not supported.
#[derive(Debug)]
pub struct SeenEventStore {
    entries: Entries,
    retention: Duration,
    backing_path: PathBuf,
    /// Whether the last write attempt reached disk.
    durable: bool,
}

impl SeenEventStore {
    /// Opens the store at `backing_path` with the default 30-day retention.
    pub fn open(backing_path: impl Into<PathBuf>) -> Self {
        Self::open_with_retention(backing_path, Duration::days(DEFAULT_RETENTION_DAYS.into()))
    }

    /// Opens the store, loading whatever non-expired records the file holds.
    ///
    /// Never fails: load problems are logged and the store starts empty.
    pub fn open_with_retention(backing_path: impl Into<PathBuf>, retention: Duration) -> Self {
        let mut store = SeenEventStore {
            entries: HashMap::new(),
            retention,
            backing_path: backing_path.into(),
            durable: true,
        };
        store.load();
        store
    }

    fn load(&mut self) {
        let decoded = match read_seen_file(&self.backing_path) {
            Ok(Some(decoded)) => decoded,
            Ok(None) => {
                info!(
                    path = %self.backing_path.display(),
                    "No existing seen-PR file found, starting fresh"
                );
                return;
            }
            Err(source) => {
                let err = StoreError::LoadFailure {
                    path: self.backing_path.clone(),
                    source,
                };
                error!(error = %err, "Starting with empty PR tracking");
                return;
            }
        };

        let total = decoded.total_records();
        let cutoff = cutoff_before(self.retention);
        self.entries = self.collect_fresh(decoded, cutoff);

        info!(
            path = %self.backing_path.display(),
            loaded = self.entries.len(),
            dropped = total - self.entries.len(),
            "Loaded seen PR IDs from storage"
        );

        if self.entries.len() != total {
            self.persist_or_log();
        }
    }

    /// Normalizes decoded records into entries, dropping those seen before
    /// `cutoff`. Rejected records are logged.
    fn collect_fresh(&self, decoded: DecodedSeenFile, cutoff: DateTime<Utc>) -> Entries {
        if let Some(version) = decoded.version.as_deref()
            && version != FORMAT_VERSION
        {
            warn!(
                path = %self.backing_path.display(),
                version,
                expected = FORMAT_VERSION,
                "Unknown seen-PR file version, reading it anyway"
            );
        }

        for rejected in decoded.rejected {
            let err = StoreError::ParseEntryFailure {
                path: self.backing_path.clone(),
                index: rejected.index,
                reason: rejected.reason,
            };
            warn!(error = %err, raw = %rejected.raw);
        }

        let mut entries = Entries::new();
        let mut expired = 0usize;
        for record in decoded.records {
            let seen_at = record.seen_at();
            if !is_fresh(seen_at, cutoff) {
                expired += 1;
                continue;
            }
            entries
                .entry(record.id())
                .and_modify(|existing| *existing = earliest(*existing, seen_at))
                .or_insert(seen_at);
        }

        if expired > 0 {
            debug!(expired, "Dropped expired seen-PR records");
        }
        entries
    }

    /// Returns true if `id` has been recorded. Does no I/O.
    pub fn has_seen(&self, id: PrId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Records `id` as seen now and persists the store.
    ///
    /// Returns `false` without touching the existing timestamp if `id` was
    /// already recorded. A failed write is logged and the identifier stays
    /// recorded in memory.
    pub fn mark_seen(&mut self, id: PrId) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        self.entries.insert(id, Some(Utc::now()));
        self.persist_or_log();
        debug!(pr_id = %id, "Marked PR as seen");
        true
    }

    /// Number of recorded identifiers.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the most recent write reached disk.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn backing_path(&self) -> &Path {
        &self.backing_path
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Removes records older than `max_age_days` and persists the result.
    ///
    /// The backing file is re-read so records are judged by their stored
    /// timestamps. Identifiers that are only in memory because an earlier
    /// write failed are kept under the same age rule. Legacy records are always
    /// kept. Returns the number of identifiers removed.
    pub fn prune_expired(&mut self, max_age_days: u32) -> usize {
        let cutoff = Duration::try_days(max_age_days.into())
            .map_or(DateTime::<Utc>::MIN_UTC, cutoff_before);

        let mut retained = match read_seen_file(&self.backing_path) {
            Ok(Some(decoded)) => self.collect_fresh(decoded, cutoff),
            Ok(None) => Entries::new(),
            Err(source) => {
                let err = StoreError::LoadFailure {
                    path: self.backing_path.clone(),
                    source,
                };
                warn!(error = %err, "Pruning in-memory records only");
                Entries::new()
            }
        };

        for (id, seen_at) in &self.entries {
            if !retained.contains_key(id) && is_fresh(*seen_at, cutoff) {
                retained.insert(*id, *seen_at);
            }
        }
        // Ids already dropped from memory stay dropped.
        retained.retain(|id, _| self.entries.contains_key(id));

        let removed = self.entries.len() - retained.len();
        self.entries = retained;
        self.persist_or_log();

        if removed > 0 {
            info!(removed, remaining = self.entries.len(), "Cleaned up old PR entries");
        }
        removed
    }

    /// The entries as file records, sorted by id.
    fn records(&self) -> Vec<SeenRecord> {
        let mut records: Vec<_> = self
            .entries
            .iter()
            .map(|(id, seen_at)| SeenRecord::new(*id, *seen_at))
            .collect();
        records.sort_by_key(SeenRecord::id);
        records
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        let records = self.records();
        match seen_file::save_atomic(&self.backing_path, &records, Utc::now()) {
            Ok(()) => {
                self.durable = true;
                debug!(
                    path = %self.backing_path.display(),
                    count = records.len(),
                    "Saved seen PR IDs to storage"
                );
                Ok(())
            }
            Err(source) => {
                self.durable = false;
                self.remove_temp_file();
                Err(StoreError::PersistFailure {
                    path: self.backing_path.clone(),
                    source,
                })
            }
        }
    }

    fn persist_or_log(&mut self) {
        if let Err(e) = self.persist() {
            error!(error = %e, "Seen PRs are held in memory only until the next successful save");
        }
    }

    fn remove_temp_file(&self) {
        let tmp = temp_path(&self.backing_path);
        match std::fs::remove_file(&tmp) {
            Ok(()) => debug!(path = %tmp.display(), "Removed leftover temp file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %tmp.display(), error = %e, "Failed to remove leftover temp file")
            }
        }
    }
}

/// The instant `window` before now. A window reaching past the earliest
/// representable time expires nothing.
fn cutoff_before(window: Duration) -> DateTime<Utc> {
    Utc::now()
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A record is fresh if it has no timestamp or was seen after `cutoff`.
fn is_fresh(seen_at: Option<DateTime<Utc>>, cutoff: DateTime<Utc>) -> bool {
    seen_at.is_none_or(|t| t > cutoff)
}

/// Combines two timestamps for the same id without ever extending retention.
fn earliest(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        _ => None,
    }
}

/// A store shared between the poll loop and the status endpoint.
///
/// Every operation goes through the one mutex, so the check-insert-persist
/// sequence of `mark_seen` is never interleaved. The lock is held across the
/// file write and fsync, so a status read can wait on a save in progress.
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<SeenEventStore>>,
}

impl SharedStore {
    pub fn new(store: SeenEventStore) -> Self {
        SharedStore {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Locks the store. A panic while holding the lock cannot leave the entry
    /// map half-updated, so a poisoned lock is recovered.
    pub fn lock(&self) -> MutexGuard<'_, SeenEventStore> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn has_seen(&self, id: PrId) -> bool {
        self.lock().has_seen(id)
    }

    pub fn mark_seen(&self, id: PrId) -> bool {
        self.lock().mark_seen(id)
    }

    pub fn count(&self) -> usize {
        self.lock().count()
    }

    pub fn prune_expired(&self, max_age_days: u32) -> usize {
        self.lock().prune_expired(max_age_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn days_ago(days: i64) -> String {
        (Utc::now() - Duration::days(days)).to_rfc3339()
    }

    fn write_json(path: &Path, value: serde_json::Value) {
        std::fs::write(path, serde_json::to_vec(&value).unwrap()).unwrap();
    }

    fn stored_ids(path: &Path) -> HashSet<PrId> {
        read_seen_file(path)
            .unwrap()
            .unwrap()
            .records
            .iter()
            .map(SeenRecord::id)
            .collect()
    }

    fn stored_records(path: &Path) -> Vec<SeenRecord> {
        read_seen_file(path).unwrap().unwrap().records
    }

    // ─── Property tests ───

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Marking an id twice changes nothing the second time.
        #[test]
        fn mark_seen_is_idempotent(ids in prop::collection::vec(any::<u64>(), 1..20)) {
            let dir = tempdir().unwrap();
            let mut store = SeenEventStore::open(dir.path().join("seen_prs.json"));

            for id in ids {
                store.mark_seen(PrId(id));
                let count = store.count();
                prop_assert!(!store.mark_seen(PrId(id)));
                prop_assert_eq!(store.count(), count);
                prop_assert!(store.has_seen(PrId(id)));
            }
        }

        /// A reopened store sees exactly what the previous one recorded.
        #[test]
        fn reopen_preserves_seen_ids(ids in prop::collection::hash_set(any::<u64>(), 0..20)) {
            let dir = tempdir().unwrap();
            let path = dir.path().join("seen_prs.json");

            let mut store = SeenEventStore::open(&path);
            for id in &ids {
                store.mark_seen(PrId(*id));
            }

            let reopened = SeenEventStore::open(&path);
            prop_assert_eq!(reopened.count(), ids.len());
            for id in &ids {
                prop_assert!(reopened.has_seen(PrId(*id)));
            }
        }

        /// Legacy bare ids survive a load regardless of what surrounds them.
        #[test]
        fn legacy_ids_always_load(
            legacy in prop::collection::hash_set(0u64..1000, 0..10),
            stale in prop::collection::hash_set(1000u64..2000, 0..10),
        ) {
            let dir = tempdir().unwrap();
            let path = dir.path().join("seen_prs.json");
            let mut prs: Vec<serde_json::Value> =
                legacy.iter().map(|id| serde_json::json!(id)).collect();
            prs.extend(
                stale
                    .iter()
                    .map(|id| serde_json::json!({ "id": id, "timestamp": days_ago(365) })),
            );
            write_json(&path, serde_json::json!({ "version": "1.0", "prs": prs }));

            let store = SeenEventStore::open(&path);

            prop_assert_eq!(store.count(), legacy.len());
            for id in &legacy {
                prop_assert!(store.has_seen(PrId(*id)));
            }
        }
    }

    // ─── Unit tests ───

    #[test]
    fn missing_file_starts_empty_without_creating_it() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");

        let store = SeenEventStore::open(&path);

        assert_eq!(store.count(), 0);
        assert!(store.is_durable());
        assert!(!path.exists());
    }

    #[test]
    fn mark_then_remark_scenario() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        let mut store = SeenEventStore::open(&path);

        assert!(store.mark_seen(PrId(101)));
        assert!(store.has_seen(PrId(101)));
        assert_eq!(store.count(), 1);

        assert!(!store.mark_seen(PrId(101)));
        assert_eq!(store.count(), 1);
        assert_eq!(stored_ids(&path), HashSet::from([PrId(101)]));
    }

    #[test]
    fn remark_keeps_original_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        let first_seen = days_ago(10);
        write_json(
            &path,
            serde_json::json!({ "prs": [{ "id": 1, "timestamp": first_seen }] }),
        );

        let mut store = SeenEventStore::open(&path);
        store.mark_seen(PrId(1));
        store.mark_seen(PrId(2));

        let records = stored_records(&path);
        let one = records.iter().find(|r| r.id() == PrId(1)).unwrap();
        assert_eq!(
            one.seen_at(),
            Some(seen_file::parse_timestamp(&first_seen).unwrap())
        );
    }

    #[test]
    fn load_drops_expired_and_rewrites_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        write_json(
            &path,
            serde_json::json!({
                "version": "1.0",
                "last_updated": days_ago(2),
                "prs": [
                    { "id": 5, "timestamp": days_ago(40) },
                    { "id": 6, "timestamp": days_ago(2) },
                    7
                ]
            }),
        );

        let store = SeenEventStore::open_with_retention(&path, Duration::days(30));

        assert!(!store.has_seen(PrId(5)));
        assert!(store.has_seen(PrId(6)));
        assert!(store.has_seen(PrId(7)));
        assert_eq!(stored_ids(&path), HashSet::from([PrId(6), PrId(7)]));
        assert!(stored_records(&path).contains(&SeenRecord::Legacy(PrId(7))));
    }

    #[test]
    fn load_without_drops_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        let original = serde_json::json!({
            "version": "1.0",
            "last_updated": "2020-01-01T00:00:00Z",
            "prs": [{ "id": 6, "timestamp": days_ago(1) }, 7]
        });
        write_json(&path, original.clone());
        let before = std::fs::read(&path).unwrap();

        let store = SeenEventStore::open(&path);

        assert_eq!(store.count(), 2);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn numeric_version_still_loads_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        write_json(&path, serde_json::json!({ "version": 2, "prs": [1, 2, 3] }));

        let mut store = SeenEventStore::open(&path);
        assert_eq!(store.count(), 3);

        store.mark_seen(PrId(4));
        assert_eq!(
            stored_ids(&path),
            HashSet::from([PrId(1), PrId(2), PrId(3), PrId(4)])
        );
    }

    #[test]
    fn corrupt_file_yields_empty_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        std::fs::write(&path, "{ this is not json").unwrap();

        let mut store = SeenEventStore::open(&path);
        assert_eq!(store.count(), 0);

        // The next write replaces the corrupt file.
        store.mark_seen(PrId(3));
        assert_eq!(stored_ids(&path), HashSet::from([PrId(3)]));
    }

    #[test]
    fn unreadable_path_yields_empty_store() {
        let dir = tempdir().unwrap();
        // A directory where the file should be cannot be read as a file.
        let path = dir.path().join("seen_prs.json");
        std::fs::create_dir(&path).unwrap();

        let store = SeenEventStore::open(&path);

        assert_eq!(store.count(), 0);
    }

    #[test]
    fn malformed_records_are_skipped_and_pruned_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        write_json(
            &path,
            serde_json::json!({
                "prs": [
                    { "id": 1, "timestamp": "garbage" },
                    "two",
                    { "id": 3, "timestamp": days_ago(1) }
                ]
            }),
        );

        let store = SeenEventStore::open(&path);

        assert_eq!(store.count(), 1);
        assert!(store.has_seen(PrId(3)));
        assert_eq!(stored_ids(&path), HashSet::from([PrId(3)]));
    }

    #[test]
    fn duplicate_records_keep_earliest_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        let older = days_ago(20);
        write_json(
            &path,
            serde_json::json!({
                "prs": [
                    { "id": 1, "timestamp": days_ago(1) },
                    { "id": 1, "timestamp": older },
                    { "id": 2, "timestamp": days_ago(1) },
                    2
                ]
            }),
        );

        let store = SeenEventStore::open(&path);

        assert_eq!(store.count(), 2);
        let records = stored_records(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].seen_at(),
            Some(seen_file::parse_timestamp(&older).unwrap())
        );
        assert_eq!(records[1], SeenRecord::Legacy(PrId(2)));
    }

    #[test]
    fn persist_failure_keeps_id_in_memory() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("seen_prs.json");

        let mut store = SeenEventStore::open(&path);
        assert!(store.mark_seen(PrId(42)));

        assert!(store.has_seen(PrId(42)));
        assert_eq!(store.count(), 1);
        assert!(!store.is_durable());
    }

    #[test]
    fn failed_publish_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        // Renaming a file over a non-empty directory fails after the temp
        // file has been written.
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("occupied"), "x").unwrap();

        let mut store = SeenEventStore::open(&path);
        store.mark_seen(PrId(1));

        assert!(store.has_seen(PrId(1)));
        assert!(!store.is_durable());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn durability_recovers_after_later_success() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("state");
        std::fs::write(&blocker, "").unwrap();
        let path = blocker.join("seen_prs.json");

        let mut store = SeenEventStore::open(&path);
        store.mark_seen(PrId(1));
        assert!(!store.is_durable());

        std::fs::remove_file(&blocker).unwrap();
        store.mark_seen(PrId(2));

        assert!(store.is_durable());
        assert_eq!(stored_ids(&path), HashSet::from([PrId(1), PrId(2)]));
    }

    #[test]
    fn interrupted_publish_leaves_previous_state_loadable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        let mut store = SeenEventStore::open(&path);
        store.mark_seen(PrId(1));

        // A half-written temp file from a crash mid-save.
        std::fs::write(temp_path(&path), "{\"version\": \"1.0\", \"prs\": [1, 2").unwrap();

        let reopened = SeenEventStore::open(&path);
        assert_eq!(reopened.count(), 1);
        assert!(reopened.has_seen(PrId(1)));
        assert!(!reopened.has_seen(PrId(2)));
    }

    #[test]
    fn prune_expired_uses_stored_timestamps() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        write_json(
            &path,
            serde_json::json!({
                "prs": [
                    { "id": 1, "timestamp": days_ago(10) },
                    { "id": 2, "timestamp": days_ago(3) },
                    9
                ]
            }),
        );
        let mut store = SeenEventStore::open(&path);
        assert_eq!(store.count(), 3);

        let removed = store.prune_expired(7);

        assert_eq!(removed, 1);
        assert!(!store.has_seen(PrId(1)));
        assert!(store.has_seen(PrId(2)));
        assert!(store.has_seen(PrId(9)));
        assert_eq!(stored_ids(&path), HashSet::from([PrId(2), PrId(9)]));
    }

    #[test]
    fn prune_expired_keeps_ids_not_yet_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        let mut store = SeenEventStore::open(&path);
        store.mark_seen(PrId(1));

        // Simulate a write that never landed.
        std::fs::remove_file(&path).unwrap();
        store.entries.insert(PrId(2), Some(Utc::now()));

        let removed = store.prune_expired(DEFAULT_RETENTION_DAYS);

        assert_eq!(removed, 0);
        assert_eq!(store.count(), 2);
        assert_eq!(stored_ids(&path), HashSet::from([PrId(1), PrId(2)]));
    }

    #[test]
    fn prune_expired_with_corrupt_file_prunes_memory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        let mut store = SeenEventStore::open(&path);
        store.mark_seen(PrId(1));
        store
            .entries
            .insert(PrId(2), Some(Utc::now() - Duration::days(60)));
        std::fs::write(&path, "corrupt").unwrap();

        let removed = store.prune_expired(30);

        assert_eq!(removed, 1);
        assert!(store.has_seen(PrId(1)));
        assert_eq!(stored_ids(&path), HashSet::from([PrId(1)]));
    }

    #[test]
    fn prune_expired_with_huge_window_keeps_everything() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        write_json(
            &path,
            serde_json::json!({
                "prs": [{ "id": 1, "timestamp": "1970-01-01T00:00:00Z" }, 2]
            }),
        );
        let mut store = SeenEventStore::open_with_retention(&path, Duration::MAX);

        assert_eq!(store.prune_expired(u32::MAX), 0);
        assert_eq!(store.count(), 2);
        assert_eq!(stored_ids(&path), HashSet::from([PrId(1), PrId(2)]));
    }

    #[test]
    fn open_with_retention_beyond_calendar_range_loads_old_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("seen_prs.json");
        write_json(
            &path,
            serde_json::json!({
                "prs": [{ "id": 5, "timestamp": days_ago(365 * 50) }]
            }),
        );

        let store = SeenEventStore::open_with_retention(&path, Duration::days(100_000_000));

        assert!(store.has_seen(PrId(5)));
    }

    #[test]
    fn shared_store_serializes_access() {
        let dir = tempdir().unwrap();
        let shared = SharedStore::new(SeenEventStore::open(dir.path().join("seen_prs.json")));

        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for i in 0..10u64 {
                        shared.mark_seen(PrId(t * 100 + i));
                        shared.mark_seen(PrId(i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Thread 0 already marks 0..10, so the shared ids add nothing.
        assert_eq!(shared.count(), 40);
        let reopened = SeenEventStore::open(shared.lock().backing_path());
        assert_eq!(reopened.count(), 40);
    }
}
