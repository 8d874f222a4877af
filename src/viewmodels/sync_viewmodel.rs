// ============================================================================
// SYNC VIEWMODEL - Local/remote reconciliation of tracked accounts
// ============================================================================
// Union-only merge: nothing is ever removed here. Every handle the remote
// is missing gets written back through the existence-checked add.
// ============================================================================

use std::collections::HashSet;

use futures::future::join_all;

use crate::error::TrackerError;
use crate::models::TrackedAccountSet;
use crate::services::RemoteDirectory;
use crate::state::TrackedState;

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport {
    /// Local set after the pass
    pub merged: TrackedAccountSet,
    /// Handles written back to the remote directory
    pub written: Vec<String>,
    /// Write-backs that failed, with the error text
    pub failed: Vec<(String, String)>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Clone)]
pub struct SyncViewModel {
    tracked: TrackedState,
    directory: RemoteDirectory,
}

impl SyncViewModel {
    pub fn new(tracked: TrackedState, directory: RemoteDirectory) -> Self {
        Self { tracked, directory }
    }

    /// One reconciliation pass for `uid`.
    ///
    /// Fails only if the remote set cannot be read, in which case local
    /// state is untouched. Write-back failures end up in the report.
    pub async fn reconcile(&self, uid: &str) -> Result<ReconcileReport, TrackerError> {
        log::info!("🔄 [Sync] Reconciling tracked accounts for {}", uid);

        let remote_handles = self.directory.tracked_accounts(uid).await.map_err(|e| {
            log::error!("❌ [Sync] Could not read remote tracked accounts: {}", e);
            e
        })?;
        let remote: HashSet<String> = remote_handles.iter().cloned().collect();

        // Snapshot after the await so adds made meanwhile are kept
        let local = self.tracked.snapshot();
        let merged = local.union(remote_handles);
        if merged != local {
            self.tracked.replace(merged.clone());
        }

        let missing: Vec<String> = merged
            .missing_from(&remote)
            .into_iter()
            .map(str::to_string)
            .collect();
        let results = join_all(
            missing
                .iter()
                .map(|handle| self.directory.add_tracked_account(uid, handle)),
        )
        .await;

        let mut report = ReconcileReport {
            merged,
            written: Vec::new(),
            failed: Vec::new(),
        };
        for (handle, result) in missing.into_iter().zip(results) {
            match result {
                Ok(true) => report.written.push(handle),
                Ok(false) => {}
                Err(e) => {
                    log::warn!("⚠️ [Sync] Write-back of @{} failed: {}", handle, e);
                    report.failed.push((handle, e.to_string()));
                }
            }
        }

        log::info!(
            "✅ [Sync] {} tracked, {} written back, {} failed",
            report.merged.len(),
            report.written.len(),
            report.failed.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryDocumentStore;
    use crate::utils::storage::{load_from_storage, MemoryStorage};
    use futures::executor::block_on;
    use std::rc::Rc;

    struct Fixture {
        sync: SyncViewModel,
        tracked: TrackedState,
        directory: RemoteDirectory,
        store: MemoryDocumentStore,
        storage: Rc<MemoryStorage>,
    }

    fn fixture(local: &[&str], remote: &[&str]) -> Fixture {
        let store = MemoryDocumentStore::new();
        let directory = RemoteDirectory::new(Rc::new(store.clone()));
        for handle in remote {
            block_on(directory.add_tracked_account("u1", handle)).unwrap();
        }
        let storage = Rc::new(MemoryStorage::new());
        let tracked = TrackedState::load(storage.clone(), "localAccounts");
        for handle in local {
            tracked.add(handle);
        }
        let sync = SyncViewModel::new(tracked.clone(), directory.clone());
        Fixture { sync, tracked, directory, store, storage }
    }

    fn set(handles: &[&str]) -> TrackedAccountSet {
        handles.iter().copied().collect()
    }

    fn remote(f: &Fixture) -> HashSet<String> {
        block_on(f.directory.tracked_accounts("u1")).unwrap().into_iter().collect()
    }

    #[test]
    fn local_and_remote_meet_in_the_union() {
        let f = fixture(&["x"], &["y"]);
        let report = block_on(f.sync.reconcile("u1")).unwrap();

        assert_eq!(f.tracked.snapshot(), set(&["x", "y"]));
        assert_eq!(report.merged, set(&["x", "y"]));
        assert_eq!(report.written, vec!["x".to_string()]);
        let expected: HashSet<String> = ["x", "y"].iter().map(|h| h.to_string()).collect();
        assert_eq!(remote(&f), expected);
    }

    #[test]
    fn merged_set_is_persisted() {
        let f = fixture(&["x"], &["y"]);
        block_on(f.sync.reconcile("u1")).unwrap();
        let stored: TrackedAccountSet = load_from_storage(f.storage.as_ref(), "localAccounts").unwrap().unwrap();
        assert_eq!(stored, set(&["x", "y"]));
    }

    #[test]
    fn second_pass_writes_nothing() {
        let f = fixture(&["a", "b"], &["b", "c"]);
        let first = block_on(f.sync.reconcile("u1")).unwrap();
        let writes = f.store.writes().len();

        let second = block_on(f.sync.reconcile("u1")).unwrap();
        assert_eq!(second.merged, first.merged);
        assert!(second.written.is_empty());
        assert_eq!(f.store.writes().len(), writes);
    }

    #[test]
    fn already_in_sync_does_nothing() {
        let f = fixture(&["a"], &["a"]);
        let report = block_on(f.sync.reconcile("u1")).unwrap();
        assert!(report.written.is_empty());
        assert!(report.is_clean());
        assert_eq!(f.store.writes().len(), 1);
    }

    #[test]
    fn write_back_failures_are_reported_not_fatal() {
        let f = fixture(&["x", "z"], &["y"]);
        f.store.set_fail_writes(true);

        let report = block_on(f.sync.reconcile("u1")).unwrap();
        assert_eq!(f.tracked.snapshot(), set(&["x", "z", "y"]));
        let failed: Vec<&str> = report.failed.iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(failed, vec!["x", "z"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn remote_only_entries_come_down() {
        let f = fixture(&[], &["test_a", "test_b"]);
        let report = block_on(f.sync.reconcile("u1")).unwrap();
        assert_eq!(f.tracked.snapshot(), set(&["test_a", "test_b"]));
        assert!(report.written.is_empty());
    }
}
