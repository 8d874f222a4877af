// ============================================================================
// TRACKING VIEWMODEL - Search and optimistic add/remove
// ============================================================================
// Local changes apply synchronously. The remote phase is handed back as a
// future so the caller decides where it runs; it never rolls local state back.
// A signed-in lookup hit also refreshes the shared account cache in the
// background.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::error::TrackerError;
use crate::models::{normalize_handle, AccountRecord};
use crate::services::{AccountLookup, RemoteDirectory};
use crate::state::{AuthState, ReactiveState, TrackedState};
use crate::utils::Spawner;

pub const ADD_FAILED_STATUS: &str = "Failed to update remote directory (add).";
pub const REMOVE_FAILED_STATUS: &str = "Failed to update remote directory (remove).";

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Input was blank after normalisation; nothing was looked up
    Empty,
    Found(AccountRecord),
    NotFound { message: String },
}

impl SearchOutcome {
    pub fn not_found(handle: &str) -> Self {
        SearchOutcome::NotFound {
            message: format!(
                "Account \"@{}\" not found or is not a business/creator account.",
                handle
            ),
        }
    }
}

/// What the remote phase of an add/remove did
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteOutcome {
    Applied,
    /// The existence check found the remote already matching
    AlreadyInSync,
    /// No signed-in user
    Skipped,
    Failed(String),
}

/// Result of an add/remove: the local part and the pending remote part
pub struct TrackChange {
    pub applied: bool,
    pub remote: Option<LocalBoxFuture<'static, RemoteOutcome>>,
}

impl TrackChange {
    fn unchanged() -> Self {
        Self {
            applied: false,
            remote: None,
        }
    }

    /// Run the remote phase on `spawner`, discarding its outcome
    pub fn spawn_remote(self, spawner: &Spawner) -> bool {
        if let Some(remote) = self.remote {
            spawner(remote.map(|_| ()).boxed_local());
        }
        self.applied
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Add,
    Remove,
}

impl Direction {
    fn failure_status(self) -> &'static str {
        match self {
            Direction::Add => ADD_FAILED_STATUS,
            Direction::Remove => REMOVE_FAILED_STATUS,
        }
    }
}

#[derive(Clone)]
pub struct TrackingViewModel {
    tracked: TrackedState,
    auth: AuthState,
    directory: RemoteDirectory,
    lookup: Rc<dyn AccountLookup>,
    spawner: Spawner,
    /// True while a lookup is pending ("Searching...")
    pub searching: ReactiveState<bool>,
    /// Latest search result (None before the first search)
    pub result: ReactiveState<Option<SearchOutcome>>,
    /// Generic status line for remote failures
    pub status: ReactiveState<Option<String>>,
    search_generation: Rc<Cell<u64>>,
}

impl TrackingViewModel {
    pub fn new(
        tracked: TrackedState,
        auth: AuthState,
        directory: RemoteDirectory,
        lookup: Rc<dyn AccountLookup>,
        spawner: Spawner,
    ) -> Self {
        Self {
            tracked,
            auth,
            directory,
            lookup,
            spawner,
            searching: ReactiveState::new(false),
            result: ReactiveState::new(None),
            status: ReactiveState::new(None),
            search_generation: Rc::new(Cell::new(0)),
        }
    }

    pub fn tracked(&self) -> &TrackedState {
        &self.tracked
    }

    pub fn is_tracked(&self, handle: &str) -> bool {
        self.tracked.contains(handle)
    }

    /// Look up the normalised input. A search started later wins: an older
    /// one still resolves but no longer touches `result` or `searching`.
    pub async fn search(&self, input: &str) -> SearchOutcome {
        let generation = self.search_generation.get() + 1;
        self.search_generation.set(generation);

        let Some(handle) = normalize_handle(input) else {
            self.searching.set(false);
            self.result.set(Some(SearchOutcome::Empty));
            return SearchOutcome::Empty;
        };

        self.searching.set(true);
        log::info!("🔍 [Tracking] Searching @{}", handle);
        let outcome = match self.lookup.lookup(&handle).await {
            Some(record) => SearchOutcome::Found(record),
            None => SearchOutcome::not_found(&handle),
        };

        if self.search_generation.get() == generation {
            self.searching.set(false);
            self.result.set(Some(outcome.clone()));
        }
        if let SearchOutcome::Found(record) = &outcome {
            self.refresh_cache(record);
        }
        outcome
    }

    /// Merge `record` into `instagramAccounts/{username}`. Anonymous hits are not cached.
    fn refresh_cache(&self, record: &AccountRecord) {
        if self.auth.uid().is_none() {
            return;
        }
        let directory = self.directory.clone();
        let record = record.clone();
        (self.spawner)(
            async move {
                if let Err(e) = directory.update_account_cache(&record).await {
                    log::warn!("⚠️ [Tracking] Could not refresh cache for @{}: {}", record.username, e);
                }
            }
            .boxed_local(),
        );
    }

    /// Track `record`. No-op (and no remote call) if already tracked.
    pub fn add_account(&self, record: &AccountRecord) -> TrackChange {
        if !self.tracked.add(&record.username) {
            return TrackChange::unchanged();
        }

        let Some(uid) = self.auth.uid() else {
            return skipped();
        };

        let directory = self.directory.clone();
        let record = record.clone();
        let remote = async move {
            directory.update_account_cache(&record).await?;
            directory.add_tracked_account(&uid, &record.username).await
        };
        self.finish(Direction::Add, remote)
    }

    /// Stop tracking `handle`. No-op (and no remote call) if not tracked.
    pub fn remove_account(&self, handle: &str) -> TrackChange {
        if !self.tracked.remove(handle) {
            return TrackChange::unchanged();
        }

        let Some(uid) = self.auth.uid() else {
            return skipped();
        };

        let directory = self.directory.clone();
        let handle = handle.to_string();
        let remote = async move { directory.remove_tracked_account(&uid, &handle).await };
        self.finish(Direction::Remove, remote)
    }

    /// The +/- button: remove when tracked, add otherwise
    pub fn toggle(&self, record: &AccountRecord) -> TrackChange {
        if self.is_tracked(&record.username) {
            self.remove_account(&record.username)
        } else {
            self.add_account(record)
        }
    }

    pub fn clear_status(&self) {
        self.status.set(None);
    }

    fn finish<F>(&self, direction: Direction, remote: F) -> TrackChange
    where
        F: std::future::Future<Output = Result<bool, TrackerError>> + 'static,
    {
        let status = self.status.clone();
        let remote = async move {
            match remote.await {
                Ok(true) => RemoteOutcome::Applied,
                Ok(false) => RemoteOutcome::AlreadyInSync,
                Err(e) => {
                    log::error!("❌ [Tracking] Remote update failed: {}", e);
                    status.set(Some(direction.failure_status().to_string()));
                    RemoteOutcome::Failed(e.to_string())
                }
            }
        };

        TrackChange {
            applied: true,
            remote: Some(remote.boxed_local()),
        }
    }
}

fn skipped() -> TrackChange {
    TrackChange {
        applied: true,
        remote: Some(future::ready(RemoteOutcome::Skipped).boxed_local()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionUser;
    use crate::services::{MemoryDocumentStore, MockAccountLookup};
    use crate::utils::spawn::pool_spawner;
    use crate::utils::storage::MemoryStorage;
    use futures::executor::{block_on, LocalPool};
    use std::time::Duration;

    struct Fixture {
        vm: TrackingViewModel,
        auth: AuthState,
        store: MemoryDocumentStore,
        directory: RemoteDirectory,
        pool: LocalPool,
    }

    fn fixture() -> Fixture {
        let pool = LocalPool::new();
        let store = MemoryDocumentStore::new();
        let directory = RemoteDirectory::new(Rc::new(store.clone()));
        let auth = AuthState::new();
        let tracked = TrackedState::load(Rc::new(MemoryStorage::new()), "localAccounts");
        let lookup = Rc::new(MockAccountLookup::new(Duration::ZERO));
        let vm = TrackingViewModel::new(tracked, auth.clone(), directory.clone(), lookup, pool_spawner(&pool));
        Fixture { vm, auth, store, directory, pool }
    }

    fn pending_vm(f: &Fixture) -> TrackingViewModel {
        TrackingViewModel::new(
            f.vm.tracked().clone(),
            f.auth.clone(),
            f.directory.clone(),
            Rc::new(PendingLookup),
            pool_spawner(&f.pool),
        )
    }

    fn record(username: &str) -> AccountRecord {
        MockAccountLookup::new(Duration::ZERO).find(username).unwrap()
    }

    #[test]
    fn search_normalises_the_handle() {
        let f = fixture();
        match block_on(f.vm.search("  @test_a ")) {
            SearchOutcome::Found(record) => assert_eq!(record.username, "test_a"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!f.vm.searching.get());
    }

    #[test]
    fn search_miss_carries_the_message() {
        let f = fixture();
        let outcome = block_on(f.vm.search("nobody"));
        assert_eq!(
            outcome,
            SearchOutcome::NotFound {
                message: "Account \"@nobody\" not found or is not a business/creator account.".to_string()
            }
        );
        assert_eq!(f.vm.result.get(), Some(outcome));
    }

    #[test]
    fn blank_search_does_nothing() {
        let f = fixture();
        assert_eq!(block_on(f.vm.search("  @ ")), SearchOutcome::Empty);
        assert!(!f.vm.searching.get());
    }

    #[test]
    fn signed_in_search_hit_refreshes_the_cache() {
        let mut f = fixture();
        f.auth.set_user(Some(SessionUser::new("u1")));

        assert!(matches!(block_on(f.vm.search("test_a")), SearchOutcome::Found(_)));
        f.pool.run_until_stalled();

        let cached = block_on(f.directory.get_account_cache("test_a")).unwrap().unwrap();
        assert_eq!(cached.record, record("test_a"));
        assert!(block_on(f.directory.tracked_accounts("u1")).unwrap().is_empty());
    }

    #[test]
    fn anonymous_or_missed_searches_write_nothing() {
        let mut f = fixture();
        block_on(f.vm.search("test_a"));
        f.auth.set_user(Some(SessionUser::new("u1")));
        block_on(f.vm.search("nobody"));
        f.pool.run_until_stalled();

        assert!(f.store.writes().is_empty());
        assert!(block_on(f.directory.get_account_cache("test_a")).unwrap().is_none());
    }

    struct PendingLookup;

    impl AccountLookup for PendingLookup {
        fn lookup(&self, _handle: &str) -> LocalBoxFuture<'_, Option<AccountRecord>> {
            future::pending().boxed_local()
        }
    }

    #[test]
    fn searching_flag_is_set_while_pending() {
        let f = fixture();
        let vm = pending_vm(&f);

        let mut pending = vm.search("test_b").boxed_local();
        assert!(pending.as_mut().now_or_never().is_none());
        assert!(vm.searching.get());
        assert!(vm.result.get().is_none());
    }

    #[test]
    fn newer_search_owns_the_result() {
        let f = fixture();
        let vm = pending_vm(&f);

        let mut stale = vm.search("test_a").boxed_local();
        assert!(stale.as_mut().now_or_never().is_none());
        assert_eq!(block_on(vm.search("")), SearchOutcome::Empty);
        assert!(!vm.searching.get());
        assert_eq!(vm.result.get(), Some(SearchOutcome::Empty));
    }

    #[test]
    fn signed_in_add_reaches_remote() {
        let f = fixture();
        f.auth.set_user(Some(SessionUser::new("u1")));

        let change = f.vm.add_account(&record("test_a"));
        assert!(change.applied);
        assert!(f.vm.is_tracked("test_a"));
        assert_eq!(block_on(change.remote.unwrap()), RemoteOutcome::Applied);

        assert_eq!(block_on(f.directory.tracked_accounts("u1")).unwrap(), vec!["test_a"]);
        assert!(block_on(f.directory.get_account_cache("test_a")).unwrap().is_some());
    }

    #[test]
    fn adding_twice_is_a_local_noop() {
        let f = fixture();
        f.auth.set_user(Some(SessionUser::new("u1")));
        block_on(f.vm.add_account(&record("test_a")).remote.unwrap());
        let writes = f.store.writes().len();

        let again = f.vm.add_account(&record("test_a"));
        assert!(!again.applied);
        assert!(again.remote.is_none());
        assert_eq!(f.store.writes().len(), writes);
        assert_eq!(f.vm.tracked().len(), 1);
    }

    #[test]
    fn removing_untracked_is_a_local_noop() {
        let f = fixture();
        let change = f.vm.remove_account("test_a");
        assert!(!change.applied);
        assert!(change.remote.is_none());
    }

    #[test]
    fn anonymous_changes_skip_remote() {
        let f = fixture();
        let change = f.vm.add_account(&record("test_b"));
        assert!(change.applied);
        assert_eq!(block_on(change.remote.unwrap()), RemoteOutcome::Skipped);
        assert!(f.store.writes().is_empty());
    }

    #[test]
    fn remote_failure_keeps_local_add_and_sets_status() {
        let f = fixture();
        f.auth.set_user(Some(SessionUser::new("u1")));
        f.store.set_fail_writes(true);

        let change = f.vm.add_account(&record("test_a"));
        let outcome = block_on(change.remote.unwrap());
        assert!(matches!(outcome, RemoteOutcome::Failed(_)));
        assert!(f.vm.is_tracked("test_a"));
        assert_eq!(f.vm.status.get().as_deref(), Some(ADD_FAILED_STATUS));
    }

    #[test]
    fn remote_failure_on_remove_sets_remove_status() {
        let f = fixture();
        f.auth.set_user(Some(SessionUser::new("u1")));
        block_on(f.vm.add_account(&record("test_a")).remote.unwrap());
        f.store.set_fail_writes(true);

        let outcome = block_on(f.vm.remove_account("test_a").remote.unwrap());
        assert!(matches!(outcome, RemoteOutcome::Failed(_)));
        assert!(!f.vm.is_tracked("test_a"));
        assert_eq!(f.vm.status.get().as_deref(), Some(REMOVE_FAILED_STATUS));
    }

    #[test]
    fn remote_already_in_sync_is_reported() {
        let f = fixture();
        f.auth.set_user(Some(SessionUser::new("u1")));
        block_on(f.directory.add_tracked_account("u1", "test_c")).unwrap();

        let outcome = block_on(f.vm.add_account(&record("test_c")).remote.unwrap());
        assert_eq!(outcome, RemoteOutcome::AlreadyInSync);
    }

    #[test]
    fn toggle_flips_membership() {
        let f = fixture();
        let record = record("rutgersblueprint");
        assert!(f.vm.toggle(&record).applied);
        assert!(f.vm.is_tracked("rutgersblueprint"));
        assert!(f.vm.toggle(&record).applied);
        assert!(!f.vm.is_tracked("rutgersblueprint"));
    }

    #[test]
    fn spawned_remote_phase_runs_on_the_pool() {
        let f = fixture();
        f.auth.set_user(Some(SessionUser::new("u1")));
        let mut pool = futures::executor::LocalPool::new();
        let spawner = crate::utils::spawn::pool_spawner(&pool);

        assert!(f.vm.add_account(&record("test_b")).spawn_remote(&spawner));
        assert!(block_on(f.directory.tracked_accounts("u1")).unwrap().is_empty());
        pool.run_until_stalled();
        assert_eq!(block_on(f.directory.tracked_accounts("u1")).unwrap(), vec!["test_b"]);
    }
}
