// ============================================================================
// SESSION VIEWMODEL - Session gate: auth transitions, mirror, reconciliation
// ============================================================================
// mount() starts observing the identity provider. The first signed-in
// observation of a mount spawns one reconciliation pass; later sign-ins in
// the same mount do not. unmount() drops every subscription.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::future::FutureExt;

use crate::error::TrackerError;
use crate::models::SessionUser;
use crate::services::{IdentityProvider, RemoteDirectory};
use crate::state::{AuthState, ReactiveState, Subscription, TrackedState};
use crate::utils::Spawner;
use crate::viewmodels::sync_viewmodel::{ReconcileReport, SyncViewModel};

struct GateInner {
    identity: Rc<dyn IdentityProvider>,
    auth: AuthState,
    directory: RemoteDirectory,
    sync: SyncViewModel,
    spawner: Spawner,
    mounted: Cell<bool>,
    reconciled: Cell<bool>,
    remote_accounts: ReactiveState<Vec<String>>,
    last_report: ReactiveState<Option<ReconcileReport>>,
    session_subscription: RefCell<Option<Subscription>>,
    /// Mirror of `users/{uid}/trackedAccounts`, keyed by uid
    remote_subscription: RefCell<Option<(String, Subscription)>>,
}

#[derive(Clone)]
pub struct SessionGate {
    inner: Rc<GateInner>,
}

impl SessionGate {
    pub fn new(
        identity: Rc<dyn IdentityProvider>,
        auth: AuthState,
        tracked: TrackedState,
        directory: RemoteDirectory,
        spawner: Spawner,
    ) -> Self {
        let sync = SyncViewModel::new(tracked, directory.clone());
        Self {
            inner: Rc::new(GateInner {
                identity,
                auth,
                directory,
                sync,
                spawner,
                mounted: Cell::new(false),
                reconciled: Cell::new(false),
                remote_accounts: ReactiveState::new(Vec::new()),
                last_report: ReactiveState::new(None),
                session_subscription: RefCell::new(None),
                remote_subscription: RefCell::new(None),
            }),
        }
    }

    pub fn auth(&self) -> &AuthState {
        &self.inner.auth
    }

    /// Remote tracked handles of the signed-in user (empty when anonymous)
    pub fn remote_accounts(&self) -> ReactiveState<Vec<String>> {
        self.inner.remote_accounts.clone()
    }

    /// Report of this mount's reconciliation pass, once it finished
    pub fn last_report(&self) -> ReactiveState<Option<ReconcileReport>> {
        self.inner.last_report.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    pub fn has_reconciled(&self) -> bool {
        self.inner.reconciled.get()
    }

    pub fn mount(&self) {
        if self.inner.mounted.replace(true) {
            return;
        }
        self.inner.reconciled.set(false);
        log::info!("🚪 [Session] Gate mounted");

        let weak: Weak<GateInner> = Rc::downgrade(&self.inner);
        let subscription = self.inner.identity.observe(Rc::new(move |user: Option<SessionUser>| {
            if let Some(inner) = weak.upgrade() {
                if inner.mounted.get() {
                    on_session(&inner, user);
                }
            }
        }));
        *self.inner.session_subscription.borrow_mut() = Some(subscription);
    }

    pub fn unmount(&self) {
        if !self.inner.mounted.replace(false) {
            return;
        }
        self.inner.session_subscription.borrow_mut().take();
        self.inner.remote_subscription.borrow_mut().take();
        log::info!("🚪 [Session] Gate unmounted");
    }

    /// Provider sign-in, then make sure `users/{uid}` exists.
    ///
    /// The returned user (and its ID token) goes into `AuthState` before any
    /// remote write, without waiting for the session observer.
    pub async fn sign_in(&self) -> Result<SessionUser, TrackerError> {
        let user = self.inner.identity.sign_in().await.map_err(|e| {
            log::error!("❌ [Session] Sign-in failed: {}", e);
            e
        })?;
        log::info!("🔐 [Session] Signed in as {}", user.uid);
        self.inner.auth.set_user(Some(user.clone()));

        if let Err(e) = self.inner.directory.ensure_user_document(&user).await {
            log::warn!("⚠️ [Session] Could not create user document: {}", e);
        }
        Ok(user)
    }

    /// Provider sign-out. Local tracked accounts stay.
    pub async fn sign_out(&self) -> Result<(), TrackerError> {
        self.inner.identity.sign_out().await.map_err(|e| {
            log::error!("❌ [Session] Sign-out failed: {}", e);
            e
        })?;
        log::info!("👋 [Session] Signed out");
        Ok(())
    }
}

fn on_session(inner: &Rc<GateInner>, user: Option<SessionUser>) {
    inner.auth.set_user(user.clone());

    let Some(user) = user else {
        if inner.remote_subscription.borrow_mut().take().is_some() {
            inner.remote_accounts.set(Vec::new());
        }
        return;
    };

    mirror_remote_accounts(inner, &user.uid);

    if !inner.reconciled.replace(true) {
        let sync = inner.sync.clone();
        let report = inner.last_report.clone();
        let uid = user.uid.clone();
        (inner.spawner)(
            async move {
                if let Ok(result) = sync.reconcile(&uid).await {
                    report.set(Some(result));
                }
            }
            .boxed_local(),
        );
    }
}

fn mirror_remote_accounts(inner: &Rc<GateInner>, uid: &str) {
    let already = matches!(&*inner.remote_subscription.borrow(), Some((current, _)) if current == uid);
    if already {
        return;
    }
    // Switching users: stop the previous mirror first
    inner.remote_subscription.borrow_mut().take();

    let weak: Weak<GateInner> = Rc::downgrade(inner);
    let subscription = inner.directory.listen_tracked_accounts(uid, move |handles| {
        if let Some(inner) = weak.upgrade() {
            if inner.mounted.get() {
                inner.remote_accounts.set(handles);
            }
        }
    });
    *inner.remote_subscription.borrow_mut() = Some((uid.to_string(), subscription));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackedAccountSet;
    use crate::services::{DocumentStore, MemoryDocumentStore, MemoryIdentityProvider};
    use crate::utils::spawn::pool_spawner;
    use crate::utils::storage::MemoryStorage;
    use futures::executor::{block_on, LocalPool};

    struct Fixture {
        gate: SessionGate,
        identity: MemoryIdentityProvider,
        tracked: TrackedState,
        directory: RemoteDirectory,
        store: MemoryDocumentStore,
        pool: LocalPool,
    }

    fn fixture() -> Fixture {
        let pool = LocalPool::new();
        let identity = MemoryIdentityProvider::new();
        let store = MemoryDocumentStore::new();
        let directory = RemoteDirectory::new(Rc::new(store.clone()));
        let tracked = TrackedState::load(Rc::new(MemoryStorage::new()), "localAccounts");
        let gate = SessionGate::new(
            Rc::new(identity.clone()),
            AuthState::new(),
            tracked.clone(),
            directory.clone(),
            pool_spawner(&pool),
        );
        Fixture { gate, identity, tracked, directory, store, pool }
    }

    impl Fixture {
        fn sign_in(&mut self, uid: &str) {
            self.identity.script_sign_in(Ok(SessionUser::new(uid).with_email(format!("{}@example.com", uid))));
            block_on(self.gate.sign_in()).unwrap();
            self.pool.run_until_stalled();
        }

        fn sign_out(&mut self) {
            block_on(self.gate.sign_out()).unwrap();
            self.pool.run_until_stalled();
        }

        fn remote(&self, uid: &str) -> Vec<String> {
            let mut handles = block_on(self.directory.tracked_accounts(uid)).unwrap();
            handles.sort();
            handles
        }
    }

    fn set(handles: &[&str]) -> TrackedAccountSet {
        handles.iter().copied().collect()
    }

    #[test]
    fn first_sign_in_reconciles_both_ways() {
        let mut f = fixture();
        f.tracked.add("x");
        block_on(f.directory.add_tracked_account("u1", "y")).unwrap();
        f.gate.mount();

        f.sign_in("u1");

        assert_eq!(f.tracked.snapshot(), set(&["x", "y"]));
        assert_eq!(f.remote("u1"), vec!["x", "y"]);
        assert!(f.gate.has_reconciled());
        assert_eq!(f.gate.last_report().get().unwrap().written, vec!["x".to_string()]);
    }

    #[test]
    fn sign_in_updates_auth_and_creates_user_document() {
        let mut f = fixture();
        f.gate.mount();
        assert!(!f.gate.auth().is_logged_in());

        f.sign_in("u1");
        assert_eq!(f.gate.auth().uid().as_deref(), Some("u1"));

        let users = crate::services::DocumentPath::new(["users", "u1"]);
        assert!(f.store.contains(&users));
    }

    #[test]
    fn sign_in_stores_token_before_observer_reports() {
        let f = fixture();
        let mut user = SessionUser::new("u2");
        user.id_token = Some("token-u2".to_string());
        f.identity.script_sign_in(Ok(user));

        // Record the token visible to writers when users/u2 is created
        let users = crate::services::DocumentPath::new(["users", "u2"]);
        let token_at_write: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
        let auth = f.gate.auth().clone();
        let seen = token_at_write.clone();
        let _watch = f.store.watch_document(
            &users,
            Rc::new(move |doc: Option<crate::services::Document>| {
                if doc.is_some() {
                    *seen.borrow_mut() = auth.id_token();
                }
            }),
        );

        // Not mounted: nothing observes the provider
        block_on(f.gate.sign_in()).unwrap();
        assert!(f.store.contains(&users));
        assert_eq!(token_at_write.borrow().as_deref(), Some("token-u2"));
        assert_eq!(f.gate.auth().id_token().as_deref(), Some("token-u2"));
    }

    #[test]
    fn failed_sign_in_stays_anonymous() {
        let mut f = fixture();
        f.gate.mount();
        f.identity.script_sign_in(Err(TrackerError::Auth("popup closed".to_string())));

        assert!(block_on(f.gate.sign_in()).is_err());
        f.pool.run_until_stalled();
        assert!(!f.gate.auth().is_logged_in());
        assert!(!f.gate.has_reconciled());
    }

    #[test]
    fn reconciliation_runs_once_per_mount() {
        let mut f = fixture();
        f.gate.mount();
        f.sign_in("u1");
        f.sign_out();

        // Added while anonymous: only a later mount pushes it up
        f.tracked.add("z");
        f.sign_in("u1");
        assert!(f.remote("u1").is_empty());

        f.gate.unmount();
        f.gate.mount();
        f.pool.run_until_stalled();
        assert_eq!(f.remote("u1"), vec!["z"]);
    }

    #[test]
    fn sign_out_keeps_local_accounts_and_clears_auth() {
        let mut f = fixture();
        f.tracked.add("test_a");
        f.gate.mount();
        f.sign_in("u1");
        f.sign_out();

        assert!(!f.gate.auth().is_logged_in());
        assert_eq!(f.tracked.snapshot(), set(&["test_a"]));
        assert!(f.gate.remote_accounts().get().is_empty());
    }

    #[test]
    fn remote_accounts_mirror_follows_the_directory() {
        let mut f = fixture();
        f.gate.mount();
        f.sign_in("u1");
        assert!(f.gate.remote_accounts().get().is_empty());

        block_on(f.directory.add_tracked_account("u1", "test_b")).unwrap();
        assert_eq!(f.gate.remote_accounts().get(), vec!["test_b".to_string()]);
    }

    #[test]
    fn unmount_drops_every_subscription() {
        let mut f = fixture();
        f.gate.mount();
        f.sign_in("u1");
        assert_eq!(f.identity.observer_count(), 1);
        assert_eq!(f.store.watcher_count(), 1);

        f.gate.unmount();
        assert_eq!(f.identity.observer_count(), 0);
        assert_eq!(f.store.watcher_count(), 0);

        // Late transitions are ignored
        f.identity.set_session(None);
        assert!(f.gate.auth().is_logged_in());
    }

    #[test]
    fn mounting_twice_keeps_one_observer() {
        let f = fixture();
        f.gate.mount();
        f.gate.mount();
        assert!(f.gate.is_mounted());
        assert_eq!(f.identity.observer_count(), 1);

        f.gate.unmount();
        assert!(!f.gate.is_mounted());
    }

    #[test]
    fn write_back_failure_is_reported_after_sign_in() {
        let mut f = fixture();
        f.tracked.add("x");
        f.gate.mount();
        f.store.set_fail_writes(true);
        f.sign_in("u1");

        assert_eq!(f.tracked.snapshot(), set(&["x"]));
        let report = f.gate.last_report().get().unwrap();
        assert_eq!(report.failed.len(), 1);
        assert!(f.gate.auth().is_logged_in());
    }

    #[test]
    fn unreadable_remote_leaves_local_state_alone() {
        let mut f = fixture();
        f.tracked.add("x");
        block_on(f.directory.add_tracked_account("u1", "y")).unwrap();
        f.gate.mount();
        f.store.set_fail_reads(true);
        f.sign_in("u1");

        assert_eq!(f.tracked.snapshot(), set(&["x"]));
        assert!(f.gate.last_report().get().is_none());
        assert!(f.gate.has_reconciled());
    }
}
