// ============================================================================
// TRACKED STATE - Local tracked-account set, persisted on every change
// ============================================================================

use std::rc::Rc;

use crate::models::TrackedAccountSet;
use crate::state::reactivity::{ReactiveState, Subscription};
use crate::utils::storage::{load_from_storage, save_to_storage, KeyValueStorage};

/// Authoritative tracked set for this device. Every mutation replaces the
/// whole set and rewrites local storage.
#[derive(Clone)]
pub struct TrackedState {
    accounts: ReactiveState<TrackedAccountSet>,
    storage: Rc<dyn KeyValueStorage>,
    key: String,
}

impl TrackedState {
    /// Read the persisted set; a missing or unreadable value starts empty
    pub fn load(storage: Rc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let accounts = match load_from_storage::<TrackedAccountSet>(storage.as_ref(), &key) {
            Ok(Some(set)) => {
                log::info!("💾 [TrackedState] Restored {} tracked accounts", set.len());
                set
            }
            Ok(None) => TrackedAccountSet::new(),
            Err(e) => {
                log::warn!("⚠️ [TrackedState] Ignoring stored accounts: {}", e);
                TrackedAccountSet::new()
            }
        };

        Self {
            accounts: ReactiveState::new(accounts),
            storage,
            key,
        }
    }

    pub fn snapshot(&self) -> TrackedAccountSet {
        self.accounts.get()
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.accounts.with(|set| set.contains(handle))
    }

    pub fn len(&self) -> usize {
        self.accounts.with(TrackedAccountSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns false (and changes nothing) if already tracked
    pub fn add(&self, handle: &str) -> bool {
        let mut next = self.snapshot();
        if !next.insert(handle) {
            return false;
        }
        self.commit(next);
        log::info!("➕ [TrackedState] Added @{} to local accounts", handle);
        true
    }

    /// Returns false (and changes nothing) if not tracked
    pub fn remove(&self, handle: &str) -> bool {
        let mut next = self.snapshot();
        if !next.remove(handle) {
            return false;
        }
        self.commit(next);
        log::info!("➖ [TrackedState] Removed @{} from local accounts", handle);
        true
    }

    /// Replace the whole set
    pub fn replace(&self, set: TrackedAccountSet) {
        self.commit(set);
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&TrackedAccountSet) + 'static,
    {
        self.accounts.subscribe(callback)
    }

    fn commit(&self, set: TrackedAccountSet) {
        // Persist before notifying so observers can rely on storage
        if let Err(e) = save_to_storage(self.storage.as_ref(), &self.key, &set) {
            log::error!("❌ [TrackedState] Could not persist tracked accounts: {}", e);
        }
        self.accounts.set(set);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::storage::MemoryStorage;
    use std::cell::Cell;

    const KEY: &str = "localAccounts";

    fn memory() -> Rc<MemoryStorage> {
        Rc::new(MemoryStorage::new())
    }

    #[test]
    fn round_trips_through_storage() {
        let storage = memory();
        let state = TrackedState::load(storage.clone(), KEY);
        state.replace(["a", "b"].into_iter().collect());

        let reloaded = TrackedState::load(storage, KEY);
        let expected: TrackedAccountSet = ["b", "a"].into_iter().collect();
        assert_eq!(reloaded.snapshot(), expected);
    }

    #[test]
    fn add_existing_is_a_noop() {
        let storage = memory();
        let state = TrackedState::load(storage.clone(), KEY);
        assert!(state.add("a"));
        let hits = Rc::new(Cell::new(0));
        let hits_cb = hits.clone();
        let _sub = state.subscribe(move |_| hits_cb.set(hits_cb.get() + 1));

        assert!(!state.add("a"));
        assert_eq!(state.len(), 1);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn remove_missing_is_a_noop() {
        let state = TrackedState::load(memory(), KEY);
        state.add("a");
        assert!(!state.remove("zzz"));
        let expected: TrackedAccountSet = ["a"].into_iter().collect();
        assert_eq!(state.snapshot(), expected);
    }

    #[test]
    fn every_change_is_persisted() {
        let storage = memory();
        let state = TrackedState::load(storage.clone(), KEY);
        state.add("a");
        state.add("b");
        state.remove("a");
        assert_eq!(storage.raw(KEY).as_deref(), Some(r#"["b"]"#));
    }

    #[test]
    fn corrupt_storage_loads_empty() {
        let storage = memory();
        storage.set_item(KEY, "{broken").unwrap();
        let state = TrackedState::load(storage, KEY);
        assert!(state.is_empty());
    }
}
