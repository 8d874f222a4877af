// ============================================================================
// REMOTE DIRECTORY - Typed access to users, tracked accounts and account cache
// ============================================================================
// Layout:
//   users/{uid}                              -> UserDocument
//   users/{uid}/trackedAccounts/{username}   -> TrackedEntry
//   instagramAccounts/{username}             -> CachedAccount (shared, merge-on-write)
// ============================================================================

use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::error::TrackerError;
use crate::models::{now_millis, AccountRecord, CachedAccount, SessionUser, TrackedEntry, UserDocument};
use crate::services::document_store::{Document, DocumentPath, DocumentStore, Fields, WriteMode};
use crate::state::Subscription;
use crate::utils::constants::{ACCOUNT_CACHE_COLLECTION, TRACKED_ACCOUNTS_COLLECTION, USERS_COLLECTION};

#[derive(Clone)]
pub struct RemoteDirectory {
    store: Rc<dyn DocumentStore>,
}

impl RemoteDirectory {
    pub fn new(store: Rc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn user_path(uid: &str) -> DocumentPath {
        DocumentPath::new([USERS_COLLECTION, uid])
    }

    fn tracked_collection(uid: &str) -> DocumentPath {
        Self::user_path(uid).child(TRACKED_ACCOUNTS_COLLECTION)
    }

    fn tracked_path(uid: &str, username: &str) -> DocumentPath {
        Self::tracked_collection(uid).child(username)
    }

    fn cache_path(username: &str) -> DocumentPath {
        DocumentPath::new([ACCOUNT_CACHE_COLLECTION, username])
    }

    /// Create `users/{uid}` on first sign-in. Returns true if it was created.
    pub async fn ensure_user_document(&self, user: &SessionUser) -> Result<bool, TrackerError> {
        let path = Self::user_path(&user.uid);
        if self.store.get_document(&path).await?.is_some() {
            return Ok(false);
        }

        let document = UserDocument {
            email: user.email.clone(),
            joined_at: now_millis(),
        };
        self.store
            .set_document(&path, to_fields(&document)?, WriteMode::Replace)
            .await?;
        log::info!("👤 [RemoteDirectory] Created user document for {}", user.uid);
        Ok(true)
    }

    /// Merge the latest lookup result into the shared account cache
    pub async fn update_account_cache(&self, record: &AccountRecord) -> Result<(), TrackerError> {
        let cached = CachedAccount {
            record: record.clone(),
            last_updated: now_millis(),
        };
        self.store
            .set_document(&Self::cache_path(&record.username), to_fields(&cached)?, WriteMode::Merge)
            .await
    }

    pub async fn get_account_cache(&self, username: &str) -> Result<Option<CachedAccount>, TrackerError> {
        match self.store.get_document(&Self::cache_path(username)).await? {
            Some(document) => document.decode().map(Some),
            None => Ok(None),
        }
    }

    pub async fn is_tracked(&self, uid: &str, username: &str) -> Result<bool, TrackerError> {
        Ok(self
            .store
            .get_document(&Self::tracked_path(uid, username))
            .await?
            .is_some())
    }

    /// Add a tracked account; returns false if it was already tracked
    pub async fn add_tracked_account(&self, uid: &str, username: &str) -> Result<bool, TrackerError> {
        if self.is_tracked(uid, username).await? {
            return Ok(false);
        }

        let entry = TrackedEntry {
            username: username.to_string(),
            added_at: now_millis(),
        };
        self.store
            .set_document(&Self::tracked_path(uid, username), to_fields(&entry)?, WriteMode::Replace)
            .await?;
        log::info!("☁️ [RemoteDirectory] @{} added for {}", username, uid);
        Ok(true)
    }

    /// Remove a tracked account; returns false if it was not tracked
    pub async fn remove_tracked_account(&self, uid: &str, username: &str) -> Result<bool, TrackerError> {
        if !self.is_tracked(uid, username).await? {
            return Ok(false);
        }

        self.store
            .delete_document(&Self::tracked_path(uid, username))
            .await?;
        log::info!("☁️ [RemoteDirectory] @{} removed for {}", username, uid);
        Ok(true)
    }

    /// Handles tracked by `uid` (record contents live in the account cache)
    pub async fn tracked_accounts(&self, uid: &str) -> Result<Vec<String>, TrackerError> {
        let documents = self
            .store
            .list_documents(&Self::tracked_collection(uid))
            .await?;
        Ok(documents.iter().map(|d| d.id().to_string()).collect())
    }

    /// Called with the full handle list whenever `uid`'s tracked set changes
    pub fn listen_tracked_accounts<F>(&self, uid: &str, callback: F) -> Subscription
    where
        F: Fn(Vec<String>) + 'static,
    {
        self.store.watch_collection(
            &Self::tracked_collection(uid),
            Rc::new(move |documents: Vec<Document>| {
                callback(documents.iter().map(|d| d.id().to_string()).collect());
            }),
        )
    }

    /// Called whenever the cached data of `username` changes (absent entries are skipped)
    pub fn listen_account_cache<F>(&self, username: &str, callback: F) -> Subscription
    where
        F: Fn(CachedAccount) + 'static,
    {
        let username = username.to_string();
        self.store.watch_document(
            &Self::cache_path(&username),
            Rc::new(move |document: Option<Document>| {
                let Some(document) = document else { return };
                match document.decode::<CachedAccount>() {
                    Ok(cached) => callback(cached),
                    Err(e) => log::warn!("⚠️ [RemoteDirectory] Bad cache entry for @{}: {}", username, e),
                }
            }),
        )
    }
}

fn to_fields<T: Serialize>(value: &T) -> Result<Fields, TrackerError> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(TrackerError::Serialization(format!("Expected an object, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;
    use crate::services::memory_store::{MemoryDocumentStore, WriteRecord};
    use futures::executor::block_on;
    use std::cell::RefCell;

    fn directory() -> (RemoteDirectory, MemoryDocumentStore) {
        let store = MemoryDocumentStore::new();
        (RemoteDirectory::new(Rc::new(store.clone())), store)
    }

    fn record(username: &str) -> AccountRecord {
        AccountRecord {
            username: username.to_string(),
            name: format!("Name of {}", username),
            is_business: true,
            location: Some(Coordinates::new(40.5, -74.45)),
        }
    }

    #[test]
    fn add_then_add_again_reports_already_tracked() {
        let (directory, store) = directory();
        assert!(block_on(directory.add_tracked_account("u1", "test_a")).unwrap());
        assert!(!block_on(directory.add_tracked_account("u1", "test_a")).unwrap());
        assert_eq!(store.writes().len(), 1);
        assert_eq!(block_on(directory.tracked_accounts("u1")).unwrap(), vec!["test_a"]);
    }

    #[test]
    fn tracked_entry_carries_added_at() {
        let (directory, store) = directory();
        block_on(directory.add_tracked_account("u1", "test_a")).unwrap();
        let path = DocumentPath::new(["users", "u1", "trackedAccounts", "test_a"]);
        let entry: TrackedEntry = block_on(store.get_document(&path)).unwrap().unwrap().decode().unwrap();
        assert_eq!(entry.username, "test_a");
        assert!(entry.added_at > 0);
    }

    #[test]
    fn remove_untracked_reports_false_without_writing() {
        let (directory, store) = directory();
        assert!(!block_on(directory.remove_tracked_account("u1", "ghost")).unwrap());
        assert!(store.writes().is_empty());

        block_on(directory.add_tracked_account("u1", "test_a")).unwrap();
        assert!(block_on(directory.remove_tracked_account("u1", "test_a")).unwrap());
        assert!(block_on(directory.tracked_accounts("u1")).unwrap().is_empty());
    }

    #[test]
    fn tracked_sets_are_per_user() {
        let (directory, _) = directory();
        block_on(directory.add_tracked_account("u1", "test_a")).unwrap();
        block_on(directory.add_tracked_account("u2", "test_b")).unwrap();
        assert_eq!(block_on(directory.tracked_accounts("u2")).unwrap(), vec!["test_b"]);
    }

    #[test]
    fn ensure_user_document_only_creates_once() {
        let (directory, store) = directory();
        let user = SessionUser::new("u1").with_email("u1@example.com");
        assert!(block_on(directory.ensure_user_document(&user)).unwrap());
        assert!(!block_on(directory.ensure_user_document(&user)).unwrap());

        let doc = block_on(store.get_document(&DocumentPath::new(["users", "u1"]))).unwrap().unwrap();
        let profile: UserDocument = doc.decode().unwrap();
        assert_eq!(profile.email.as_deref(), Some("u1@example.com"));
    }

    #[test]
    fn account_cache_merges_and_reads_back() {
        let (directory, store) = directory();
        let path = DocumentPath::new(["instagramAccounts", "test_a"]);
        let mut extra = Fields::new();
        extra.insert("followers".to_string(), Value::from(120));
        store.insert(&path, extra);

        block_on(directory.update_account_cache(&record("test_a"))).unwrap();
        assert_eq!(store.writes(), vec![WriteRecord::Set(path.clone(), WriteMode::Merge)]);

        let cached = block_on(directory.get_account_cache("test_a")).unwrap().unwrap();
        assert_eq!(cached.record, record("test_a"));
        assert!(cached.last_updated > 0);
        let raw = block_on(store.get_document(&path)).unwrap().unwrap();
        assert_eq!(raw.fields["followers"], 120);

        assert!(block_on(directory.get_account_cache("missing")).unwrap().is_none());
    }

    #[test]
    fn listeners_follow_remote_changes() {
        let (directory, _) = directory();
        let tracked: Rc<RefCell<Vec<Vec<String>>>> = Rc::new(RefCell::new(Vec::new()));
        let tracked_cb = tracked.clone();
        let _tracked_sub = directory.listen_tracked_accounts("u1", move |handles| tracked_cb.borrow_mut().push(handles));

        let names: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let names_cb = names.clone();
        let _cache_sub = directory.listen_account_cache("test_a", move |cached| names_cb.borrow_mut().push(cached.record.name));

        block_on(directory.add_tracked_account("u1", "test_a")).unwrap();
        block_on(directory.update_account_cache(&record("test_a"))).unwrap();

        assert_eq!(*tracked.borrow(), vec![Vec::<String>::new(), vec!["test_a".to_string()]]);
        assert_eq!(*names.borrow(), vec!["Name of test_a".to_string()]);
    }
}
