// ============================================================================
// MEMORY STORE - In-process DocumentStore (offline mode and tests)
// ============================================================================

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use futures::future::{FutureExt, LocalBoxFuture};

use crate::error::TrackerError;
use crate::services::document_store::*;
use crate::state::Subscription;

/// Write that reached the store (kept for inspection)
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRecord {
    Set(DocumentPath, WriteMode),
    Delete(DocumentPath),
}

#[derive(Default)]
struct Inner {
    documents: BTreeMap<DocumentPath, Fields>,
    document_watchers: Vec<(u64, DocumentPath, DocumentCallback)>,
    collection_watchers: Vec<(u64, DocumentPath, CollectionCallback)>,
    next_watch_id: u64,
    fail_writes: bool,
    fail_reads: bool,
    writes: Vec<WriteRecord>,
}

impl Inner {
    fn document(&self, path: &DocumentPath) -> Option<Document> {
        self.documents.get(path).map(|fields| Document {
            path: path.clone(),
            fields: fields.clone(),
        })
    }

    fn children(&self, collection: &DocumentPath) -> Vec<Document> {
        self.documents
            .iter()
            .filter(|(path, _)| path.parent().as_ref() == Some(collection))
            .map(|(path, fields)| Document {
                path: path.clone(),
                fields: fields.clone(),
            })
            .collect()
    }

    fn apply_set(&mut self, path: &DocumentPath, fields: Fields, mode: WriteMode) {
        match mode {
            WriteMode::Replace => {
                self.documents.insert(path.clone(), fields);
            }
            WriteMode::Merge => {
                let existing = self.documents.entry(path.clone()).or_default();
                for (key, value) in fields {
                    existing.insert(key, value);
                }
            }
        }
    }
}

/// Shared in-memory document tree. Clones point at the same data.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write/delete fail (simulates an unreachable backend)
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    /// Make every following get/list fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.inner.borrow_mut().fail_reads = fail;
    }

    /// Writes accepted so far, in order
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.inner.borrow().writes.clone()
    }

    pub fn contains(&self, path: &DocumentPath) -> bool {
        self.inner.borrow().documents.contains_key(path)
    }

    /// Seed a document without recording a write
    pub fn insert(&self, path: &DocumentPath, fields: Fields) {
        self.inner.borrow_mut().apply_set(path, fields, WriteMode::Replace);
        notify(&self.inner, path);
    }

    pub fn watcher_count(&self) -> usize {
        let inner = self.inner.borrow();
        inner.document_watchers.len() + inner.collection_watchers.len()
    }

    fn next_watch_id(&self) -> u64 {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_watch_id;
        inner.next_watch_id += 1;
        id
    }
}

/// Deliver the new state of `path` to its watchers and its collection's watchers
fn notify(inner: &Rc<RefCell<Inner>>, path: &DocumentPath) {
    let mut document_calls = Vec::new();
    let mut collection_calls = Vec::new();
    {
        let inner = inner.borrow();
        let parent = path.parent();
        for (_, watched, callback) in &inner.document_watchers {
            if watched == path {
                document_calls.push((callback.clone(), inner.document(path)));
            }
        }
        if let Some(parent) = parent {
            for (_, watched, callback) in &inner.collection_watchers {
                if *watched == parent {
                    collection_calls.push((callback.clone(), inner.children(&parent)));
                }
            }
        }
    }

    for (callback, document) in document_calls {
        callback(document);
    }
    for (callback, documents) in collection_calls {
        callback(documents);
    }
}

fn rejected(operation: &str, path: &DocumentPath) -> TrackerError {
    TrackerError::Remote(format!("{} rejected for {}", operation, path))
}

impl DocumentStore for MemoryDocumentStore {
    fn set_document(
        &self,
        path: &DocumentPath,
        fields: Fields,
        mode: WriteMode,
    ) -> LocalBoxFuture<'_, Result<(), TrackerError>> {
        let path = path.clone();
        async move {
            {
                let mut inner = self.inner.borrow_mut();
                if inner.fail_writes {
                    return Err(rejected("write", &path));
                }
                if mode == WriteMode::Merge && fields.is_empty() {
                    return Ok(());
                }
                inner.apply_set(&path, fields, mode);
                inner.writes.push(WriteRecord::Set(path.clone(), mode));
            }
            notify(&self.inner, &path);
            Ok(())
        }
        .boxed_local()
    }

    fn get_document(&self, path: &DocumentPath) -> LocalBoxFuture<'_, Result<Option<Document>, TrackerError>> {
        let path = path.clone();
        async move {
            let inner = self.inner.borrow();
            if inner.fail_reads {
                return Err(rejected("read", &path));
            }
            Ok(inner.document(&path))
        }
        .boxed_local()
    }

    fn delete_document(&self, path: &DocumentPath) -> LocalBoxFuture<'_, Result<(), TrackerError>> {
        let path = path.clone();
        async move {
            {
                let mut inner = self.inner.borrow_mut();
                if inner.fail_writes {
                    return Err(rejected("delete", &path));
                }
                inner.documents.remove(&path);
                inner.writes.push(WriteRecord::Delete(path.clone()));
            }
            notify(&self.inner, &path);
            Ok(())
        }
        .boxed_local()
    }

    fn list_documents(&self, collection: &DocumentPath) -> LocalBoxFuture<'_, Result<Vec<Document>, TrackerError>> {
        let collection = collection.clone();
        async move {
            let inner = self.inner.borrow();
            if inner.fail_reads {
                return Err(rejected("list", &collection));
            }
            Ok(inner.children(&collection))
        }
        .boxed_local()
    }

    fn watch_document(&self, path: &DocumentPath, callback: DocumentCallback) -> Subscription {
        let id = self.next_watch_id();
        let current = {
            let mut inner = self.inner.borrow_mut();
            inner.document_watchers.push((id, path.clone(), callback.clone()));
            inner.document(path)
        };
        callback(current);

        let weak: Weak<RefCell<Inner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().document_watchers.retain(|(w, _, _)| *w != id);
            }
        })
    }

    fn watch_collection(&self, collection: &DocumentPath, callback: CollectionCallback) -> Subscription {
        let id = self.next_watch_id();
        let current = {
            let mut inner = self.inner.borrow_mut();
            inner.collection_watchers.push((id, collection.clone(), callback.clone()));
            inner.children(collection)
        };
        callback(current);

        let weak: Weak<RefCell<Inner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().collection_watchers.retain(|(w, _, _)| *w != id);
            }
        })
    }
}
