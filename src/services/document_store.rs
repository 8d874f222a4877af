// ============================================================================
// DOCUMENT STORE - Generic remote document operations (no business logic)
// ============================================================================

use std::fmt;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::TrackerError;
use crate::state::Subscription;

/// Field map of a document
pub type Fields = Map<String, Value>;

/// Slash-separated path: odd segment counts name collections, even ones documents
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Last segment
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    pub fn is_document(&self) -> bool {
        !self.segments.is_empty() && self.segments.len() % 2 == 0
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub path: DocumentPath,
    pub fields: Fields,
}

impl Document {
    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// Decode the fields into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, TrackerError> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Document becomes exactly the given fields
    Replace,
    /// Given fields overwrite, other existing fields are kept
    Merge,
}

pub type DocumentCallback = Rc<dyn Fn(Option<Document>)>;
pub type CollectionCallback = Rc<dyn Fn(Vec<Document>)>;

/// Remote document database. Watches deliver the current state once on
/// registration and again on every change; callers must not assume any
/// ordering between different watches.
pub trait DocumentStore {
    fn set_document(
        &self,
        path: &DocumentPath,
        fields: Fields,
        mode: WriteMode,
    ) -> LocalBoxFuture<'_, Result<(), TrackerError>>;

    fn get_document(&self, path: &DocumentPath) -> LocalBoxFuture<'_, Result<Option<Document>, TrackerError>>;

    fn delete_document(&self, path: &DocumentPath) -> LocalBoxFuture<'_, Result<(), TrackerError>>;

    /// Direct children of a collection
    fn list_documents(&self, collection: &DocumentPath) -> LocalBoxFuture<'_, Result<Vec<Document>, TrackerError>>;

    fn watch_document(&self, path: &DocumentPath, callback: DocumentCallback) -> Subscription;

    fn watch_collection(&self, collection: &DocumentPath, callback: CollectionCallback) -> Subscription;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn path_navigation() {
        let users = DocumentPath::new(["users"]);
        let tracked = users.child("u1").child("trackedAccounts");
        let entry = tracked.child("test_a");

        assert_eq!(entry.to_string(), "users/u1/trackedAccounts/test_a");
        assert_eq!(entry.id(), "test_a");
        assert!(entry.is_document());
        assert!(!tracked.is_document());
        assert_eq!(entry.parent(), Some(tracked));
        assert_eq!(users.parent(), None);
    }

    #[test]
    fn decode_typed_fields() {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Entry {
            username: String,
            added_at: i64,
        }

        let mut fields = Fields::new();
        fields.insert("username".to_string(), Value::from("a"));
        fields.insert("addedAt".to_string(), Value::from(7));
        let doc = Document { path: DocumentPath::new(["c", "a"]), fields };

        let entry: Entry = doc.decode().unwrap();
        assert_eq!(entry.username, "a");
        assert_eq!(entry.added_at, 7);
    }
}
