// ============================================================================
// FIRESTORE CLIENT - HTTP only (gloo-net), no business logic
// ============================================================================
// Watches are emulated by polling: the REST API has no push channel.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use gloo_net::http::{Request, RequestBuilder, Response};
use gloo_timers::callback::Interval;
use serde_json::json;

use super::codec::*;
use crate::error::TrackerError;
use crate::services::document_store::*;
use crate::state::{AuthState, Subscription};
use crate::utils::constants::FIRESTORE_API_ROOT;

const LIST_PAGE_SIZE: u32 = 300;

#[derive(Clone)]
pub struct FirestoreDocumentStore {
    /// `projects/{id}/databases/(default)/documents`
    documents_prefix: String,
    auth: AuthState,
    poll_interval_ms: u32,
}

impl FirestoreDocumentStore {
    pub fn new(project_id: &str, auth: AuthState, poll_interval_ms: u32) -> Self {
        Self {
            documents_prefix: format!("projects/{}/databases/(default)/documents", project_id),
            auth,
            poll_interval_ms,
        }
    }

    fn url(&self, path: &DocumentPath) -> String {
        let encoded: Vec<String> = path
            .segments()
            .iter()
            .map(|segment| String::from(js_sys::encode_uri_component(segment)))
            .collect();
        format!("{}/{}/{}", FIRESTORE_API_ROOT, self.documents_prefix, encoded.join("/"))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.auth.id_token() {
            Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
            None => builder,
        }
    }

    /// Writes always need a token; reads may go out anonymously
    fn require_token(&self) -> Result<(), TrackerError> {
        match self.auth.id_token() {
            Some(_) => Ok(()),
            None => Err(TrackerError::NotSignedIn),
        }
    }

    async fn fetch_document(&self, path: &DocumentPath) -> Result<Option<Document>, TrackerError> {
        let response = send(self.authorize(Request::get(&self.url(path)))).await?;
        if response.status() == 404 {
            return Ok(None);
        }
        let response = ensure_ok(response).await?;
        let raw = response
            .json::<FirestoreDocument>()
            .await
            .map_err(|e| TrackerError::Serialization(e.to_string()))?;
        decode_document(&raw, &self.documents_prefix).map(Some)
    }

    async fn write_document(&self, path: &DocumentPath, fields: Fields, mode: WriteMode) -> Result<(), TrackerError> {
        let url = match patch_mask(&fields, mode) {
            PatchMask::Nothing => {
                log::debug!("📝 [Firestore] Empty merge into {} skipped", path);
                return Ok(());
            }
            PatchMask::Replace => self.url(path),
            PatchMask::Fields(paths) => {
                let mask: Vec<String> = paths
                    .iter()
                    .map(|field| {
                        format!(
                            "updateMask.fieldPaths={}",
                            String::from(js_sys::encode_uri_component(field))
                        )
                    })
                    .collect();
                format!("{}?{}", self.url(path), mask.join("&"))
            }
        };
        self.require_token()?;

        let body = json!({ "fields": encode_fields(&fields) });
        let request = self
            .authorize(Request::patch(&url))
            .json(&body)
            .map_err(|e| TrackerError::Serialization(e.to_string()))?;
        let response = request
            .send()
            .await
            .map_err(|e| TrackerError::Network(e.to_string()))?;
        ensure_ok(response).await?;
        log::debug!("📝 [Firestore] {:?} {}", mode, path);
        Ok(())
    }

    async fn remove_document(&self, path: &DocumentPath) -> Result<(), TrackerError> {
        self.require_token()?;
        let response = send(self.authorize(Request::delete(&self.url(path)))).await?;
        ensure_ok(response).await?;
        log::debug!("🗑️ [Firestore] Deleted {}", path);
        Ok(())
    }

    async fn fetch_collection(&self, collection: &DocumentPath) -> Result<Vec<Document>, TrackerError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!("{}?pageSize={}", self.url(collection), LIST_PAGE_SIZE);
            if let Some(token) = &page_token {
                url = format!("{}&pageToken={}", url, String::from(js_sys::encode_uri_component(token)));
            }

            let response = send(self.authorize(Request::get(&url))).await?;
            if response.status() == 404 {
                break;
            }
            let page = ensure_ok(response)
                .await?
                .json::<ListDocumentsResponse>()
                .await
                .map_err(|e| TrackerError::Serialization(e.to_string()))?;

            for raw in &page.documents {
                documents.push(decode_document(raw, &self.documents_prefix)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    /// Poll `fetch` every interval and deliver results that differ from the last one
    fn poll<T, F, Fut>(&self, label: String, fetch: F, deliver: Rc<dyn Fn(T)>) -> Subscription
    where
        T: PartialEq + Clone + 'static,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, TrackerError>> + 'static,
    {
        let active = Rc::new(Cell::new(true));
        let last: Rc<RefCell<Option<T>>> = Rc::new(RefCell::new(None));

        let tick = {
            let active = active.clone();
            Rc::new(move || {
                if !active.get() {
                    return;
                }
                let future = fetch();
                let active = active.clone();
                let last = last.clone();
                let deliver = deliver.clone();
                let label = label.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match future.await {
                        Ok(value) => {
                            // Late responses after unsubscribe are dropped
                            if !active.get() {
                                return;
                            }
                            let changed = last.borrow().as_ref() != Some(&value);
                            if changed {
                                *last.borrow_mut() = Some(value.clone());
                                deliver(value);
                            }
                        }
                        Err(e) => log::warn!("⚠️ [Firestore] Polling {} failed: {}", label, e),
                    }
                });
            })
        };

        tick();
        let interval = {
            let tick = tick.clone();
            Interval::new(self.poll_interval_ms, move || tick())
        };

        Subscription::new(move || {
            active.set(false);
            drop(interval);
        })
    }
}

async fn send(builder: RequestBuilder) -> Result<Response, TrackerError> {
    builder.send().await.map_err(|e| TrackerError::Network(e.to_string()))
}

async fn ensure_ok(response: Response) -> Result<Response, TrackerError> {
    if response.ok() {
        return Ok(response);
    }
    let status = response.status();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(TrackerError::Http { status, message })
}

impl DocumentStore for FirestoreDocumentStore {
    fn set_document(
        &self,
        path: &DocumentPath,
        fields: Fields,
        mode: WriteMode,
    ) -> LocalBoxFuture<'_, Result<(), TrackerError>> {
        let path = path.clone();
        async move { self.write_document(&path, fields, mode).await }.boxed_local()
    }

    fn get_document(&self, path: &DocumentPath) -> LocalBoxFuture<'_, Result<Option<Document>, TrackerError>> {
        let path = path.clone();
        async move { self.fetch_document(&path).await }.boxed_local()
    }

    fn delete_document(&self, path: &DocumentPath) -> LocalBoxFuture<'_, Result<(), TrackerError>> {
        let path = path.clone();
        async move { self.remove_document(&path).await }.boxed_local()
    }

    fn list_documents(&self, collection: &DocumentPath) -> LocalBoxFuture<'_, Result<Vec<Document>, TrackerError>> {
        let collection = collection.clone();
        async move { self.fetch_collection(&collection).await }.boxed_local()
    }

    fn watch_document(&self, path: &DocumentPath, callback: DocumentCallback) -> Subscription {
        let store = self.clone();
        let path = path.clone();
        let label = path.to_string();
        self.poll(
            label,
            move || {
                let store = store.clone();
                let path = path.clone();
                async move { store.fetch_document(&path).await }
            },
            callback,
        )
    }

    fn watch_collection(&self, collection: &DocumentPath, callback: CollectionCallback) -> Subscription {
        let store = self.clone();
        let collection = collection.clone();
        let label = collection.to_string();
        self.poll(
            label,
            move || {
                let store = store.clone();
                let collection = collection.clone();
                async move { store.fetch_collection(&collection).await }
            },
            callback,
        )
    }
}
