// ============================================================================
// APP - Composition root (browser only)
// ============================================================================
// Wires storage, identity, remote directory, lookup and map into the
// viewmodels, builds the layout once and re-renders views on state changes.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::config::AppConfig;
use crate::dom::{append_child, require_element, ElementBuilder};
use crate::maps::GoogleMapRenderer;
use crate::services::*;
use crate::state::{AuthState, ReactiveState, Subscription, TrackedState};
use crate::utils::firebase_ffi::init_firebase;
use crate::utils::spawn::browser_spawner;
use crate::utils::{BrowserStorage, Spawner};
use crate::viewmodels::{MarkerLayer, SessionGate, TrackingViewModel};
use crate::views::*;

/// What the views need; cheap to clone
#[derive(Clone)]
pub struct AppContext {
    pub config: Rc<AppConfig>,
    pub spawner: Spawner,
    pub gate: SessionGate,
    pub tracking: TrackingViewModel,
    pub login_open: ReactiveState<bool>,
}

pub struct App {
    ctx: AppContext,
    lookup: Rc<dyn AccountLookup>,
    markers: Option<MarkerLayer>,
    subscriptions: Vec<Subscription>,
}

type View = fn(&Element, &AppContext) -> Result<(), JsValue>;

impl App {
    pub fn new(config: AppConfig) -> Result<Self, JsValue> {
        let spawner = browser_spawner();
        let auth = AuthState::new();
        let tracked = TrackedState::load(Rc::new(BrowserStorage), config.storage_key.clone());

        let (store, identity): (Rc<dyn DocumentStore>, Rc<dyn IdentityProvider>) = if config.has_remote() {
            let firebase = serde_json::to_string(&config.firebase)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            init_firebase(&firebase);
            (
                Rc::new(FirestoreDocumentStore::new(
                    &config.firebase.project_id,
                    auth.clone(),
                    config.remote_poll_interval_ms,
                )),
                Rc::new(FirebaseIdentityProvider),
            )
        } else {
            log::warn!("⚠️ [App] No Firebase project configured, running local-only");
            (Rc::new(MemoryDocumentStore::new()), Rc::new(MemoryIdentityProvider::new()))
        };

        let directory = RemoteDirectory::new(store);
        let lookup: Rc<dyn AccountLookup> = Rc::new(MockAccountLookup::new(config.lookup_latency()));

        let gate = SessionGate::new(identity, auth.clone(), tracked.clone(), directory.clone(), spawner.clone());
        let tracking = TrackingViewModel::new(tracked, auth, directory, lookup.clone(), spawner.clone());

        Ok(Self {
            ctx: AppContext {
                config: Rc::new(config),
                spawner,
                gate,
                tracking,
                login_open: ReactiveState::new(false),
            },
            lookup,
            markers: None,
            subscriptions: Vec::new(),
        })
    }

    /// Build the layout, start the map and session, and bind views to state
    pub fn render(&mut self) -> Result<(), JsValue> {
        let root = require_element("app")?;
        root.set_inner_html("");
        for (tag, id, class) in [
            ("div", "header", "header"),
            ("div", self.ctx.config.map_config.container_id.as_str(), "map"),
            ("section", "search-form", "panel search"),
            ("section", "search-result", "panel result"),
            ("aside", "tracked-list", "panel tracked"),
            ("div", "login-modal", "modal hidden"),
        ] {
            append_child(&root, &ElementBuilder::new(tag)?.id(id)?.class(class).build())?;
        }

        self.start_map();

        render_search_form(&require_element("search-form")?, &self.ctx)?;
        self.bind_views();
        self.ctx.gate.mount();
        log::info!("✅ [App] Rendered");
        Ok(())
    }

    fn start_map(&mut self) {
        let mut renderer = GoogleMapRenderer::new();
        if let Err(e) = renderer.initialize(&self.ctx.config.map_config, &self.ctx.config.google_maps_api_key) {
            log::error!("❌ [App] Map unavailable: {}", e);
            return;
        }

        let layer = MarkerLayer::new(Rc::new(RefCell::new(renderer)), self.lookup.clone());
        let subscription = layer.follow(self.ctx.tracking.tracked(), self.ctx.spawner.clone());
        self.subscriptions.push(subscription);
        self.markers = Some(layer);
    }

    fn bind_views(&mut self) {
        refresh_view("header", &self.ctx, render_header);
        refresh_view("login-modal", &self.ctx, render_login_modal);
        refresh_view("search-result", &self.ctx, render_search_result);
        refresh_view("tracked-list", &self.ctx, render_tracked_list);

        let ctx = self.ctx.clone();
        self.subscriptions.push(self.ctx.gate.auth().subscribe(move |_| {
            refresh_view("header", &ctx, render_header);
            refresh_view("login-modal", &ctx, render_login_modal);
        }));

        let ctx = self.ctx.clone();
        self.subscriptions.push(
            self.ctx
                .login_open
                .subscribe(move |_| refresh_view("login-modal", &ctx, render_login_modal)),
        );

        let tracking = &self.ctx.tracking;
        let ctx = self.ctx.clone();
        self.subscriptions.push(
            tracking
                .searching
                .subscribe(move |_| refresh_view("search-result", &ctx, render_search_result)),
        );
        let ctx = self.ctx.clone();
        self.subscriptions.push(
            tracking
                .result
                .subscribe(move |_| refresh_view("search-result", &ctx, render_search_result)),
        );
        let ctx = self.ctx.clone();
        self.subscriptions.push(
            tracking
                .status
                .subscribe(move |_| refresh_view("search-result", &ctx, render_search_result)),
        );

        let ctx = self.ctx.clone();
        self.subscriptions.push(tracking.tracked().subscribe(move |_| {
            refresh_view("search-result", &ctx, render_search_result);
            refresh_view("tracked-list", &ctx, render_tracked_list);
        }));
    }

    /// Stop the session gate, the marker layer and every view binding
    pub fn shutdown(&mut self) {
        self.ctx.gate.unmount();
        if let Some(layer) = self.markers.take() {
            layer.teardown();
        }
        self.subscriptions.clear();
    }
}

fn refresh_view(id: &str, ctx: &AppContext, view: View) {
    if let Err(e) = require_element(id).and_then(|container| view(&container, ctx)) {
        log::error!("❌ [App] Rendering #{} failed: {:?}", id, e);
    }
}
