// ============================================================================
// EVENT TRACKER - Track club/organization accounts and plot them on a map
// ============================================================================
// MVVM over plain DOM:
// - Views: functions that render DOM (no logic)
// - ViewModels: session gate, reconciliation, search/add/remove, markers
// - Services: identity, document store, remote directory, account lookup
// - State: Rc<RefCell> reactive cells
// - Models: shared records
// Everything except the browser shell builds and tests natively.
// ============================================================================

pub mod config;
pub mod error;
pub mod maps;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod viewmodels;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod views;

pub use config::AppConfig;
pub use error::TrackerError;

#[cfg(target_arch = "wasm32")]
mod entry {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;
    use wasm_logger::Config;

    use crate::app::App;
    use crate::config::AppConfig;

    thread_local! {
        static APP: RefCell<Option<App>> = RefCell::new(None);
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();

        let config = AppConfig::from_build_env();
        if config.enable_logging {
            wasm_logger::init(Config::default());
        }
        log::info!("🚀 Event Tracker - Rust + WASM");

        let mut app = App::new(config)?;
        app.render()?;

        APP.with(|cell| {
            *cell.borrow_mut() = Some(app);
        });
        Ok(())
    }

    /// Tear the app down (called from JS on page hide)
    #[wasm_bindgen]
    pub fn shutdown_app() {
        APP.with(|cell| {
            if let Some(mut app) = cell.borrow_mut().take() {
                app.shutdown();
                log::info!("👋 [App] Shut down");
            }
        });
    }
}
