// ============================================================================
// GOOGLE MAPS FFI - Bindings to the map bridge (static/js/maps-bridge.js)
// ============================================================================

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Loads the Maps script with `api_key` on first use; false if the container is missing
    #[wasm_bindgen(js_name = initGoogleMap)]
    pub fn init_google_map(container_id: &str, lat: f64, lng: f64, zoom: f64, api_key: &str) -> bool;

    /// Pin with a click-to-open info window
    #[wasm_bindgen(js_name = addMapPin)]
    pub fn add_map_pin(id: u32, lat: f64, lng: f64, title: &str, info_html: &str);

    #[wasm_bindgen(js_name = clearMapPins)]
    pub fn clear_map_pins();
}
