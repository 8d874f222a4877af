// ============================================================================
// FIREBASE FFI - Bindings to the Firebase Auth bridge (static/js/firebase-bridge.js)
// ============================================================================
// Thin wrappers only. Users cross the boundary as JSON strings.
// ============================================================================

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// Opens the Google popup; resolves to the user JSON
    #[wasm_bindgen(js_name = firebaseSignInWithGoogle, catch)]
    pub fn firebase_sign_in_with_google() -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_name = firebaseSignOut, catch)]
    pub fn firebase_sign_out() -> Result<js_sys::Promise, JsValue>;

    /// Returns the unsubscribe function
    #[wasm_bindgen(js_name = firebaseOnAuthStateChanged)]
    pub fn firebase_on_auth_state_changed(callback: &Closure<dyn FnMut(Option<String>)>) -> js_sys::Function;

    #[wasm_bindgen(js_name = initFirebase)]
    pub fn init_firebase(config_json: &str);
}
