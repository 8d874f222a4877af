// ============================================================================
// HEADER VIEW - Title and the login button
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::app::AppContext;
use crate::dom::{append_child, clear_children, ElementBuilder};

pub fn render_header(container: &Element, ctx: &AppContext) -> Result<(), JsValue> {
    clear_children(container);

    let label = if ctx.gate.auth().is_logged_in() { "Account" } else { "Log In" };
    let login_open = ctx.login_open.clone();
    let button = ElementBuilder::new("button")?
        .class("btn-login")
        .text(label)
        .on_click(move |_| login_open.set(true))?
        .build();

    let header = ElementBuilder::new("header")?
        .class("app-header")
        .child(ElementBuilder::new("h1")?.text("Event Tracker").build())?
        .child(button)?
        .build();
    append_child(container, &header)
}
