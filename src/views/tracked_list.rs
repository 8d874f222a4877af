// ============================================================================
// TRACKED LIST - Overlay listing tracked handles with remove buttons
// ============================================================================

use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::app::AppContext;
use crate::dom::{append_child, clear_children, ElementBuilder};

pub fn render_tracked_list(container: &Element, ctx: &AppContext) -> Result<(), JsValue> {
    clear_children(container);
    let tracked = ctx.tracking.tracked().snapshot();

    let title = format!("Tracked accounts ({})", tracked.len());
    append_child(container, &ElementBuilder::new("h2")?.text(&title).build())?;

    if tracked.is_empty() {
        let empty = ElementBuilder::new("p")?.class("empty").text("No accounts tracked yet.").build();
        return append_child(container, &empty);
    }

    let list = ElementBuilder::new("ul")?.class("tracked-list").build();
    for handle in tracked.iter() {
        let remove = {
            let tracking = ctx.tracking.clone();
            let spawner = ctx.spawner.clone();
            let handle = handle.to_string();
            ElementBuilder::new("button")?
                .class("btn-toggle")
                .attr("aria-label", &format!("Stop tracking @{}", handle))?
                .text("-")
                .on_click(move |_| {
                    tracking.clear_status();
                    tracking.remove_account(&handle).spawn_remote(&spawner);
                })?
                .build()
        };
        let item = ElementBuilder::new("li")?
            .child(ElementBuilder::new("span")?.text(&format!("@{}", handle)).build())?
            .child(remove)?
            .build();
        append_child(&list, &item)?;
    }
    append_child(container, &list)
}
