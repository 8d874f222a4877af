// ============================================================================
// SEARCH PANEL - Handle input, lookup result row with +/- and status line
// ============================================================================

use futures::future::FutureExt;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::app::AppContext;
use crate::dom::{append_child, clear_children, input_value, on_enter, ElementBuilder};
use crate::viewmodels::SearchOutcome;

/// Built once: re-rendering would drop the input's focus and text
pub fn render_search_form(container: &Element, ctx: &AppContext) -> Result<(), JsValue> {
    clear_children(container);

    let input = ElementBuilder::new("input")?
        .class("search-input")
        .attr("type", "text")?
        .attr("placeholder", "@username")?
        .build();

    let submit = {
        let input = input.clone();
        let ctx = ctx.clone();
        move || {
            let tracking = ctx.tracking.clone();
            let query = input_value(&input);
            (ctx.spawner)(
                async move {
                    tracking.search(&query).await;
                }
                .boxed_local(),
            );
        }
    };
    on_enter(&input, submit.clone())?;

    let button = ElementBuilder::new("button")?
        .class("btn-search")
        .text("Search")
        .on_click(move |_| submit())?
        .build();

    let form = ElementBuilder::new("div")?
        .class("search-form")
        .child(input)?
        .child(button)?
        .build();
    append_child(container, &form)
}

pub fn render_search_result(container: &Element, ctx: &AppContext) -> Result<(), JsValue> {
    clear_children(container);
    let tracking = &ctx.tracking;

    if tracking.searching.get() {
        let pending = ElementBuilder::new("p")?.class("search-pending").text("Searching...").build();
        append_child(container, &pending)?;
    } else {
        match tracking.result.get() {
            Some(SearchOutcome::Found(record)) => {
                let sign = if tracking.is_tracked(&record.username) { "-" } else { "+" };
                let toggle = {
                    let tracking = tracking.clone();
                    let spawner = ctx.spawner.clone();
                    let record = record.clone();
                    ElementBuilder::new("button")?
                        .class("btn-toggle")
                        .text(sign)
                        .on_click(move |_| {
                            tracking.clear_status();
                            tracking.toggle(&record).spawn_remote(&spawner);
                        })?
                        .build()
                };
                let row = ElementBuilder::new("div")?
                    .class("search-row")
                    .child(ElementBuilder::new("span")?.class("account-name").text(record.display_name()).build())?
                    .child(
                        ElementBuilder::new("span")?
                            .class("account-handle")
                            .text(&format!("@{}", record.username))
                            .build(),
                    )?
                    .child(toggle)?
                    .build();
                append_child(container, &row)?;
            }
            Some(SearchOutcome::NotFound { message }) => {
                append_child(container, &ElementBuilder::new("p")?.class("search-error").text(&message).build())?;
            }
            Some(SearchOutcome::Empty) | None => {}
        }
    }

    if let Some(status) = tracking.status.get() {
        append_child(container, &ElementBuilder::new("p")?.class("status-line").text(&status).build())?;
    }
    Ok(())
}
