// ============================================================================
// LOGIN MODAL - Google sign-in / account details and sign-out
// ============================================================================

use futures::future::FutureExt;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::app::AppContext;
use crate::dom::{append_child, clear_children, set_visible, ElementBuilder};

pub fn render_login_modal(container: &Element, ctx: &AppContext) -> Result<(), JsValue> {
    clear_children(container);
    let open = ctx.login_open.get();
    set_visible(container, open)?;
    if !open {
        return Ok(());
    }

    let close = {
        let login_open = ctx.login_open.clone();
        ElementBuilder::new("button")?
            .class("btn-close")
            .attr("aria-label", "Close")?
            .text("×")
            .on_click(move |_| login_open.set(false))?
            .build()
    };

    let card = ElementBuilder::new("div")?.class("modal-card").child(close)?.build();

    match ctx.gate.auth().current_user() {
        Some(user) => {
            let who = user
                .display_name
                .or(user.email)
                .unwrap_or_else(|| user.uid.clone());
            append_child(&card, &ElementBuilder::new("h2")?.text("Account").build())?;
            append_child(&card, &ElementBuilder::new("p")?.class("account-name").text(&who).build())?;
            append_child(&card, &sign_out_button(ctx)?)?;
        }
        None if ctx.config.has_remote() => {
            append_child(&card, &ElementBuilder::new("h2")?.text("Log In").build())?;
            append_child(&card, &sign_in_button(ctx)?)?;
        }
        None => {
            append_child(&card, &ElementBuilder::new("h2")?.text("Log In").build())?;
            let note = ElementBuilder::new("p")?
                .class("modal-note")
                .text("Sign-in is unavailable: no Firebase project is configured.")
                .build();
            append_child(&card, &note)?;
        }
    }

    let overlay = ElementBuilder::new("div")?.class("modal-overlay").child(card)?.build();
    append_child(container, &overlay)
}

fn sign_in_button(ctx: &AppContext) -> Result<Element, JsValue> {
    let gate = ctx.gate.clone();
    let login_open = ctx.login_open.clone();
    let spawner = ctx.spawner.clone();
    Ok(ElementBuilder::new("button")?
        .class("btn-google")
        .text("Sign in with Google")
        .on_click(move |_| {
            let gate = gate.clone();
            let login_open = login_open.clone();
            spawner(
                async move {
                    if gate.sign_in().await.is_ok() {
                        login_open.set(false);
                    }
                }
                .boxed_local(),
            );
        })?
        .build())
}

fn sign_out_button(ctx: &AppContext) -> Result<Element, JsValue> {
    let gate = ctx.gate.clone();
    let login_open = ctx.login_open.clone();
    let spawner = ctx.spawner.clone();
    Ok(ElementBuilder::new("button")?
        .class("btn-secondary")
        .text("Sign out")
        .on_click(move |_| {
            let gate = gate.clone();
            let login_open = login_open.clone();
            spawner(
                async move {
                    if gate.sign_out().await.is_ok() {
                        login_open.set(false);
                    }
                }
                .boxed_local(),
            );
        })?
        .build())
}
