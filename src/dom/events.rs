// ============================================================================
// EVENT HANDLING
// ============================================================================
// Listeners on elements are leaked with forget(); the browser drops them
// together with the element when a view clears its container.
// ============================================================================

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent, MouseEvent};

pub fn on_click<F>(element: &Element, handler: F) -> Result<(), JsValue>
where
    F: FnMut(MouseEvent) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(MouseEvent)>);
    element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Fires `handler` when Enter is pressed inside `element`
pub fn on_enter<F>(element: &Element, mut handler: F) -> Result<(), JsValue>
where
    F: FnMut() + 'static,
{
    let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if event.key() == "Enter" {
            event.prevent_default();
            handler();
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);
    element.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
