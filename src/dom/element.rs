// ============================================================================
// ELEMENT HELPERS - Basic DOM functions
// ============================================================================

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, Window};

pub fn window() -> Option<Window> {
    web_sys::window()
}

pub fn document() -> Option<Document> {
    window()?.document()
}

pub fn get_element_by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

/// Element by id, or an error naming the missing id
pub fn require_element(id: &str) -> Result<Element, JsValue> {
    get_element_by_id(id).ok_or_else(|| JsValue::from_str(&format!("No #{} element found", id)))
}

pub fn create_element(tag: &str) -> Result<Element, JsValue> {
    document()
        .ok_or_else(|| JsValue::from_str("No document"))
        .and_then(|doc| doc.create_element(tag))
}

pub fn set_text_content(element: &Element, text: &str) {
    element.set_text_content(Some(text));
}

/// Remove every child of `element`
pub fn clear_children(element: &Element) {
    element.set_inner_html("");
}

pub fn append_child(parent: &Element, child: &Element) -> Result<(), JsValue> {
    parent.append_child(child).map(|_| ())
}

pub fn set_attribute(element: &Element, name: &str, value: &str) -> Result<(), JsValue> {
    element.set_attribute(name, value)
}

/// Show or hide with the `hidden` class
pub fn set_visible(element: &Element, visible: bool) -> Result<(), JsValue> {
    if visible {
        element.class_list().remove_1("hidden")
    } else {
        element.class_list().add_1("hidden")
    }
}

/// Current value of an `<input>`, empty if `element` is not one
pub fn input_value(element: &Element) -> String {
    element
        .dyn_ref::<HtmlInputElement>()
        .map(|input| input.value())
        .unwrap_or_default()
}
