use std::collections::HashMap;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, Element, HtmlLinkElement, HtmlStyleElement, Node, Url};

use crate::document;

/// Creates a `<style type="text/css">` element carrying `attrs`.
///
/// `type` is always overwritten after the caller-supplied attributes are
/// applied, so it cannot be spoofed through `attrs`.
pub fn create_style_element(attrs: &HashMap<String, String>) -> HtmlStyleElement {
    let el: HtmlStyleElement = document()
        .create_element("style")
        .expect("Failed to create style element")
        .unchecked_into();
    apply_attrs(el.unchecked_ref(), attrs);
    let _ = el.set_attribute("type", "text/css");
    el
}

/// Creates a `<link rel="stylesheet" type="text/css">` element carrying `attrs`.
///
/// Like [`create_style_element`], `type` and `rel` always win over `attrs`.
pub fn create_link_element(attrs: &HashMap<String, String>) -> HtmlLinkElement {
    let el: HtmlLinkElement = document()
        .create_element("link")
        .expect("Failed to create link element")
        .unchecked_into();
    apply_attrs(el.unchecked_ref(), attrs);
    let _ = el.set_attribute("type", "text/css");
    el.set_rel("stylesheet");
    el
}

/// Applies every entry of `attrs` as an attribute on `el`.
pub fn apply_attrs(el: &Element, attrs: &HashMap<String, String>) {
    for (name, value) in attrs {
        if let Err(err) = el.set_attribute(name, value) {
            stylemount_core::warn!("Failed to set attribute '{}': {:?}", name, err);
        }
    }
}

/// Detaches `node` from its parent, if it has one.
pub fn detach(node: &Node) {
    if let Some(parent) = node.parent_node() {
        let _ = parent.remove_child(node);
    }
}

// --- Blob-backed stylesheet URLs ---

/// Packages a chunk of CSS as a `text/css` blob.
pub fn create_css_blob(css: &str) -> Option<Blob> {
    let parts = js_sys::Array::new();
    parts.push(&JsValue::from_str(css));
    let options = BlobPropertyBag::new();
    options.set_type("text/css");
    Blob::new_with_str_sequence_and_options(&parts, &options).ok()
}

/// Mints an object URL addressing `blob`.
pub fn create_object_url(blob: &Blob) -> Option<String> {
    Url::create_object_url_with_blob(blob).ok()
}

/// Releases an object URL previously minted by [`create_object_url`].
pub fn revoke_object_url(url: &str) {
    let _ = Url::revoke_object_url(url);
}
