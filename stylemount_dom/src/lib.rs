pub mod element;
pub mod env;

pub use element::*;
pub use env::*;

use web_sys::{Document, Window};

// --- Window & Document Access ---

thread_local! {
    static WINDOW: Window = web_sys::window().expect("Window not found");
    static DOCUMENT: Document = WINDOW.with(|w| w.document().expect("Document not found"));
}

/// Returns the cached [`Window`](web_sys::Window).
pub fn window() -> Window {
    WINDOW.with(|w| w.clone())
}

/// Returns the cached [`Document`](web_sys::Document).
pub fn document() -> Document {
    DOCUMENT.with(|d| d.clone())
}

/// Non-panicking probe for a live document, used by debug-build assertions.
pub fn has_live_document() -> bool {
    web_sys::window().and_then(|w| w.document()).is_some()
}

/// Resolves a CSS selector against the document, returning `None` when the
/// selector is invalid or matches nothing.
pub fn query_selector(selector: &str) -> Option<web_sys::Element> {
    document().query_selector(selector).ok().flatten()
}
