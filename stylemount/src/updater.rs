use std::cell::RefCell;
use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlLinkElement, HtmlStyleElement};

use crate::options::FixUrls;
use crate::types::Part;

/// Elements inserted at the top of their target, in arrival order. Shared
/// between the session and every handle that may need to splice itself out.
pub(crate) type SharedTopList = Rc<RefCell<Vec<Element>>>;

pub(crate) type SharedSingleton = Rc<RefCell<SingletonState>>;

// --- Singleton strategy state ---

/// The one physical `<style>` element shared by every part in singleton mode,
/// plus its slot store. Slot indices are handed out monotonically and never
/// reused, so `slots` is a sparse sequence addressed by index; an empty
/// string marks a removed slot and keeps later indices aligned.
#[derive(Default)]
pub(crate) struct SingletonState {
    pub element: Option<HtmlStyleElement>,
    slots: Vec<String>,
    next_slot: usize,
}

impl SingletonState {
    pub fn take_slot(&mut self) -> usize {
        let index = self.next_slot;
        self.next_slot += 1;
        index
    }

    fn write_slot(&mut self, index: usize, css: &str) {
        if self.slots.len() <= index {
            self.slots.resize(index + 1, String::new());
        }
        self.slots[index] = css.to_string();
        let rendered = join_slots(&self.slots);
        if let Some(element) = &self.element {
            element.set_text_content(Some(&rendered));
        }
    }
}

/// Joins the non-empty slots with newlines; removed slots vanish from the
/// output instead of leaving blank lines.
pub(crate) fn join_slots(slots: &[String]) -> String {
    slots
        .iter()
        .filter(|css| !css.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

// --- Blob-link strategy helpers ---

/// Whether the blob-link strategy rewrites URLs: an explicit setting always
/// wins, and an unset one auto-enables exactly when a source map is present.
pub(crate) fn should_fix_urls(convert_to_absolute_urls: Option<bool>, has_source_map: bool) -> bool {
    convert_to_absolute_urls.unwrap_or(has_source_map)
}

/// Renders the embedded source-map comment appended to blob-backed CSS.
pub(crate) fn source_map_comment(source_map: &serde_json::Value) -> Option<String> {
    let json = serde_json::to_string(source_map).ok()?;
    let encoded = BASE64.encode(json.as_bytes());
    Some(format!(
        "\n/*# sourceMappingURL=data:application/json;base64,{} */",
        encoded
    ))
}

// --- Part handles ---

enum Strategy {
    /// One slot of the session-wide shared `<style>` element.
    SingletonSlot { store: SharedSingleton, index: usize },
    /// A `<link>` whose href is a revocable blob URL, re-minted per update.
    BlobLink {
        link: HtmlLinkElement,
        href: Option<String>,
        convert_to_absolute_urls: Option<bool>,
        url_fixer: Option<Rc<dyn FixUrls>>,
        top_inserted: SharedTopList,
    },
    /// A dedicated `<style>` element, text content replaced in place.
    Inline {
        style: HtmlStyleElement,
        top_inserted: SharedTopList,
    },
}

/// Live update/remove handle for one inserted part. The strategy is chosen
/// once at creation and fixed for the handle's lifetime.
pub struct PartHandle {
    strategy: Strategy,
    applied: Option<Part>,
}

impl PartHandle {
    pub(crate) fn singleton_slot(store: SharedSingleton, index: usize) -> Self {
        Self::new(Strategy::SingletonSlot { store, index })
    }

    pub(crate) fn blob_link(
        link: HtmlLinkElement,
        convert_to_absolute_urls: Option<bool>,
        url_fixer: Option<Rc<dyn FixUrls>>,
        top_inserted: SharedTopList,
    ) -> Self {
        Self::new(Strategy::BlobLink {
            link,
            href: None,
            convert_to_absolute_urls,
            url_fixer,
            top_inserted,
        })
    }

    pub(crate) fn inline(style: HtmlStyleElement, top_inserted: SharedTopList) -> Self {
        Self::new(Strategy::Inline {
            style,
            top_inserted,
        })
    }

    fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            applied: None,
        }
    }

    /// Pushes a new part into the backing element. A part field-wise equal to
    /// the last applied one is a no-op, so repeated identical registrations
    /// cause no DOM churn.
    pub fn update(&mut self, part: Part) {
        if self.applied.as_ref() == Some(&part) {
            return;
        }
        match &mut self.strategy {
            Strategy::SingletonSlot { store, index } => {
                store.borrow_mut().write_slot(*index, &part.css);
            }
            Strategy::BlobLink {
                link,
                href,
                convert_to_absolute_urls,
                url_fixer,
                ..
            } => {
                let mut css = part.css.clone();
                if should_fix_urls(*convert_to_absolute_urls, part.source_map.is_some())
                    && let Some(fixer) = url_fixer
                {
                    css = fixer.fix(&css);
                }
                if let Some(map) = &part.source_map
                    && let Some(comment) = source_map_comment(map)
                {
                    css.push_str(&comment);
                }
                // Assign the new href before revoking the old one, so the
                // link never points at a dead URL (no flash of unstyled
                // content in between).
                if let Some(url) = stylemount_dom::create_css_blob(&css)
                    .as_ref()
                    .and_then(stylemount_dom::create_object_url)
                {
                    link.set_href(&url);
                    if let Some(old) = href.replace(url) {
                        stylemount_dom::revoke_object_url(&old);
                    }
                }
            }
            Strategy::Inline { style, .. } => {
                if !part.media.is_empty() {
                    let _ = style.set_attribute("media", &part.media);
                }
                style.set_text_content(Some(&part.css));
            }
        }
        self.applied = Some(part);
    }

    /// Detaches the backing element (or blanks the singleton slot) and
    /// releases any resources it held.
    pub fn remove(&mut self) {
        match &mut self.strategy {
            Strategy::SingletonSlot { store, index } => {
                // The slot is blanked, not deleted; the shared element stays.
                store.borrow_mut().write_slot(*index, "");
            }
            Strategy::BlobLink {
                link,
                href,
                top_inserted,
                ..
            } => {
                detach_tracked(link.unchecked_ref(), top_inserted);
                if let Some(old) = href.take() {
                    stylemount_dom::revoke_object_url(&old);
                }
            }
            Strategy::Inline {
                style,
                top_inserted,
            } => {
                detach_tracked(style.unchecked_ref(), top_inserted);
            }
        }
        self.applied = None;
    }
}

/// Detaches an element and, if it was top-inserted, splices it out of the
/// arrival-order list so later top insertions stay correctly positioned.
fn detach_tracked(el: &Element, top_inserted: &SharedTopList) {
    stylemount_dom::detach(el.unchecked_ref());
    let mut top = top_inserted.borrow_mut();
    if let Some(pos) = top.iter().position(|tracked| tracked == el) {
        top.remove(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_drops_empty_slots() {
        let slots = vec![
            String::new(),
            "a{color:red}".to_string(),
            String::new(),
            "b{color:blue}".to_string(),
        ];
        assert_eq!(join_slots(&slots), "a{color:red}\nb{color:blue}");
    }

    #[test]
    fn test_join_of_all_empty_slots_is_empty() {
        assert_eq!(join_slots(&[String::new(), String::new()]), "");
        assert_eq!(join_slots(&[]), "");
    }

    #[test]
    fn test_slot_indices_are_never_reused() {
        let mut state = SingletonState::default();
        assert_eq!(state.take_slot(), 0);
        assert_eq!(state.take_slot(), 1);
        // Blanking a slot must not hand its index back out.
        state.write_slot(0, "");
        assert_eq!(state.take_slot(), 2);
    }

    #[test]
    fn test_sparse_slot_write_keeps_alignment() {
        let mut state = SingletonState::default();
        state.write_slot(2, "c{}");
        state.write_slot(0, "a{}");
        assert_eq!(join_slots(&state.slots), "a{}\nc{}");
    }

    #[test]
    fn test_url_fixing_coupling_table() {
        // Explicit settings always win.
        assert!(should_fix_urls(Some(true), false));
        assert!(!should_fix_urls(Some(false), true));
        // Unset auto-enables exactly when a source map is present.
        assert!(should_fix_urls(None, true));
        assert!(!should_fix_urls(None, false));
    }

    #[test]
    fn test_source_map_comment_embeds_base64_json() {
        let map = serde_json::json!({ "version": 3 });
        let comment = source_map_comment(&map).unwrap();
        assert!(comment.starts_with("\n/*# sourceMappingURL=data:application/json;base64,"));
        assert!(comment.ends_with(" */"));
        let encoded = comment
            .trim_start_matches("\n/*# sourceMappingURL=data:application/json;base64,")
            .trim_end_matches(" */");
        let decoded = BASE64.decode(encoded).unwrap();
        assert_eq!(decoded, serde_json::to_vec(&map).unwrap());
    }
}
