use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use stylemount_core::StyleMountResult;
use wasm_bindgen::JsCast;
use web_sys::Element;

use crate::options::{InsertAt, InstallOptions, ResolvedOptions};
use crate::registry::{LiveModule, LiveModuleRef, StyleRegistry};
use crate::types::{Part, StyleModule, StyleTuple, list_to_modules};
use crate::updater::{PartHandle, SharedSingleton, SharedTopList};

/// One independent style-injection session.
///
/// Everything the runtime mutates — the live-module registry, the
/// top-insertion order list, the singleton slot store, the capability cache,
/// and the target-resolution memo — is owned here, so independent sessions
/// never cross-talk. Cloning is cheap and shares the same state.
#[derive(Clone, Default)]
pub struct StyleSession {
    inner: Rc<SessionInner>,
}

impl StyleSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects every module of `list` into the document and returns the
    /// updater used to apply later diffs or tear everything down.
    ///
    /// Fails fast when the configured insertion target does not resolve to a
    /// live node; debug builds additionally reject environments without a
    /// live document.
    pub fn install(
        &self,
        list: Vec<StyleTuple>,
        options: InstallOptions,
    ) -> StyleMountResult<StyleUpdater> {
        #[cfg(debug_assertions)]
        {
            if !stylemount_dom::has_live_document() {
                return Err(stylemount_core::StyleMountError::NoDocument);
            }
        }

        let options = Rc::new(options.resolve(self.inner.legacy_engine()));
        let modules = list_to_modules(list);
        self.inner.install_modules(&modules, &options)?;
        Ok(StyleUpdater {
            inner: Rc::clone(&self.inner),
            options,
            tracked: modules,
        })
    }

    /// Number of distinct live modules currently registered.
    pub fn live_modules(&self) -> usize {
        self.inner.registry.borrow().live_len()
    }
}

#[derive(Default)]
struct SessionInner {
    registry: RefCell<StyleRegistry>,
    top_inserted: SharedTopList,
    singleton: SharedSingleton,
    targets: RefCell<HashMap<String, Option<Element>>>,
    legacy_engine: Cell<Option<bool>>,
    blob_urls: Cell<Option<bool>>,
}

impl SessionInner {
    // --- Cached capability probes ---

    fn legacy_engine(&self) -> bool {
        if let Some(cached) = self.legacy_engine.get() {
            return cached;
        }
        let probed = stylemount_dom::is_legacy_single_tag_engine();
        self.legacy_engine.set(Some(probed));
        probed
    }

    fn blob_urls_supported(&self) -> bool {
        if let Some(cached) = self.blob_urls.get() {
            return cached;
        }
        let probed = stylemount_dom::supports_blob_urls();
        self.blob_urls.set(Some(probed));
        probed
    }

    // --- Target resolution & element insertion ---

    /// Memoized per selector for the session's lifetime; a selector that
    /// resolves to nothing is cached as such and stays fatal.
    fn resolve_target(&self, selector: &str) -> Option<Element> {
        self.targets
            .borrow_mut()
            .entry(selector.to_string())
            .or_insert_with(|| stylemount_dom::query_selector(selector))
            .clone()
    }

    fn insert_element(&self, options: &ResolvedOptions, el: &Element) -> StyleMountResult<()> {
        let target = self.resolve_target(&options.insert_into).ok_or_else(|| {
            stylemount_core::StyleMountError::TargetNotFound(options.insert_into.clone())
        })?;
        match options.insert_at {
            InsertAt::Bottom => {
                let _ = target.append_child(el);
            }
            InsertAt::Top => {
                let mut top = self.top_inserted.borrow_mut();
                // Land directly after the most recent top insertion, or as
                // the target's first child when there is none recorded.
                let reference = match top.last() {
                    Some(last) => last.next_sibling(),
                    None => target.first_child(),
                };
                let _ = target.insert_before(el, reference.as_ref());
                top.push(el.clone());
            }
        }
        Ok(())
    }

    // --- Live module management ---

    fn install_modules(
        &self,
        modules: &[Rc<StyleModule>],
        options: &ResolvedOptions,
    ) -> StyleMountResult<()> {
        for module in modules {
            let existing = self.registry.borrow().lookup(module);
            match existing {
                Some(entry) => {
                    self.refresh_entry(&entry, module, options)?;
                    self.registry
                        .borrow_mut()
                        .register(Rc::clone(module), entry);
                }
                None => {
                    let mut handles = Vec::with_capacity(module.parts.len());
                    for part in &module.parts {
                        handles.push(self.create_handle(part.clone(), options)?);
                    }
                    let entry = Rc::new(RefCell::new(LiveModule {
                        id: module.id,
                        refs: 1,
                        handles,
                    }));
                    self.registry
                        .borrow_mut()
                        .register(Rc::clone(module), entry);
                }
            }
        }
        Ok(())
    }

    /// Re-registers an already-live module: bumps its reference count, pushes
    /// the new parts into the existing handles positionally, tears down any
    /// handles past the new part count, and appends handles for trailing
    /// parts the entry has not seen before.
    fn refresh_entry(
        &self,
        entry: &LiveModuleRef,
        module: &StyleModule,
        options: &ResolvedOptions,
    ) -> StyleMountResult<()> {
        let mut live = entry.borrow_mut();
        live.refs += 1;
        let handled = live.handles.len();
        for (handle, part) in live.handles.iter_mut().zip(module.parts.iter()) {
            handle.update(part.clone());
        }
        for handle in live.handles.iter_mut().skip(module.parts.len()) {
            handle.remove();
        }
        for part in module.parts.iter().skip(handled) {
            let handle = self.create_handle(part.clone(), options)?;
            live.handles.push(handle);
        }
        Ok(())
    }

    /// Creates the live handle for one part, choosing its strategy once:
    /// singleton slot when the session runs in singleton mode, blob-backed
    /// link when the part has a source map and the environment supports
    /// object URLs, plain inline `<style>` otherwise.
    fn create_handle(&self, part: Part, options: &ResolvedOptions) -> StyleMountResult<PartHandle> {
        let mut handle = if options.singleton {
            self.ensure_singleton_element(options)?;
            let index = self.singleton.borrow_mut().take_slot();
            PartHandle::singleton_slot(Rc::clone(&self.singleton), index)
        } else if part.source_map.is_some() && self.blob_urls_supported() {
            let link = stylemount_dom::create_link_element(&options.attrs);
            self.insert_element(options, link.unchecked_ref())?;
            PartHandle::blob_link(
                link,
                options.convert_to_absolute_urls,
                options.url_fixer.clone(),
                Rc::clone(&self.top_inserted),
            )
        } else {
            let style = stylemount_dom::create_style_element(&options.attrs);
            self.insert_element(options, style.unchecked_ref())?;
            PartHandle::inline(style, Rc::clone(&self.top_inserted))
        };
        handle.update(part);
        Ok(handle)
    }

    fn ensure_singleton_element(&self, options: &ResolvedOptions) -> StyleMountResult<()> {
        if self.singleton.borrow().element.is_some() {
            return Ok(());
        }
        let style = stylemount_dom::create_style_element(&options.attrs);
        self.insert_element(options, style.unchecked_ref())?;
        self.singleton.borrow_mut().element = Some(style);
        Ok(())
    }
}

/// Applies diffs to, and eventually tears down, what one `install` created.
///
/// Each call first stages a reference-count decrement for every module the
/// previous call tracked, then (when a new list is given) re-runs the install
/// logic against it, and finally drops every staged module whose count
/// reached zero. Calling with `None` is a pure teardown.
pub struct StyleUpdater {
    inner: Rc<SessionInner>,
    options: Rc<ResolvedOptions>,
    tracked: Vec<Rc<StyleModule>>,
}

impl StyleUpdater {
    pub fn update(&mut self, new_list: Option<Vec<StyleTuple>>) -> StyleMountResult<()> {
        let mut staged: Vec<(Rc<StyleModule>, LiveModuleRef)> = Vec::new();
        for descriptor in self.tracked.drain(..) {
            let found = self.inner.registry.borrow().lookup_exact(&descriptor);
            if let Some(entry) = found {
                entry.borrow_mut().refs -= 1;
                staged.push((descriptor, entry));
            }
        }

        if let Some(list) = new_list {
            let modules = list_to_modules(list);
            self.inner.install_modules(&modules, &self.options)?;
            self.tracked = modules;
        }

        for (descriptor, entry) in staged {
            self.inner.registry.borrow_mut().remove_pair(&descriptor);
            let drained = entry.borrow().refs == 0;
            if drained {
                for handle in entry.borrow_mut().handles.iter_mut() {
                    handle.remove();
                }
                self.inner.registry.borrow_mut().evict(&entry);
            }
        }
        Ok(())
    }
}
