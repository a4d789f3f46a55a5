//! Runtime injection and hot update of bundler-produced CSS modules.
//!
//! A bundler's style pipeline emits lists of `(id, css, media, source map)`
//! tuples. [`install`] turns such a list into live `<style>`/`<link>`
//! elements and returns a [`StyleUpdater`] that applies later lists as
//! in-place diffs against the same elements, reference-counting modules that
//! several consumers share, and tears everything down when asked.
//!
//! ```ignore
//! let mut updater = stylemount::install(
//!     vec![(1, "a{color:red}".into(), String::new(), None)],
//!     stylemount::InstallOptions::new(),
//! )?;
//! // hot update
//! updater.update(Some(vec![(1, "a{color:blue}".into(), String::new(), None)]))?;
//! // teardown
//! updater.update(None)?;
//! ```

pub mod options;
pub mod registry;
pub mod session;
pub mod types;
pub mod updater;

pub use options::{FixUrls, InsertAt, InstallOptions};
pub use session::{StyleSession, StyleUpdater};
pub use stylemount_core::{StyleMountError, StyleMountResult};
pub use types::{Part, StyleModule, StyleTuple, list_to_modules};

pub mod prelude {
    pub use crate::options::{FixUrls, InsertAt, InstallOptions};
    pub use crate::session::{StyleSession, StyleUpdater};
    pub use crate::types::{Part, StyleModule, StyleTuple};
    pub use stylemount_core::{StyleMountError, StyleMountResult};
}

thread_local! {
    static DEFAULT_SESSION: StyleSession = StyleSession::new();
}

/// Installs `list` into the shared thread-local session.
///
/// Most callers want this; independent registries (say, one per shadow root
/// pipeline) can create their own [`StyleSession`] instead.
pub fn install(
    list: Vec<StyleTuple>,
    options: InstallOptions,
) -> StyleMountResult<StyleUpdater> {
    DEFAULT_SESSION.with(|session| session.install(list, options))
}
