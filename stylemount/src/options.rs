use std::collections::HashMap;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use stylemount_core::{StyleMountError, StyleMountResult};

/// Where newly created elements land within the resolved target node.
///
/// Top insertions chain: each one goes directly after the most recently
/// top-inserted element, so repeated top insertions read in reverse order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertAt {
    Top,
    #[default]
    Bottom,
}

impl FromStr for InsertAt {
    type Err = StyleMountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(InsertAt::Top),
            "bottom" => Ok(InsertAt::Bottom),
            other => Err(StyleMountError::InvalidInsertAt(other.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for InsertAt {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// External URL-fixing collaborator: rewrites `url(...)` references that are
/// relative to the stylesheet's own location against a configured base.
/// Must be pure; the same CSS in yields the same CSS out.
pub trait FixUrls {
    fn fix(&self, css: &str) -> String;
}

impl<F> FixUrls for F
where
    F: Fn(&str) -> String,
{
    fn fix(&self, css: &str) -> String {
        self(css)
    }
}

/// Options accepted by `install`. Every field is optional; unset fields fall
/// back to the defaults described on each builder method.
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstallOptions {
    /// Extra attributes applied to every created element. `type` and `rel`
    /// are always overwritten by the implementation.
    pub attrs: HashMap<String, String>,
    /// Forces or suppresses the shared-element strategy. Unset defaults to
    /// true only on legacy single-tag engines.
    pub singleton: Option<bool>,
    /// Forces or suppresses URL rewriting in the blob-link strategy. Unset
    /// auto-enables whenever a part carries a source map; this coupling is a
    /// deliberate default, not an accident.
    pub convert_to_absolute_urls: Option<bool>,
    /// Selector for the node styles are inserted into. Defaults to "head".
    pub insert_into: Option<String>,
    /// Defaults to [`InsertAt::Bottom`].
    pub insert_at: Option<InsertAt>,
    #[serde(skip)]
    pub url_fixer: Option<Rc<dyn FixUrls>>,
}

impl InstallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an options object arriving from JavaScript. An invalid
    /// `insertAt` string is rejected here, before any element is touched.
    pub fn from_js(value: wasm_bindgen::JsValue) -> StyleMountResult<Self> {
        serde_wasm_bindgen::from_value(value)
            .map_err(|err| StyleMountError::Javascript(err.to_string()))
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn singleton(mut self, on: bool) -> Self {
        self.singleton = Some(on);
        self
    }

    pub fn convert_to_absolute_urls(mut self, on: bool) -> Self {
        self.convert_to_absolute_urls = Some(on);
        self
    }

    pub fn insert_into(mut self, selector: impl Into<String>) -> Self {
        self.insert_into = Some(selector.into());
        self
    }

    pub fn insert_at(mut self, at: InsertAt) -> Self {
        self.insert_at = Some(at);
        self
    }

    /// String form of [`Self::insert_at`]; anything but "top" or "bottom"
    /// is a fatal [`StyleMountError::InvalidInsertAt`].
    pub fn parse_insert_at(mut self, at: &str) -> StyleMountResult<Self> {
        self.insert_at = Some(at.parse()?);
        Ok(self)
    }

    pub fn url_fixer(mut self, fixer: impl FixUrls + 'static) -> Self {
        self.url_fixer = Some(Rc::new(fixer));
        self
    }

    /// Fills every unset field with its documented default. The singleton
    /// default depends on the environment, so the caller passes the cached
    /// legacy-engine probe result in.
    pub(crate) fn resolve(self, legacy_engine: bool) -> ResolvedOptions {
        ResolvedOptions {
            attrs: self.attrs,
            singleton: self.singleton.unwrap_or(legacy_engine),
            convert_to_absolute_urls: self.convert_to_absolute_urls,
            insert_into: self.insert_into.unwrap_or_else(|| "head".to_string()),
            insert_at: self.insert_at.unwrap_or_default(),
            url_fixer: self.url_fixer,
        }
    }
}

/// [`InstallOptions`] with every default applied, fixed for the lifetime of
/// the updater that captured it.
#[derive(Clone)]
pub(crate) struct ResolvedOptions {
    pub attrs: HashMap<String, String>,
    pub singleton: bool,
    pub convert_to_absolute_urls: Option<bool>,
    pub insert_into: String,
    pub insert_at: InsertAt,
    pub url_fixer: Option<Rc<dyn FixUrls>>,
}
