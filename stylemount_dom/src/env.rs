use wasm_bindgen::JsValue;

use crate::window;

// --- Environment Capability Probes ---
//
// These are pure probes; callers that need the answer cached for a session's
// lifetime hold the result themselves.

/// True for engines that only reliably render a single `<style>` tag
/// (IE 6 through 9). Such environments default to singleton mode.
pub fn is_legacy_single_tag_engine() -> bool {
    let ua = window()
        .navigator()
        .user_agent()
        .unwrap_or_default()
        .to_lowercase();
    matches_legacy_ua(&ua)
}

/// Equivalent of matching `msie [6-9]\b` against a lowercased user agent.
pub(crate) fn matches_legacy_ua(ua: &str) -> bool {
    ua.match_indices("msie ").any(|(pos, _)| {
        let mut rest = ua[pos + 5..].chars();
        matches!(rest.next(), Some('6'..='9')) && !matches!(rest.next(), Some('0'..='9'))
    })
}

/// True when the environment can mint and revoke object URLs from blobs and
/// base64-encode text, i.e. everything the blob-link strategy relies on.
pub fn supports_blob_urls() -> bool {
    let global: JsValue = js_sys::global().into();
    global_fn(&global, "btoa")
        && global_fn(&global, "Blob")
        && url_method(&global, "createObjectURL")
        && url_method(&global, "revokeObjectURL")
}

fn global_fn(global: &JsValue, name: &str) -> bool {
    js_sys::Reflect::get(global, &JsValue::from_str(name))
        .map(|v| v.is_function())
        .unwrap_or(false)
}

fn url_method(global: &JsValue, method: &str) -> bool {
    js_sys::Reflect::get(global, &JsValue::from_str("URL"))
        .ok()
        .filter(|url| url.is_function())
        .and_then(|url| js_sys::Reflect::get(&url, &JsValue::from_str(method)).ok())
        .map(|v| v.is_function())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_ua_matches_old_ie() {
        assert!(matches_legacy_ua(
            "mozilla/4.0 (compatible; msie 6.0; windows nt 5.1)"
        ));
        assert!(matches_legacy_ua(
            "mozilla/5.0 (compatible; msie 9.0; windows nt 6.1)"
        ));
    }

    #[test]
    fn test_modern_uas_are_not_legacy() {
        // IE 10 starts with a '1', which must not match the 6-9 range.
        assert!(!matches_legacy_ua(
            "mozilla/5.0 (compatible; msie 10.0; windows nt 6.2)"
        ));
        assert!(!matches_legacy_ua(
            "mozilla/5.0 (windows nt 10.0) applewebkit/537.36 chrome/120.0"
        ));
        assert!(!matches_legacy_ua(""));
    }

    #[test]
    fn test_digit_run_is_not_a_word_boundary() {
        assert!(!matches_legacy_ua("something msie 60 something"));
    }
}
