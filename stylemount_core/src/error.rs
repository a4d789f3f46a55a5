use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)] // Clone to allow easy propagation in closures if needed
pub enum StyleMountError {
    /// The configured insertion target did not resolve to a live node.
    TargetNotFound(String),
    /// An insertion position string that is neither "top" nor "bottom".
    InvalidInsertAt(String),
    /// No live document is available in this environment.
    NoDocument,
    Dom(String),
    Javascript(String),
}

impl fmt::Display for StyleMountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleMountError::TargetNotFound(selector) => {
                write!(f, "Couldn't find a style target: {}", selector)
            }
            StyleMountError::InvalidInsertAt(value) => write!(
                f,
                "Invalid value for parameter 'insert_at' ('{}'). Valid values are 'top' and 'bottom'.",
                value
            ),
            StyleMountError::NoDocument => {
                write!(f, "stylemount cannot be used in a non-browser environment")
            }
            StyleMountError::Dom(msg) => write!(f, "DOM Error: {}", msg),
            StyleMountError::Javascript(msg) => write!(f, "JavaScript Error: {}", msg),
        }
    }
}

impl std::error::Error for StyleMountError {}

impl From<wasm_bindgen::JsValue> for StyleMountError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        let msg = value.as_string().unwrap_or_else(|| format!("{:?}", value));
        StyleMountError::Javascript(msg)
    }
}

pub type StyleMountResult<T> = Result<T, StyleMountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_insert_at_message_names_value() {
        let err = StyleMountError::InvalidInsertAt("middle".to_string());
        assert!(err.to_string().contains("'middle'"));
    }

    #[test]
    fn test_target_not_found_message_names_selector() {
        let err = StyleMountError::TargetNotFound("#missing".to_string());
        assert!(err.to_string().contains("#missing"));
    }
}
