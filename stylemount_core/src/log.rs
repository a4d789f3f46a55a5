use wasm_bindgen::JsValue;
use web_sys::console;

/// Logs a message to [`console.log`](https://developer.mozilla.org/en-US/docs/Web/API/Console/log).
pub fn console_log(msg: &str) {
    console::log_1(&JsValue::from_str(msg));
}

/// Logs a message to `console.warn`.
pub fn console_warn(msg: &str) {
    console::warn_1(&JsValue::from_str(msg));
}

/// Logs a message to `console.error`.
pub fn console_error(msg: &str) {
    console::error_1(&JsValue::from_str(msg));
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {
        $crate::log::console_log(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::log::console_warn(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::log::console_error(&format!($($arg)*))
    };
}
