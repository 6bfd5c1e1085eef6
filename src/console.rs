const PREFIX: &str = "[BASURAYT]";

#[cfg(target_arch = "wasm32")]
pub(crate) fn info(message: &str) {
    web_sys::console::log_1(&format!("{PREFIX} {message}").into());
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn warn(message: &str) {
    web_sys::console::warn_1(&format!("{PREFIX} {message}").into());
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn error(message: &str) {
    web_sys::console::error_1(&format!("{PREFIX} {message}").into());
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn info(message: &str) {
    eprintln!("{PREFIX} {message}");
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn warn(message: &str) {
    eprintln!("{PREFIX} warn: {message}");
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn error(message: &str) {
    eprintln!("{PREFIX} error: {message}");
}
