//! Errors raised by the browser host

use mos_core::MosError;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("no global `window` object")]
    NoWindow,

    #[error("window has no document")]
    NoDocument,

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("JavaScript error: {0}")]
    Js(String),

    #[error(transparent)]
    Mos(#[from] MosError),
}

impl HostError {
    pub(crate) fn js(value: &JsValue) -> Self {
        HostError::Js(describe(value))
    }
}

impl From<HostError> for JsValue {
    fn from(err: HostError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Best-effort text for a thrown JavaScript value
pub(crate) fn describe(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

pub type Result<T> = std::result::Result<T, HostError>;
