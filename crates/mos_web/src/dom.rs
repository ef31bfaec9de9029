//! `web-sys` implementations of the DOM traits

use std::fmt;

use mos_core::{Document, DomElement};
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, Window};

use crate::error::{HostError, Result};

/// The page the session runs on
#[derive(Clone)]
pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
}

impl WebDocument {
    pub fn from_window() -> Result<Self> {
        let window = web_sys::window().ok_or(HostError::NoWindow)?;
        let document = window.document().ok_or(HostError::NoDocument)?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }
}

impl Document for WebDocument {
    type Element = WebElement;

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.window
            .inner_height()
            .ok()
            .and_then(|h| h.as_f64())
            .unwrap_or(0.0)
    }

    fn query_selector(&self, selector: &str) -> Option<WebElement> {
        match self.document.query_selector(selector) {
            Ok(found) => found.map(WebElement),
            Err(_) => {
                tracing::warn!("invalid selector {:?}", selector);
                None
            }
        }
    }

    fn elements_with_attribute(&self, name: &str) -> Vec<WebElement> {
        let Ok(nodes) = self.document.query_selector_all(&format!("[{name}]")) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .map(WebElement)
            .collect()
    }
}

/// A DOM element handle
#[derive(Clone)]
pub struct WebElement(pub web_sys::Element);

impl WebElement {
    fn html(&self) -> Option<&HtmlElement> {
        self.0.dyn_ref::<HtmlElement>()
    }
}

impl AsRef<web_sys::Element> for WebElement {
    fn as_ref(&self) -> &web_sys::Element {
        &self.0
    }
}

impl fmt::Debug for WebElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.0.id();
        if id.is_empty() {
            write!(f, "<{}>", self.0.tag_name().to_lowercase())
        } else {
            write!(f, "<{}#{}>", self.0.tag_name().to_lowercase(), id)
        }
    }
}

impl DomElement for WebElement {
    fn is_same_node(&self, other: &Self) -> bool {
        let other: &web_sys::Node = &other.0;
        self.0.is_same_node(Some(other))
    }

    // Non-HTML elements (SVG) have no offset box
    fn offset_top(&self) -> f64 {
        self.html().map_or(0.0, |h| f64::from(h.offset_top()))
    }

    fn offset_left(&self) -> f64 {
        self.html().map_or(0.0, |h| f64::from(h.offset_left()))
    }

    fn offset_height(&self) -> f64 {
        self.html().map_or(0.0, |h| f64::from(h.offset_height()))
    }

    fn scroll_top(&self) -> f64 {
        f64::from(self.0.scroll_top())
    }

    fn scroll_left(&self) -> f64 {
        f64::from(self.0.scroll_left())
    }

    fn offset_parent(&self) -> Option<Self> {
        self.html().and_then(|h| h.offset_parent()).map(WebElement)
    }

    fn is_document_root(&self) -> bool {
        let tag = self.0.tag_name();
        tag.eq_ignore_ascii_case("body") || tag.eq_ignore_ascii_case("html")
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.0.has_attribute(name)
    }

    fn add_class(&self, class: &str) {
        if self.0.class_list().add_1(class).is_err() {
            tracing::warn!("could not add class {:?} to {:?}", class, self);
        }
    }

    fn remove_class(&self, class: &str) {
        if self.0.class_list().remove_1(class).is_err() {
            tracing::warn!("could not remove class {:?} from {:?}", class, self);
        }
    }

    fn has_descendant_with_attribute(&self, name: &str) -> bool {
        matches!(self.0.query_selector(&format!("[{name}]")), Ok(Some(_)))
    }
}
