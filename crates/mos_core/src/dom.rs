//! DOM abstraction
//!
//! The trigger engine only needs a handful of layout reads and class writes.
//! Hosts implement [`Document`] and [`DomElement`] over their real DOM; the
//! browser host wraps `web-sys`, tests use an in-memory tree.

use std::fmt;

/// Presence attribute marking an element as tracked; its value is the preset
pub const TRIGGER_ATTRIBUTE: &str = "data-mos";

/// Layout and class access for one DOM element
///
/// Implementations are cheap handles: cloning must refer to the same node.
pub trait DomElement: Clone + fmt::Debug + 'static {
    /// Node identity, not structural equality
    fn is_same_node(&self, other: &Self) -> bool;

    fn offset_top(&self) -> f64;
    fn offset_left(&self) -> f64;
    fn offset_height(&self) -> f64;
    fn scroll_top(&self) -> f64;
    fn scroll_left(&self) -> f64;
    fn offset_parent(&self) -> Option<Self>;

    /// Whether this is the `<body>` element, whose scroll offsets belong to
    /// the document rather than to a scroll container
    fn is_document_root(&self) -> bool;

    fn attribute(&self, name: &str) -> Option<String>;

    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);

    /// Whether any descendant carries `name`
    fn has_descendant_with_attribute(&self, name: &str) -> bool;
}

/// Window/document level access
pub trait Document: 'static {
    type Element: DomElement;

    /// Current vertical scroll position of the page
    fn scroll_y(&self) -> f64;

    /// Height of the layout viewport
    fn viewport_height(&self) -> f64;

    /// First element matching a CSS selector
    fn query_selector(&self, selector: &str) -> Option<Self::Element>;

    /// Every element carrying `name`, in document order
    fn elements_with_attribute(&self, name: &str) -> Vec<Self::Element>;
}
