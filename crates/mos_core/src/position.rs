//! Position calculator
//!
//! Trigger thresholds are expressed in document coordinates so they stay
//! constant while the page scrolls. They are recomputed only when layout may
//! have changed (prepare, refresh, resize).

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::config::ElementConfig;
use crate::dom::{Document, DomElement};

/// Which edge of the element meets which edge of the viewport
///
/// Named `{element edge}-{viewport edge}`; `top-bottom` fires as soon as the
/// element's top reaches the bottom of the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorPlacement {
    #[default]
    TopBottom,
    CenterBottom,
    BottomBottom,
    TopCenter,
    CenterCenter,
    BottomCenter,
    TopTop,
    CenterTop,
    BottomTop,
}

impl AnchorPlacement {
    pub const ALL: [AnchorPlacement; 9] = [
        Self::TopBottom,
        Self::CenterBottom,
        Self::BottomBottom,
        Self::TopCenter,
        Self::CenterCenter,
        Self::BottomCenter,
        Self::TopTop,
        Self::CenterTop,
        Self::BottomTop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopBottom => "top-bottom",
            Self::CenterBottom => "center-bottom",
            Self::BottomBottom => "bottom-bottom",
            Self::TopCenter => "top-center",
            Self::CenterCenter => "center-center",
            Self::BottomCenter => "bottom-center",
            Self::TopTop => "top-top",
            Self::CenterTop => "center-top",
            Self::BottomTop => "bottom-top",
        }
    }

    /// Amount added to `offset.top - viewport_height`
    pub fn adjustment(&self, viewport_height: f64, target_height: f64) -> f64 {
        let half_vh = viewport_height / 2.0;
        let half_h = target_height / 2.0;
        match self {
            Self::TopBottom => 0.0,
            Self::CenterBottom => half_h,
            Self::BottomBottom => target_height,
            Self::TopCenter => half_vh,
            Self::CenterCenter => half_vh + half_h,
            Self::BottomCenter => half_vh + target_height,
            Self::TopTop => viewport_height,
            Self::CenterTop => viewport_height + half_h,
            Self::BottomTop => viewport_height + target_height,
        }
    }
}

impl FromStr for AnchorPlacement {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|placement| placement.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for AnchorPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document-relative position of an element
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub top: f64,
    pub left: f64,
}

/// Both thresholds for one element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerPoints {
    pub trigger_in: f64,
    /// `None` when mirroring is off or the animation is once-only
    pub trigger_out: Option<f64>,
}

/// Walk the offset-parent chain, summing offsets minus the scroll of every
/// ancestor except the document root
pub fn compute_offset<E: DomElement>(element: &E) -> Offset {
    let mut offset = Offset::default();
    let mut current = Some(element.clone());

    while let Some(el) = current {
        offset.top += el.offset_top();
        offset.left += el.offset_left();
        if !el.is_document_root() {
            offset.top -= el.scroll_top();
            offset.left -= el.scroll_left();
        }
        current = el.offset_parent();
    }

    offset
}

/// The element thresholds are measured against: the anchor if its selector
/// resolves, the element itself otherwise
pub fn trigger_target<D: Document>(
    document: &D,
    element: &D::Element,
    config: &ElementConfig,
) -> D::Element {
    match config.anchor.as_deref() {
        Some(selector) => document.query_selector(selector).unwrap_or_else(|| {
            tracing::debug!(
                "anchor {:?} matched nothing; measuring {:?} instead",
                selector,
                element
            );
            element.clone()
        }),
        None => element.clone(),
    }
}

/// Scroll position at which the forward animation starts
pub fn compute_trigger_in<D: Document>(
    document: &D,
    element: &D::Element,
    config: &ElementConfig,
) -> f64 {
    let target = trigger_target(document, element, config);
    let viewport_height = document.viewport_height();
    let base = compute_offset(&target).top - viewport_height;

    base + config
        .anchor_placement
        .adjustment(viewport_height, target.offset_height())
        + config.offset
}

/// Scroll position at which a mirrored animation starts reversing
///
/// Callers decide whether the value is meaningful; see
/// [`TriggerPoints::compute`].
pub fn compute_trigger_out<D: Document>(
    document: &D,
    element: &D::Element,
    config: &ElementConfig,
) -> f64 {
    let target = trigger_target(document, element, config);
    compute_offset(&target).top + target.offset_height() - config.offset
}

/// Whether the element's bottom edge is already above the current scroll
/// position
pub fn is_above_document_viewport<D: Document>(document: &D, element: &D::Element) -> bool {
    compute_offset(element).top + element.offset_height() < document.scroll_y()
}

impl TriggerPoints {
    pub fn compute<D: Document>(document: &D, element: &D::Element, config: &ElementConfig) -> Self {
        let trigger_out = if config.mirror_enabled() {
            Some(compute_trigger_out(document, element, config))
        } else {
            None
        };

        Self {
            trigger_in: compute_trigger_in(document, element, config),
            trigger_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalConfig;
    use crate::testing::{MockDocument, MockElement};

    fn config_with(offset: f64, placement: AnchorPlacement) -> ElementConfig {
        let mut config = ElementConfig::from_global("fade", &GlobalConfig::default());
        config.offset = offset;
        config.anchor_placement = placement;
        config
    }

    #[test]
    fn test_anchor_placement_parse() {
        for placement in AnchorPlacement::ALL {
            assert_eq!(placement.as_str().parse::<AnchorPlacement>(), Ok(placement));
        }
        assert!("middle-middle".parse::<AnchorPlacement>().is_err());
    }

    #[test]
    fn test_center_center_trigger_in() {
        let doc = MockDocument::new(800.0);
        let el = doc.add(MockElement::new().at(100.0, 50.0));

        let config = config_with(0.0, AnchorPlacement::CenterCenter);
        assert_eq!(compute_trigger_in(&doc, &el, &config), -275.0);
    }

    #[test]
    fn test_top_bottom_trigger_in() {
        let doc = MockDocument::new(800.0);
        let el = doc.add(MockElement::new().at(100.0, 50.0));

        let config = config_with(0.0, AnchorPlacement::TopBottom);
        assert_eq!(compute_trigger_in(&doc, &el, &config), -700.0);
    }

    #[test]
    fn test_placement_table() {
        // top=1000, h=200, vh=800 => base 200
        let doc = MockDocument::new(800.0);
        let el = doc.add(MockElement::new().at(1000.0, 200.0));

        let expected = [
            (AnchorPlacement::TopBottom, 200.0),
            (AnchorPlacement::CenterBottom, 300.0),
            (AnchorPlacement::BottomBottom, 400.0),
            (AnchorPlacement::TopCenter, 600.0),
            (AnchorPlacement::CenterCenter, 700.0),
            (AnchorPlacement::BottomCenter, 800.0),
            (AnchorPlacement::TopTop, 1000.0),
            (AnchorPlacement::CenterTop, 1100.0),
            (AnchorPlacement::BottomTop, 1200.0),
        ];
        for (placement, value) in expected {
            let config = config_with(0.0, placement);
            assert_eq!(compute_trigger_in(&doc, &el, &config), value, "{placement}");
        }
    }

    #[test]
    fn test_offset_sums_parent_chain() {
        let doc = MockDocument::new(800.0);
        let body = MockElement::new().document_root().with_scroll(500.0);
        let container = MockElement::new().at(300.0, 1000.0).with_scroll(40.0);
        container.set_offset_parent(&body);
        let el = doc.add(MockElement::new().at(100.0, 50.0));
        el.set_offset_parent(&container);

        // Root scroll is ignored, container scroll is subtracted
        assert_eq!(compute_offset(&el).top, 100.0 + 300.0 - 40.0);
    }

    #[test]
    fn test_anchor_replaces_target() {
        let doc = MockDocument::new(800.0);
        let el = doc.add(MockElement::new().at(100.0, 50.0));
        let anchor = MockElement::new().at(2000.0, 100.0);
        doc.register_selector("#hero", &anchor);

        let mut config = config_with(0.0, AnchorPlacement::TopBottom);
        config.anchor = Some("#hero".to_string());
        assert_eq!(compute_trigger_in(&doc, &el, &config), 1200.0);
        assert_eq!(compute_trigger_out(&doc, &el, &config), 2100.0);

        // Unresolvable selector falls back to the element
        config.anchor = Some("#missing".to_string());
        assert_eq!(compute_trigger_in(&doc, &el, &config), -700.0);
    }

    #[test]
    fn test_trigger_out_disabled_without_mirror() {
        let doc = MockDocument::new(800.0);
        let el = doc.add(MockElement::new().at(1000.0, 200.0));

        let mut config = config_with(120.0, AnchorPlacement::TopBottom);
        assert_eq!(TriggerPoints::compute(&doc, &el, &config).trigger_out, None);

        config.mirror = true;
        let points = TriggerPoints::compute(&doc, &el, &config);
        assert_eq!(points.trigger_in, 320.0);
        assert_eq!(points.trigger_out, Some(1080.0));

        config.once = true;
        assert_eq!(TriggerPoints::compute(&doc, &el, &config).trigger_out, None);
    }

    #[test]
    fn test_zero_height_element() {
        let doc = MockDocument::new(800.0);
        let el = doc.add(MockElement::new().at(1000.0, 0.0));

        let config = config_with(120.0, AnchorPlacement::TopBottom);
        let trigger_in = compute_trigger_in(&doc, &el, &config);
        let trigger_out = compute_trigger_out(&doc, &el, &config);
        assert_eq!(trigger_in, 320.0);
        assert_eq!(trigger_out, 880.0);
    }

    #[test]
    fn test_trigger_in_is_deterministic() {
        let doc = MockDocument::new(800.0);
        let el = doc.add(MockElement::new().at(640.0, 90.0));

        let config = config_with(120.0, AnchorPlacement::BottomCenter);
        let first = compute_trigger_in(&doc, &el, &config);
        let second = compute_trigger_in(&doc, &el, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_is_above_document_viewport() {
        let doc = MockDocument::new(800.0);
        let el = doc.add(MockElement::new().at(100.0, 50.0));

        assert!(!is_above_document_viewport(&doc, &el));
        doc.set_scroll_y(150.0);
        assert!(!is_above_document_viewport(&doc, &el));
        doc.set_scroll_y(151.0);
        assert!(is_above_document_viewport(&doc, &el));
    }
}
