//! Configuration
//!
//! Three layers, highest precedence first: `data-mos-*` attributes on the
//! element, the options passed to the session, library defaults.

use mos_animation::presets::DEFAULT_PRESET;
use mos_animation::{AnimateOptions, Easing, FillMode};
use serde::Deserialize;

use crate::dom::{DomElement, TRIGGER_ATTRIBUTE};
use crate::error::{MosError, Result};
use crate::position::AnchorPlacement;

/// Unit of `duration` and `delay`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum TimeUnit {
    #[default]
    #[serde(rename = "ms")]
    Milliseconds,
    #[serde(rename = "s")]
    Seconds,
}

impl TimeUnit {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "ms" => Some(Self::Milliseconds),
            "s" => Some(Self::Seconds),
            _ => None,
        }
    }

    /// Convert a value in this unit to seconds
    pub fn to_seconds(self, value: f64) -> f64 {
        match self {
            Self::Milliseconds => value / 1000.0,
            Self::Seconds => value,
        }
    }
}

// ============================================================================
// Global configuration
// ============================================================================

/// Session-wide options
///
/// Deserializes from the camelCase option object hosts pass to `init`; every
/// field is optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalConfig {
    /// Pixels added to the trigger-in point and removed from trigger-out
    pub offset: f64,
    pub delay: f64,
    pub duration: f64,
    pub time_unit: TimeUnit,
    pub easing: Easing,
    pub once: bool,
    pub mirror: bool,
    pub anchor_placement: AnchorPlacement,
    /// Pixel distance used by directional presets
    pub distance: f64,
    /// Scroll throttle window in milliseconds
    pub throttle_delay: f64,
    /// Resize debounce in milliseconds
    pub debounce_delay: f64,
    /// Leave the page untouched
    pub disable: bool,
    pub disable_mutation_observer: bool,
    /// Document event that starts the session in the browser host
    pub start_event: String,
    pub init_class_name: String,
    pub animated_class_name: String,
    /// Also add the preset name as a class while animated
    pub use_class_names: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            offset: 120.0,
            delay: 0.0,
            duration: 400.0,
            time_unit: TimeUnit::Milliseconds,
            easing: Easing::ease(),
            once: false,
            mirror: false,
            anchor_placement: AnchorPlacement::TopBottom,
            distance: 100.0,
            throttle_delay: 99.0,
            debounce_delay: 50.0,
            disable: false,
            disable_mutation_observer: false,
            start_event: "DOMContentLoaded".to_string(),
            init_class_name: "mos-init".to_string(),
            animated_class_name: "mos-animate".to_string(),
            use_class_names: false,
        }
    }
}

impl GlobalConfig {
    /// Parse and validate a JSON option object
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GlobalConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let numbers = [
            ("offset", self.offset, false),
            ("delay", self.delay, true),
            ("duration", self.duration, true),
            ("distance", self.distance, false),
            ("throttleDelay", self.throttle_delay, true),
            ("debounceDelay", self.debounce_delay, true),
        ];
        for (name, value, non_negative) in numbers {
            if !value.is_finite() || (non_negative && value < 0.0) {
                return Err(MosError::InvalidConfig(format!(
                    "{name} must be a finite{} number, got {value}",
                    if non_negative { " non-negative" } else { "" }
                )));
            }
        }

        for (name, class) in [
            ("initClassName", &self.init_class_name),
            ("animatedClassName", &self.animated_class_name),
        ] {
            if class.is_empty() || class.chars().any(char::is_whitespace) {
                return Err(MosError::InvalidConfig(format!(
                    "{name} must be a single class name, got {class:?}"
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Per-element configuration
// ============================================================================

/// Fully resolved options for one tracked element
#[derive(Clone, Debug, PartialEq)]
pub struct ElementConfig {
    /// Animation preset or registered factory name
    pub preset: String,
    pub offset: f64,
    pub delay: f64,
    pub duration: f64,
    pub time_unit: TimeUnit,
    pub easing: Easing,
    pub once: bool,
    pub mirror: bool,
    /// Selector of an element whose position replaces this one's
    pub anchor: Option<String>,
    pub anchor_placement: AnchorPlacement,
    pub distance: f64,
    /// Informational id, used in logs
    pub id: Option<String>,
}

impl ElementConfig {
    /// Global values for a given preset, before attribute overrides
    pub fn from_global(preset: &str, global: &GlobalConfig) -> Self {
        Self {
            preset: preset.to_string(),
            offset: global.offset,
            delay: global.delay,
            duration: global.duration,
            time_unit: global.time_unit,
            easing: global.easing,
            once: global.once,
            mirror: global.mirror,
            anchor: None,
            anchor_placement: global.anchor_placement,
            distance: global.distance,
            id: None,
        }
    }

    /// Mirroring only applies to animations that may replay
    pub fn mirror_enabled(&self) -> bool {
        self.mirror && !self.once
    }

    /// Engine timing in seconds
    pub fn animate_options(&self) -> AnimateOptions {
        AnimateOptions {
            duration: self.time_unit.to_seconds(self.duration),
            delay: self.time_unit.to_seconds(self.delay),
            easing: self.easing,
            fill: FillMode::Both,
        }
    }
}

/// Attribute names read by [`resolve_element_config`]
pub mod attributes {
    pub const OFFSET: &str = "data-mos-offset";
    pub const DELAY: &str = "data-mos-delay";
    pub const DURATION: &str = "data-mos-duration";
    pub const TIME_UNIT: &str = "data-mos-time-unit";
    pub const EASING: &str = "data-mos-easing";
    pub const ONCE: &str = "data-mos-once";
    pub const MIRROR: &str = "data-mos-mirror";
    pub const ANCHOR: &str = "data-mos-anchor";
    pub const ANCHOR_PLACEMENT: &str = "data-mos-anchor-placement";
    pub const DISTANCE: &str = "data-mos-distance";
    pub const ID: &str = "data-mos-id";
}

/// Merge element attributes over the global options
///
/// Returns `None` when the element lacks the trigger attribute. Unparseable
/// attribute values keep the global value and log a warning.
pub fn resolve_element_config<E: DomElement>(
    element: &E,
    global: &GlobalConfig,
) -> Option<ElementConfig> {
    let preset = element.attribute(TRIGGER_ATTRIBUTE)?;
    let preset = match preset.trim() {
        "" => DEFAULT_PRESET,
        name => name,
    };

    let mut config = ElementConfig::from_global(preset, global);
    config.offset = number(element, attributes::OFFSET, config.offset);
    config.delay = non_negative(element, attributes::DELAY, config.delay);
    config.duration = non_negative(element, attributes::DURATION, config.duration);
    config.distance = number(element, attributes::DISTANCE, config.distance);
    config.once = flag(element, attributes::ONCE, config.once);
    config.mirror = flag(element, attributes::MIRROR, config.mirror);

    if let Some(value) = element.attribute(attributes::TIME_UNIT) {
        match TimeUnit::parse(&value) {
            Some(unit) => config.time_unit = unit,
            None => warn_fallback(element, attributes::TIME_UNIT, &value),
        }
    }

    if let Some(value) = element.attribute(attributes::EASING) {
        match Easing::parse(&value) {
            Ok(easing) => config.easing = easing,
            Err(_) => warn_fallback(element, attributes::EASING, &value),
        }
    }

    if let Some(value) = element.attribute(attributes::ANCHOR_PLACEMENT) {
        match value.parse::<AnchorPlacement>() {
            Ok(placement) => config.anchor_placement = placement,
            Err(()) => warn_fallback(element, attributes::ANCHOR_PLACEMENT, &value),
        }
    }

    config.anchor = non_empty(element.attribute(attributes::ANCHOR));
    config.id = non_empty(element.attribute(attributes::ID));

    Some(config)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn warn_fallback<E: DomElement>(element: &E, attribute: &str, value: &str) {
    tracing::warn!(
        "ignoring {}={:?} on {:?}; using the global value",
        attribute,
        value,
        element
    );
}

fn number<E: DomElement>(element: &E, attribute: &str, fallback: f64) -> f64 {
    let Some(value) = element.attribute(attribute) else {
        return fallback;
    };
    match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => {
            warn_fallback(element, attribute, &value);
            fallback
        }
    }
}

fn non_negative<E: DomElement>(element: &E, attribute: &str, fallback: f64) -> f64 {
    let n = number(element, attribute, fallback);
    if n < 0.0 {
        warn_fallback(element, attribute, &n.to_string());
        fallback
    } else {
        n
    }
}

fn flag<E: DomElement>(element: &E, attribute: &str, fallback: bool) -> bool {
    let Some(value) = element.attribute(attribute) else {
        return fallback;
    };
    match value.trim() {
        "" | "true" => true,
        "false" => false,
        _ => {
            warn_fallback(element, attribute, &value);
            fallback
        }
    }
}
