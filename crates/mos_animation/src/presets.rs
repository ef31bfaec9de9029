//! Built-in entrance presets
//!
//! Preset names follow the `family[-direction]` scheme used in `data-mos`
//! attributes: `fade-up`, `slide-left`, `zoom-in-down`, `flip-right`, ...
//!
//! Directional presets move the element from an offset of `distance` px back
//! to its resting position:
//!
//! | direction | axis | keyframes      |
//! |-----------|------|----------------|
//! | up        | Y    | `[+D, 0]`      |
//! | down      | Y    | `[-D, 0]`      |
//! | left      | X    | `[-D, 0]`      |
//! | right     | X    | `[+D, 0]`      |

use crate::keyframe::{AnimatedProperty, KeyframeSpec};

/// Preset used when a name is unknown
pub const DEFAULT_PRESET: &str = "fade";

/// Rotation applied by flip presets, in degrees
const FLIP_ANGLE: f64 = 100.0;

/// Every built-in preset name
pub const PRESET_NAMES: &[&str] = &[
    "fade",
    "fade-up",
    "fade-down",
    "fade-left",
    "fade-right",
    "fade-up-right",
    "fade-up-left",
    "fade-down-right",
    "fade-down-left",
    "flip-up",
    "flip-down",
    "flip-left",
    "flip-right",
    "slide-up",
    "slide-down",
    "slide-left",
    "slide-right",
    "zoom-in",
    "zoom-in-up",
    "zoom-in-down",
    "zoom-in-left",
    "zoom-in-right",
    "zoom-out",
    "zoom-out-up",
    "zoom-out-down",
    "zoom-out-left",
    "zoom-out-right",
];

/// Preset family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresetFamily {
    Fade,
    Slide,
    ZoomIn,
    ZoomOut,
    Flip,
}

/// Where the element enters from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Direction {
    /// Vertical component: +1 for up, -1 for down
    pub vertical: i8,
    /// Horizontal component: -1 for left, +1 for right
    pub horizontal: i8,
}

impl Direction {
    fn parse(input: &str) -> Option<Self> {
        let mut direction = Self::default();
        for part in input.split('-') {
            match part {
                "up" if direction.vertical == 0 => direction.vertical = 1,
                "down" if direction.vertical == 0 => direction.vertical = -1,
                "left" if direction.horizontal == 0 => direction.horizontal = -1,
                "right" if direction.horizontal == 0 => direction.horizontal = 1,
                _ => return None,
            }
        }
        Some(direction)
    }

    fn is_diagonal(&self) -> bool {
        self.vertical != 0 && self.horizontal != 0
    }
}

/// A parsed built-in preset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationPreset {
    pub family: PresetFamily,
    pub direction: Option<Direction>,
}

impl AnimationPreset {
    /// Parse a preset name, `None` when it is not built in
    pub fn from_name(name: &str) -> Option<Self> {
        let (family, rest) = [
            ("zoom-in", PresetFamily::ZoomIn),
            ("zoom-out", PresetFamily::ZoomOut),
            ("fade", PresetFamily::Fade),
            ("slide", PresetFamily::Slide),
            ("flip", PresetFamily::Flip),
        ]
        .into_iter()
        .find_map(|(prefix, family)| name.strip_prefix(prefix).map(|rest| (family, rest)))?;

        let direction = match rest {
            "" => None,
            suffix => Some(Direction::parse(suffix.strip_prefix('-')?)?),
        };

        let valid = match (family, direction) {
            (PresetFamily::Fade, _) => true,
            (PresetFamily::ZoomIn | PresetFamily::ZoomOut, None) => true,
            (PresetFamily::Slide | PresetFamily::Flip, None) => false,
            (_, Some(d)) => !d.is_diagonal(),
        };
        valid.then_some(Self { family, direction })
    }

    /// Build the keyframes for this preset
    pub fn keyframes(&self, distance: f64) -> KeyframeSpec {
        let mut spec = KeyframeSpec::new();

        if self.family == PresetFamily::Flip {
            let d = self.direction.unwrap_or_default();
            // flip-up / flip-left start rotated backwards
            if d.vertical != 0 {
                spec.set(AnimatedProperty::RotateX, -f64::from(d.vertical) * FLIP_ANGLE, 0.0);
            } else {
                spec.set(AnimatedProperty::RotateY, f64::from(d.horizontal) * FLIP_ANGLE, 0.0);
            }
            return spec;
        }

        match self.family {
            PresetFamily::Fade => spec.set(AnimatedProperty::Opacity, 0.0, 1.0),
            PresetFamily::ZoomIn => {
                spec.set(AnimatedProperty::Opacity, 0.0, 1.0);
                spec.set(AnimatedProperty::Scale, 0.6, 1.0);
            }
            PresetFamily::ZoomOut => {
                spec.set(AnimatedProperty::Opacity, 0.0, 1.0);
                spec.set(AnimatedProperty::Scale, 1.2, 1.0);
            }
            PresetFamily::Slide | PresetFamily::Flip => {}
        }

        if let Some(d) = self.direction {
            if d.vertical != 0 {
                spec.set(AnimatedProperty::TranslateY, f64::from(d.vertical) * distance, 0.0);
            }
            if d.horizontal != 0 {
                spec.set(AnimatedProperty::TranslateX, f64::from(d.horizontal) * distance, 0.0);
            }
        }
        spec
    }
}

/// Keyframes for a built-in preset, `None` for unknown names
pub fn builtin(name: &str, distance: f64) -> Option<KeyframeSpec> {
    AnimationPreset::from_name(name).map(|preset| preset.keyframes(distance))
}

/// Keyframes for a preset, falling back to [`DEFAULT_PRESET`] with a warning
pub fn resolve(name: &str, distance: f64) -> KeyframeSpec {
    builtin(name, distance).unwrap_or_else(|| {
        tracing::warn!("unknown animation preset `{name}`; using `{DEFAULT_PRESET}`");
        AnimationPreset {
            family: PresetFamily::Fade,
            direction: None,
        }
        .keyframes(distance)
    })
}
