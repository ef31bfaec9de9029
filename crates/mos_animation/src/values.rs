//! Animatable value types
//!
//! Provides interpolation for scalar animation values and the sampled
//! per-frame value set produced by a keyframe set.

use crate::keyframe::AnimatedProperty;

/// Trait for values that can be linearly interpolated
pub trait Interpolate: Clone {
    /// Linearly interpolate between self and other by factor t (0.0 to 1.0)
    fn lerp(&self, other: &Self, t: f64) -> Self;

    /// Check if two values are approximately equal
    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool;
}

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }

    fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self - other).abs() < epsilon
    }
}

// ============================================================================
// Frame Values
// ============================================================================

/// Resolved visual state at one point of an animation
///
/// Properties a keyframe set does not animate keep their identity value
/// (opacity 1, no translation, scale 1, no rotation).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameValues {
    pub opacity: f64,
    /// Horizontal translation in px
    pub translate_x: f64,
    /// Vertical translation in px
    pub translate_y: f64,
    pub scale: f64,
    /// Rotation around the X axis in degrees
    pub rotate_x: f64,
    /// Rotation around the Y axis in degrees
    pub rotate_y: f64,
}

impl Default for FrameValues {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            scale: 1.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
        }
    }
}

impl FrameValues {
    /// Overwrite one property
    pub fn set(&mut self, property: AnimatedProperty, value: f64) {
        match property {
            AnimatedProperty::Opacity => self.opacity = value,
            AnimatedProperty::TranslateX => self.translate_x = value,
            AnimatedProperty::TranslateY => self.translate_y = value,
            AnimatedProperty::Scale => self.scale = value,
            AnimatedProperty::RotateX => self.rotate_x = value,
            AnimatedProperty::RotateY => self.rotate_y = value,
        }
    }

    /// Read one property
    pub fn get(&self, property: AnimatedProperty) -> f64 {
        match property {
            AnimatedProperty::Opacity => self.opacity,
            AnimatedProperty::TranslateX => self.translate_x,
            AnimatedProperty::TranslateY => self.translate_y,
            AnimatedProperty::Scale => self.scale,
            AnimatedProperty::RotateX => self.rotate_x,
            AnimatedProperty::RotateY => self.rotate_y,
        }
    }

    /// CSS `transform` value for this frame
    ///
    /// Flips need a perspective to read as 3D, so it is always emitted first.
    pub fn transform_css(&self) -> String {
        format!(
            "perspective(2500px) translate3d({}px, {}px, 0) scale({}) rotateX({}deg) rotateY({}deg)",
            self.translate_x, self.translate_y, self.scale, self.rotate_x, self.rotate_y
        )
    }
}
