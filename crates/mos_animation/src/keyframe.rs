//! Keyframe sets
//!
//! A [`KeyframeSpec`] describes a two-point (from → to) animation over a small
//! set of visual properties. It is the payload handed to an
//! [`AnimationEngine`](crate::handle::AnimationEngine).

use smallvec::SmallVec;

use crate::error::AnimationError;
use crate::values::{FrameValues, Interpolate};

/// A visual property a preset can animate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimatedProperty {
    Opacity,
    TranslateX,
    TranslateY,
    Scale,
    RotateX,
    RotateY,
}

impl AnimatedProperty {
    /// Whether the property is rendered through CSS `transform`
    pub fn is_transform(self) -> bool {
        !matches!(self, Self::Opacity)
    }
}

/// Start and end values for one property
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyTrack {
    pub property: AnimatedProperty,
    pub from: f64,
    pub to: f64,
}

impl PropertyTrack {
    /// The `[from, to]` pair
    pub fn values(&self) -> [f64; 2] {
        [self.from, self.to]
    }
}

/// One rendered CSS keyframe
#[derive(Clone, Debug, PartialEq)]
pub struct CssKeyframe {
    /// Position in the animation (0.0 or 1.0)
    pub offset: f64,
    pub opacity: Option<String>,
    pub transform: Option<String>,
}

/// Multi-property from → to keyframes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyframeSpec {
    tracks: SmallVec<[PropertyTrack; 4]>,
}

impl KeyframeSpec {
    /// Create an empty keyframe set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a track (builder pattern)
    pub fn with(mut self, property: AnimatedProperty, from: f64, to: f64) -> Self {
        self.set(property, from, to);
        self
    }

    /// Add or replace a track
    pub fn set(&mut self, property: AnimatedProperty, from: f64, to: f64) {
        let track = PropertyTrack { property, from, to };
        match self.tracks.iter_mut().find(|t| t.property == property) {
            Some(existing) => *existing = track,
            None => self.tracks.push(track),
        }
    }

    /// The `[from, to]` values of a property, if animated
    pub fn track(&self, property: AnimatedProperty) -> Option<[f64; 2]> {
        self.tracks
            .iter()
            .find(|t| t.property == property)
            .map(PropertyTrack::values)
    }

    pub fn tracks(&self) -> &[PropertyTrack] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Reject empty sets and non-finite values
    pub fn validate(&self) -> Result<(), AnimationError> {
        if self.tracks.is_empty() {
            return Err(AnimationError::InvalidKeyframes("no tracks".into()));
        }
        if let Some(bad) = self
            .tracks
            .iter()
            .find(|t| !t.from.is_finite() || !t.to.is_finite())
        {
            return Err(AnimationError::InvalidKeyframes(format!(
                "non-finite value for {:?}",
                bad.property
            )));
        }
        Ok(())
    }

    /// Sample at eased progress (0.0 = from, 1.0 = to)
    pub fn sample(&self, progress: f64) -> FrameValues {
        let mut frame = FrameValues::default();
        for track in &self.tracks {
            frame.set(track.property, track.from.lerp(&track.to, progress));
        }
        frame
    }

    /// Render the start and end frames as CSS values
    pub fn css_frames(&self) -> [CssKeyframe; 2] {
        [self.css_frame(0.0), self.css_frame(1.0)]
    }

    fn css_frame(&self, offset: f64) -> CssKeyframe {
        let frame = self.sample(offset);
        let animates = |transform: bool| {
            self.tracks
                .iter()
                .any(|t| t.property.is_transform() == transform)
        };
        CssKeyframe {
            offset,
            opacity: animates(false).then(|| frame.opacity.to_string()),
            transform: animates(true).then(|| frame.transform_css()),
        }
    }
}
