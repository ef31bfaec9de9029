//! Easing functions
//!
//! Every named easing is a CSS cubic-bézier curve, so the same value can be
//! handed to an engine that takes CSS timing strings or sampled directly by
//! the in-process scheduler.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::AnimationError;

/// Named easings and their control points
const NAMED: &[(&str, [f64; 4])] = &[
    ("ease", [0.25, 0.1, 0.25, 1.0]),
    ("ease-in", [0.42, 0.0, 1.0, 1.0]),
    ("ease-out", [0.0, 0.0, 0.58, 1.0]),
    ("ease-in-out", [0.42, 0.0, 0.58, 1.0]),
    ("ease-in-back", [0.6, -0.28, 0.735, 0.045]),
    ("ease-out-back", [0.175, 0.885, 0.32, 1.275]),
    ("ease-in-out-back", [0.68, -0.55, 0.265, 1.55]),
    ("ease-in-sine", [0.47, 0.0, 0.745, 0.715]),
    ("ease-out-sine", [0.39, 0.575, 0.565, 1.0]),
    ("ease-in-out-sine", [0.445, 0.05, 0.55, 0.95]),
    ("ease-in-quad", [0.55, 0.085, 0.68, 0.53]),
    ("ease-out-quad", [0.25, 0.46, 0.45, 0.94]),
    ("ease-in-out-quad", [0.455, 0.03, 0.515, 0.955]),
    ("ease-in-cubic", [0.55, 0.055, 0.675, 0.19]),
    ("ease-out-cubic", [0.215, 0.61, 0.355, 1.0]),
    ("ease-in-out-cubic", [0.645, 0.045, 0.355, 1.0]),
    ("ease-in-quart", [0.895, 0.03, 0.685, 0.22]),
    ("ease-out-quart", [0.165, 0.84, 0.44, 1.0]),
    ("ease-in-out-quart", [0.77, 0.0, 0.175, 1.0]),
];

/// A timing function mapping linear progress to eased progress
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub enum Easing {
    Linear,
    /// CSS `cubic-bezier(x1, y1, x2, y2)`
    CubicBezier(f64, f64, f64, f64),
}

impl Default for Easing {
    fn default() -> Self {
        Self::ease()
    }
}

impl Easing {
    /// The CSS `ease` keyword
    pub fn ease() -> Self {
        Self::CubicBezier(0.25, 0.1, 0.25, 1.0)
    }

    /// Look up a named easing keyword
    pub fn named(name: &str) -> Option<Self> {
        if name == "linear" {
            return Some(Self::Linear);
        }
        NAMED
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, [x1, y1, x2, y2])| Self::CubicBezier(*x1, *y1, *x2, *y2))
    }

    /// Parse a keyword or a `cubic-bezier(...)` expression
    pub fn parse(input: &str) -> Result<Self, AnimationError> {
        let trimmed = input.trim();
        if let Some(easing) = Self::named(trimmed) {
            return Ok(easing);
        }

        let args = trimmed
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| AnimationError::InvalidEasing(input.to_string()))?;

        let points = args
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| AnimationError::InvalidEasing(input.to_string()))?;

        match points.as_slice() {
            [x1, y1, x2, y2]
                if points.iter().all(|p| p.is_finite())
                    && (0.0..=1.0).contains(x1)
                    && (0.0..=1.0).contains(x2) =>
            {
                Ok(Self::CubicBezier(*x1, *y1, *x2, *y2))
            }
            _ => Err(AnimationError::InvalidEasing(input.to_string())),
        }
    }

    /// Render as a CSS timing function
    pub fn to_css(&self) -> String {
        match self {
            Self::Linear => "linear".to_string(),
            Self::CubicBezier(x1, y1, x2, y2) => {
                format!("cubic-bezier({x1}, {y1}, {x2}, {y2})")
            }
        }
    }

    /// Apply the easing to linear progress `t` (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Self::Linear => t,
            Self::CubicBezier(x1, y1, x2, y2) => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let s = solve_curve_x(x1, x2, t);
                bezier(y1, y2, s)
            }
        }
    }
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Easing {
    type Error = AnimationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

// ============================================================================
// Cubic bézier solver
// ============================================================================

/// One axis of a bézier with endpoints fixed at 0 and 1
fn bezier(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * p1 + 3.0 * inv * s * s * p2 + s * s * s
}

fn bezier_derivative(p1: f64, p2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * p1 + 6.0 * inv * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

/// Find the curve parameter whose x equals `x`
fn solve_curve_x(x1: f64, x2: f64, x: f64) -> f64 {
    const EPSILON: f64 = 1e-7;

    let mut s = x;
    for _ in 0..8 {
        let err = bezier(x1, x2, s) - x;
        if err.abs() < EPSILON {
            return s;
        }
        let d = bezier_derivative(x1, x2, s);
        if d.abs() < 1e-6 {
            break;
        }
        s -= err / d;
    }

    // Newton stalled; x(s) is monotonic for x1, x2 in [0, 1]
    let (mut lo, mut hi) = (0.0, 1.0);
    s = x;
    for _ in 0..64 {
        let value = bezier(x1, x2, s);
        if (value - x).abs() < EPSILON {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}
