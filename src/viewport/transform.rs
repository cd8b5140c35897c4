//! Affine viewport transform.

use crate::layout::Coord;
use serde::{Deserialize, Serialize};

/// Translate-then-scale transform: `screen = diagram * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportTransform {
    /// Horizontal translation in screen pixels.
    pub x: f64,
    /// Vertical translation in screen pixels.
    pub y: f64,
    /// Scale factor.
    pub k: f64,
}

impl Default for ViewportTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewportTransform {
    /// No translation, scale 1.
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    /// Create a transform.
    pub fn new(x: f64, y: f64, k: f64) -> Self {
        Self { x, y, k }
    }

    /// Map a diagram point to the screen.
    pub fn apply(&self, point: Coord) -> Coord {
        Coord::new(point.x * self.k + self.x, point.y * self.k + self.y)
    }

    /// Map a screen point back into the diagram.
    pub fn invert(&self, point: Coord) -> Coord {
        Coord::new((point.x - self.x) / self.k, (point.y - self.y) / self.k)
    }

    /// Same scale, translation moved by `(dx, dy)` screen pixels.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.k)
    }

    /// Scale to `k` while keeping the diagram point under `anchor` fixed on screen.
    pub fn zoomed_about(&self, anchor: Coord, k: f64) -> Self {
        let fixed = self.invert(anchor);
        Self::new(anchor.x - fixed.x * k, anchor.y - fixed.y * k, k)
    }

    /// Finite translation and a finite, positive scale.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.k.is_finite() && self.k > 0.0
    }

    /// SVG `transform` attribute value: `translate(x,y)scale(k)`.
    pub fn to_svg_transform(&self) -> String {
        format!("translate({},{})scale({})", self.x, self.y, self.k)
    }
}

/// Allowed scale range. Defaults to unbounded `(0, +inf)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleExtent {
    /// Smallest scale.
    pub min: f64,
    /// Largest scale.
    pub max: f64,
}

impl Default for ScaleExtent {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: f64::INFINITY,
        }
    }
}

impl ScaleExtent {
    /// Create an extent; the bounds are swapped if given in the wrong order.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Clamp `k` into the extent. NaN passes through unchanged.
    pub fn clamp(&self, k: f64) -> f64 {
        if k.is_nan() {
            return k;
        }
        k.max(self.min).min(self.max)
    }
}
