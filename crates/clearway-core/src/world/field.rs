//! Rectangular planning field

use serde::{Deserialize, Serialize};

use crate::Vec2;

/// Axis-aligned field spanning `[0, width] × [0, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f64,
    pub height: f64,
}

impl Default for Field {
    fn default() -> Self {
        // Canvas size of the desktop front end
        Self {
            width: 600.0,
            height: 400.0,
        }
    }
}

impl Field {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both dimensions are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Whether `p` lies inside the closed field
    pub fn contains(&self, p: &Vec2) -> bool {
        self.contains_with_margin(p, 0.0)
    }

    /// Whether `p` lies at least `margin` inside every border
    pub fn contains_with_margin(&self, p: &Vec2, margin: f64) -> bool {
        p.x >= margin && p.x <= self.width - margin && p.y >= margin && p.y <= self.height - margin
    }

    /// Clamp `p` into the field shrunk by `margin` on every side
    ///
    /// When the margin exceeds half a dimension, that coordinate collapses
    /// onto the field's midline.
    pub fn clamp(&self, p: &Vec2, margin: f64) -> Vec2 {
        let clamp_axis = |v: f64, extent: f64| {
            let lo = margin;
            let hi = extent - margin;
            if lo > hi {
                extent / 2.0
            } else {
                v.clamp(lo, hi)
            }
        };
        Vec2::new(clamp_axis(p.x, self.width), clamp_axis(p.y, self.height))
    }
}
