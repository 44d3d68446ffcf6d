use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::math::{Bounds3, Vec3};

/// One sample along a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintPoint {
    pub position: Vec3,
    pub normal: Vec3,
    pub direction: Vec3,
    pub color: Color,
    pub alpha: f32,
    /// Brush width at this sample.
    pub width: f32,
    /// Arc length from the start of the stroke.
    pub length: f32,
    /// Time at which the sample was painted.
    pub time: f32,
}

impl PaintPoint {
    /// A white, opaque sample at `position` facing up and heading forward.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            normal: Vec3::UP,
            direction: Vec3::FORWARD,
            color: Color::WHITE,
            alpha: 1.0,
            width: 0.0,
            length: 0.0,
            time: 0.0,
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_color(mut self, color: Color, alpha: f32) -> Self {
        self.color = color;
        self.alpha = alpha;
        self
    }

    /// Set both arc length and time.
    pub fn with_progress(mut self, length: f32, time: f32) -> Self {
        self.length = length;
        self.time = time;
        self
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.normal.is_finite()
            && self.direction.is_finite()
            && [
                self.color.r,
                self.color.g,
                self.color.b,
                self.alpha,
                self.width,
                self.length,
                self.time,
            ]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Volume swept by the brush at this sample.
    pub fn bounds(&self) -> Bounds3 {
        Bounds3::around(self.position, self.width * 0.5)
    }
}
