//! Perspective projection onto the screen.

use nalgebra::Point3;

/// Default viewport width in pixels.
pub const DEFAULT_WIDTH: f64 = 1200.0;

/// Default viewport height in pixels.
pub const DEFAULT_HEIGHT: f64 = 800.0;

/// Default field-of-view distance.
pub const DEFAULT_FOV: f64 = 800.0;

/// A projected point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    /// Depth factor `fov / (fov + z)`. Larger means closer to the viewer.
    pub scale: f64,
}

impl ScreenPoint {
    /// Pixel position rounded to the nearest integer.
    pub fn pixel(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }
}

/// Screen size and perspective strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub fov: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fov: DEFAULT_FOV,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64, fov: f64) -> Self {
        Self { width, height, fov }
    }

    /// Screen center.
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Project one point, `None` when it sits at or behind the eye plane.
    pub fn project_point(&self, point: &Point3<f64>) -> Option<ScreenPoint> {
        let depth = self.fov + point.z;
        if !(depth > 0.0) {
            return None;
        }

        let factor = self.fov / depth;
        let (cx, cy) = self.center();
        let projected = ScreenPoint {
            x: point.x * factor + cx,
            y: point.y * factor + cy,
            scale: factor,
        };

        if projected.x.is_finite() && projected.y.is_finite() && factor.is_finite() {
            Some(projected)
        } else {
            None
        }
    }

    /// Project every point. The output has the same length and order as
    /// the input.
    pub fn project(&self, points: &[Point3<f64>]) -> Vec<Option<ScreenPoint>> {
        points.iter().map(|p| self.project_point(p)).collect()
    }
}
