//! Artificial horizon and pitch ladder geometry.
//!
//! Both are 2D overlays around the view center. Pitch shifts them vertically
//! by `pitch * px_per_degree`, then the whole overlay rotates about the
//! center by the (convention-adjusted) roll angle.

use nalgebra::Point2;

use super::matrix::{Attitude, AxisConvention};
use super::projection::Viewport;

/// Default vertical pixels per degree of pitch.
pub const DEFAULT_PX_PER_DEGREE: f64 = 20.0;

/// Rotate `(dx, dy)`, given relative to `center`, by `degrees`.
fn rotate_about(center: (f64, f64), dx: f64, dy: f64, degrees: f64) -> Point2<f64> {
    let (s, c) = degrees.to_radians().sin_cos();
    Point2::new(center.0 + dx * c - dy * s, center.1 + dx * s + dy * c)
}

/// Horizon line endpoints in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonLine {
    pub left: Point2<f64>,
    pub right: Point2<f64>,
}

impl HorizonLine {
    /// Angle of the line against the screen X axis, in degrees.
    pub fn angle(&self) -> f64 {
        let d = self.right - self.left;
        d.y.atan2(d.x).to_degrees()
    }
}

/// Horizon line generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizon {
    pub px_per_degree: f64,
    /// Half length of the line; large enough to cross the screen at any roll.
    pub half_width: f64,
}

impl Default for Horizon {
    fn default() -> Self {
        Self {
            px_per_degree: DEFAULT_PX_PER_DEGREE,
            half_width: 2000.0,
        }
    }
}

impl Horizon {
    pub fn line(
        &self,
        attitude: Attitude,
        convention: &AxisConvention,
        viewport: &Viewport,
    ) -> HorizonLine {
        let a = convention.apply(attitude);
        let shift = a.pitch * self.px_per_degree;
        let center = viewport.center();
        HorizonLine {
            left: rotate_about(center, -self.half_width, shift, a.roll),
            right: rotate_about(center, self.half_width, shift, a.roll),
        }
    }
}

/// One ladder rung, split in two halves by the center gap.
#[derive(Debug, Clone, PartialEq)]
pub struct LadderRung {
    /// Pitch angle this rung marks.
    pub angle: i32,
    /// Long rungs mark multiples of 10 degrees.
    pub long: bool,
    pub left: (Point2<f64>, Point2<f64>),
    pub right: (Point2<f64>, Point2<f64>),
    /// End ticks pointing towards the horizon, outer end first.
    pub ticks: [(Point2<f64>, Point2<f64>); 2],
    /// Where the label goes, left of the rung. Only long rungs are labelled.
    pub label: Option<Point2<f64>>,
}

/// Pitch ladder generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchLadder {
    /// Degrees between rungs.
    pub step: i32,
    /// Rungs are generated in `[-range, range]`.
    pub range: i32,
    pub px_per_degree: f64,
    /// Half of the center gap between rung halves.
    pub gap: f64,
    pub long_length: f64,
    pub short_length: f64,
    pub tick_length: f64,
    /// Rungs further than this from the center, vertically, are skipped.
    /// `None` clips at half the viewport height minus 50 px.
    pub clip: Option<f64>,
}

impl Default for PitchLadder {
    fn default() -> Self {
        Self {
            step: 5,
            range: 90,
            px_per_degree: DEFAULT_PX_PER_DEGREE,
            gap: 50.0,
            long_length: 160.0,
            short_length: 100.0,
            tick_length: 10.0,
            clip: None,
        }
    }
}

impl PitchLadder {
    fn clip_distance(&self, viewport: &Viewport) -> f64 {
        self.clip.unwrap_or(viewport.height / 2.0 - 50.0)
    }

    /// Visible rungs for the given attitude, lowest angle first. The zero
    /// rung is left to the [`Horizon`].
    pub fn rungs(
        &self,
        attitude: Attitude,
        convention: &AxisConvention,
        viewport: &Viewport,
    ) -> Vec<LadderRung> {
        if self.step <= 0 {
            return Vec::new();
        }

        let a = convention.apply(attitude);
        let center = viewport.center();
        let clip = self.clip_distance(viewport);
        let rotate = |dx: f64, dy: f64| rotate_about(center, dx, dy, a.roll);

        let first = -(self.range / self.step) * self.step;
        (first..=self.range)
            .step_by(self.step as usize)
            .filter(|&angle| angle != 0)
            .filter_map(|angle| {
                let dy = (a.pitch - angle as f64) * self.px_per_degree;
                if dy.abs() > clip {
                    return None;
                }

                let long = angle % 10 == 0;
                let length = if long { self.long_length } else { self.short_length };
                let outer = length + self.gap;
                let tick = if angle > 0 { self.tick_length } else { -self.tick_length };

                let left = (rotate(-outer, dy), rotate(-self.gap, dy));
                let right = (rotate(self.gap, dy), rotate(outer, dy));
                let ticks = [
                    (left.0, rotate(-outer, dy + tick)),
                    (right.1, rotate(outer, dy + tick)),
                ];
                let label = long.then(|| rotate(-outer - 45.0, dy - 12.0));

                Some(LadderRung {
                    angle,
                    long,
                    left,
                    right,
                    ticks,
                    label,
                })
            })
            .collect()
    }
}
