//! Orientation kernel: attitude to screen coordinates.
//!
//! Turns roll/pitch/yaw and a set of model points into projected 2D points
//! the drawing layer can use directly. The pipeline is
//!
//! 1. rotate every point by `R = Rz(roll) * Ry(yaw) * Rx(pitch)` after the
//!    [`AxisConvention`] adjusts the signs,
//! 2. scale and translate ([`Transform`]),
//! 3. perspective divide through the [`Viewport`].
//!
//! Points at or behind the eye plane come back as `None` rather than as
//! garbage coordinates.
//!
//! ```
//! use flightdeck::kernel::{Attitude, OrientationKernel};
//! use nalgebra::Point3;
//!
//! let kernel = OrientationKernel::default();
//! let projected = kernel.project(Attitude::default(), &[Point3::origin()]);
//! let center = projected[0].unwrap();
//! assert_eq!((center.x, center.y), (600.0, 400.0));
//! ```
//!
//! Everything here is a pure function of its inputs except [`Trail`], which
//! the caller owns.

mod horizon;
mod matrix;
mod mesh;
mod projection;
mod trail;

pub use horizon::{Horizon, HorizonLine, LadderRung, PitchLadder, DEFAULT_PX_PER_DEGREE};
pub use matrix::{rotation_x, rotation_y, rotation_z, Attitude, AxisConvention, Transform};
pub use mesh::{Mesh, PointSet, VisibleEdge, MESH_NAMES};
pub use projection::{ScreenPoint, Viewport, DEFAULT_FOV, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use trail::{Trail, TrailSegment, DEFAULT_TRAIL_LENGTH};

use nalgebra::Point3;

use crate::smoother::DisplayState;

impl From<&DisplayState> for Attitude {
    fn from(state: &DisplayState) -> Self {
        Attitude::new(state.roll, state.pitch, state.yaw)
    }
}

/// Convention, model transform and viewport bundled for repeated use.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationKernel {
    pub convention: AxisConvention,
    pub transform: Transform,
    pub viewport: Viewport,
}

impl OrientationKernel {
    pub fn new(convention: AxisConvention, transform: Transform, viewport: Viewport) -> Self {
        Self {
            convention,
            transform,
            viewport,
        }
    }

    /// Rotated, scaled and translated points, still in 3D.
    pub fn orient(&self, attitude: Attitude, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        let rotation = self.convention.rotation(attitude);
        self.transform.apply(&rotation, points)
    }

    /// Full pipeline. One entry per input point, in order.
    pub fn project(&self, attitude: Attitude, points: &[Point3<f64>]) -> Vec<Option<ScreenPoint>> {
        self.viewport.project(&self.orient(attitude, points))
    }

    /// Project a single point, e.g. a model center.
    pub fn project_point(&self, attitude: Attitude, point: Point3<f64>) -> Option<ScreenPoint> {
        self.project(attitude, &[point]).pop().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    #[test]
    fn test_identity_projects_origin_to_center() {
        for (w, h) in [(1200.0, 800.0), (640.0, 480.0), (1.0, 1.0)] {
            let kernel = OrientationKernel {
                viewport: Viewport::new(w, h, 500.0),
                ..OrientationKernel::default()
            };
            let p = kernel.project_point(Attitude::default(), Point3::origin()).unwrap();
            assert_eq!(p.x, w / 2.0);
            assert_eq!(p.y, h / 2.0);
        }
    }

    #[test]
    fn test_point_pushed_behind_eye_is_none() {
        let kernel = OrientationKernel::new(
            AxisConvention::default(),
            Transform::new(1.0, Vector3::new(0.0, 0.0, -800.0)),
            Viewport::default(),
        );
        assert!(kernel.project_point(Attitude::default(), Point3::origin()).is_none());
    }

    #[test]
    fn test_quadcopter_projects_fully_at_default_scale() {
        let kernel = OrientationKernel {
            transform: Transform::scaled(40.0),
            ..OrientationKernel::default()
        };
        let mesh = Mesh::quadcopter();
        let projected = kernel.project(Attitude::new(25.0, -10.0, 45.0), mesh.vertices());
        assert!(projected.iter().all(Option::is_some));
        assert_eq!(mesh.visible_edges(&projected).count(), mesh.edges().len());
    }

    #[test]
    fn test_attitude_from_display_state() {
        let state = DisplayState {
            roll: 1.0,
            pitch: 2.0,
            yaw: 3.0,
            ..DisplayState::default()
        };
        assert_eq!(Attitude::from(&state), Attitude::new(1.0, 2.0, 3.0));
    }
}
