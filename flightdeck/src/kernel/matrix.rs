//! Rotation matrices and the attitude composition.

use nalgebra::{Matrix4, Point3, Vector3};

/// Rotation about the X (lateral) axis.
pub fn rotation_x(degrees: f64) -> Matrix4<f64> {
    let (s, c) = degrees.to_radians().sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
        1.0, 0.0, 0.0, 0.0,
        0.0,   c,  -s, 0.0,
        0.0,   s,   c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Rotation about the Y (vertical) axis.
pub fn rotation_y(degrees: f64) -> Matrix4<f64> {
    let (s, c) = degrees.to_radians().sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
          c, 0.0,   s, 0.0,
        0.0, 1.0, 0.0, 0.0,
         -s, 0.0,   c, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Rotation about the Z (longitudinal, into the screen) axis.
pub fn rotation_z(degrees: f64) -> Matrix4<f64> {
    let (s, c) = degrees.to_radians().sin_cos();
    #[rustfmt::skip]
    let m = Matrix4::new(
          c,  -s, 0.0, 0.0,
          s,   c, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );
    m
}

/// Aircraft attitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Attitude {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Attitude with yaw fixed at zero.
    pub fn level_heading(roll: f64, pitch: f64) -> Self {
        Self::new(roll, pitch, 0.0)
    }
}

/// Sign convention mapping aircraft axes onto the screen frame.
///
/// Screen Y grows downwards, so a right-wing-down roll reported by the board
/// has to be mirrored to look right on screen. The default inverts roll and
/// keeps pitch and yaw as reported. Every call site goes through the same
/// value so the dashboard never mixes conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisConvention {
    pub invert_roll: bool,
    pub invert_pitch: bool,
    pub invert_yaw: bool,
}

impl Default for AxisConvention {
    fn default() -> Self {
        Self {
            invert_roll: true,
            invert_pitch: false,
            invert_yaw: false,
        }
    }
}

impl AxisConvention {
    /// Angles exactly as reported.
    pub const fn raw() -> Self {
        Self {
            invert_roll: false,
            invert_pitch: false,
            invert_yaw: false,
        }
    }

    /// Apply the sign convention to an attitude.
    pub fn apply(&self, attitude: Attitude) -> Attitude {
        let sign = |invert: bool| if invert { -1.0 } else { 1.0 };
        Attitude {
            roll: attitude.roll * sign(self.invert_roll),
            pitch: attitude.pitch * sign(self.invert_pitch),
            yaw: attitude.yaw * sign(self.invert_yaw),
        }
    }

    /// Full rotation: pitch first, then yaw, then roll.
    ///
    /// `R = Rz(roll) * Ry(yaw) * Rx(pitch)` after the sign convention.
    pub fn rotation(&self, attitude: Attitude) -> Matrix4<f64> {
        let a = self.apply(attitude);
        rotation_z(a.roll) * rotation_y(a.yaw) * rotation_x(a.pitch)
    }
}

/// Uniform scale followed by a translation, applied after rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: f64,
    pub translation: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: Vector3::zeros(),
        }
    }
}

impl Transform {
    pub fn new(scale: f64, translation: Vector3<f64>) -> Self {
        Self { scale, translation }
    }

    pub fn scaled(scale: f64) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }

    /// Rotate every point by `rotation`, then scale and translate.
    pub fn apply(&self, rotation: &Matrix4<f64>, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
        points
            .iter()
            .map(|p| {
                let v = rotation * p.to_homogeneous();
                Point3::new(v.x, v.y, v.z) * self.scale + self.translation
            })
            .collect()
    }
}
