//! Wireframe models drawn in the attitude view.

use nalgebra::Point3;

use super::projection::ScreenPoint;

/// Names accepted by [`Mesh::named`].
pub const MESH_NAMES: [&str; 3] = ["quadcopter", "cube", "cross-drone"];

/// Ordered set of model-space points.
pub type PointSet = Vec<Point3<f64>>;

/// An edge whose both endpoints projected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleEdge {
    /// Vertex indices.
    pub from: usize,
    pub to: usize,
    pub a: ScreenPoint,
    pub b: ScreenPoint,
    /// Mean depth factor of the two endpoints.
    pub depth: f64,
}

/// Immutable vertices plus the edges that connect them.
///
/// The anchor is the model-space point the motion trail follows. It must sit
/// off the rotation origin, otherwise attitude changes never move it.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: PointSet,
    edges: Vec<(usize, usize)>,
    anchor: Point3<f64>,
}

impl Mesh {
    /// Build a mesh anchored at its centroid. Edges referring to missing
    /// vertices are dropped.
    pub fn new(vertices: PointSet, edges: Vec<(usize, usize)>) -> Self {
        let count = vertices.len();
        let edges = edges
            .into_iter()
            .filter(|&(a, b)| a < count && b < count)
            .collect();
        let anchor = centroid(&vertices);
        Self {
            vertices,
            edges,
            anchor,
        }
    }

    /// Replace the trail anchor.
    pub fn with_anchor(mut self, anchor: Point3<f64>) -> Self {
        self.anchor = anchor;
        self
    }

    /// Quadcopter with a two-layer body, four arms and motor shafts.
    pub fn quadcopter() -> Self {
        let p = Point3::new;
        let vertices = vec![
            // body, top plate
            p(-1.0, -1.0, 0.2),
            p(1.0, -1.0, 0.2),
            p(1.0, 1.0, 0.2),
            p(-1.0, 1.0, 0.2),
            // body, bottom plate
            p(-0.5, -0.5, -0.2),
            p(0.5, -0.5, -0.2),
            p(0.5, 0.5, -0.2),
            p(-0.5, 0.5, -0.2),
            // arm tips
            p(-3.0, -3.0, 0.0),
            p(3.0, 3.0, 0.0),
            p(3.0, -3.0, 0.0),
            p(-3.0, 3.0, 0.0),
            // motors, top
            p(-3.0, -3.0, 0.5),
            p(3.0, 3.0, 0.5),
            p(3.0, -3.0, 0.5),
            p(-3.0, 3.0, 0.5),
            // motors, bottom
            p(-3.0, -3.0, -0.5),
            p(3.0, 3.0, -0.5),
            p(3.0, -3.0, -0.5),
            p(-3.0, 3.0, -0.5),
        ];
        #[rustfmt::skip]
        let edges = vec![
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
            (8, 4), (9, 6), (10, 5), (11, 7),
            (8, 12), (9, 13), (10, 14), (11, 15),
            (12, 14), (14, 13), (13, 15), (15, 12),
            (16, 17), (17, 19), (19, 18), (18, 16),
        ];
        // top plate center, between vertices 0 and 2
        Self::new(vertices, edges).with_anchor(Point3::new(0.0, 0.0, 0.2))
    }

    /// Unit cube centered on the origin.
    pub fn cube() -> Self {
        let p = Point3::new;
        let vertices = vec![
            p(-1.0, -1.0, -1.0),
            p(1.0, -1.0, -1.0),
            p(1.0, 1.0, -1.0),
            p(-1.0, 1.0, -1.0),
            p(-1.0, -1.0, 1.0),
            p(1.0, -1.0, 1.0),
            p(1.0, 1.0, 1.0),
            p(-1.0, 1.0, 1.0),
        ];
        #[rustfmt::skip]
        let edges = vec![
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];
        Self::new(vertices, edges).with_anchor(Point3::new(0.0, 0.0, 1.0))
    }

    /// Minimal X-frame: a hub and four arms with raised props.
    pub fn cross_drone() -> Self {
        let p = Point3::new;
        let vertices = vec![
            p(0.0, 0.0, 0.0),
            p(-2.0, -2.0, 0.0),
            p(2.0, 2.0, 0.0),
            p(2.0, -2.0, 0.0),
            p(-2.0, 2.0, 0.0),
            p(-2.0, -2.0, 0.5),
            p(2.0, 2.0, 0.5),
            p(2.0, -2.0, 0.5),
            p(-2.0, 2.0, 0.5),
        ];
        let edges = vec![(0, 1), (0, 2), (0, 3), (0, 4), (1, 5), (2, 6), (3, 7), (4, 8)];
        Self::new(vertices, edges).with_anchor(Point3::new(0.0, 0.0, 0.5))
    }

    /// Built-in mesh by name, as used in configuration files.
    pub fn named(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "quadcopter" | "quad" => Some(Self::quadcopter()),
            "cube" => Some(Self::cube()),
            "cross-drone" | "cross" => Some(Self::cross_drone()),
            _ => None,
        }
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Centroid of the vertices, origin for an empty mesh.
    pub fn center(&self) -> Point3<f64> {
        centroid(&self.vertices)
    }

    /// Point the motion trail follows.
    pub fn anchor(&self) -> Point3<f64> {
        self.anchor
    }

    /// Edges whose both endpoints are projectable.
    ///
    /// `projections` must come from projecting [`vertices`](Self::vertices)
    /// in order; edges pointing past its end are skipped.
    pub fn visible_edges<'a>(
        &'a self,
        projections: &'a [Option<ScreenPoint>],
    ) -> impl Iterator<Item = VisibleEdge> + 'a {
        self.edges.iter().filter_map(move |&(from, to)| {
            let a = (*projections.get(from)?)?;
            let b = (*projections.get(to)?)?;
            Some(VisibleEdge {
                from,
                to,
                a,
                b,
                depth: (a.scale + b.scale) / 2.0,
            })
        })
    }
}

fn centroid(vertices: &[Point3<f64>]) -> Point3<f64> {
    if vertices.is_empty() {
        return Point3::origin();
    }
    let sum = vertices
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / vertices.len() as f64)
}
