//! Fading motion trail behind the projected model.

use std::collections::VecDeque;

use nalgebra::Point2;

use super::projection::ScreenPoint;

/// Default number of remembered positions.
pub const DEFAULT_TRAIL_LENGTH: usize = 40;

/// One trail segment. `fade` runs from 0 (oldest) towards 1 (newest).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailSegment {
    pub from: Point2<f64>,
    pub to: Point2<f64>,
    pub fade: f64,
}

/// Bounded history of screen positions.
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<Point2<f64>>,
    capacity: usize,
}

impl Default for Trail {
    fn default() -> Self {
        Self::new(DEFAULT_TRAIL_LENGTH)
    }
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a position, evicting the oldest when full.
    pub fn push(&mut self, point: Point2<f64>) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Append a projected point; unprojectable points leave the trail as is.
    pub fn push_projected(&mut self, point: Option<ScreenPoint>) {
        if let Some(p) = point {
            self.push(Point2::new(p.x, p.y));
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> impl Iterator<Item = &Point2<f64>> {
        self.points.iter()
    }

    /// Segments from oldest to newest.
    pub fn segments(&self) -> Vec<TrailSegment> {
        let total = self.points.len() as f64;
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .enumerate()
            .map(|(i, (from, to))| TrailSegment {
                from: *from,
                to: *to,
                fade: i as f64 / total,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded() {
        let mut trail = Trail::new(3);
        for i in 0..5 {
            trail.push(Point2::new(i as f64, 0.0));
        }
        assert_eq!(trail.len(), 3);
        let xs: Vec<f64> = trail.points().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_segments_fade_in() {
        let mut trail = Trail::new(4);
        for i in 0..4 {
            trail.push(Point2::new(i as f64, i as f64));
        }
        let fades: Vec<f64> = trail.segments().iter().map(|s| s.fade).collect();
        assert_eq!(fades, vec![0.0, 0.25, 0.5]);
    }

    #[test]
    fn test_unprojectable_points_skipped() {
        let mut trail = Trail::default();
        trail.push_projected(None);
        assert!(trail.is_empty());
        assert!(trail.segments().is_empty());
        assert_eq!(trail.capacity(), DEFAULT_TRAIL_LENGTH);
    }
}
