use serde::{Deserialize, Serialize};

/// A position on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance. Used as the routing cost between grid vertices.
    pub fn distance_squared(&self, other: &Point) -> f64 {
        (other.x - self.x).powi(2) + (other.y - self.y).powi(2)
    }

    /// Bit-level identity with `-0.0` folded into `0.0`, so equal points hash equally.
    pub(crate) fn bits(&self) -> (u64, u64) {
        ((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned segment. Producers only ever emit horizontal or vertical
/// segments; nothing here checks it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub start: Point,
    pub end: Point,
}

impl Connection {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn from_coords(start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> Self {
        Self {
            start: Point::new(start_x, start_y),
            end: Point::new(end_x, end_y),
        }
    }

    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    pub fn is_horizontal(&self) -> bool {
        self.start.y == self.end.y
    }

    /// Exactly one of the two axes is shared by both endpoints.
    pub fn is_axis_aligned(&self) -> bool {
        self.is_vertical() != self.is_horizontal()
    }

    /// Bounding-box containment. For axis-aligned segments this is the same
    /// as lying on the segment.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let (start, end) = (self.start, self.end);
        (x >= start.x && x <= end.x || x >= end.x && x <= start.x)
            && (y >= start.y && y <= end.y || y >= end.y && y <= start.y)
    }

    pub fn contains_point(&self, point: &Point) -> bool {
        self.contains(point.x, point.y)
    }

    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }
}

/// Read-only view of an axis-aligned rectangle consumed by the router.
pub trait Bounds {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn width(&self) -> f64;
    fn height(&self) -> f64;

    fn right(&self) -> f64 {
        self.x() + self.width()
    }

    fn bottom(&self) -> f64 {
        self.y() + self.height()
    }
}

/// Plain rectangle record.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Obstacle {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn of<B: Bounds + ?Sized>(bounds: &B) -> Self {
        Self::new(bounds.x(), bounds.y(), bounds.width(), bounds.height())
    }

    /// Grown by `margin` on every side.
    pub fn inflate(&self, margin: f64) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }
}

impl Bounds for Obstacle {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }
}

impl<B: Bounds + ?Sized> Bounds for &B {
    fn x(&self) -> f64 {
        (**self).x()
    }

    fn y(&self) -> f64 {
        (**self).y()
    }

    fn width(&self) -> f64 {
        (**self).width()
    }

    fn height(&self) -> f64 {
        (**self).height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacle_derives_right_and_bottom() {
        let obstacle = Obstacle::new(50.0, 150.0, 130.0, 50.0);
        assert_eq!(obstacle.right(), 180.0);
        assert_eq!(obstacle.bottom(), 200.0);
    }

    #[test]
    fn contains_accepts_either_endpoint_order() {
        let forward = Connection::from_coords(10.0, 5.0, 10.0, 50.0);
        let backward = forward.reversed();
        for line in [forward, backward] {
            assert!(line.contains(10.0, 5.0));
            assert!(line.contains(10.0, 27.5));
            assert!(line.contains(10.0, 50.0));
            assert!(!line.contains(10.0, 50.5));
            assert!(!line.contains(10.5, 20.0));
        }
    }

    #[test]
    fn axis_alignment_rejects_diagonals_and_points() {
        assert!(Connection::from_coords(0.0, 0.0, 0.0, 10.0).is_axis_aligned());
        assert!(Connection::from_coords(0.0, 3.0, 10.0, 3.0).is_axis_aligned());
        assert!(!Connection::from_coords(0.0, 0.0, 4.0, 10.0).is_axis_aligned());
        assert!(!Connection::from_coords(2.0, 2.0, 2.0, 2.0).is_axis_aligned());
    }

    #[test]
    fn negative_zero_shares_bits_with_zero() {
        assert_eq!(Point::new(-0.0, 1.0).bits(), Point::new(0.0, 1.0).bits());
    }
}
