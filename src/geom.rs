//! Plain geometry: points, rectangles, and compass directions.
//!
//! Rectangles are axis-aligned and stored as `x, y, width, height`. The same
//! types are used for graph coordinates and screen coordinates; which space a
//! value lives in is documented at each call site.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

/// A point in either screen or graph space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Translate by `dx, dy`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Rotate around `center` by `deg` degrees (clockwise in screen space).
    #[must_use]
    pub fn rotate_around(self, center: Point, deg: f64) -> Point {
        if deg == 0.0 {
            return self;
        }
        let (sin, cos) = deg.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// A rectangle of the given size centred on `center`.
    #[must_use]
    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    /// Smallest rectangle containing all `points`. `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Self::new(min.x, min.y, max.x - min.x, max.y - min.y))
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Grow by `amount` on every side. Negative values shrink.
    #[must_use]
    pub fn grow(&self, amount: f64) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    /// Smallest rectangle containing both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(x, y, self.right().max(other.right()) - x, self.bottom().max(other.bottom()) - y)
    }

    /// Axis-aligned bounds of this rectangle rotated by `deg` around its center.
    #[must_use]
    pub fn rotated_bounds(&self, deg: f64) -> Rect {
        if deg.rem_euclid(360.0) == 0.0 {
            return *self;
        }
        let c = self.center();
        let corners = [
            Point::new(self.x, self.y).rotate_around(c, deg),
            Point::new(self.right(), self.y).rotate_around(c, deg),
            Point::new(self.right(), self.bottom()).rotate_around(c, deg),
            Point::new(self.x, self.bottom()).rotate_around(c, deg),
        ];
        Rect::from_points(&corners).unwrap_or(*self)
    }

    /// Scale every component by `s`.
    #[must_use]
    pub fn scaled(&self, s: f64) -> Rect {
        Rect::new(self.x * s, self.y * s, self.width * s, self.height * s)
    }
}

/// Compass direction of a connect affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions in probe order.
    pub const ALL: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];

    #[must_use]
    pub fn opposite(self) -> Direction {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Whether travel is along the y axis.
    #[must_use]
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::North | Self::South)
    }

    /// Unit step in screen orientation (y grows downwards).
    #[must_use]
    pub fn unit(self) -> (f64, f64) {
        match self {
            Self::North => (0.0, -1.0),
            Self::East => (1.0, 0.0),
            Self::South => (0.0, 1.0),
            Self::West => (-1.0, 0.0),
        }
    }
}

/// Closest point to `p` on the segment `a`–`b`, with the squared distance.
#[must_use]
pub fn nearest_on_segment(p: Point, a: Point, b: Point) -> (Point, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let q = Point::new(a.x + t * dx, a.y + t * dy);
    let ddx = p.x - q.x;
    let ddy = p.y - q.y;
    (q, ddx * ddx + ddy * ddy)
}

/// Index of the polyline segment closest to `p` and the squared distance to it.
#[must_use]
pub fn nearest_segment(points: &[Point], p: Point) -> Option<(usize, f64)> {
    points
        .windows(2)
        .enumerate()
        .map(|(i, w)| (i, nearest_on_segment(p, w[0], w[1]).1))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
