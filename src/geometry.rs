use std::fmt;

use crate::error::{QuadtreeError, Result};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle. Both edges are inclusive.
///
/// A `Rect` built through [`Rect::new`] always has finite coordinates with
/// `min <= max` on both axes; zero width or height is allowed and describes
/// a segment or a point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    min: Point,
    max: Point,
}

impl Rect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        let finite = [min_x, min_y, max_x, max_y].iter().all(|v| v.is_finite());
        if !finite || min_x > max_x || min_y > max_y {
            return Err(QuadtreeError::InvalidBound {
                min_x,
                min_y,
                max_x,
                max_y,
            });
        }
        Ok(Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        })
    }

    pub fn from_point(point: Point) -> Result<Self> {
        Self::new(point.x, point.y, point.x, point.y)
    }

    /// Splits at `center` without re-validating. Callers pass a center
    /// that lies inside `self`, so the result keeps `min <= max`.
    pub(crate) fn quarter(&self, center: Point, high_x: bool, high_y: bool) -> Self {
        let (min_x, max_x) = if high_x { (center.x, self.max.x) } else { (self.min.x, center.x) };
        let (min_y, max_y) = if high_y { (center.y, self.max.y) } else { (self.min.y, center.y) };
        Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        }
    }

    pub fn min(&self) -> Point {
        self.min
    }

    pub fn max(&self) -> Point {
        self.max
    }

    pub fn center(&self) -> Point {
        // Halving first keeps the sum finite near f64::MAX.
        Point::new(
            self.min.x * 0.5 + self.max.x * 0.5,
            self.min.y * 0.5 + self.max.y * 0.5,
        )
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        other.min.x <= self.max.x
            && other.max.x >= self.min.x
            && other.min.y <= self.max.y
            && other.max.y >= self.min.y
    }

    pub fn contains_point(&self, point: Point) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.min, self.max)
    }
}
