use serde::{Deserialize, Serialize};

/// A 2D coordinate. Pixel units for detector centroids, normalized units
/// for landmark model output.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    /// Smallest box containing every point, `None` for an empty input.
    pub fn enclosing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: Point::new(acc.min.x.min(p.x), acc.min.y.min(p.y)),
                max: Point::new(acc.max.x.max(p.x), acc.max.y.max(p.y)),
            },
        ))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Arithmetic mean of the points, `None` for an empty input.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(Point::new(0.0, 0.0).distance(&Point::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_bounding_box_extents() {
        let points = [
            Point::new(10.0, 5.0),
            Point::new(-2.0, 8.0),
            Point::new(4.0, -1.0),
        ];
        let bbox = BoundingBox::enclosing(&points).unwrap();
        assert_eq!(bbox.width(), 12.0);
        assert_eq!(bbox.height(), 9.0);
        assert!(BoundingBox::enclosing(&Vec::<Point>::new()).is_none());
    }

    #[test]
    fn test_centroid() {
        let points = [Point::new(0.0, 0.0), Point::new(2.0, 4.0)];
        assert_eq!(centroid(&points), Some(Point::new(1.0, 2.0)));
        assert_eq!(centroid(&[]), None);
    }
}
