use crate::{Point, SelectionError};

/// One leg of a selection path: a connected run of at least two points.
///
/// Immutable once built. Equality and hashing compare the whole point sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct PolyLine {
    points: Vec<Point>,
}

impl PolyLine {
    /// Straight segment from `start` to `end`.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            points: vec![start, end],
        }
    }

    pub fn from_points(points: Vec<Point>) -> Result<Self, SelectionError> {
        if points.len() < 2 {
            return Err(SelectionError::TooFewPoints(points.len()));
        }
        Ok(Self { points })
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn xs(&self) -> impl Iterator<Item = i32> + '_ {
        self.points.iter().map(|p| p.x)
    }

    pub fn ys(&self) -> impl Iterator<Item = i32> + '_ {
        self.points.iter().map(|p| p.y)
    }
}

impl TryFrom<Vec<Point>> for PolyLine {
    type Error = SelectionError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::from_points(points)
    }
}

impl From<PolyLine> for Vec<Point> {
    fn from(value: PolyLine) -> Self {
        value.points
    }
}
