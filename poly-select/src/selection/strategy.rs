use futures::future::BoxFuture;

use crate::{Point, PolyLine};

/// A leg produced by a strategy, either immediately or after background work.
pub enum Leg {
    Ready(PolyLine),
    /// The model stays in `Processing` until this resolves
    Pending(BoxFuture<'static, PolyLine>),
}

impl std::fmt::Debug for Leg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Leg::Ready(line) => f.debug_tuple("Ready").field(line).finish(),
            Leg::Pending(_) => f.write_str("Pending"),
        }
    }
}

/// How a selection tool connects the last committed point to the next one.
///
/// The state machine, undo and point moving live in
/// [`SelectionModel`](crate::SelectionModel); strategies only compute legs.
pub trait SelectionStrategy {
    /// Preview from `last` to the pointer. Must be cheap, it runs every frame.
    fn live_wire(&self, last: Point, cursor: Point) -> PolyLine;

    /// The leg to append when the user commits `target`.
    fn append_segment(&mut self, last: Point, target: Point) -> Leg;

    fn name(&self) -> &'static str;
}

/// Connects every pair of points with a straight line.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointToPointStrategy;

impl SelectionStrategy for PointToPointStrategy {
    fn live_wire(&self, last: Point, cursor: Point) -> PolyLine {
        PolyLine::new(last, cursor)
    }

    fn append_segment(&mut self, last: Point, target: Point) -> Leg {
        Leg::Ready(PolyLine::new(last, target))
    }

    fn name(&self) -> &'static str {
        "Point-to-point"
    }
}
