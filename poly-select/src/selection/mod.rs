//! The selection model: a closed-or-open polygonal path traced over an image.
//!
//! The model owns the path, its start point and a [`SelectionState`]; it is only
//! mutated through its own operations. How a new leg is computed is delegated to a
//! [`SelectionStrategy`], everything else (undo, closing, point moving, hit testing)
//! is strategy independent.

use std::{
    io::{Seek, Write},
    sync::Arc,
};

use image::DynamicImage;
use itertools::Itertools;
use log::{debug, info};

use crate::{ExportError, Point, PollTask, PolyLine, SelectionError, extract_selection};

mod notify;
mod strategy;

pub use notify::*;
pub use strategy::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionState {
    NoSelection,
    Selecting,
    /// A strategy is still computing the latest leg
    Processing,
    Selected,
}

impl SelectionState {
    pub fn is_processing(&self) -> bool {
        *self == SelectionState::Processing
    }

    pub fn is_finished(&self) -> bool {
        *self == SelectionState::Selected
    }

    pub fn can_undo(&self) -> bool {
        matches!(
            self,
            SelectionState::Selecting | SelectionState::Processing | SelectionState::Selected
        )
    }

    pub fn can_finish(&self) -> bool {
        *self == SelectionState::Selecting
    }
}

impl std::fmt::Display for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SelectionState::NoSelection => "NO_SELECTION",
            SelectionState::Selecting => "SELECTING",
            SelectionState::Processing => "PROCESSING",
            SelectionState::Selected => "SELECTED",
        })
    }
}

struct PendingLeg {
    task: PollTask<PolyLine>,
    closes: bool,
}

pub struct SelectionModel {
    strategy: Box<dyn SelectionStrategy>,
    state: SelectionState,
    /// First point of the path, `None` exactly in `NoSelection`
    start: Option<Point>,
    selection: Vec<PolyLine>,
    processing: Option<PendingLeg>,
    image: Option<Arc<DynamicImage>>,
    notifier: Notifier,
}

impl SelectionModel {
    pub fn new(strategy: Box<dyn SelectionStrategy>, mode: NotifyMode) -> Self {
        Self {
            strategy,
            state: SelectionState::NoSelection,
            start: None,
            selection: Vec::new(),
            processing: None,
            image: None,
            notifier: Notifier::new(mode),
        }
    }

    pub fn point_to_point(mode: NotifyMode) -> Self {
        Self::new(Box::new(PointToPointStrategy), mode)
    }

    /// Fresh model for a newly chosen tool. Keeps the image and the notify mode of
    /// `previous`, but neither its path nor its listeners.
    pub fn from_previous(strategy: Box<dyn SelectionStrategy>, previous: &SelectionModel) -> Self {
        let mut model = Self::new(strategy, previous.notifier.mode());
        model.image = previous.image.clone();
        model
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn start(&self) -> Option<Point> {
        self.start
    }

    /// The committed legs in traversal order.
    pub fn selection(&self) -> &[PolyLine] {
        &self.selection
    }

    /// One control point per leg: the point where the leg starts.
    pub fn control_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.selection.iter().map(PolyLine::start)
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn image(&self) -> Option<&DynamicImage> {
        self.image.as_deref()
    }

    /// Consecutive legs share their boundary points.
    pub fn is_connected(&self) -> bool {
        self.selection
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.end() == b.start())
    }

    /// Connected, non-empty and ending where it starts.
    pub fn is_closed(&self) -> bool {
        match (self.selection.first(), self.selection.last()) {
            (Some(first), Some(last)) => self.is_connected() && last.end() == first.start(),
            _ => false,
        }
    }

    /// End of the last leg, or the start point while the path is empty.
    pub fn last_point(&self) -> Result<Point, SelectionError> {
        let start = self.start.ok_or(SelectionError::InvalidState {
            operation: "last_point",
            state: self.state,
        })?;
        Ok(self.selection.last().map_or(start, PolyLine::end))
    }

    /// Preview leg from the last point to `p`. Never mutates the model.
    pub fn live_wire(&self, p: Point) -> Result<PolyLine, SelectionError> {
        let last = self.last_point().map_err(|_| SelectionError::InvalidState {
            operation: "live_wire",
            state: self.state,
        })?;
        Ok(self.strategy.live_wire(last, p))
    }

    pub fn add_point(&mut self, p: Point) -> Result<(), SelectionError> {
        match self.state {
            SelectionState::NoSelection => {
                self.start = Some(p);
                self.set_state(SelectionState::Selecting);
                Ok(())
            }
            SelectionState::Selecting => {
                let last = self.last_point()?;
                let leg = self.strategy.append_segment(last, p);
                self.accept_leg(leg, false);
                Ok(())
            }
            state => Err(SelectionError::InvalidState {
                operation: "add_point",
                state,
            }),
        }
    }

    /// Close the path by connecting the last point back to the start.
    pub fn finish_selection(&mut self) -> Result<(), SelectionError> {
        if self.state != SelectionState::Selecting {
            return Err(SelectionError::InvalidState {
                operation: "finish_selection",
                state: self.state,
            });
        }
        let (Some(start), false) = (self.start, self.selection.is_empty()) else {
            return Err(SelectionError::EmptyPath {
                operation: "finish_selection",
            });
        };
        let last = self.last_point()?;
        let leg = self.strategy.append_segment(last, start);
        self.accept_leg(leg, true);
        Ok(())
    }

    /// Remove the most recently added leg (or the start point if there is none).
    /// While processing, this cancels the pending leg instead.
    pub fn undo(&mut self) -> Result<(), SelectionError> {
        match self.state {
            SelectionState::NoSelection => Err(SelectionError::InvalidState {
                operation: "undo",
                state: self.state,
            }),
            SelectionState::Processing => {
                self.cancel_processing();
                Ok(())
            }
            SelectionState::Selecting if self.selection.is_empty() => {
                self.start = None;
                self.set_state(SelectionState::NoSelection);
                Ok(())
            }
            SelectionState::Selecting | SelectionState::Selected => {
                self.selection.pop();
                self.fire_selection();
                self.set_state(SelectionState::Selecting);
                Ok(())
            }
        }
    }

    /// Move control point `index` of a finished selection to `new_pos`, replacing the
    /// leg that ends there and the leg that starts there with straight segments.
    pub fn move_point(&mut self, index: usize, new_pos: Point) -> Result<(), SelectionError> {
        if self.state != SelectionState::Selected {
            return Err(SelectionError::InvalidState {
                operation: "move_point",
                state: self.state,
            });
        }
        let n = self.selection.len();
        if index >= n {
            return Err(SelectionError::IndexOutOfRange { index, len: n });
        }

        let prev = (index + n - 1) % n;
        self.selection[prev] = PolyLine::new(self.selection[prev].start(), new_pos);
        self.selection[index] = PolyLine::new(new_pos, self.selection[index].end());
        if index == 0 {
            self.start = Some(new_pos);
        }
        debug_assert!(self.is_closed());

        debug!("Moved control point {index} to {new_pos}");
        self.fire_selection();
        Ok(())
    }

    /// Index of the control point nearest to `p` whose squared distance is at most
    /// `max_dist_squared`. Ties resolve to the lowest index.
    ///
    /// Works in every state; with an empty path there is nothing to hit.
    pub fn closest_point(&self, p: Point, max_dist_squared: i64) -> Option<usize> {
        self.control_points()
            .map(|c| c.distance_squared(p))
            .enumerate()
            .filter(|(_, d)| *d <= max_dist_squared)
            .min_by_key(|(_, d)| *d)
            .map(|(i, _)| i)
    }

    pub fn reset(&mut self) {
        if self.processing.take().is_some() {
            debug!("Dropped pending leg on reset");
        }
        self.start = None;
        if !self.selection.is_empty() {
            self.selection.clear();
            self.fire_selection();
        }
        self.set_state(SelectionState::NoSelection);
    }

    /// Abort a pending leg. Does nothing unless the model is processing.
    pub fn cancel_processing(&mut self) {
        if self.state != SelectionState::Processing {
            return;
        }
        self.processing = None;
        info!("Cancelled {} processing", self.strategy.name());
        self.set_state(SelectionState::Selecting);
    }

    /// Check whether a pending leg is done and commit it. Returns `true` if a leg
    /// was committed. Call this regularly (e.g. once per frame) while processing.
    pub fn poll_processing(&mut self) -> bool {
        let Some(pending) = self.processing.as_mut() else {
            return false;
        };
        let Some(line) = pending.task.poll_ready() else {
            return false;
        };
        let closes = pending.closes;
        self.processing = None;
        self.commit(line, closes);
        true
    }

    /// Replace the traced image. Any selection on the previous image is discarded.
    pub fn set_image(&mut self, image: Option<DynamicImage>) {
        self.reset();
        let dims = image.as_ref().map(|i| (i.width(), i.height()));
        self.image = image.map(Arc::new);
        self.notifier.fire(PropertyChange::image(dims));
    }

    /// Encode the pixels inside the closed path as PNG.
    pub fn save_selection<W: Write + Seek>(&self, w: &mut W) -> Result<(), ExportError> {
        if self.state != SelectionState::Selected {
            return Err(ExportError::NotSelected(self.state));
        }
        let image = self.image.as_deref().ok_or(ExportError::NoImage)?;
        let extracted = extract_selection(image, &self.selection)?;
        extracted.write_to(w, image::ImageFormat::Png)?;
        info!(
            "Saved selection of {}x{} pixels",
            extracted.width(),
            extracted.height()
        );
        Ok(())
    }

    pub fn add_listener(&mut self, callback: impl FnMut(&PropertyChange) + 'static) -> ListenerId {
        self.notifier.add_listener(Box::new(callback))
    }

    pub fn add_property_listener(
        &mut self,
        property: Property,
        callback: impl FnMut(&PropertyChange) + 'static,
    ) -> ListenerId {
        self.notifier
            .add_property_listener(property, Box::new(callback))
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.notifier.remove_listener(id)
    }

    /// Deliver queued notifications (only relevant for [`NotifyMode::Queued`]).
    pub fn dispatch_pending(&mut self) -> usize {
        self.notifier.dispatch_pending()
    }

    fn accept_leg(&mut self, leg: Leg, closes: bool) {
        match leg {
            Leg::Ready(line) => self.commit(line, closes),
            Leg::Pending(fut) => {
                self.processing = Some(PendingLeg {
                    task: PollTask::new(fut),
                    closes,
                });
                self.set_state(SelectionState::Processing);
            }
        }
    }

    fn commit(&mut self, line: PolyLine, closes: bool) {
        debug_assert_eq!(self.last_point().ok(), Some(line.start()));
        self.selection.push(line);
        self.fire_selection();
        self.set_state(if closes {
            SelectionState::Selected
        } else {
            SelectionState::Selecting
        });
    }

    fn set_state(&mut self, new: SelectionState) {
        let old = self.state;
        if old == new {
            return;
        }
        self.state = new;
        debug!("Selection state {old} -> {new}");
        self.notifier.fire(PropertyChange::state(old, new));
    }

    fn fire_selection(&mut self) {
        self.notifier
            .fire(PropertyChange::selection(&self.selection));
    }
}

impl Default for SelectionModel {
    fn default() -> Self {
        Self::point_to_point(NotifyMode::Immediate)
    }
}

impl std::fmt::Debug for SelectionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionModel")
            .field("strategy", &self.strategy.name())
            .field("state", &self.state)
            .field("start", &self.start)
            .field("selection", &self.selection)
            .field("notifier", &self.notifier)
            .finish_non_exhaustive()
    }
}
