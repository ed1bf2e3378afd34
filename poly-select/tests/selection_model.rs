//! Behaviour of the point-to-point selection model, including the notifications it sends.

use std::{cell::RefCell, rc::Rc};

use poly_select::{
    ChangeValue, NotifyMode, Point, PointToPointStrategy, PolyLine, Property, PropertyChange,
    SelectionError, SelectionModel, SelectionState::*,
};

/// Records every change a model sends.
#[derive(Clone, Default)]
struct Observer(Rc<RefCell<Vec<PropertyChange>>>);

impl Observer {
    fn attach(model: &mut SelectionModel) -> Self {
        let observer = Self::default();
        let events = observer.0.clone();
        model.add_listener(move |c| events.borrow_mut().push(c.clone()));
        observer
    }

    fn changed(&self, property: Property) -> bool {
        self.0.borrow().iter().any(|c| c.property == property)
    }

    fn changed_to(&self, property: Property, value: ChangeValue) -> bool {
        self.0
            .borrow()
            .iter()
            .any(|c| c.property == property && c.new == value)
    }

    fn count(&self) -> usize {
        self.0.borrow().len()
    }
}

fn model() -> SelectionModel {
    SelectionModel::point_to_point(NotifyMode::Immediate)
}

/// Square from (0,0) over (10,0), (10,10) and (0,10) back to the start.
fn square() -> SelectionModel {
    let mut model = model();
    for p in [(0, 0), (10, 0), (10, 10), (0, 10)] {
        model.add_point(p.into()).unwrap();
    }
    model.finish_selection().unwrap();
    model
}

fn with_duplicates() -> SelectionModel {
    let mut model = model();
    for p in [(0, 0), (10, 0), (20, 20), (0, 10), (10, 10), (20, 20)] {
        model.add_point(p.into()).unwrap();
    }
    model.finish_selection().unwrap();
    model
}

#[test]
fn default_construction() {
    let model = model();
    assert_eq!(model.state(), NoSelection);
    assert!(model.selection().is_empty());
    assert_eq!(model.start(), None);
}

#[test]
fn strategy_can_be_named_directly() {
    let previous = square();
    let model = SelectionModel::from_previous(Box::new(PointToPointStrategy), &previous);
    assert_eq!(model.strategy_name(), "Point-to-point");
    assert_eq!(model.state(), NoSelection);
}

#[test]
fn first_point_starts_selecting() {
    let mut model = model();
    let observer = Observer::attach(&mut model);

    model.add_point(Point::new(0, 0)).unwrap();

    assert!(observer.changed_to(Property::State, ChangeValue::State(Selecting)));
    assert!(!observer.changed(Property::Selection));
    assert_eq!(model.state(), Selecting);
    assert!(model.selection().is_empty());
    assert_eq!(model.last_point(), Ok(Point::new(0, 0)));
}

#[test]
fn live_wire_from_start() {
    let mut model = model();
    model.add_point(Point::new(0, 0)).unwrap();
    let wire = model.live_wire(Point::new(1, 2)).unwrap();
    assert_eq!(wire, PolyLine::new(Point::new(0, 0), Point::new(1, 2)));
    assert_eq!(model.state(), Selecting);
    assert!(model.selection().is_empty());
}

#[test]
fn live_wire_from_last_segment() {
    let mut model = model();
    model.add_point(Point::new(0, 0)).unwrap();
    model.add_point(Point::new(1, 2)).unwrap();
    let wire = model.live_wire(Point::new(3, 3)).unwrap();
    assert_eq!(wire, PolyLine::new(Point::new(1, 2), Point::new(3, 3)));
    assert_eq!(model.selection().len(), 1);
}

#[test]
fn undo_empty_returns_to_no_selection() {
    let mut model = model();
    model.add_point(Point::new(0, 0)).unwrap();
    let observer = Observer::attach(&mut model);

    model.undo().unwrap();

    assert!(observer.changed_to(Property::State, ChangeValue::State(NoSelection)));
    assert_eq!(model.state(), NoSelection);
    assert!(model.selection().is_empty());
    assert_eq!(model.start(), None);
}

#[test]
fn append_adds_straight_segment() {
    let mut model = model();
    model.add_point(Point::new(0, 0)).unwrap();
    let observer = Observer::attach(&mut model);

    model.add_point(Point::new(1, 2)).unwrap();

    assert!(!observer.changed(Property::State));
    assert!(observer.changed(Property::Selection));
    assert_eq!(model.state(), Selecting);
    assert_eq!(model.selection().len(), 1);
    let last = model.selection().last().unwrap();
    assert_eq!(last.point_count(), 2);
    assert_eq!(last.end(), Point::new(1, 2));
    assert_eq!(model.last_point(), Ok(Point::new(1, 2)));
}

#[test]
fn undo_in_progress_removes_one_segment() {
    let mut model = model();
    for p in [(0, 0), (0, 5), (5, 10), (10, 15)] {
        model.add_point(p.into()).unwrap();
    }
    assert_eq!(model.selection().len(), 3);
    let observer = Observer::attach(&mut model);

    model.undo().unwrap();

    assert!(!observer.changed(Property::State));
    assert!(observer.changed(Property::Selection));
    assert_eq!(model.state(), Selecting);
    assert_eq!(model.selection().len(), 2);
    assert_eq!(model.last_point(), Ok(Point::new(5, 10)));
}

#[test]
fn finish_closes_the_path() {
    let mut model = model();
    for p in [(0, 0), (10, 0), (10, 10), (0, 10)] {
        model.add_point(p.into()).unwrap();
    }
    let observer = Observer::attach(&mut model);

    model.finish_selection().unwrap();

    assert!(observer.changed_to(Property::State, ChangeValue::State(Selected)));
    assert!(observer.changed(Property::Selection));
    assert_eq!(model.state(), Selected);
    assert_eq!(model.selection().len(), 4);
    assert_eq!(model.last_point(), Ok(Point::new(0, 0)));
}

#[test]
fn square_chains_back_to_start() {
    let model = square();
    let s = model.selection();
    assert_eq!(s.len(), 4);
    for i in 0..s.len() {
        assert_eq!(s[i].end(), s[(i + 1) % s.len()].start());
    }
    assert_eq!(s[0].start(), model.start().unwrap());
    assert!(model.is_closed());
}

#[test]
fn finish_with_empty_path_is_rejected() {
    let mut model = model();
    model.add_point(Point::new(3, 3)).unwrap();
    let err = model.finish_selection().unwrap_err();
    assert!(err.is_invalid_state());
    assert_eq!(model.state(), Selecting);

    let mut model = square();
    assert!(model.finish_selection().unwrap_err().is_invalid_state());
}

#[test]
fn undo_selected_reopens_path() {
    let mut model = square();
    let observer = Observer::attach(&mut model);

    model.undo().unwrap();

    assert!(observer.changed_to(Property::State, ChangeValue::State(Selecting)));
    assert!(observer.changed(Property::Selection));
    assert_eq!(model.state(), Selecting);
    assert_eq!(model.selection().len(), 3);
    assert_eq!(model.last_point(), Ok(Point::new(0, 10)));
}

#[test]
fn undo_without_selection_is_rejected() {
    let mut model = model();
    assert!(model.undo().unwrap_err().is_invalid_state());
}

#[test]
fn add_point_after_finish_is_rejected() {
    let mut model = square();
    assert!(matches!(
        model.add_point(Point::new(1, 1)),
        Err(SelectionError::InvalidState { state: Selected, .. })
    ));
    assert_eq!(model.selection().len(), 4);
}

#[test]
fn move_point_middle() {
    let mut model = square();
    let observer = Observer::attach(&mut model);

    model.move_point(1, Point::new(11, 12)).unwrap();

    assert!(observer.changed(Property::Selection));
    assert_eq!(observer.count(), 1);
    let s = model.selection();
    assert_eq!(s[0], PolyLine::new(Point::new(0, 0), Point::new(11, 12)));
    assert_eq!(s[1], PolyLine::new(Point::new(11, 12), Point::new(10, 10)));
    assert_eq!(s[2], PolyLine::new(Point::new(10, 10), Point::new(0, 10)));
    assert_eq!(s[3], PolyLine::new(Point::new(0, 10), Point::new(0, 0)));
}

#[test]
fn move_point_start_wraps_around() {
    let mut model = square();
    let observer = Observer::attach(&mut model);

    model.move_point(0, Point::new(11, 12)).unwrap();

    assert!(observer.changed(Property::Selection));
    let s = model.selection();
    assert_eq!(s[3], PolyLine::new(Point::new(0, 10), Point::new(11, 12)));
    assert_eq!(s[0], PolyLine::new(Point::new(11, 12), Point::new(10, 0)));
    assert_eq!(s[1], PolyLine::new(Point::new(10, 0), Point::new(10, 10)));
    assert_eq!(model.start(), Some(Point::new(11, 12)));
}

#[test]
fn move_point_requires_selected() {
    let mut model = model();
    model.add_point(Point::new(0, 0)).unwrap();
    model.add_point(Point::new(5, 0)).unwrap();
    let err = model.move_point(0, Point::new(1, 1)).unwrap_err();
    assert!(err.is_invalid_state());
    assert_eq!(model.selection()[0], PolyLine::new(Point::new(0, 0), Point::new(5, 0)));

    let mut model = square();
    let err = model.move_point(9, Point::new(1, 1)).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn stored_points_are_copies() {
    let mut model = model();
    let mut p = Point::new(0, 0);
    model.add_point(p).unwrap();
    p.x = 50;
    model.add_point(p).unwrap();
    p.y = 60;
    assert_eq!(model.start(), Some(Point::new(0, 0)));
    assert_eq!(model.last_point(), Ok(Point::new(50, 0)));

    let mut model = square();
    let mut q = Point::new(11, 12);
    model.move_point(0, q).unwrap();
    q.x = -1;
    assert_eq!(model.start(), Some(Point::new(11, 12)));
    assert_eq!(model.selection()[0].start(), Point::new(11, 12));
}

#[test]
fn closest_point_centered() {
    assert_eq!(square().closest_point(Point::new(10, 0), 4), Some(1));
    assert_eq!(square().closest_point(Point::new(0, 0), 0), Some(0));
}

#[test]
fn closest_point_too_far() {
    assert_eq!(square().closest_point(Point::new(100, -100), 9), None);
}

#[test]
fn closest_point_picks_nearest_within_tolerance() {
    assert_eq!(square().closest_point(Point::new(9, 1), 4), Some(1));
    assert_eq!(square().closest_point(Point::new(8, 8), 8), Some(2));
    assert_eq!(square().closest_point(Point::new(8, 8), 7), None);
}

#[test]
fn closest_point_duplicates() {
    let model = with_duplicates();
    let idx = model.closest_point(Point::new(20, 20), 4);
    assert!(matches!(idx, Some(2) | Some(5)), "got {idx:?}");
}

#[test]
fn reset_clears_everything() {
    let mut model = square();
    let observer = Observer::attach(&mut model);
    model.reset();
    assert!(observer.changed_to(Property::State, ChangeValue::State(NoSelection)));
    assert!(observer.changed_to(Property::Selection, ChangeValue::Selection(Vec::new())));
    assert_eq!(model.state(), NoSelection);
    assert!(model.selection().is_empty());
    assert_eq!(model.start(), None);
}

#[test]
fn queued_notifications_wait_for_dispatch() {
    let mut model = SelectionModel::point_to_point(NotifyMode::Queued);
    let observer = Observer::attach(&mut model);

    model.add_point(Point::new(0, 0)).unwrap();
    model.add_point(Point::new(4, 0)).unwrap();
    assert_eq!(observer.count(), 0);

    assert_eq!(model.dispatch_pending(), 2);
    let names: Vec<_> = observer.0.borrow().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["state", "selection"]);
}

#[test]
fn property_listener_only_sees_its_property() {
    let mut model = model();
    let states = Rc::new(RefCell::new(Vec::new()));
    let seen = states.clone();
    let id = model.add_property_listener(Property::State, move |c| {
        if let ChangeValue::State(s) = c.new {
            seen.borrow_mut().push(s);
        }
    });

    model.add_point(Point::new(0, 0)).unwrap();
    model.add_point(Point::new(4, 0)).unwrap();
    model.finish_selection().unwrap();
    assert_eq!(*states.borrow(), vec![Selecting, Selected]);

    assert!(model.remove_listener(id));
    model.reset();
    assert_eq!(states.borrow().len(), 2);
}
