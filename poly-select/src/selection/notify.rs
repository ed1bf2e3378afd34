//! Property-change notifications for observers of a [`SelectionModel`](crate::SelectionModel).
//!
//! Observers register callbacks (optionally restricted to one property) and receive a
//! [`PropertyChange`] per change. In [`NotifyMode::Queued`] the changes are buffered until the
//! owner of the UI loop calls [`Notifier::dispatch_pending`], which keeps delivery on that loop.
//! Changes are always delivered in the order they were produced.

use std::collections::VecDeque;

use log::trace;

use crate::{PolyLine, SelectionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    State,
    Selection,
    Image,
}

impl Property {
    pub fn name(&self) -> &'static str {
        match self {
            Property::State => "state",
            Property::Selection => "selection",
            Property::Image => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeValue {
    State(SelectionState),
    Selection(Vec<PolyLine>),
    /// Dimensions of the new image, `None` once the image is closed
    Image(Option<(u32, u32)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub property: Property,
    pub old: Option<ChangeValue>,
    pub new: ChangeValue,
}

impl PropertyChange {
    pub fn state(old: SelectionState, new: SelectionState) -> Self {
        Self {
            property: Property::State,
            old: Some(ChangeValue::State(old)),
            new: ChangeValue::State(new),
        }
    }

    pub fn selection(new: &[PolyLine]) -> Self {
        Self {
            property: Property::Selection,
            old: None,
            new: ChangeValue::Selection(new.to_vec()),
        }
    }

    pub fn image(new: Option<(u32, u32)>) -> Self {
        Self {
            property: Property::Image,
            old: None,
            new: ChangeValue::Image(new),
        }
    }

    pub fn name(&self) -> &'static str {
        self.property.name()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyMode {
    /// Deliver while the mutating call is still running
    #[default]
    Immediate,
    /// Buffer until [`Notifier::dispatch_pending`]
    Queued,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub type Listener = Box<dyn FnMut(&PropertyChange)>;

struct Registration {
    id: ListenerId,
    filter: Option<Property>,
    callback: Listener,
}

pub struct Notifier {
    mode: NotifyMode,
    next_id: u64,
    listeners: Vec<Registration>,
    pending: VecDeque<PropertyChange>,
}

impl Notifier {
    pub fn new(mode: NotifyMode) -> Self {
        Self {
            mode,
            next_id: 0,
            listeners: Vec::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn mode(&self) -> NotifyMode {
        self.mode
    }

    pub fn add_listener(&mut self, callback: Listener) -> ListenerId {
        self.register(None, callback)
    }

    pub fn add_property_listener(&mut self, property: Property, callback: Listener) -> ListenerId {
        self.register(Some(property), callback)
    }

    fn register(&mut self, filter: Option<Property>, callback: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Registration {
            id,
            filter,
            callback,
        });
        id
    }

    /// Returns whether a listener with this id was registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|r| r.id != id);
        before != self.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn fire(&mut self, change: PropertyChange) {
        trace!("{} changed ({:?})", change.name(), self.mode);
        match self.mode {
            NotifyMode::Immediate => self.deliver(&change),
            NotifyMode::Queued => self.pending.push_back(change),
        }
    }

    /// Deliver all buffered changes in order. Returns how many were delivered.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut count = 0;
        while let Some(change) = self.pending.pop_front() {
            self.deliver(&change);
            count += 1;
        }
        count
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn deliver(&mut self, change: &PropertyChange) {
        for r in self
            .listeners
            .iter_mut()
            .filter(|r| r.filter.is_none_or(|p| p == change.property))
        {
            (r.callback)(change);
        }
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("mode", &self.mode)
            .field("listeners", &self.listeners.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, Listener) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_cb = seen.clone();
        (
            seen,
            Box::new(move |c: &PropertyChange| seen_cb.borrow_mut().push(c.name())),
        )
    }

    #[test]
    fn immediate_delivers_during_fire() {
        let mut n = Notifier::new(NotifyMode::Immediate);
        let (seen, cb) = recorder();
        n.add_listener(cb);
        n.fire(PropertyChange::state(
            SelectionState::NoSelection,
            SelectionState::Selecting,
        ));
        assert_eq!(*seen.borrow(), vec!["state"]);
        assert_eq!(n.pending_count(), 0);
    }

    #[test]
    fn queued_delivers_in_order_on_dispatch() {
        let mut n = Notifier::new(NotifyMode::Queued);
        let (seen, cb) = recorder();
        n.add_listener(cb);
        n.fire(PropertyChange::selection(&[]));
        n.fire(PropertyChange::state(
            SelectionState::Selecting,
            SelectionState::Selected,
        ));
        assert!(seen.borrow().is_empty());
        assert_eq!(n.dispatch_pending(), 2);
        assert_eq!(*seen.borrow(), vec!["selection", "state"]);
    }

    #[test]
    fn property_filter_and_removal() {
        let mut n = Notifier::new(NotifyMode::Immediate);
        let (seen, cb) = recorder();
        let id = n.add_property_listener(Property::State, cb);
        n.fire(PropertyChange::selection(&[]));
        n.fire(PropertyChange::image(Some((2, 2))));
        assert!(seen.borrow().is_empty());

        assert!(n.remove_listener(id));
        assert!(!n.remove_listener(id));
        n.fire(PropertyChange::state(
            SelectionState::Selecting,
            SelectionState::NoSelection,
        ));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn notify_mode_from_config() {
        let mode: NotifyMode = serde_json::from_str(r#""queued""#).unwrap();
        assert_eq!(mode, NotifyMode::Queued);
    }
}
