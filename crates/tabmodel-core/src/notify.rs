//! Change notifications for tree-view consumers
//!
//! Events are delivered synchronously, in mutation order. Pre-mutation hooks
//! (`object_deleting`, `property_changing`) carry a cancel flag the engine
//! checks before committing anything.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::model::{ChildKind, ObjectId, ObjectKind, PropertyName, PropertyValue};

/// Committed structural or property change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event")]
pub enum ChangeEvent {
    NodeInserted {
        parent: ObjectId,
        collection: ChildKind,
        children: Vec<ObjectId>,
    },
    NodeRemoved {
        parent: ObjectId,
        collection: ChildKind,
        children: Vec<ObjectId>,
    },
    PropertyChanged {
        object: ObjectId,
        property: PropertyName,
        old: PropertyValue,
        new: PropertyValue,
    },
    /// Every reference edge owned by `object` was severed
    ReferencesCleared { object: ObjectId },
    ObjectDeleted { object: ObjectId, kind: ObjectKind },
}

/// Receiver of model notifications
///
/// All methods have empty defaults so listeners only implement what they
/// care about. Listeners cannot mutate the model re-entrantly.
pub trait ModelListener {
    /// Called before a delete commits; set `cancel` to abort it
    fn object_deleting(&mut self, _object: ObjectId, _kind: ObjectKind, _cancel: &mut bool) {}

    /// Called before a property change commits; set `cancel` to veto it
    fn property_changing(
        &mut self,
        _object: ObjectId,
        _property: PropertyName,
        _new: &PropertyValue,
        _cancel: &mut bool,
    ) {
    }

    /// Called after every committed change
    fn on_change(&mut self, _event: &ChangeEvent) {}
}

#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Vec<Box<dyn ModelListener>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn ModelListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Ask every listener; returns true if any cancelled
    pub(crate) fn object_deleting(&mut self, object: ObjectId, kind: ObjectKind) -> bool {
        let mut cancel = false;
        for listener in &mut self.listeners {
            listener.object_deleting(object, kind, &mut cancel);
        }
        cancel
    }

    /// Ask every listener; returns true if any vetoed
    pub(crate) fn property_changing(
        &mut self,
        object: ObjectId,
        property: PropertyName,
        new: &PropertyValue,
    ) -> bool {
        let mut cancel = false;
        for listener in &mut self.listeners {
            listener.property_changing(object, property, new, &mut cancel);
        }
        cancel
    }

    pub(crate) fn publish(&mut self, event: ChangeEvent) {
        for listener in &mut self.listeners {
            listener.on_change(&event);
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Shared in-memory record of published events
///
/// Clone the journal to keep a read handle; subscribe the value returned by
/// [`EventJournal::listener`].
#[derive(Debug, Clone, Default)]
pub struct EventJournal {
    events: Rc<RefCell<Vec<ChangeEvent>>>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener that appends into this journal
    pub fn listener(&self) -> Box<dyn ModelListener> {
        Box::new(JournalListener {
            events: Rc::clone(&self.events),
        })
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

struct JournalListener {
    events: Rc<RefCell<Vec<ChangeEvent>>>,
}

impl ModelListener for JournalListener {
    fn on_change(&mut self, event: &ChangeEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
