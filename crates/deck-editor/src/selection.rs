//! Layout-wide selection arbiter.
//!
//! Owns one [`SelectionStore`] per registered element and enforces that at
//! most one of them is selected. Stores are kept in registration order so
//! iteration is deterministic.

use crate::store::{ResizeFloor, SelectionStore};
use deck_core::element::ElementRef;
use deck_core::model::ElementTransform;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Elements whose in-flight gesture was cancelled by a selection change.
pub type Released = SmallVec<[ElementRef; 2]>;

#[derive(Debug, Default)]
pub struct SelectionArbiter {
    stores: Vec<SelectionStore>,
    index: HashMap<ElementRef, usize>,
    floor: ResizeFloor,
}

impl SelectionArbiter {
    pub fn new(floor: ResizeFloor) -> Self {
        Self {
            stores: Vec::new(),
            index: HashMap::new(),
            floor,
        }
    }

    /// Register an element. Re-registering re-seeds its transform.
    pub fn register(&mut self, element: ElementRef, initial: ElementTransform) {
        if let Some(&i) = self.index.get(&element) {
            self.stores[i].sync_transform(initial);
            return;
        }
        self.index.insert(element, self.stores.len());
        self.stores
            .push(SelectionStore::new(element, initial, self.floor));
    }

    /// Drop an element's store. Returns `true` if it was mid-gesture.
    pub fn unregister(&mut self, element: ElementRef) -> bool {
        let Some(i) = self.index.remove(&element) else {
            return false;
        };
        let mut store = self.stores.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        store.deselect()
    }

    /// Select `element` exclusively. Every other store is deselected first;
    /// returns the ones whose gesture was cancelled by that.
    pub fn select(&mut self, element: ElementRef) -> Released {
        if !self.index.contains_key(&element) {
            log::debug!("select of unregistered {element} ignored");
            return Released::new();
        }
        let released = self.deselect_all_except(Some(element));
        if let Some(store) = self.store_mut(element) {
            store.select();
        }
        released
    }

    /// Deselect every store except `keep`.
    pub fn deselect_all_except(&mut self, keep: Option<ElementRef>) -> Released {
        let mut released = Released::new();
        for store in &mut self.stores {
            if Some(store.element()) == keep || !store.state().is_selected {
                continue;
            }
            if store.deselect() {
                released.push(store.element());
            }
        }
        released
    }

    pub fn selected(&self) -> Option<ElementRef> {
        self.stores
            .iter()
            .find(|s| s.state().is_selected)
            .map(SelectionStore::element)
    }

    pub fn is_selected(&self, element: ElementRef) -> bool {
        self.store(element).is_some_and(|s| s.state().is_selected)
    }

    pub fn store(&self, element: ElementRef) -> Option<&SelectionStore> {
        self.index.get(&element).map(|&i| &self.stores[i])
    }

    pub fn store_mut(&mut self, element: ElementRef) -> Option<&mut SelectionStore> {
        self.index.get(&element).map(|&i| &mut self.stores[i])
    }

    /// Number of stores with page-level listeners installed.
    pub fn active_gestures(&self) -> usize {
        self.stores.iter().filter(|s| s.is_listening()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectionStore> {
        self.stores.iter()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::Point;
    use pretty_assertions::assert_eq;

    fn arbiter() -> SelectionArbiter {
        let mut arbiter = SelectionArbiter::new(ResizeFloor::default());
        arbiter.register(ElementRef::Title, ElementTransform::IDENTITY);
        arbiter.register(ElementRef::Subtitle, ElementTransform::IDENTITY);
        arbiter.register(ElementRef::Logo(0), ElementTransform::at(4.0, 4.0));
        arbiter
    }

    #[test]
    fn selecting_one_deselects_the_rest() {
        let mut arbiter = arbiter();
        arbiter.select(ElementRef::Title);
        arbiter.select(ElementRef::Logo(0));
        assert_eq!(arbiter.selected(), Some(ElementRef::Logo(0)));
        assert_eq!(arbiter.iter().filter(|s| s.state().is_selected).count(), 1);
    }

    #[test]
    fn cancelled_gesture_is_reported() {
        let mut arbiter = arbiter();
        arbiter.select(ElementRef::Title);
        arbiter
            .store_mut(ElementRef::Title)
            .unwrap()
            .begin_drag(Point::ZERO);
        assert_eq!(arbiter.active_gestures(), 1);

        let released = arbiter.select(ElementRef::Subtitle);
        assert_eq!(released.as_slice(), &[ElementRef::Title]);
        assert_eq!(arbiter.active_gestures(), 0);
    }

    #[test]
    fn unregister_keeps_index_consistent() {
        let mut arbiter = arbiter();
        arbiter.unregister(ElementRef::Title);
        assert_eq!(arbiter.len(), 2);
        assert_eq!(
            arbiter.store(ElementRef::Logo(0)).unwrap().transform(),
            ElementTransform::at(4.0, 4.0)
        );
        arbiter.select(ElementRef::Logo(0));
        assert!(arbiter.is_selected(ElementRef::Logo(0)));
        assert!(arbiter.select(ElementRef::Title).is_empty());
        assert_eq!(arbiter.selected(), Some(ElementRef::Logo(0)));
    }

    #[test]
    fn deselect_all_is_idempotent() {
        let mut arbiter = arbiter();
        arbiter.select(ElementRef::Subtitle);
        arbiter.deselect_all_except(None);
        arbiter.deselect_all_except(None);
        assert_eq!(arbiter.selected(), None);
    }
}
