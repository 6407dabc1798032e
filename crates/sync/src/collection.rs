//! In-memory collection of one resource and its selection state.

use engine::{ListScope, Record};

use crate::{
    policy::{PressKind, RowAction, press_event},
    selection::{Selection, SelectionEvent, SelectionState},
};

/// Ordered entities of one resource, as last confirmed by the store.
///
/// Outside of the selection events, the collection only changes through the
/// response handlers below, which the mutation paths call after the store
/// succeeded. Every id in the delete list is present in `items`, and once a
/// listing succeeded every item lies within its scope.
#[derive(Debug, Clone)]
pub struct EntityCollectionStore<T, S = ()> {
    items: Vec<T>,
    scope: Option<S>,
    selection: Selection,
}

impl<T: Record, S: ListScope<T>> Default for EntityCollectionStore<T, S> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            scope: None,
            selection: Selection::new(),
        }
    }
}

impl<T: Record, S: ListScope<T>> EntityCollectionStore<T, S> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Whether a listing has succeeded at least once.
    pub fn is_loaded(&self) -> bool {
        self.scope.is_some()
    }

    /// Scope of the last successful listing.
    pub fn scope(&self) -> Option<&S> {
        self.scope.as_ref()
    }

    /// Whether `item` would be part of the last listing. Anything is, before
    /// the first one.
    pub fn in_scope(&self, item: &T) -> bool {
        self.scope.as_ref().is_none_or(|scope| scope.contains(item))
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.get(id).is_some()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> SelectionState {
        self.selection.state()
    }

    pub fn is_select_mode(&self) -> bool {
        self.selection.is_select_mode()
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selection.is_selected(id)
    }

    pub fn delete_list(&self) -> &[i64] {
        self.selection.delete_list()
    }

    /// Listing response: replaces the whole collection and remembers `scope`.
    /// Pending ids that are gone from the new listing leave the delete list.
    pub fn replace_all(&mut self, scope: S, items: Vec<T>) {
        self.items = items;
        self.scope = Some(scope);
        let items = &self.items;
        self.selection
            .retain(|id| items.iter().any(|item| item.id() == id));
    }

    /// Create response: appends the new entity when it lies within the listed
    /// scope. Returns whether it was kept.
    pub fn append(&mut self, item: T) -> bool {
        if !self.in_scope(&item) {
            return false;
        }
        match self.items.iter_mut().find(|slot| slot.id() == item.id()) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
        true
    }

    /// Update response: swaps the entity with the same id, or drops it when
    /// the new version left the listed scope. Returns false when no entity
    /// matched.
    pub fn replace(&mut self, item: T) -> bool {
        let id = item.id();
        let Some(index) = self.items.iter().position(|slot| slot.id() == id) else {
            return false;
        };
        if self.in_scope(&item) {
            self.items[index] = item;
        } else {
            self.items.remove(index);
            self.selection.retain(|pending| pending != id);
        }
        true
    }

    /// Delete response: drops the `requested` and the `affected` entities and
    /// takes them out of the delete list. Other pending ids stay selected.
    pub fn remove_deleted(&mut self, requested: &[i64], affected: &[i64]) {
        let gone = |id: i64| requested.contains(&id) || affected.contains(&id);
        self.items.retain(|item| !gone(item.id()));
        self.selection.retain(|id| !gone(id));
    }

    /// Empties the delete list and leaves select mode.
    pub fn reset_selection(&mut self) {
        self.selection.clear();
    }

    /// Applies a selection event. Adding an id that is not in the collection is
    /// ignored and returns false.
    pub fn dispatch(&mut self, event: SelectionEvent) -> bool {
        if let SelectionEvent::AddToDeleteList(id) = event {
            if !self.contains(id) {
                return false;
            }
        }
        self.selection.apply(event);
        true
    }

    /// Classifies a press on row `id` and applies the selection event it
    /// implies. The returned action tells the caller whether to navigate.
    pub fn on_row_press(&mut self, id: i64, press: PressKind) -> RowAction {
        let (action, event) = press_event(
            self.selection.is_select_mode(),
            self.selection.is_selected(id),
            press,
            id,
        );
        if let Some(event) = event {
            self.dispatch(event);
        }
        action
    }
}
