//! Multi-select state over one collection.
//!
//! `select_mode` is updated at each transition rather than derived from the
//! delete list on read. Every transition leaves
//! `select_mode == !delete_list.is_empty()`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Idle,
    Selecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    AddToDeleteList(i64),
    RemoveFromDeleteList(i64),
    Cancel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    delete_list: Vec<i64>,
    select_mode: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: SelectionEvent) {
        match event {
            SelectionEvent::AddToDeleteList(id) => self.add(id),
            SelectionEvent::RemoveFromDeleteList(id) => self.remove(id),
            SelectionEvent::Cancel => self.clear(),
        }
    }

    fn add(&mut self, id: i64) {
        if !self.select_mode && self.delete_list.is_empty() {
            self.select_mode = true;
        }
        if !self.delete_list.contains(&id) {
            self.delete_list.push(id);
        }
    }

    fn remove(&mut self, id: i64) {
        self.delete_list.retain(|member| *member != id);
        if self.select_mode && self.delete_list.is_empty() {
            self.select_mode = false;
        }
    }

    /// Empties the delete list and leaves select mode.
    pub fn clear(&mut self) {
        self.delete_list.clear();
        self.select_mode = false;
    }

    /// Drops the members for which `keep` returns false, leaving select mode
    /// when nothing is left.
    pub fn retain(&mut self, mut keep: impl FnMut(i64) -> bool) {
        self.delete_list.retain(|id| keep(*id));
        if self.select_mode && self.delete_list.is_empty() {
            self.select_mode = false;
        }
    }

    /// Pending ids in the order they were added.
    pub fn delete_list(&self) -> &[i64] {
        &self.delete_list
    }

    pub fn is_select_mode(&self) -> bool {
        self.select_mode
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.delete_list.contains(&id)
    }

    pub fn state(&self) -> SelectionState {
        if self.select_mode {
            SelectionState::Selecting
        } else {
            SelectionState::Idle
        }
    }
}
