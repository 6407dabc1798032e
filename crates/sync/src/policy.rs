use crate::selection::SelectionEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressKind {
    Normal,
    Long,
}

/// What a row press means for the list it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    /// Remove the row from the delete list if it is a member, add it otherwise.
    ToggleMembership(i64),
    /// Add the row to the delete list, entering select mode.
    EnterSelection(i64),
    /// Leave selection untouched; the caller opens the row.
    NavigateToDetail,
}

impl RowAction {
    /// Resolves the action against the current membership of its row.
    pub fn into_event(self, in_delete_list: bool) -> Option<SelectionEvent> {
        match self {
            Self::ToggleMembership(id) if in_delete_list => {
                Some(SelectionEvent::RemoveFromDeleteList(id))
            }
            Self::ToggleMembership(id) | Self::EnterSelection(id) => {
                Some(SelectionEvent::AddToDeleteList(id))
            }
            Self::NavigateToDetail => None,
        }
    }
}

/// Classifies a press on row `id`. Membership of the row is resolved later by
/// [`RowAction::into_event`].
pub fn classify(select_mode: bool, press: PressKind, id: i64) -> RowAction {
    match (select_mode, press) {
        (true, _) => RowAction::ToggleMembership(id),
        (false, PressKind::Long) => RowAction::EnterSelection(id),
        (false, PressKind::Normal) => RowAction::NavigateToDetail,
    }
}

/// Classifies a press and resolves it to the selection event it triggers, if
/// any.
pub fn press_event(
    select_mode: bool,
    in_delete_list: bool,
    press: PressKind,
    id: i64,
) -> (RowAction, Option<SelectionEvent>) {
    let action = classify(select_mode, press, id);
    (action, action.into_event(in_delete_list))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_normal_press_navigates() {
        assert_eq!(
            press_event(false, false, PressKind::Normal, 7),
            (RowAction::NavigateToDetail, None)
        );
    }

    #[test]
    fn idle_long_press_enters_selection() {
        assert_eq!(
            press_event(false, false, PressKind::Long, 7),
            (
                RowAction::EnterSelection(7),
                Some(SelectionEvent::AddToDeleteList(7))
            )
        );
    }

    #[test]
    fn any_press_toggles_while_selecting() {
        for press in [PressKind::Normal, PressKind::Long] {
            assert_eq!(classify(true, press, 3), RowAction::ToggleMembership(3));
            assert_eq!(
                press_event(true, true, press, 3).1,
                Some(SelectionEvent::RemoveFromDeleteList(3))
            );
            assert_eq!(
                press_event(true, false, press, 3).1,
                Some(SelectionEvent::AddToDeleteList(3))
            );
        }
    }
}
