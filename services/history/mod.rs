/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Per-pane navigation history.
//!
//! A linear list of visited locations with a single cursor. Navigating to a
//! new location from the middle of the list drops every entry after the
//! cursor before appending, so back/forward remain a simple walk.

/// One visited location and the renderer state needed to restore it.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntry {
    /// Canonical requested location.
    pub address: String,
    /// Location actually shown; differs from `address` after e.g. index resolution.
    pub displayed_address: String,
    pub title: String,
    /// Opaque renderer-specific scroll/selection/offset state.
    pub renderer_state: Option<Vec<u8>>,
    pub content_type: String,
    pub implementation_name: String,
}

impl HistoryEntry {
    pub fn new(address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            displayed_address: address.clone(),
            title: address.clone(),
            address,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// `cursor + steps` does not land on an existing entry.
    OutOfRange { cursor: usize, steps: isize, len: usize },
    /// A restored cursor does not index into the restored entries.
    InvalidCursor { cursor: usize, len: usize },
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::OutOfRange { cursor, steps, len } => write!(
                f,
                "history move of {steps} from position {cursor} is outside 0..{len}"
            ),
            HistoryError::InvalidCursor { cursor, len } => {
                write!(f, "history cursor {cursor} is outside 0..{len}")
            }
        }
    }
}

impl std::error::Error for HistoryError {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStack {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a stack from persisted parts. An empty list ignores the cursor.
    pub fn from_parts(entries: Vec<HistoryEntry>, cursor: usize) -> Result<Self, HistoryError> {
        if entries.is_empty() {
            return Ok(Self::new());
        }
        if cursor >= entries.len() {
            return Err(HistoryError::InvalidCursor {
                cursor,
                len: entries.len(),
            });
        }
        Ok(Self { entries, cursor })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cursor position, `None` while the history is empty.
    pub fn cursor(&self) -> Option<usize> {
        (!self.entries.is_empty()).then_some(self.cursor)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    pub fn can_go_back(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        !self.entries.is_empty() && self.cursor < self.entries.len() - 1
    }

    /// Drop the forward entries, push `entry` and make it current.
    pub fn append(&mut self, entry: HistoryEntry) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }

    /// The entry `steps` away from the cursor, without moving.
    pub fn peek(&self, steps: isize) -> Result<&HistoryEntry, HistoryError> {
        let target = self.target_index(steps)?;
        Ok(&self.entries[target])
    }

    /// Move the cursor by `steps` and return the entry it lands on.
    pub fn move_by(&mut self, steps: isize) -> Result<&HistoryEntry, HistoryError> {
        self.cursor = self.target_index(steps)?;
        Ok(&self.entries[self.cursor])
    }

    /// Mutate the entry at the cursor in place. Returns false on an empty history.
    pub fn update_current<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut HistoryEntry),
    {
        match self.entries.get_mut(self.cursor) {
            Some(entry) => {
                mutate(entry);
                true
            }
            None => false,
        }
    }

    fn target_index(&self, steps: isize) -> Result<usize, HistoryError> {
        let out_of_range = || HistoryError::OutOfRange {
            cursor: self.cursor,
            steps,
            len: self.entries.len(),
        };
        let target = self
            .cursor
            .checked_add_signed(steps)
            .ok_or_else(out_of_range)?;
        if target >= self.entries.len() {
            return Err(out_of_range());
        }
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stack_of(addresses: &[&str]) -> HistoryStack {
        let mut stack = HistoryStack::new();
        for address in addresses {
            stack.append(HistoryEntry::new(*address));
        }
        stack
    }

    fn addresses(stack: &HistoryStack) -> Vec<&str> {
        stack.entries().iter().map(|e| e.address.as_str()).collect()
    }

    #[test]
    fn empty_stack_has_no_cursor_and_no_movement() {
        let mut stack = HistoryStack::new();
        assert_eq!(stack.cursor(), None);
        assert!(!stack.can_go_back());
        assert!(!stack.can_go_forward());
        assert!(matches!(
            stack.move_by(0),
            Err(HistoryError::OutOfRange { len: 0, .. })
        ));
        assert!(!stack.update_current(|e| e.title = "x".into()));
    }

    #[test]
    fn append_after_moving_back_truncates_forward_entries() {
        let mut stack = stack_of(&["A", "B", "C"]);
        assert_eq!(stack.move_by(-2).unwrap().address, "A");
        stack.append(HistoryEntry::new("D"));

        assert_eq!(addresses(&stack), vec!["A", "D"]);
        assert_eq!(stack.cursor(), Some(1));
        assert!(!stack.can_go_forward());
    }

    #[test]
    fn move_out_of_range_leaves_cursor_untouched() {
        let mut stack = stack_of(&["A", "B"]);
        assert!(stack.move_by(1).is_err());
        assert!(stack.move_by(-2).is_err());
        assert_eq!(stack.cursor(), Some(1));
    }

    #[test]
    fn update_current_mutates_only_the_cursor_entry() {
        let mut stack = stack_of(&["A", "B"]);
        stack.move_by(-1).unwrap();
        assert!(stack.update_current(|e| e.displayed_address = "A/index".into()));

        assert_eq!(stack.entries()[0].displayed_address, "A/index");
        assert_eq!(stack.entries()[1].displayed_address, "B");
    }

    #[test]
    fn peek_does_not_move() {
        let stack = stack_of(&["A", "B", "C"]);
        assert_eq!(stack.peek(-1).unwrap().address, "B");
        assert_eq!(stack.cursor(), Some(2));
    }

    #[test]
    fn from_parts_rejects_cursor_past_end() {
        let entries = vec![HistoryEntry::new("A")];
        assert_eq!(
            HistoryStack::from_parts(entries.clone(), 1),
            Err(HistoryError::InvalidCursor { cursor: 1, len: 1 })
        );
        let stack = HistoryStack::from_parts(entries, 0).unwrap();
        assert_eq!(stack.current().unwrap().address, "A");
    }

    proptest! {
        #[test]
        fn cursor_stays_valid_under_any_operation_sequence(
            ops in proptest::collection::vec((any::<bool>(), -4isize..4), 0..64)
        ) {
            let mut stack = HistoryStack::new();
            for (i, (append, steps)) in ops.into_iter().enumerate() {
                if append {
                    stack.append(HistoryEntry::new(format!("addr-{i}")));
                } else {
                    let _ = stack.move_by(steps);
                }
                if let Some(cursor) = stack.cursor() {
                    prop_assert!(cursor < stack.len());
                    prop_assert_eq!(stack.can_go_back(), cursor > 0);
                    prop_assert_eq!(stack.can_go_forward(), cursor < stack.len() - 1);
                } else {
                    prop_assert!(stack.is_empty());
                }
            }
        }

        #[test]
        fn back_then_forward_returns_to_same_entry(len in 2usize..12, back in 1usize..11) {
            let back = back.min(len - 1) as isize;
            let mut stack = HistoryStack::new();
            for i in 0..len {
                stack.append(HistoryEntry::new(format!("addr-{i}")));
            }
            let before = stack.current().cloned();
            stack.move_by(-back).unwrap();
            stack.move_by(back).unwrap();
            prop_assert_eq!(stack.current().cloned(), before);
        }
    }
}
