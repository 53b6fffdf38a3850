//! Presentation list: the exact sequence of notes to render.
//!
//! # Responsibility
//! - Mirror `NoteRepository::list_all()` between mutations.
//! - Re-apply the done-partition ordering after every change.
//! - Resolve stable note ids to current positions.
//!
//! # Invariants
//! - After any mutation the list is sorted by `display_order`.
//! - A position that does not resolve is a no-op, never a panic.

use crate::model::note::{display_order, Note, NoteId};
use std::cmp::Ordering;

/// Structured change event emitted by list mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    /// Content or order changed; redraw everything.
    Changed,
    /// One row left the list at `index`; the rest shifted up.
    Removed { index: usize },
}

/// Ordered in-memory notes backing the list screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteList {
    notes: Vec<Note>,
}

impl NoteList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the contents with a fresh store read.
    pub fn refresh_from_store(&mut self, notes: Vec<Note>) -> ListChange {
        self.notes = notes;
        self.sort();
        ListChange::Changed
    }

    /// Appends a stored note and moves it to its sorted slot.
    pub fn insert_local(&mut self, note: Note) -> ListChange {
        self.notes.push(note);
        self.sort();
        ListChange::Changed
    }

    /// Flips `done` at `position` and re-sorts.
    ///
    /// Returns `None` when `position` is out of range.
    pub fn toggle_local(&mut self, position: usize) -> Option<ListChange> {
        let note = self.notes.get_mut(position)?;
        note.done = !note.done;
        self.sort();
        Some(ListChange::Changed)
    }

    /// Removes the note at `position`.
    ///
    /// Returns `None` when `position` is out of range.
    pub fn remove_local(&mut self, position: usize) -> Option<(Note, ListChange)> {
        if position >= self.notes.len() {
            return None;
        }
        let removed = self.notes.remove(position);
        Some((removed, ListChange::Removed { index: position }))
    }

    /// Current index of the note with `id`, if it is still displayed.
    pub fn position_of(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }

    pub fn get(&self, position: usize) -> Option<&Note> {
        self.notes.get(position)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Whether every adjacent pair respects `display_order`.
    pub fn is_sorted(&self) -> bool {
        self.notes
            .windows(2)
            .all(|pair| display_order(&pair[0], &pair[1]) != Ordering::Greater)
    }

    fn sort(&mut self) {
        self.notes.sort_by(display_order);
    }
}
