//! Note domain model.
//!
//! # Responsibility
//! - Define the `Note` record (identity, title, body, done flag).
//! - Provide validation and the display ordering comparator.
//!
//! # Invariants
//! - `id == 0` means "not yet stored"; the store assigns ids once.
//! - `title` is non-empty after trimming for every stored note.
//! - `display_order` matches `ORDER BY done ASC, id DESC`.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned row identity.
pub type NoteId = i64;

/// Placeholder identity of a note the store has not seen yet.
pub const UNSAVED_NOTE_ID: NoteId = 0;

/// Validation failure for note writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty or whitespace only.
    EmptyTitle,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title must not be empty"),
        }
    }
}

impl Error for NoteValidationError {}

/// One task/memo shown on the list screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Row identity; [`UNSAVED_NOTE_ID`] until inserted.
    pub id: NoteId,
    pub title: String,
    /// Free text, may be empty.
    pub body: String,
    pub done: bool,
}

impl Note {
    /// Creates an unsaved note with `done = false`.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_NOTE_ID,
            title: title.into(),
            body: body.into(),
            done: false,
        }
    }

    /// Builds a note from raw dialog input, trimming both fields.
    ///
    /// Returns `EmptyTitle` instead of a note when nothing is left of the
    /// title, so an invalid note never exists.
    pub fn from_input(title: &str, body: &str) -> Result<Self, NoteValidationError> {
        let note = Self::new(title.trim(), body.trim());
        note.validate()?;
        Ok(note)
    }

    /// Checks write invariants.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        Ok(())
    }

    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_NOTE_ID
    }

    /// Row label for the done flag.
    pub fn status_label(&self) -> &'static str {
        if self.done {
            "Done"
        } else {
            "Not done"
        }
    }

    /// Label of the action that flips the done flag.
    pub fn toggle_action_label(&self) -> &'static str {
        if self.done {
            "Mark as Undone"
        } else {
            "Mark as Done"
        }
    }
}

/// Display ordering: not-done first, then newest id first.
pub fn display_order(a: &Note, b: &Note) -> Ordering {
    a.done.cmp(&b.done).then_with(|| b.id.cmp(&a.id))
}
