//! Contracts for the rendering side of the note screen.
//!
//! A surface receives list change events plus the full ordered snapshot and
//! shows transient confirmations. It never mutates notes itself.

use crate::model::note::{Note, NoteId};
use crate::view::note_list::ListChange;
use serde::Serialize;

/// Display and confirmation surface driven by the controller.
pub trait NoteSurface {
    /// Called once after every list mutation with the post-change snapshot.
    fn list_changed(&mut self, change: &ListChange, notes: &[Note]);

    /// Transient, non-blocking acknowledgement (e.g. after delete).
    fn confirm(&mut self, _message: &str) {}
}

/// Surface that renders nothing; for headless sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSurface;

impl NoteSurface for NullSurface {
    fn list_changed(&mut self, _change: &ListChange, _notes: &[Note]) {}
}

/// Dialog input collected by the add form. A cancelled form yields none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteInput {
    pub title: String,
    pub body: String,
}

impl NoteInput {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Read-only projection shown by the note detail dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteView {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub done: bool,
    /// `"Done"` or `"Not done"`.
    pub status_label: &'static str,
    /// Label for the button that flips `done`.
    pub toggle_label: &'static str,
}

impl From<&Note> for NoteView {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            body: note.body.clone(),
            done: note.done,
            status_label: note.status_label(),
            toggle_label: note.toggle_action_label(),
        }
    }
}
