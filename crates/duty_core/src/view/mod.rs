//! Presentation-side state and the contracts rendering layers implement.
//!
//! # Responsibility
//! - Hold the ordered, in-memory mirror of the note store.
//! - Describe list mutations as typed change events.
//! - Define the display/confirmation surface the controller talks to.
//!
//! # Invariants
//! - Only the interaction controller mutates a `NoteList`.
//! - Rows are addressed by stable `NoteId`, never by a cached index.

pub mod note_list;
pub mod surface;
