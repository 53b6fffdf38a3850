//! Domain model for the note list screen.
//!
//! # Responsibility
//! - Define the note record shared by store, list and controller.
//! - Own the display ordering rule so every layer sorts the same way.
//!
//! # Invariants
//! - A persisted note is identified by a store-assigned `NoteId`.
//! - Not-done notes always order before done notes.

pub mod note;
