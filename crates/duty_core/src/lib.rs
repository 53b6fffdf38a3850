//! Core logic for the Duty Manager note screen.
//! This crate owns the note store, the presentation list and the
//! interaction controller; host layers only render and forward intents.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{display_order, Note, NoteId, NoteValidationError, UNSAVED_NOTE_ID};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::note_controller::{
    AddOutcome, ControllerError, ControllerResult, IntentOutcome, NoteController, StartupReport,
    DELETE_CONFIRMATION, WELCOME_BODY, WELCOME_TITLE,
};
pub use view::note_list::{ListChange, NoteList};
pub use view::surface::{NoteInput, NoteSurface, NoteView, NullSurface};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
