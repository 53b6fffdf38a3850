//! Interaction controller for the note list screen.
//!
//! # Responsibility
//! - Run add/view/toggle/delete/startup intents as single synchronous
//!   transactions.
//! - Write to the store first and mirror into the list only on success.
//! - Notify the surface once per mutation.
//!
//! # Invariants
//! - After every intent the list equals `NoteRepository::list_all()`.
//! - Only one intent runs at a time (`&mut self`).
//! - Stale note ids are skipped silently; store failures are returned.
//! - A write that finds its row gone reloads the list before reporting
//!   `Inconsistent`.

use crate::model::note::{Note, NoteId, NoteValidationError};
use crate::repo::note_repo::{NoteRepository, RepoError};
use crate::view::note_list::{ListChange, NoteList};
use crate::view::surface::{NoteInput, NoteSurface, NoteView};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Title of the note created on first launch.
pub const WELCOME_TITLE: &str = "Welcome";
/// Body of the note created on first launch.
pub const WELCOME_BODY: &str = "Tap the + button to add a note";
/// Acknowledgement shown after a delete.
pub const DELETE_CONFIRMATION: &str = "Task deleted";

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Unrecovered failure of a user intent.
#[derive(Debug)]
pub enum ControllerError {
    /// Store unreachable or write failed.
    Persistence(RepoError),
    /// Store reported zero rows for a note the list showed; the list has
    /// been reloaded from the store.
    Inconsistent {
        intent: &'static str,
        id: NoteId,
    },
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence(err) => write!(f, "{err}"),
            Self::Inconsistent { intent, id } => write!(
                f,
                "inconsistent note state: {intent} affected no row for note {id}"
            ),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            Self::Inconsistent { .. } => None,
        }
    }
}

impl From<RepoError> for ControllerError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

/// Result of an add intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Note stored and shown under this id.
    Created(NoteId),
    /// Input failed validation; nothing was created.
    Rejected(NoteValidationError),
}

/// Result of an intent addressed at a displayed note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentOutcome {
    Applied,
    /// The id no longer resolves to a displayed row.
    Skipped,
}

/// What startup found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupReport {
    /// Notes loaded from the store.
    pub loaded: usize,
    /// Id of the auto-created welcome note, when the store was empty.
    pub welcome_id: Option<NoteId>,
}

/// Orchestrates user intents against one store, one list and one surface.
pub struct NoteController<R: NoteRepository, S: NoteSurface> {
    repo: R,
    surface: S,
    list: NoteList,
}

impl<R: NoteRepository, S: NoteSurface> NoteController<R, S> {
    /// Creates a controller over an opened store. Call [`Self::startup`]
    /// before issuing intents.
    pub fn new(repo: R, surface: S) -> Self {
        Self {
            repo,
            surface,
            list: NoteList::new(),
        }
    }

    /// Loads the store into the list and seeds a welcome note on first run.
    ///
    /// # Errors
    /// - Any store failure; callers treat it as fatal.
    pub fn startup(&mut self) -> ControllerResult<StartupReport> {
        let notes = match self.repo.list_all() {
            Ok(notes) => notes,
            Err(err) => {
                error!("event=notes_startup module=service status=error error={err}");
                return Err(err.into());
            }
        };
        let loaded = notes.len();
        let change = self.list.refresh_from_store(notes);
        self.notify(change);

        let welcome_id = if self.list.is_empty() {
            let welcome = Note::new(WELCOME_TITLE, WELCOME_BODY);
            Some(self.store_and_show(welcome, "startup")?)
        } else {
            None
        };

        info!(
            "event=notes_startup module=service status=ok loaded={loaded} welcome_created={}",
            welcome_id.is_some()
        );
        Ok(StartupReport { loaded, welcome_id })
    }

    /// Creates a note from dialog input.
    ///
    /// Both fields are trimmed. A blank title is rejected without touching
    /// the store or the list.
    pub fn add(&mut self, input: NoteInput) -> ControllerResult<AddOutcome> {
        let note = match Note::from_input(&input.title, &input.body) {
            Ok(note) => note,
            Err(err) => {
                debug!("event=note_add module=service status=skipped reason={err}");
                return Ok(AddOutcome::Rejected(err));
            }
        };

        let id = self.store_and_show(note, "add")?;
        Ok(AddOutcome::Created(id))
    }

    /// Detail projection for a displayed note, or `None` when stale.
    pub fn view(&self, id: NoteId) -> Option<NoteView> {
        let position = self.list.position_of(id)?;
        self.list.get(position).map(NoteView::from)
    }

    /// Flips the done flag of a displayed note and persists it.
    pub fn toggle(&mut self, id: NoteId) -> ControllerResult<IntentOutcome> {
        let Some((position, mut updated)) = self.resolve(id, "toggle") else {
            return Ok(IntentOutcome::Skipped);
        };
        updated.done = !updated.done;

        let rows = self.repo.update(&updated).map_err(|err| {
            error!("event=note_toggle module=service status=error id={id} error={err}");
            ControllerError::from(err)
        })?;
        if rows == 0 {
            return Err(self.inconsistent("toggle", id));
        }

        let Some(change) = self.list.toggle_local(position) else {
            return Err(self.inconsistent("toggle", id));
        };
        self.notify(change);
        info!(
            "event=note_toggle module=service status=ok id={id} done={}",
            updated.done
        );
        Ok(IntentOutcome::Applied)
    }

    /// Deletes a displayed note and confirms it on the surface.
    pub fn delete(&mut self, id: NoteId) -> ControllerResult<IntentOutcome> {
        let Some((position, note)) = self.resolve(id, "delete") else {
            return Ok(IntentOutcome::Skipped);
        };

        let rows = self.repo.delete(&note).map_err(|err| {
            error!("event=note_delete module=service status=error id={id} error={err}");
            ControllerError::from(err)
        })?;
        if rows == 0 {
            return Err(self.inconsistent("delete", id));
        }

        let Some((_, change)) = self.list.remove_local(position) else {
            return Err(self.inconsistent("delete", id));
        };
        self.notify(change);
        self.surface.confirm(DELETE_CONFIRMATION);
        info!("event=note_delete module=service status=ok id={id}");
        Ok(IntentOutcome::Applied)
    }

    /// Current ordered notes, as the surface last saw them.
    pub fn notes(&self) -> &[Note] {
        self.list.notes()
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Hands the store and surface back, e.g. to close the store.
    pub fn into_parts(self) -> (R, S) {
        (self.repo, self.surface)
    }

    fn store_and_show(&mut self, mut note: Note, intent: &'static str) -> ControllerResult<NoteId> {
        let id = self.repo.insert(&note).map_err(|err| {
            error!("event=note_add module=service status=error intent={intent} error={err}");
            ControllerError::from(err)
        })?;
        note.id = id;

        let change = self.list.insert_local(note);
        self.notify(change);
        info!("event=note_add module=service status=ok intent={intent} id={id}");
        Ok(id)
    }

    fn resolve(&self, id: NoteId, intent: &'static str) -> Option<(usize, Note)> {
        let resolved = self
            .list
            .position_of(id)
            .and_then(|position| self.list.get(position).map(|note| (position, note.clone())));
        if resolved.is_none() {
            debug!("event=note_{intent} module=service status=skipped reason=stale id={id}");
        }
        resolved
    }

    /// Reloads the list from the store after it reported a row missing, so
    /// the divergence does not outlive this intent.
    fn inconsistent(&mut self, intent: &'static str, id: NoteId) -> ControllerError {
        error!("event=note_{intent} module=service status=error error_code=inconsistent id={id}");
        match self.repo.list_all() {
            Ok(notes) => {
                let change = self.list.refresh_from_store(notes);
                self.notify(change);
                info!(
                    "event=notes_resync module=service status=ok count={}",
                    self.list.len()
                );
                ControllerError::Inconsistent { intent, id }
            }
            Err(err) => {
                error!("event=notes_resync module=service status=error error={err}");
                ControllerError::Persistence(err)
            }
        }
    }

    fn notify(&mut self, change: ListChange) {
        self.surface.list_changed(&change, self.list.notes());
    }
}
