//! FFI use-case API for the Flutter note screen.
//!
//! # Responsibility
//! - Expose the note intents (open/list/add/view/toggle/delete/close) as
//!   sync FRB functions.
//! - Own the single controller session between `notes_open` and
//!   `notes_close`.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Every mutating call on an open session returns the session's ordered
//!   list, failed calls included, so the host can redraw without a second
//!   round trip.

use duty_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AddOutcome, IntentOutcome, ListChange, Note, NoteController, NoteId, NoteInput, NoteSurface,
    SqliteNoteRepository,
};
use log::{info, warn};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

const DB_PATH_ENV: &str = "DUTY_DB_PATH";
const DEFAULT_DB_FILE_NAME: &str = "duty_manager.sqlite3";

type Session = NoteController<SqliteNoteRepository, FfiSurface>;

static SESSION: Mutex<Option<Session>> = Mutex::new(None);

/// Surface that buffers the acknowledgement the host should show after the
/// current call. Rows are returned in every response instead of streamed.
#[derive(Debug, Default)]
struct FfiSurface {
    confirmation: Option<String>,
}

impl NoteSurface for FfiSurface {
    fn list_changed(&mut self, _change: &ListChange, _notes: &[Note]) {}

    fn confirm(&mut self, message: &str) {
        self.confirmation = Some(message.to_string());
    }
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
/// Repeating the same `level + log_dir` is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One list row as rendered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    /// Stable note id; pass it back for view/toggle/delete.
    pub id: i64,
    pub title: String,
    pub body: String,
    pub done: bool,
    /// `Done` or `Not done`.
    pub status_label: String,
}

/// Response envelope for list reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    /// Rows in display order (undone first, newest first).
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Response envelope for add/toggle/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// False only on session or storage failure.
    pub ok: bool,
    /// False when the intent was a no-op (blank title, stale id).
    pub applied: bool,
    /// Id of the created note for add.
    pub note_id: Option<i64>,
    /// Transient acknowledgement to show, if any.
    pub confirmation: Option<String>,
    /// Post-call rows in display order; empty only without a session.
    pub items: Vec<NoteItem>,
    pub message: String,
}

impl NoteActionResponse {
    fn no_session(operation: &str) -> Self {
        Self {
            ok: false,
            applied: false,
            note_id: None,
            confirmation: None,
            items: Vec::new(),
            message: format!("{operation} failed: no open session"),
        }
    }
}

/// Detail dialog content for one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteViewResponse {
    /// False when the id is no longer displayed or no session is open.
    pub found: bool,
    pub id: i64,
    pub title: String,
    pub body: String,
    pub done: bool,
    pub status_label: String,
    /// `Mark as Done` or `Mark as Undone`.
    pub toggle_label: String,
}

impl NoteViewResponse {
    fn not_found(id: i64) -> Self {
        Self {
            found: false,
            id,
            title: String::new(),
            body: String::new(),
            done: false,
            status_label: String::new(),
            toggle_label: String::new(),
        }
    }
}

/// Opens the notes database and runs startup (welcome note on first run).
///
/// `db_path` falls back to `$DUTY_DB_PATH`, then to a file in the temp dir.
/// Returns an empty string on success and the error message otherwise.
/// Fails when a session is already open; call `notes_close` first.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_open(db_path: Option<String>) -> String {
    let mut slot = lock_session();
    if slot.is_some() {
        return "notes_open failed: session already open".to_string();
    }

    let path = resolve_db_path(db_path);
    let repo = match SqliteNoteRepository::open(&path) {
        Ok(repo) => repo,
        Err(err) => return format!("notes_open failed: {err}"),
    };

    let mut controller = NoteController::new(repo, FfiSurface::default());
    match controller.startup() {
        Ok(report) => {
            info!(
                "event=ffi_session_open module=ffi status=ok loaded={} welcome_created={}",
                report.loaded,
                report.welcome_id.is_some()
            );
            *slot = Some(controller);
            String::new()
        }
        Err(err) => format!("notes_open failed: {err}"),
    }
}

/// Closes the open session. Closing without a session is a no-op.
///
/// Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_close() -> String {
    let Some(controller) = lock_session().take() else {
        return String::new();
    };
    let (repo, _) = controller.into_parts();
    match repo.close() {
        Ok(()) => {
            info!("event=ffi_session_close module=ffi status=ok");
            String::new()
        }
        Err(err) => format!("notes_close failed: {err}"),
    }
}

/// Current rows in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NotesListResponse {
    match lock_session().as_ref() {
        Some(controller) => {
            let items = to_items(controller.notes());
            NotesListResponse {
                ok: true,
                message: format!("{} note(s).", items.len()),
                items,
            }
        }
        None => NotesListResponse {
            ok: false,
            items: Vec::new(),
            message: "notes_list failed: no open session".to_string(),
        },
    }
}

/// Adds a note from the "New Note" dialog.
///
/// A blank title is not an error: `ok=true`, `applied=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_add(title: String, body: String) -> NoteActionResponse {
    with_session("notes_add", |controller| {
        let outcome = controller
            .add(NoteInput::new(title, body))
            .map_err(|err| err.to_string())?;
        Ok(match outcome {
            AddOutcome::Created(id) => (true, Some(id), "Note created."),
            AddOutcome::Rejected(_) => (false, None, "Title is empty; nothing created."),
        })
    })
}

/// Detail projection for the note dialog.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_view(id: i64) -> NoteViewResponse {
    let view = lock_session()
        .as_ref()
        .and_then(|controller| controller.view(id));
    match view {
        Some(view) => NoteViewResponse {
            found: true,
            id: view.id,
            title: view.title,
            body: view.body,
            done: view.done,
            status_label: view.status_label.to_string(),
            toggle_label: view.toggle_label.to_string(),
        },
        None => NoteViewResponse::not_found(id),
    }
}

/// Flips the done flag of a displayed note.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_toggle(id: i64) -> NoteActionResponse {
    with_session("notes_toggle", |controller| {
        let outcome = controller.toggle(id).map_err(|err| err.to_string())?;
        Ok(intent_result(outcome, "Note updated."))
    })
}

/// Deletes a displayed note; `confirmation` carries the acknowledgement.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_delete(id: i64) -> NoteActionResponse {
    with_session("notes_delete", |controller| {
        let outcome = controller.delete(id).map_err(|err| err.to_string())?;
        Ok(intent_result(outcome, "Note deleted."))
    })
}

fn intent_result(
    outcome: IntentOutcome,
    applied_message: &'static str,
) -> (bool, Option<NoteId>, &'static str) {
    match outcome {
        IntentOutcome::Applied => (true, None, applied_message),
        IntentOutcome::Skipped => (false, None, "Note is no longer shown; nothing changed."),
    }
}

fn with_session(
    operation: &'static str,
    f: impl FnOnce(&mut Session) -> Result<(bool, Option<NoteId>, &'static str), String>,
) -> NoteActionResponse {
    let mut slot = lock_session();
    let Some(controller) = slot.as_mut() else {
        return NoteActionResponse::no_session(operation);
    };

    let result = f(controller);
    let confirmation = controller.surface_mut().confirmation.take();
    match result {
        Ok((applied, note_id, message)) => NoteActionResponse {
            ok: true,
            applied,
            note_id,
            confirmation,
            items: to_items(controller.notes()),
            message: message.to_string(),
        },
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op={operation} error={err}");
            NoteActionResponse {
                ok: false,
                applied: false,
                note_id: None,
                confirmation,
                items: to_items(controller.notes()),
                message: format!("{operation} failed: {err}"),
            }
        }
    }
}

fn lock_session() -> MutexGuard<'static, Option<Session>> {
    // A panic while holding the lock leaves the session usable; state is
    // only mutated after successful store writes.
    SESSION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn resolve_db_path(explicit: Option<String>) -> PathBuf {
    let non_blank = |raw: String| {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    };

    explicit
        .and_then(non_blank)
        .or_else(|| std::env::var(DB_PATH_ENV).ok().and_then(non_blank))
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME))
}

fn to_items(notes: &[Note]) -> Vec<NoteItem> {
    notes
        .iter()
        .map(|note| NoteItem {
            id: note.id,
            title: note.title.clone(),
            body: note.body.clone(),
            done: note.done,
            status_label: note.status_label().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, notes_add, notes_close, notes_delete, notes_list, notes_open,
        notes_toggle, notes_view, ping, resolve_db_path,
    };
    use duty_core::{NoteRepository, SqliteNoteRepository};
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    // Session tests share the process-wide slot.
    static SESSION_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn unique_db_path(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}-{}-{nanos}.sqlite3", std::process::id()))
    }

    fn open_fresh(prefix: &str) -> PathBuf {
        let path = unique_db_path(prefix);
        let error = notes_open(Some(path.to_string_lossy().into_owned()));
        assert!(error.is_empty(), "{error}");
        path
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn explicit_db_path_wins_over_fallbacks() {
        assert_eq!(
            resolve_db_path(Some(" /data/notes.db ".to_string())),
            PathBuf::from("/data/notes.db")
        );
    }

    #[test]
    fn calls_without_session_fail_softly() {
        let _guard = SESSION_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        assert!(notes_close().is_empty());

        assert!(!notes_list().ok);
        let added = notes_add("x".to_string(), String::new());
        assert!(!added.ok);
        assert!(added.message.contains("no open session"));
        assert!(!notes_view(1).found);
    }

    #[test]
    fn session_flow_covers_all_intents() {
        let _guard = SESSION_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        assert!(notes_close().is_empty());
        let path = open_fresh("duty-ffi-flow");

        let listed = notes_list();
        assert!(listed.ok);
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].title, "Welcome");

        assert!(notes_open(None).contains("already open"));

        let blank = notes_add("   ".to_string(), "body".to_string());
        assert!(blank.ok);
        assert!(!blank.applied);
        assert_eq!(blank.items.len(), 1);

        let added = notes_add("Buy milk".to_string(), "2%".to_string());
        assert!(added.ok && added.applied, "{}", added.message);
        let milk = added.note_id.expect("add should return note id");
        assert_eq!(added.items[0].id, milk);

        let toggled = notes_toggle(milk);
        assert!(toggled.applied);
        assert_eq!(toggled.items.last().map(|item| item.id), Some(milk));
        assert_eq!(notes_view(milk).toggle_label, "Mark as Undone");

        let deleted = notes_delete(milk);
        assert!(deleted.applied);
        assert_eq!(deleted.confirmation.as_deref(), Some("Task deleted"));
        assert!(deleted.items.iter().all(|item| item.id != milk));

        let stale = notes_toggle(milk);
        assert!(stale.ok);
        assert!(!stale.applied);

        assert!(notes_close().is_empty());
        let reopened = notes_open(Some(path.to_string_lossy().into_owned()));
        assert!(reopened.is_empty(), "{reopened}");
        let listed = notes_list();
        assert_eq!(listed.items.len(), 1);
        assert_eq!(listed.items[0].title, "Welcome");
        assert!(notes_close().is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn failed_call_returns_reloaded_rows() {
        let _guard = SESSION_TEST_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        assert!(notes_close().is_empty());
        let path = open_fresh("duty-ffi-failed-call");

        let keep = notes_add("keep".to_string(), String::new())
            .note_id
            .expect("add should return note id");
        let welcome = notes_list()
            .items
            .into_iter()
            .find(|item| item.title == "Welcome")
            .expect("welcome row should be listed");

        let other = SqliteNoteRepository::open(&path).unwrap();
        let row = other.get(welcome.id).unwrap().expect("welcome row stored");
        assert_eq!(other.delete(&row).unwrap(), 1);
        other.close().unwrap();

        let failed = notes_toggle(welcome.id);
        assert!(!failed.ok);
        assert!(failed.message.contains("inconsistent"), "{}", failed.message);
        let ids: Vec<i64> = failed.items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![keep]);
        assert_eq!(notes_list().items, failed.items);

        assert!(notes_close().is_empty());
        let _ = std::fs::remove_file(path);
    }
}
