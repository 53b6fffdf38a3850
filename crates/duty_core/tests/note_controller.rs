use duty_core::db::DbError;
use duty_core::{
    AddOutcome, ControllerError, IntentOutcome, ListChange, Note, NoteController, NoteId,
    NoteInput, NoteRepository, NoteSurface, NoteValidationError, NullSurface, RepoError,
    RepoResult, SqliteNoteRepository, DELETE_CONFIRMATION, WELCOME_BODY, WELCOME_TITLE,
};
use std::cell::Cell;

#[derive(Default)]
struct RecordingSurface {
    changes: Vec<ListChange>,
    last_snapshot: Vec<Note>,
    confirmations: Vec<String>,
}

impl NoteSurface for RecordingSurface {
    fn list_changed(&mut self, change: &ListChange, notes: &[Note]) {
        self.changes.push(*change);
        self.last_snapshot = notes.to_vec();
    }

    fn confirm(&mut self, message: &str) {
        self.confirmations.push(message.to_string());
    }
}

type Controller = NoteController<SqliteNoteRepository, RecordingSurface>;

fn started() -> Controller {
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    let mut controller = NoteController::new(repo, RecordingSurface::default());
    controller.startup().unwrap();
    controller
}

fn add(controller: &mut Controller, title: &str, body: &str) -> NoteId {
    match controller.add(NoteInput::new(title, body)).unwrap() {
        AddOutcome::Created(id) => id,
        other => panic!("unexpected add outcome: {other:?}"),
    }
}

fn assert_mirrors_store(controller: &Controller) {
    let stored = controller.repository().list_all().unwrap();
    assert_eq!(controller.notes(), stored.as_slice());
    assert_eq!(controller.surface().last_snapshot, stored);

    let first_done = controller
        .notes()
        .iter()
        .position(|note| note.done)
        .unwrap_or(controller.notes().len());
    assert!(controller.notes()[first_done..].iter().all(|note| note.done));
}

#[test]
fn startup_on_empty_store_creates_single_welcome_note() {
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    let mut controller = NoteController::new(repo, RecordingSurface::default());

    let report = controller.startup().unwrap();

    assert_eq!(report.loaded, 0);
    let welcome_id = report.welcome_id.expect("welcome note should be created");
    assert_eq!(controller.notes().len(), 1);
    let welcome = &controller.notes()[0];
    assert_eq!(welcome.id, welcome_id);
    assert_eq!(welcome.title, WELCOME_TITLE);
    assert_eq!(welcome.body, WELCOME_BODY);
    assert!(!welcome.done);
    assert_mirrors_store(&controller);
}

#[test]
fn startup_on_non_empty_store_creates_nothing() {
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    repo.insert(&Note::new("existing", "")).unwrap();
    let mut controller = NoteController::new(repo, NullSurface);

    let report = controller.startup().unwrap();

    assert_eq!(report.loaded, 1);
    assert_eq!(report.welcome_id, None);
    assert_eq!(controller.notes().len(), 1);
    assert_eq!(controller.notes()[0].title, "existing");
}

#[test]
fn restarting_on_same_file_does_not_duplicate_welcome() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.db");

    let mut first = NoteController::new(SqliteNoteRepository::open(&path).unwrap(), NullSurface);
    assert!(first.startup().unwrap().welcome_id.is_some());
    let (repo, _) = first.into_parts();
    repo.close().unwrap();

    let mut second = NoteController::new(SqliteNoteRepository::open(&path).unwrap(), NullSurface);
    let report = second.startup().unwrap();
    assert_eq!(report.loaded, 1);
    assert_eq!(report.welcome_id, None);
}

#[test]
fn add_with_blank_title_creates_nothing() {
    let mut controller = started();
    let before = controller.notes().len();
    let changes_before = controller.surface().changes.len();

    for title in ["", "   "] {
        let outcome = controller.add(NoteInput::new(title, "body")).unwrap();
        assert_eq!(
            outcome,
            AddOutcome::Rejected(NoteValidationError::EmptyTitle)
        );
    }

    assert_eq!(controller.notes().len(), before);
    assert_eq!(controller.surface().changes.len(), changes_before);
    assert_mirrors_store(&controller);
}

#[test]
fn add_creates_undone_note_at_top_of_list() {
    let mut controller = started();

    let id = add(&mut controller, "  Buy milk ", " 2% ");

    let top = &controller.notes()[0];
    assert_eq!(top.id, id);
    assert_eq!(top.title, "Buy milk");
    assert_eq!(top.body, "2%");
    assert!(!top.done);
    assert_eq!(controller.surface().changes.last(), Some(&ListChange::Changed));
    assert_mirrors_store(&controller);
}

#[test]
fn toggle_moves_note_into_done_partition_and_back() {
    let mut controller = started();
    let milk = add(&mut controller, "Buy milk", "2%");
    let bread = add(&mut controller, "Buy bread", "");

    assert_eq!(controller.toggle(milk).unwrap(), IntentOutcome::Applied);
    let last = controller.notes().last().unwrap();
    assert_eq!(last.id, milk);
    assert!(last.done);
    assert!(controller.repository().get(milk).unwrap().unwrap().done);
    assert_mirrors_store(&controller);

    assert_eq!(controller.toggle(milk).unwrap(), IntentOutcome::Applied);
    let ids: Vec<_> = controller.notes().iter().map(|note| note.id).collect();
    assert_eq!(ids[..2], [bread, milk]);
    assert!(controller.notes().iter().all(|note| !note.done));
    assert_mirrors_store(&controller);
}

#[test]
fn delete_removes_note_and_confirms() {
    let mut controller = started();
    let keep = add(&mut controller, "keep", "");
    let gone = add(&mut controller, "gone", "");
    let others_before: Vec<Note> = controller
        .notes()
        .iter()
        .filter(|note| note.id != gone)
        .cloned()
        .collect();

    assert_eq!(controller.delete(gone).unwrap(), IntentOutcome::Applied);

    assert_eq!(controller.notes(), others_before.as_slice());
    assert!(controller.notes().iter().any(|note| note.id == keep));
    assert_eq!(controller.repository().get(gone).unwrap(), None);
    assert_eq!(
        controller.surface().changes.last(),
        Some(&ListChange::Removed { index: 0 })
    );
    assert_eq!(controller.surface().confirmations, vec![DELETE_CONFIRMATION]);
    assert_mirrors_store(&controller);
}

#[test]
fn stale_ids_are_skipped_silently() {
    let mut controller = started();
    let id = add(&mut controller, "once", "");
    controller.delete(id).unwrap();
    let changes_before = controller.surface().changes.len();

    assert_eq!(controller.toggle(id).unwrap(), IntentOutcome::Skipped);
    assert_eq!(controller.delete(id).unwrap(), IntentOutcome::Skipped);
    assert_eq!(controller.view(id), None);
    assert_eq!(controller.surface().changes.len(), changes_before);
    assert_eq!(controller.surface().confirmations.len(), 1);
}

#[test]
fn view_reflects_current_state() {
    let mut controller = started();
    let id = add(&mut controller, "Call mom", "Sunday");

    let view = controller.view(id).unwrap();
    assert_eq!(view.title, "Call mom");
    assert_eq!(view.body, "Sunday");
    assert_eq!(view.status_label, "Not done");
    assert_eq!(view.toggle_label, "Mark as Done");

    controller.toggle(id).unwrap();
    let view = controller.view(id).unwrap();
    assert!(view.done);
    assert_eq!(view.status_label, "Done");
    assert_eq!(view.toggle_label, "Mark as Undone");
}

#[test]
fn mixed_intent_sequence_keeps_list_and_store_in_sync() {
    let mut controller = started();
    let mut ids = Vec::new();
    for index in 0..6 {
        ids.push(add(&mut controller, &format!("note {index}"), "body"));
        assert_mirrors_store(&controller);
    }

    for (step, id) in ids.iter().enumerate() {
        if step % 2 == 0 {
            controller.toggle(*id).unwrap();
        }
        assert_mirrors_store(&controller);
    }

    controller.delete(ids[1]).unwrap();
    assert_mirrors_store(&controller);
    controller.delete(ids[2]).unwrap();
    assert_mirrors_store(&controller);
    controller.toggle(ids[4]).unwrap();
    assert_mirrors_store(&controller);
    controller.add(NoteInput::new(" ", "ignored")).unwrap();
    assert_mirrors_store(&controller);

    assert_eq!(controller.notes().len(), 5);
}

/// Store double that can fail or report zero affected rows on demand.
struct FlakyRepository {
    inner: SqliteNoteRepository,
    fail_writes: Cell<bool>,
    lose_rows: Cell<bool>,
}

impl FlakyRepository {
    fn new() -> Self {
        Self {
            inner: SqliteNoteRepository::open_in_memory().unwrap(),
            fail_writes: Cell::new(false),
            lose_rows: Cell::new(false),
        }
    }

    fn write_failure() -> RepoError {
        RepoError::Db(DbError::Sqlite(rusqlite::Error::InvalidQuery))
    }
}

impl NoteRepository for FlakyRepository {
    fn list_all(&self) -> RepoResult<Vec<Note>> {
        self.inner.list_all()
    }

    fn insert(&self, note: &Note) -> RepoResult<NoteId> {
        if self.fail_writes.get() {
            return Err(Self::write_failure());
        }
        self.inner.insert(note)
    }

    fn update(&self, note: &Note) -> RepoResult<usize> {
        if self.fail_writes.get() {
            return Err(Self::write_failure());
        }
        if self.lose_rows.get() {
            return Ok(0);
        }
        self.inner.update(note)
    }

    fn delete(&self, note: &Note) -> RepoResult<usize> {
        if self.fail_writes.get() {
            return Err(Self::write_failure());
        }
        if self.lose_rows.get() {
            return Ok(0);
        }
        self.inner.delete(note)
    }

    fn get(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.inner.get(id)
    }
}

#[test]
fn store_failures_propagate_and_leave_list_untouched() {
    let mut controller = NoteController::new(FlakyRepository::new(), NullSurface);
    controller.startup().unwrap();
    let before = controller.notes().to_vec();
    let welcome = before[0].id;

    controller.repository().fail_writes.set(true);

    assert!(matches!(
        controller.add(NoteInput::new("x", "")),
        Err(ControllerError::Persistence(_))
    ));
    assert!(matches!(
        controller.toggle(welcome),
        Err(ControllerError::Persistence(_))
    ));
    assert!(matches!(
        controller.delete(welcome),
        Err(ControllerError::Persistence(_))
    ));
    assert_eq!(controller.notes(), before.as_slice());
}

#[test]
fn zero_rows_affected_is_reported_as_inconsistency() {
    let mut controller = NoteController::new(FlakyRepository::new(), NullSurface);
    controller.startup().unwrap();
    let welcome = controller.notes()[0].id;

    controller.repository().lose_rows.set(true);

    match controller.toggle(welcome).unwrap_err() {
        ControllerError::Inconsistent { intent, id } => {
            assert_eq!(intent, "toggle");
            assert_eq!(id, welcome);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        controller.delete(welcome),
        Err(ControllerError::Inconsistent {
            intent: "delete",
            ..
        })
    ));
    assert_eq!(
        controller.notes(),
        controller.repository().list_all().unwrap().as_slice()
    );
    assert!(!controller.notes()[0].done);
}

#[test]
fn row_removed_behind_controller_is_dropped_from_list() {
    let mut controller = started();
    let keep = add(&mut controller, "keep", "");
    let welcome = controller
        .notes()
        .iter()
        .find(|note| note.title == WELCOME_TITLE)
        .cloned()
        .unwrap();
    assert_eq!(controller.repository().delete(&welcome).unwrap(), 1);

    assert!(matches!(
        controller.toggle(welcome.id),
        Err(ControllerError::Inconsistent {
            intent: "toggle",
            ..
        })
    ));
    assert_mirrors_store(&controller);
    assert_eq!(controller.notes().len(), 1);
    assert_eq!(controller.notes()[0].id, keep);

    assert_eq!(controller.toggle(welcome.id).unwrap(), IntentOutcome::Skipped);
    assert_eq!(controller.delete(welcome.id).unwrap(), IntentOutcome::Skipped);
}

#[test]
fn startup_fails_when_store_is_unreadable() {
    let repo = SqliteNoteRepository::open_in_memory().unwrap();
    repo.connection().execute_batch("DROP TABLE notes;").unwrap();
    let mut controller = NoteController::new(repo, NullSurface);

    assert!(matches!(
        controller.startup(),
        Err(ControllerError::Persistence(_))
    ));
}
