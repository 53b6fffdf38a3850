//! Command-line front end for the note store.
//!
//! # Responsibility
//! - Drive the same controller the mobile host uses, against a database file.
//! - Print the ordered list after every intent for quick local checks.

use clap::{Parser, Subcommand};
use duty_core::{
    default_log_level, init_logging, AddOutcome, ControllerError, IntentOutcome, ListChange,
    Note, NoteController, NoteId, NoteInput, NoteSurface, SqliteNoteRepository,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "duty", about = "Duty Manager notes from the terminal", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Notes database file
    #[arg(long, global = true, env = "DUTY_DB_PATH", default_value = "notes.db")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off without it
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Print core linkage info
    Ping,
    /// List notes, undone first
    List,
    /// Add a note
    Add {
        title: String,
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Show one note
    View { id: NoteId },
    /// Flip a note's done flag
    Toggle { id: NoteId },
    /// Delete a note
    Delete { id: NoteId },
}

/// Prints confirmations; the list itself is printed once per command.
struct TerminalSurface;

impl NoteSurface for TerminalSurface {
    fn list_changed(&mut self, _change: &ListChange, _notes: &[Note]) {}

    fn confirm(&mut self, message: &str) {
        println!("{message}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), ControllerError> {
    if let Command::Ping = cli.command {
        println!("duty_core ping={}", duty_core::ping());
        println!("duty_core version={}", duty_core::core_version());
        return Ok(());
    }

    let repo = SqliteNoteRepository::open(&cli.db)?;
    let mut controller = NoteController::new(repo, TerminalSurface);
    controller.startup()?;

    match cli.command {
        Command::Ping | Command::List => {}
        Command::Add { title, body } => match controller.add(NoteInput::new(title, body))? {
            AddOutcome::Created(id) => println!("created {id}"),
            AddOutcome::Rejected(err) => println!("nothing created: {err}"),
        },
        Command::View { id } => {
            match controller.view(id) {
                Some(view) => println!(
                    "#{} {}\n\n{}\n\n{}",
                    view.id, view.title, view.body, view.status_label
                ),
                None => println!("no note {id}"),
            }
            return close(controller);
        }
        Command::Toggle { id } => report(controller.toggle(id)?, id),
        Command::Delete { id } => report(controller.delete(id)?, id),
    }

    print_list(controller.notes());
    close(controller)
}

fn report(outcome: IntentOutcome, id: NoteId) {
    if outcome == IntentOutcome::Skipped {
        println!("no note {id}");
    }
}

fn print_list(notes: &[Note]) {
    for note in notes {
        println!("{:>5}  [{}]  {}", note.id, note.status_label(), note.title);
    }
}

fn close(
    controller: NoteController<SqliteNoteRepository, TerminalSurface>,
) -> Result<(), ControllerError> {
    let (repo, _) = controller.into_parts();
    repo.close()?;
    Ok(())
}
