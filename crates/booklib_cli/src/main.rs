//! Command-line front end for the book library.
//!
//! # Responsibility
//! - Map one CLI invocation onto one library use-case.
//! - Flush pending writes before the process exits.

use booklib_core::{
    default_log_level, init_logging, BookStore, LibraryService, SqliteKvStore, StoreConfig,
    StoreResult, SystemClock,
};
use clap::{ArgGroup, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

mod presenter;

use presenter::TerminalPresenter;

#[derive(Parser)]
#[command(name = "booklib")]
#[command(about = "Personal book library", long_about = None)]
#[command(version)]
struct Cli {
    /// Library database file
    #[arg(long, env = "BOOKLIB_DB", default_value = "booklib.sqlite3")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "BOOKLIB_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, env = "BOOKLIB_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every book, newest first
    #[command(visible_alias = "ls")]
    List,
    /// Add a book
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long, allow_negative_numbers = true)]
        pages: i64,
        /// Mark as already read
        #[arg(long)]
        read: bool,
    },
    /// Look up books by id, exact title or exact author
    #[command(group(ArgGroup::new("key").required(true).args(["id", "title", "author"])))]
    Find {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
    },
    /// Case-insensitive search over titles and authors
    Search { query: String },
    /// Flip a book's read status
    Toggle { id: String },
    /// Set a book's read status explicitly
    #[command(group(ArgGroup::new("status").required(true).args(["read", "unread"])))]
    SetStatus {
        id: String,
        #[arg(long)]
        read: bool,
        #[arg(long)]
        unread: bool,
    },
    /// Delete a book after confirmation
    #[command(visible_alias = "rm")]
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("booklib: logging disabled: {err}");
        }
    }

    let backend = match SqliteKvStore::open(&cli.db) {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("booklib: cannot open `{}`: {err}", cli.db.display());
            return ExitCode::FAILURE;
        }
    };

    let assume_yes = matches!(cli.command, Command::Delete { yes: true, .. });
    let store = BookStore::new(backend, SystemClock, StoreConfig::default());
    let mut service = LibraryService::new(store, TerminalPresenter::new(assume_yes));
    let outcome = service.start();
    info!("event=cli_start module=cli status=ok outcome={outcome:?}");

    let result = run(&mut service, cli.command);
    service.shutdown();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

fn run(
    service: &mut LibraryService<SqliteKvStore, SystemClock, TerminalPresenter>,
    command: Command,
) -> StoreResult<()> {
    match command {
        Command::List => service.show_all(),
        Command::Add {
            title,
            author,
            pages,
            read,
        } => {
            service.add_book(title.trim(), author.trim(), read, pages)?;
        }
        Command::Find { id, title, author } => {
            let found = if let Some(id) = id {
                service.store().find_by_id(&id).map(|book| vec![book])
            } else if let Some(title) = title {
                service.store().find_by_title(&title).map(|book| vec![book])
            } else {
                service
                    .store()
                    .find_by_author(author.as_deref().unwrap_or_default())
            };
            match found {
                Ok(books) => TerminalPresenter::print_books(&books),
                Err(err) => {
                    eprintln!("Error: {err}");
                    return Err(err);
                }
            }
        }
        Command::Search { query } => {
            service.search(&query);
        }
        Command::Toggle { id } => {
            service.toggle_status(&id)?;
        }
        Command::SetStatus { id, read, .. } => {
            service.set_status(&id, read)?;
        }
        Command::Delete { id, .. } => {
            service.delete_book(&id)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_accepts_negative_pages_for_core_validation() {
        let cli = Cli::try_parse_from([
            "booklib", "add", "--title", "T", "--author", "A", "--pages", "-5",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Add { pages: -5, read: false, .. }));
    }

    #[test]
    fn find_requires_exactly_one_key() {
        assert!(Cli::try_parse_from(["booklib", "find"]).is_err());
        assert!(Cli::try_parse_from(["booklib", "find", "--id", "x", "--title", "y"]).is_err());
        assert!(Cli::try_parse_from(["booklib", "find", "--author", "Harper Lee"]).is_ok());
    }

    #[test]
    fn set_status_requires_a_direction() {
        assert!(Cli::try_parse_from(["booklib", "set-status", "x"]).is_err());
        let cli = Cli::try_parse_from(["booklib", "set-status", "x", "--unread"]).unwrap();
        assert!(matches!(cli.command, Command::SetStatus { read: false, unread: true, .. }));
    }
}
