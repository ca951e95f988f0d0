//! Terminal implementation of the presentation contract.

use booklib_core::{Book, ConfirmOptions, Presenter, Severity};
use std::io::{self, BufRead, Write};

pub struct TerminalPresenter {
    assume_yes: bool,
}

impl TerminalPresenter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    pub fn print_books(books: &[Book]) {
        if books.is_empty() {
            println!("No books found.");
            return;
        }
        for book in books {
            let status = if book.is_read { "read  " } else { "unread" };
            println!(
                "{}  [{}]  {} by {} ({} pages, added {})",
                book.id,
                status,
                book.title,
                book.author,
                book.num_of_pages,
                book.created_at.format("%Y-%m-%d")
            );
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, books: &[Book]) {
        Self::print_books(books);
    }

    fn notify(&mut self, title: &str, message: &str, severity: Severity) {
        match severity {
            Severity::Error => eprintln!("{title} {message}"),
            Severity::Success | Severity::Info => println!("{title} {message}"),
        }
    }

    fn confirm(&mut self, title: &str, message: &str, options: &ConfirmOptions) -> bool {
        if self.assume_yes {
            return true;
        }

        print!(
            "{title}: {message} [{}/{}] (y/N) ",
            options.confirm_text, options.cancel_text
        );
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
