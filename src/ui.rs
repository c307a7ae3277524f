//! Collaborator seams for the presentation layer: notifications and
//! confirmation dialogs. The controller only ever talks to these traits;
//! the console implementations below are what the CLI binary plugs in.

use std::io::{BufRead, Write};

/// Outcome of a confirmation dialog. Declining abandons the workflow that
/// asked; it is not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

pub trait NotificationSink {
    fn show_info(&self, message: &str);
    fn show_error(&self, message: &str);
}

pub trait ConfirmDialog {
    fn confirm(&self, title: &str, message: &str, action_label: &str) -> Confirmation;
}

impl<T: NotificationSink + ?Sized> NotificationSink for Box<T> {
    fn show_info(&self, message: &str) {
        (**self).show_info(message);
    }

    fn show_error(&self, message: &str) {
        (**self).show_error(message);
    }
}

impl<T: ConfirmDialog + ?Sized> ConfirmDialog for Box<T> {
    fn confirm(&self, title: &str, message: &str, action_label: &str) -> Confirmation {
        (**self).confirm(title, message, action_label)
    }
}

/// Prints notifications to stdout/stderr.
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn show_info(&self, message: &str) {
        println!("{}", message);
    }

    fn show_error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}

/// Interactive yes/no prompt on the terminal.
pub struct ConsoleConfirm;

impl ConfirmDialog for ConsoleConfirm {
    fn confirm(&self, title: &str, message: &str, action_label: &str) -> Confirmation {
        eprintln!("{}", title);
        eprint!("{} [{}/cancel]: ", message, action_label.to_lowercase());
        let _ = std::io::stderr().flush();

        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_err() {
            return Confirmation::Declined;
        }
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => Confirmation::Confirmed,
            answer if answer == action_label.to_lowercase() => Confirmation::Confirmed,
            _ => Confirmation::Declined,
        }
    }
}

/// Non-interactive dialog for `--yes` runs.
pub struct AssumeYes;

impl ConfirmDialog for AssumeYes {
    fn confirm(&self, _title: &str, _message: &str, _action_label: &str) -> Confirmation {
        Confirmation::Confirmed
    }
}
