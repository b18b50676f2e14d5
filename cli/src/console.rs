use studyplan_core::{Notice, Notifier, Severity};

/// Prints notices to the terminal: confirmations on stdout, failures on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Normal => {
                println!("\x1b[1;32m{}\x1b[0m {}", notice.title, notice.description)
            }
            Severity::Destructive => {
                eprintln!("\x1b[1;31m{}\x1b[0m {}", notice.title, notice.description)
            }
        }
    }
}
