use carepoint_auth::{Notice, NoticeLevel, Notifier};
use colored::Colorize;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_redirect(location: &str) {
    println!("{} {}", "→".yellow(), location.yellow());
}

/// Toast surface for the terminal.
pub struct TerminalToasts;

impl Notifier for TerminalToasts {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => print_success(&notice.message),
            NoticeLevel::Error => print_error(&notice.message),
        }
    }
}
