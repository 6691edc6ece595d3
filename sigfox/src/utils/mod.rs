use colored::*;
use sigfox_core::Response;
use std::fmt;

/// Severity of a status line written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Error,
    Success,
    Warning,
    Info,
}

impl Notice {
    fn prefix(self) -> ColoredString {
        match self {
            Notice::Error => "Error:".red().bold(),
            Notice::Success => "Done:".green().bold(),
            Notice::Warning => "Warning:".yellow().bold(),
            Notice::Info => "Info:".blue().bold(),
        }
    }
}

pub fn format_notice(kind: Notice, message: impl fmt::Display) -> String {
    format!("{prefix} {message}", prefix = kind.prefix())
}

pub fn print_error(message: impl fmt::Display) {
    eprintln!("{}", format_notice(Notice::Error, message));
}

pub fn print_success(message: impl fmt::Display) {
    eprintln!("{}", format_notice(Notice::Success, message));
}

pub fn print_warning(message: impl fmt::Display) {
    eprintln!("{}", format_notice(Notice::Warning, message));
}

pub fn print_info(message: impl fmt::Display) {
    eprintln!("{}", format_notice(Notice::Info, message));
}

/// The module's reply line, or `None` when it stayed silent
pub fn format_response(response: &Response) -> Option<String> {
    if response.is_empty() {
        return None;
    }
    Some(response.text().green().to_string())
}

/// Device replies go to stdout so they can be piped
pub fn print_response(response: &Response) {
    match format_response(response) {
        Some(line) => println!("{line}"),
        None => print_warning("No response from device"),
    }
}
