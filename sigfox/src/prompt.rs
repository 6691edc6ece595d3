use crate::utils::print_warning;
use colored::*;
use std::io::{self, BufRead, Write};

/// Source of operator input
pub trait Prompter {
    /// Read one line of text, without its line ending
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;

    /// Read one line without echoing it
    fn read_secret(&mut self, prompt: &str) -> io::Result<String>;
}

/// Reads from the controlling terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        print!("{prompt} ", prompt = prompt.bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
        rpassword::prompt_password(format!("{} ", prompt.bold()))
    }
}

/// A numbered menu entry
#[derive(Debug, Clone, Copy)]
pub struct MenuItem<T> {
    pub selector: u32,
    pub label: &'static str,
    pub action: T,
}

/// Show `items` and keep asking until one of their selectors is entered
pub fn select<P, T>(prompter: &mut P, title: &str, items: &[MenuItem<T>]) -> io::Result<T>
where
    P: Prompter + ?Sized,
    T: Copy,
{
    for item in items {
        println!(
            "[{selector}] {label}",
            selector = item.selector.to_string().cyan(),
            label = item.label
        );
    }

    loop {
        let answer = prompter.read_line(title)?;
        let chosen = answer
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|n| items.iter().find(|item| item.selector == n));

        match chosen {
            Some(item) => return Ok(item.action),
            None => print_warning("Enter a valid option."),
        }
    }
}

/// Pick one entry of a list, numbered from 1
pub fn select_from_list<'a, P>(
    prompter: &mut P,
    title: &str,
    entries: &'a [String],
) -> io::Result<&'a str>
where
    P: Prompter + ?Sized,
{
    for (index, entry) in entries.iter().enumerate() {
        println!(
            "[{number}] {entry}",
            number = (index + 1).to_string().cyan()
        );
    }

    loop {
        let answer = prompter.read_line(title)?;
        let chosen = answer
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| entries.get(index));

        match chosen {
            Some(entry) => return Ok(entry.as_str()),
            None => print_warning("Enter a valid option."),
        }
    }
}

/// Ask until `parse` accepts the answer
pub fn ask<P, T, E, F>(prompter: &mut P, prompt: &str, parse: F) -> io::Result<T>
where
    P: Prompter + ?Sized,
    E: std::fmt::Display,
    F: Fn(&str) -> Result<T, E>,
{
    loop {
        let answer = prompter.read_line(prompt)?;
        match parse(answer.trim()) {
            Ok(value) => return Ok(value),
            Err(e) => print_warning(e),
        }
    }
}

pub fn pause<P: Prompter + ?Sized>(prompter: &mut P) -> io::Result<()> {
    prompter.read_line("Press Enter to continue...")?;
    Ok(())
}

#[cfg(test)]
pub mod testing {
    use super::Prompter;
    use std::collections::VecDeque;
    use std::io;

    /// Replays canned answers; runs dry with `UnexpectedEof`
    #[derive(Debug, Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<String>,
        pub prompts: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                prompts: Vec::new(),
            }
        }

        pub fn remaining(&self) -> usize {
            self.answers.len()
        }

        fn next(&mut self, prompt: &str) -> io::Result<String> {
            self.prompts.push(prompt.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn read_line(&mut self, prompt: &str) -> io::Result<String> {
            self.next(prompt)
        }

        fn read_secret(&mut self, prompt: &str) -> io::Result<String> {
            self.next(prompt)
        }
    }
}
