//! Per-OS rules for turning a command line back into a process

use crate::game::launcher::command;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandLineError {
    #[error("Command line is empty")]
    Empty,

    #[error("Unbalanced quotes in command line")]
    UnbalancedQuotes,
}

/// How a synthesized command line is split and which classpath separator it
/// uses. Each strategy is a pure function of the string, so both can be
/// exercised on any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnStrategy {
    Windows,
    Unix,
}

impl SpawnStrategy {
    pub fn current() -> Self {
        if cfg!(windows) {
            SpawnStrategy::Windows
        } else {
            SpawnStrategy::Unix
        }
    }

    pub fn classpath_separator(&self) -> &'static str {
        match self {
            SpawnStrategy::Windows => ";",
            SpawnStrategy::Unix => ":",
        }
    }

    /// Quote `argument` if it would not come back as one word from
    /// [`split_command_line`](Self::split_command_line)
    pub fn quote(&self, argument: &str) -> String {
        match self {
            SpawnStrategy::Windows => command::quote(argument),
            SpawnStrategy::Unix if is_unix_quoted(argument) || !needs_unix_quotes(argument) => {
                argument.to_string()
            }
            SpawnStrategy::Unix => unix_quote(argument),
        }
    }

    /// Quote `argument` whether or not it needs it
    pub fn quote_always(&self, argument: &str) -> String {
        match self {
            SpawnStrategy::Windows => command::quote_always(argument),
            SpawnStrategy::Unix if is_unix_quoted(argument) => argument.to_string(),
            SpawnStrategy::Unix => unix_quote(argument),
        }
    }

    /// Quote only the value of a `key=value` argument
    pub fn quote_assignment(&self, argument: &str) -> String {
        match argument.split_once('=') {
            Some((key, value)) => format!("{}={}", key, self.quote(value)),
            None => self.quote(argument),
        }
    }

    /// Split into program and arguments
    pub fn split_command_line(&self, command_line: &str) -> Result<Vec<String>, CommandLineError> {
        let argv = match self {
            SpawnStrategy::Unix => {
                shlex::split(command_line).ok_or(CommandLineError::UnbalancedQuotes)?
            }
            SpawnStrategy::Windows => split_windows(command_line)?,
        };
        if argv.is_empty() {
            return Err(CommandLineError::Empty);
        }
        Ok(argv)
    }
}

/// Characters POSIX word splitting treats specially. Backslashes are left out:
/// `format_path` turns them into slashes once the line is assembled.
fn needs_unix_quotes(argument: &str) -> bool {
    argument.is_empty()
        || argument
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '#'))
}

fn is_unix_quoted(argument: &str) -> bool {
    argument.len() >= 2
        && argument.starts_with('"')
        && argument.ends_with('"')
        && !argument[1..argument.len() - 1].contains('"')
}

/// Double quotes keep `'` literal. An argument holding `"` is single-quoted
/// instead, with each `'` spelled `'"'"'` so no backslash escape is needed.
fn unix_quote(argument: &str) -> String {
    if argument.contains('"') {
        format!("'{}'", argument.replace('\'', r#"'"'"'"#))
    } else {
        format!("\"{}\"", argument)
    }
}

/// Double quotes group words; backslashes are plain characters since every
/// path has been normalized to forward slashes before this point.
fn split_windows(command_line: &str) -> Result<Vec<String>, CommandLineError> {
    let mut argv = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in command_line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    argv.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(CommandLineError::UnbalancedQuotes);
    }
    if has_token {
        argv.push(current);
    }
    Ok(argv)
}
