//! # Command Tokenizer
//!
//! Naive splitting of a job line into an executable and its arguments.
//!
//! Tokens are separated by literal spaces. A space inside a double-quoted
//! region does not split, and every token has surrounding `"` and space
//! characters trimmed. There is no escaping, no nested quoting and no shell
//! metacharacter handling: `a|b` is a single argument.

use std::fmt;
use thiserror::Error;

const TRIM_CHARS: &[char] = &['"', ' '];

/// A parsed invocation: what to execute and with which arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub executable: String,
    pub arguments: Vec<String>,
}

impl CommandLine {
    pub fn new<E: Into<String>>(executable: E, arguments: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            arguments,
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable)?;
        for argument in &self.arguments {
            write!(f, " {argument}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("line contains no command")]
    Empty,
}

/// Split `raw` into a [`CommandLine`]; lines without any token are rejected
pub fn tokenize(raw: &str) -> Result<CommandLine, TokenizeError> {
    let mut tokens = split_tokens(raw).into_iter();
    let executable = tokens.next().ok_or(TokenizeError::Empty)?;

    Ok(CommandLine {
        executable,
        arguments: tokens.collect(),
    })
}

fn split_tokens(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (index, ch) in raw.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ' ' if !in_quotes => {
                push_token(&mut tokens, &raw[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    push_token(&mut tokens, &raw[start..]);

    tokens
}

fn push_token(tokens: &mut Vec<String>, segment: &str) {
    let token = segment.trim_matches(TRIM_CHARS);
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
}
