//! Decision sources for interactive yes/no questions.
//!
//! Steps never read stdin themselves. They ask a [`Prompter`], which is a
//! terminal in production and a scripted queue in tests.

use std::collections::VecDeque;
use std::io::{self, IsTerminal};

use crate::console;
use crate::error::Result;

/// A yes/no question with the answer used on empty input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub question: String,
    pub default: bool,
}

impl Confirmation {
    /// A question defaulting to yes
    pub fn yes(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            default: true,
        }
    }
}

/// Source of yes/no decisions.
pub trait Prompter {
    /// Ask `question`; `default` is returned for an empty answer.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;

    fn ask(&mut self, confirmation: &Confirmation) -> Result<bool> {
        self.confirm(&confirmation.question, confirmation.default)
    }
}

/// Asks on the controlling terminal through `dialoguer`.
///
/// Without a terminal (piped stdin, cron, CI) nobody can answer, so every
/// question takes its default and the choice is printed.
#[derive(Debug, Clone)]
pub struct TerminalPrompter {
    interactive: bool,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPrompter {
    /// Interactive when both stdin and stderr are terminals
    pub fn new() -> Self {
        Self::with_interactive(io::stdin().is_terminal() && io::stderr().is_terminal())
    }

    pub fn with_interactive(interactive: bool) -> Self {
        Self { interactive }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        if !self.interactive {
            let answer = if default { "yes" } else { "no" };
            console::info(&format!("{} {} (no terminal, using default)", question, answer));
            return Ok(default);
        }

        let answer = dialoguer::Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact_opt();

        match answer {
            Ok(Some(answer)) => Ok(answer),
            // Esc or q: no explicit answer
            Ok(None) => Ok(default),
            Err(dialoguer::Error::IO(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                tracing::debug!("EOF on prompt input, using default for {:?}", question);
                Ok(default)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Answers from a fixed queue; falls back to the default once exhausted.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<bool>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Accept every default
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Questions asked so far, in order
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        self.asked.push(question.to_string());
        Ok(self.answers.pop_front().unwrap_or(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_interactive_terminal_takes_defaults() {
        let mut prompter = TerminalPrompter::with_interactive(false);
        assert!(!prompter.is_interactive());
        assert!(prompter.confirm("Proceed?", true).unwrap());
        assert!(!prompter.confirm("Continue anyway?", false).unwrap());
    }

    #[test]
    fn test_ask_uses_confirmation_default() {
        let mut prompter = TerminalPrompter::with_interactive(false);
        assert!(prompter.ask(&Confirmation::yes("Reboot now?")).unwrap());
    }

    #[test]
    fn test_scripted_prompter_records_questions() {
        let mut prompter = ScriptedPrompter::new([false]);
        assert!(!prompter.confirm("first", true).unwrap());
        assert!(prompter.confirm("second", true).unwrap());
        assert_eq!(prompter.asked(), ["first", "second"]);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_scripted_prompter_exhausted_queue_takes_default() {
        let mut prompter = ScriptedPrompter::defaults();
        assert!(!prompter.confirm("Continue anyway?", false).unwrap());
        assert!(prompter.ask(&Confirmation::yes("Proceed?")).unwrap());
        assert_eq!(prompter.asked().len(), 2);
    }
}
