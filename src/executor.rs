//! The effect side of provisioning.
//!
//! Steps decide *what* should change and express it as [`Action`]s. The
//! [`Executor`] decides *whether* it changes: in `Live` mode it hands each
//! action to the [`System`]; in `DryRun` it only prints a description. Both
//! paths append to the journal, which is the run's record of intent.

use std::fmt;
use std::path::PathBuf;

use crate::command_traits::{CommandArgs, CommandLine};
use crate::console;
use crate::error::Result;
use crate::system::System;
use crate::types::RunMode;

/// One mutating effect on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run an external command; a non-zero exit fails the step
    Run(CommandLine),
    /// Create a directory and its parents
    CreateDir(PathBuf),
    /// Recursively copy a tree, overwriting files, skipping `exclude` names
    CopyTree {
        from: PathBuf,
        to: PathBuf,
        exclude: Vec<String>,
    },
    /// Write (or overwrite) a file
    WriteFile { path: PathBuf, contents: String },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run(cmd) => write!(f, "run `{}`", cmd),
            Self::CreateDir(path) => write!(f, "create directory {}", path.display()),
            Self::CopyTree { from, to, .. } => {
                write!(f, "copy {} into {}", from.display(), to.display())
            }
            Self::WriteFile { path, contents } => {
                write!(f, "write {} ({} bytes)", path.display(), contents.len())
            }
        }
    }
}

/// A journaled action and whether it actually touched the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub action: Action,
    pub applied: bool,
}

/// Applies or describes actions according to the run mode.
pub struct Executor<'a> {
    mode: RunMode,
    system: &'a mut dyn System,
    journal: Vec<JournalEntry>,
}

impl<'a> Executor<'a> {
    pub fn new(mode: RunMode, system: &'a mut dyn System) -> Self {
        Self {
            mode,
            system,
            journal: Vec::new(),
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Read-only access for state queries (always real, also in dry-run)
    pub fn system(&self) -> &dyn System {
        &*self.system
    }

    /// Apply `action` in live mode, describe it in dry-run.
    pub fn execute(&mut self, action: Action) -> Result<()> {
        let applied = match self.mode {
            RunMode::DryRun => {
                match &action {
                    Action::WriteFile { path, contents } => {
                        console::block(&format!("Would write {}:", path.display()), contents)
                    }
                    other => console::emit(
                        crate::types::Severity::DryRun,
                        &format!("Would {}", other),
                    ),
                }
                false
            }
            RunMode::Live => {
                tracing::info!("Applying: {}", action);
                self.system.apply(&action)?;
                true
            }
        };

        self.journal.push(JournalEntry { action, applied });
        Ok(())
    }

    /// Shorthand for running a typed command
    pub fn run<C: CommandArgs>(&mut self, args: &C) -> Result<()> {
        self.execute(Action::Run(args.command_line()))
    }

    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    pub fn into_journal(self) -> Vec<JournalEntry> {
        self.journal
    }
}
